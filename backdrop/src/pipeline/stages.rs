//! Dirty tracking for the three pipeline stages.
//!
//! The stages form a chain, so invalidating one stage invalidates every
//! stage after it.

use strum_macros::{Display, EnumIter};

use super::params::ProcessingParams;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum Stage {
    Smoothing,
    Thresholding,
    Morphology,
}

impl Stage {
    pub const COUNT: usize = 3;

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// The stage whose output this stage consumes.
    pub fn upstream(self) -> Option<Stage> {
        match self {
            Stage::Smoothing => None,
            Stage::Thresholding => Some(Stage::Smoothing),
            Stage::Morphology => Some(Stage::Thresholding),
        }
    }

    /// Whether a change from `old` to `new` touches a parameter this stage
    /// reads directly.
    pub fn depends_on_change(self, old: &ProcessingParams, new: &ProcessingParams) -> bool {
        match self {
            Stage::Smoothing => old.blur_radius != new.blur_radius,
            Stage::Thresholding => old.threshold != new.threshold,
            Stage::Morphology => {
                old.opening_radius != new.opening_radius
                    || old.closing_iterations != new.closing_iterations
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirtyFlags {
    dirty: [bool; Stage::COUNT],
}

impl Default for DirtyFlags {
    fn default() -> Self {
        Self::all()
    }
}

impl DirtyFlags {
    pub fn all() -> Self {
        Self {
            dirty: [true; Stage::COUNT],
        }
    }

    pub fn is_dirty(&self, stage: Stage) -> bool {
        self.dirty[stage.index()]
    }

    pub fn any(&self) -> bool {
        self.dirty.iter().any(|&d| d)
    }

    /// Marks `stage` and everything downstream of it.
    pub fn mark(&mut self, stage: Stage) {
        for flag in &mut self.dirty[stage.index()..] {
            *flag = true;
        }
    }

    pub fn mark_all(&mut self) {
        self.dirty = [true; Stage::COUNT];
    }

    pub fn clear(&mut self, stage: Stage) {
        debug_assert!(
            stage.upstream().is_none_or(|up| !self.is_dirty(up)),
            "{stage} cleaned before its upstream stage"
        );
        self.dirty[stage.index()] = false;
    }
}

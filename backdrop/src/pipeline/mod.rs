//! Incremental foreground/background mask computation.
//!
//! The mask for a reference frame is produced by three chained stages:
//!
//! 1. **Smoothing** - blur the reference and every other frame and keep the
//!    grayscale intensity of each absolute difference.
//! 2. **Thresholding** - a pixel agrees with a frame when its difference is
//!    below the threshold; agreements are OR-ed across frames.
//! 3. **Morphology** - an opening drops small accepted specks, then a few
//!    fixed 5x5 erosions pull accepted areas back from their edges.
//!
//! Each stage reruns only when a parameter it reads changed or an upstream
//! stage reran, which keeps interactive tuning cheap.

mod params;
mod stages;

use common::Buffer2;
use log::{debug, trace};
use strum::IntoEnumIterator;

use crate::error::{Error, Result};
use crate::frame::{Frame, Mask};
use crate::rolling_window::RollingWindowFilter;

pub use params::ProcessingParams;
pub use stages::{DirtyFlags, Stage};

/// Radius of the erosion repeated `closing_iterations` times (a 5x5 window).
pub const SAFETY_MARGIN_RADIUS: usize = 2;

#[derive(Debug)]
pub struct MaskPipeline {
    filter: RollingWindowFilter,
    dirty: DirtyFlags,
    last_params: Option<ProcessingParams>,
    reference: Option<usize>,
    stage_runs: [usize; Stage::COUNT],

    /// Grayscale blurred differences against every non-reference frame, in
    /// frame order.
    differences: Vec<Buffer2<u8>>,
    /// OR of per-frame agreement before morphology.
    agreement: Mask,
    mask: Mask,
}

impl MaskPipeline {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            filter: RollingWindowFilter::new(width, height),
            dirty: DirtyFlags::all(),
            last_params: None,
            reference: None,
            stage_runs: [0; Stage::COUNT],
            differences: Vec::new(),
            agreement: Mask::new_default(width, height),
            mask: Mask::new_default(width, height),
        }
    }

    pub fn filter(&self) -> &RollingWindowFilter {
        &self.filter
    }

    pub fn size(&self) -> (usize, usize) {
        (self.filter.width(), self.filter.height())
    }

    /// How many times `stage` has been recomputed.
    pub fn stage_runs(&self, stage: Stage) -> usize {
        self.stage_runs[stage.index()]
    }

    pub fn dirty(&self) -> &DirtyFlags {
        &self.dirty
    }

    pub fn last_params(&self) -> Option<&ProcessingParams> {
        self.last_params.as_ref()
    }

    /// Reference frame the cached stages were computed for.
    pub fn reference(&self) -> Option<usize> {
        self.reference
    }

    /// Most recent mask, if every stage is up to date.
    pub fn mask(&self) -> Option<&Mask> {
        (!self.dirty.any()).then_some(&self.mask)
    }

    pub fn differences(&self) -> &[Buffer2<u8>] {
        &self.differences
    }

    /// Drops every cached stage, e.g. after the frame set changed.
    pub fn invalidate(&mut self) {
        self.dirty.mark_all();
        self.last_params = None;
        self.reference = None;
    }

    /// Background mask of `frames[reference]` against all other frames.
    ///
    /// Returns the cached mask when neither the reference nor the parameters
    /// changed since the previous call. Invalid parameters, a reference out of
    /// range and frames of the wrong size are rejected before anything is
    /// recomputed.
    pub fn compute_mask(
        &mut self,
        frames: &[Frame],
        reference: usize,
        params: &ProcessingParams,
    ) -> Result<&Mask> {
        params.validate()?;
        if frames.len() < 2 {
            return Err(Error::NotEnoughFrames {
                count: frames.len(),
            });
        }
        if reference >= frames.len() {
            return Err(Error::ReferenceOutOfRange {
                index: reference,
                count: frames.len(),
            });
        }
        if let Some((index, frame)) = frames
            .iter()
            .enumerate()
            .find(|(_, frame)| frame.size() != self.size())
        {
            return Err(Error::DimensionMismatch {
                index,
                expected: self.size(),
                actual: frame.size(),
            });
        }

        if self.reference != Some(reference) {
            self.dirty.mark_all();
            self.reference = Some(reference);
        }
        match &self.last_params {
            Some(last) => {
                for stage in Stage::iter() {
                    if stage.depends_on_change(last, params) {
                        self.dirty.mark(stage);
                    }
                }
            }
            None => self.dirty.mark_all(),
        }

        for stage in Stage::iter() {
            if !self.dirty.is_dirty(stage) {
                trace!("{stage} is up to date for reference {reference}");
                continue;
            }

            debug!("Recomputing {stage} for reference {reference}");
            match stage {
                Stage::Smoothing => self.smooth(frames, reference, params.blur_radius as usize),
                Stage::Thresholding => self.threshold(params.threshold),
                Stage::Morphology => self.morph(
                    params.opening_radius as usize,
                    params.closing_iterations as usize,
                ),
            }
            self.stage_runs[stage.index()] += 1;
            self.dirty.clear(stage);
        }

        self.last_params = Some(*params);
        Ok(&self.mask)
    }

    fn smooth(&mut self, frames: &[Frame], reference: usize, blur_radius: usize) {
        let blurred_reference = self.filter.mean_blur(&frames[reference], blur_radius);

        self.differences = frames
            .iter()
            .enumerate()
            .filter(|&(index, _)| index != reference)
            .map(|(_, frame)| {
                let blurred = self.filter.mean_blur(frame, blur_radius);
                let diffs = blurred_reference
                    .iter()
                    .zip(blurred.iter())
                    .map(|(&a, &b)| a.abs_diff(b).luma())
                    .collect();
                Buffer2::new(blurred.width(), blurred.height(), diffs)
            })
            .collect();
    }

    /// A pixel agrees with a frame when its difference is strictly below
    /// `threshold`, so a threshold of 0 accepts nothing.
    fn threshold(&mut self, threshold: u32) {
        let (width, height) = self.size();
        self.agreement = Mask::new_default(width, height);
        for diff in &self.differences {
            let agrees = Mask::from_fn(width, height, |x, y| (diff[(x, y)] as u32) < threshold);
            self.agreement.or_assign(&agrees);
        }
    }

    fn morph(&mut self, opening_radius: usize, closing_iterations: usize) {
        let mut mask = self.filter.open(&self.agreement, opening_radius);
        for _ in 0..closing_iterations {
            mask = self.filter.erode(&mask, SAFETY_MARGIN_RADIUS);
        }
        self.mask = mask;
    }
}

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Tuning knobs of the mask pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingParams {
    /// Box blur radius applied before differencing. Larger radii give
    /// smoother, less noisy masks.
    pub blur_radius: u32,
    /// Grayscale difference below which two frames agree, in `[0, 255]`.
    /// Low values reject almost everything, high values accept almost
    /// everything.
    pub threshold: u32,
    /// Radius of the opening that removes accepted areas smaller than the
    /// window.
    pub opening_radius: u32,
    /// Number of 5x5 erosions applied last to keep accepted areas away from
    /// uncertain boundaries.
    pub closing_iterations: u32,
}

impl Default for ProcessingParams {
    fn default() -> Self {
        Self {
            blur_radius: 3,
            threshold: 20,
            opening_radius: 4,
            closing_iterations: 1,
        }
    }
}

impl ProcessingParams {
    pub const MAX_THRESHOLD: u32 = 255;
    /// Largest accepted blur or opening radius. Row sums are padded with
    /// `radius` rows on both sides, so the radius bounds memory use.
    pub const MAX_RADIUS: u32 = 4096;

    pub fn new(
        blur_radius: u32,
        threshold: u32,
        opening_radius: u32,
        closing_iterations: u32,
    ) -> Self {
        Self {
            blur_radius,
            threshold,
            opening_radius,
            closing_iterations,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.threshold > Self::MAX_THRESHOLD {
            return Err(Error::ThresholdOutOfRange(self.threshold));
        }
        for (name, value) in [
            ("blur_radius", self.blur_radius),
            ("opening_radius", self.opening_radius),
        ] {
            if value > Self::MAX_RADIUS {
                return Err(Error::RadiusOutOfRange {
                    name,
                    value,
                    max: Self::MAX_RADIUS,
                });
            }
        }
        Ok(())
    }
}

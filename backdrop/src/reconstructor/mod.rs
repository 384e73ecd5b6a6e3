//! Reference-by-reference background reconstruction.
//!
//! Frames are visited in order. For the current reference the caller tunes
//! [`ProcessingParams`] through [`BackgroundReconstructor::request_preview`]
//! and then commits the mask, which copies the accepted pixels that are still
//! uncovered into the output image. The session ends once every pixel is
//! covered or no reference is left.

mod overlay;
#[cfg(test)]
mod tests;

use log::{debug, info, warn};
use strum_macros::Display;

use crate::config::ReconstructorConfig;
use crate::error::{Error, Result};
use crate::frame::{Frame, Mask};
use crate::pipeline::{MaskPipeline, ProcessingParams};
use crate::resample::{downsample_frame, upscale_mask, working_size};

pub use overlay::compose_overlay;

/// Result of committing a mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Status {
    /// More references are available and some pixels are still uncovered.
    Continue,
    /// Every output pixel has been filled.
    Success,
    /// References are exhausted with pixels still uncovered.
    Fail,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Outcome {
    Success,
    Failure,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum State {
    /// No frames loaded.
    Empty,
    /// Positioned on a reference with no validated mask yet.
    Ready,
    /// A previewed mask for the current reference is waiting to be committed.
    AwaitingValidatedMask,
    Finished(Outcome),
}

#[derive(Debug, Clone)]
pub struct Preview {
    /// Working-resolution rendering of the mask over the reference.
    pub overlay: Frame,
    /// Whether committing the mask would fill at least one uncovered pixel.
    /// A commit is allowed either way and moves on to the next reference.
    pub mask_valid: bool,
    /// Pixels a commit would fill.
    pub new_pixels: usize,
}

#[derive(Debug)]
struct Session {
    originals: Vec<Frame>,
    working: Vec<Frame>,
    pipeline: MaskPipeline,
    coverage: Mask,
    output: Frame,
    cursor: usize,
    mask_validated: bool,
}

#[derive(Debug)]
pub struct BackgroundReconstructor {
    config: ReconstructorConfig,
    session: Option<Session>,
    state: State,
}

impl BackgroundReconstructor {
    pub fn new(config: ReconstructorConfig) -> Self {
        Self {
            config,
            session: None,
            state: State::Empty,
        }
    }

    pub fn config(&self) -> &ReconstructorConfig {
        &self.config
    }

    pub fn state(&self) -> State {
        self.state
    }

    /// Starts a new session on `frames`.
    ///
    /// Requires at least two non-empty frames of identical size. On error the
    /// current session is left as it was.
    pub fn load_frames(&mut self, frames: Vec<Frame>) -> Result<()> {
        if frames.len() < 2 {
            return Err(Error::NotEnoughFrames {
                count: frames.len(),
            });
        }

        let original_size = frames[0].size();
        if let Some((index, frame)) = frames
            .iter()
            .enumerate()
            .find(|(_, frame)| frame.size() != original_size)
        {
            return Err(Error::DimensionMismatch {
                index,
                expected: original_size,
                actual: frame.size(),
            });
        }

        if original_size.0 == 0 || original_size.1 == 0 {
            return Err(Error::EmptyFrame {
                width: original_size.0,
                height: original_size.1,
            });
        }

        let (width, height) = working_size(original_size, self.config.scale_factor)?;
        let working = frames
            .iter()
            .map(|frame| downsample_frame(frame, width, height))
            .collect();

        info!(
            "Loaded {} frames of {}x{}, working at {}x{}",
            frames.len(),
            original_size.0,
            original_size.1,
            width,
            height
        );

        self.session = Some(Session {
            output: Frame::new_filled(
                original_size.0,
                original_size.1,
                self.config.sentinel_color,
            ),
            originals: frames,
            working,
            pipeline: MaskPipeline::new(width, height),
            coverage: Mask::new_filled(width, height, true),
            cursor: 0,
            mask_validated: false,
        });
        self.state = State::Ready;

        Ok(())
    }

    /// Computes the mask of the current reference and renders it.
    ///
    /// Marks the mask as validated so it can be committed. Does not move to
    /// the next reference.
    pub fn request_preview(&mut self, params: &ProcessingParams) -> Result<Preview> {
        self.ensure_active()?;
        let session = self.session.as_mut().ok_or(Error::NoFramesLoaded)?;

        let mask = session
            .pipeline
            .compute_mask(&session.working, session.cursor, params)?;
        let overlay = compose_overlay(&session.working[session.cursor], mask, &session.coverage);
        let new_pixels = mask.and(&session.coverage).count_ones();

        session.mask_validated = true;
        self.state = State::AwaitingValidatedMask;
        debug!(
            "Previewed reference {} with {:?}: {} new pixels",
            session.cursor, params, new_pixels
        );

        Ok(Preview {
            overlay,
            mask_valid: new_pixels > 0,
            new_pixels,
        })
    }

    /// Writes the validated mask of the current reference into the output and
    /// moves on.
    pub fn commit_current_mask(&mut self) -> Result<Status> {
        self.ensure_active()?;
        let session = self.session.as_mut().ok_or(Error::NoFramesLoaded)?;

        let mask = match session.pipeline.mask() {
            Some(mask) if session.mask_validated => mask,
            _ => {
                return Err(Error::MaskNotValidated {
                    reference: session.cursor,
                })
            }
        };

        // only pixels no earlier reference has filled
        let contribution = mask.and(&session.coverage);
        let (out_width, out_height) = session.output.size();
        let contribution = upscale_mask(&contribution, out_width, out_height);
        let reference = &session.originals[session.cursor];
        for (idx, (out, &px)) in session
            .output
            .iter_mut()
            .zip(reference.iter())
            .enumerate()
        {
            if contribution.get(idx) {
                *out = px;
            }
        }

        session.coverage.clear_where(mask);
        let uncovered = session.coverage.count_ones();
        info!(
            "Committed reference {}, {} working pixels left uncovered",
            session.cursor, uncovered
        );

        if uncovered == 0 {
            self.state = State::Finished(Outcome::Success);
            return Ok(Status::Success);
        }

        session.cursor += 1;
        session.mask_validated = false;
        if session.cursor >= session.originals.len() {
            warn!("Ran out of references with {uncovered} pixels uncovered");
            self.state = State::Finished(Outcome::Failure);
            Ok(Status::Fail)
        } else {
            self.state = State::Ready;
            Ok(Status::Continue)
        }
    }

    /// Releases every frame and returns to [`State::Empty`].
    pub fn reset(&mut self) {
        self.session = None;
        self.state = State::Empty;
    }

    /// Output image so far. Uncovered pixels hold the sentinel color.
    pub fn output_image(&self) -> Option<&Frame> {
        self.session.as_ref().map(|s| &s.output)
    }

    /// Working-resolution pixels that still need a value.
    pub fn coverage_mask(&self) -> Option<&Mask> {
        self.session.as_ref().map(|s| &s.coverage)
    }

    pub fn uncovered_pixel_count(&self) -> Option<usize> {
        self.coverage_mask().map(Mask::count_ones)
    }

    /// Mask of the current reference, if one has been validated.
    pub fn current_mask(&self) -> Option<&Mask> {
        let session = self.session.as_ref()?;
        if session.mask_validated {
            session.pipeline.mask()
        } else {
            None
        }
    }

    /// Index of the current reference. Equals [`Self::frame_count`] once the
    /// references are exhausted.
    pub fn reference_index(&self) -> Option<usize> {
        self.session.as_ref().map(|s| s.cursor)
    }

    pub fn frame_count(&self) -> usize {
        self.session.as_ref().map_or(0, |s| s.originals.len())
    }

    pub fn working_size(&self) -> Option<(usize, usize)> {
        self.session.as_ref().map(|s| s.coverage.size())
    }

    pub fn original_size(&self) -> Option<(usize, usize)> {
        self.session.as_ref().map(|s| s.output.size())
    }

    pub fn pipeline(&self) -> Option<&MaskPipeline> {
        self.session.as_ref().map(|s| &s.pipeline)
    }

    fn ensure_active(&self) -> Result<()> {
        match self.state {
            State::Empty => Err(Error::NoFramesLoaded),
            State::Finished(_) => Err(Error::SessionFinished),
            State::Ready | State::AwaitingValidatedMask => Ok(()),
        }
    }
}

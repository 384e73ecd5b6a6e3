//! Backdrop - static background reconstruction.
//!
//! Given several aligned photos of the same scene with different transient
//! foreground objects (people, cars, birds), picks for every region a photo
//! in which that region shows the background and stitches those regions into
//! one clean image.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use backdrop::{BackgroundReconstructor, ProcessingParams, ReconstructorConfig, Status};
//!
//! let mut reconstructor = BackgroundReconstructor::new(ReconstructorConfig::default());
//! reconstructor.load_frames(frames)?;
//!
//! let params = ProcessingParams::default();
//! loop {
//!     let preview = reconstructor.request_preview(&params)?;
//!     // show preview.overlay, let the user adjust params ...
//!     match reconstructor.commit_current_mask()? {
//!         Status::Continue => continue,
//!         Status::Success | Status::Fail => break,
//!     }
//! }
//! let background = reconstructor.output_image();
//! ```

pub mod config;
pub mod error;
pub mod frame;
pub mod pipeline;
pub mod pixel;
pub mod reconstructor;
pub mod resample;
pub mod rolling_window;


// ============================================================================
// Core types
// ============================================================================

pub use error::{Error, Result};
pub use frame::{frame_from_rgb_bytes, frame_to_rgb_bytes, Frame, Mask};
pub use pixel::Rgb8;

// ============================================================================
// Processing
// ============================================================================

pub use config::ReconstructorConfig;
pub use pipeline::{MaskPipeline, ProcessingParams, Stage};
pub use reconstructor::{BackgroundReconstructor, Outcome, Preview, State, Status};
pub use rolling_window::RollingWindowFilter;

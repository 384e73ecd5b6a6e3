//! Error types for reconstruction sessions.

use thiserror::Error;

/// Precondition and parameter errors. None of them leave partial state behind.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error("At least 2 frames are required, got {count}")]
    NotEnoughFrames { count: usize },

    #[error("Dimension mismatch for frame {index}: expected {expected:?}, got {actual:?}")]
    DimensionMismatch {
        index: usize,
        expected: (usize, usize),
        actual: (usize, usize),
    },

    #[error("Frame data has {actual} bytes, expected {expected} for {width}x{height} RGB")]
    InvalidFrameData {
        width: usize,
        height: usize,
        expected: usize,
        actual: usize,
    },

    #[error("Scale factor must be in (0, 1], got {0}")]
    InvalidScaleFactor(f32),

    #[error("Threshold must be in [0, 255], got {0}")]
    ThresholdOutOfRange(u32),

    #[error("{name} must be at most {max}, got {value}")]
    RadiusOutOfRange {
        name: &'static str,
        value: u32,
        max: u32,
    },

    #[error("Frames must not be empty, got {width}x{height}")]
    EmptyFrame { width: usize, height: usize },

    #[error("Reference index {index} is out of range for {count} frames")]
    ReferenceOutOfRange { index: usize, count: usize },

    #[error("No frames are loaded")]
    NoFramesLoaded,

    #[error("No validated mask for reference {reference}, request a preview first")]
    MaskNotValidated { reference: usize },

    #[error("The session is already finished")]
    SessionFinished,
}

pub type Result<T> = std::result::Result<T, Error>;

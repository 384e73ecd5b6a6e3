//! Frame and mask buffers.

use common::{BitBuffer2, Buffer2};

use crate::error::{Error, Result};
use crate::pixel::Rgb8;

/// A 3-channel color image.
pub type Frame = Buffer2<Rgb8>;

/// Binary mask. `true` marks background to keep; for coverage masks it marks
/// output pixels that still need a value.
pub type Mask = BitBuffer2;

/// Wraps a decoded, tightly packed RGB byte buffer as a [`Frame`].
pub fn frame_from_rgb_bytes(width: usize, height: usize, bytes: &[u8]) -> Result<Frame> {
    let expected = width * height * 3;
    if bytes.len() != expected {
        return Err(Error::InvalidFrameData {
            width,
            height,
            expected,
            actual: bytes.len(),
        });
    }

    let pixels: &[Rgb8] = bytemuck::cast_slice(bytes);
    Ok(Frame::new(width, height, pixels.to_vec()))
}

/// Packed RGB bytes of `frame`, for handing to an encoder.
pub fn frame_to_rgb_bytes(frame: &Frame) -> &[u8] {
    bytemuck::cast_slice(frame.pixels())
}

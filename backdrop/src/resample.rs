//! Conversion between the original and the working resolution.

use crate::error::{Error, Result};
use crate::frame::{Frame, Mask};
use crate::pixel::{Rgb8, RgbSum};

/// Working resolution for `original` scaled by `scale_factor`, at least 1x1.
pub fn working_size(original: (usize, usize), scale_factor: f32) -> Result<(usize, usize)> {
    if !(scale_factor > 0.0 && scale_factor <= 1.0) {
        return Err(Error::InvalidScaleFactor(scale_factor));
    }

    let scale = |extent: usize| ((extent as f64 * scale_factor as f64) as usize).max(1);
    Ok((scale(original.0), scale(original.1)))
}

/// Downsample a frame with box filtering (area average).
pub fn downsample_frame(frame: &Frame, dst_width: usize, dst_height: usize) -> Frame {
    let (src_width, src_height) = frame.size();
    if (src_width, src_height) == (dst_width, dst_height) {
        return frame.clone();
    }

    let scale_x = src_width as f64 / dst_width as f64;
    let scale_y = src_height as f64 / dst_height as f64;

    Frame::from_fn(dst_width, dst_height, |dx, dy| {
        let sx0 = (dx as f64 * scale_x) as usize;
        let sy0 = (dy as f64 * scale_y) as usize;
        let sx1 = (((dx + 1) as f64 * scale_x).ceil() as usize).min(src_width);
        let sy1 = (((dy + 1) as f64 * scale_y).ceil() as usize).min(src_height);

        let mut sum = RgbSum::default();
        for sy in sy0..sy1 {
            for &px in &frame.row(sy)[sx0..sx1] {
                sum = sum + RgbSum::from(px);
            }
        }

        let count = ((sx1 - sx0) * (sy1 - sy0)) as u64;
        if count > 0 {
            sum.mean(count)
        } else {
            Rgb8::BLACK
        }
    })
}

/// Upscale a mask with nearest-neighbour sampling.
///
/// Every destination pixel reads exactly one source pixel, so masks that are
/// disjoint at the working resolution stay disjoint after upscaling.
pub fn upscale_mask(mask: &Mask, dst_width: usize, dst_height: usize) -> Mask {
    let (src_width, src_height) = mask.size();
    if (src_width, src_height) == (dst_width, dst_height) {
        return mask.clone();
    }

    Mask::from_fn(dst_width, dst_height, |x, y| {
        let sx = (x * src_width / dst_width).min(src_width - 1);
        let sy = (y * src_height / dst_height).min(src_height - 1);
        mask.get_xy(sx, sy)
    })
}

use crate::frame::{Frame, Mask};
use crate::pixel::Rgb8;

const TINT_ALPHA: f32 = 0.3;
const COVERAGE_ALPHA: f32 = 0.5;

/// Preview of a reference frame: accepted pixels tinted green, rejected
/// ones red, and pixels already filled by an earlier reference dimmed.
pub fn compose_overlay(reference: &Frame, mask: &Mask, coverage: &Mask) -> Frame {
    assert_eq!(reference.size(), mask.size(), "mask size mismatch");
    assert_eq!(reference.size(), coverage.size(), "coverage size mismatch");

    Frame::from_fn(reference.width(), reference.height(), |x, y| {
        let tint = if mask.get_xy(x, y) {
            Rgb8::GREEN
        } else {
            Rgb8::RED
        };
        let shade = if coverage.get_xy(x, y) {
            Rgb8::WHITE
        } else {
            Rgb8::BLACK
        };

        reference[(x, y)]
            .blend(tint, 1.0 - TINT_ALPHA)
            .blend(shade, 1.0 - COVERAGE_ALPHA)
    })
}

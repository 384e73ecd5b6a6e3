//! Pixel types.

use std::ops::{Add, Sub};

use bytemuck::{Pod, Zeroable};
use num_traits::Zero;
use serde::{Deserialize, Serialize};

/// 8-bit RGB sample, laid out as three consecutive bytes.
#[repr(C)]
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Pod, Zeroable, Serialize, Deserialize,
)]
pub struct Rgb8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb8 {
    pub const BLACK: Self = Self::new(0, 0, 0);
    pub const WHITE: Self = Self::new(255, 255, 255);
    pub const RED: Self = Self::new(255, 0, 0);
    pub const GREEN: Self = Self::new(0, 255, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn abs_diff(self, other: Self) -> Self {
        Self {
            r: self.r.abs_diff(other.r),
            g: self.g.abs_diff(other.g),
            b: self.b.abs_diff(other.b),
        }
    }

    /// BT.601 luma in 14-bit fixed point, rounded.
    pub fn luma(self) -> u8 {
        const R: u32 = 4899;
        const G: u32 = 9617;
        const B: u32 = 1868;
        const SHIFT: u32 = 14;

        let weighted = R * self.r as u32 + G * self.g as u32 + B * self.b as u32;
        ((weighted + (1 << (SHIFT - 1))) >> SHIFT) as u8
    }

    /// `self * alpha + other * (1 - alpha)` per channel, rounded and saturated.
    pub fn blend(self, other: Self, alpha: f32) -> Self {
        let mix = |a: u8, b: u8| {
            (a as f32 * alpha + b as f32 * (1.0 - alpha))
                .round()
                .clamp(0.0, 255.0) as u8
        };
        Self {
            r: mix(self.r, other.r),
            g: mix(self.g, other.g),
            b: mix(self.b, other.b),
        }
    }
}

/// Per-channel running sum over [`Rgb8`] samples.
///
/// `u64` channels hold the full `(2r+1)^2` window of 255s for any radius the
/// filter can allocate rows for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RgbSum {
    pub r: u64,
    pub g: u64,
    pub b: u64,
}

impl RgbSum {
    /// Divides by `count` with round-half-up.
    pub fn mean(self, count: u64) -> Rgb8 {
        debug_assert!(count > 0);
        let div = |v: u64| ((v + count / 2) / count).min(255) as u8;
        Rgb8 {
            r: div(self.r),
            g: div(self.g),
            b: div(self.b),
        }
    }
}

impl From<Rgb8> for RgbSum {
    #[inline]
    fn from(px: Rgb8) -> Self {
        Self {
            r: px.r as u64,
            g: px.g as u64,
            b: px.b as u64,
        }
    }
}

impl Add for RgbSum {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self {
            r: self.r + rhs.r,
            g: self.g + rhs.g,
            b: self.b + rhs.b,
        }
    }
}

impl Sub for RgbSum {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self {
            r: self.r - rhs.r,
            g: self.g - rhs.g,
            b: self.b - rhs.b,
        }
    }
}

impl Zero for RgbSum {
    #[inline]
    fn zero() -> Self {
        Self::default()
    }

    #[inline]
    fn is_zero(&self) -> bool {
        *self == Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_luma_extremes() {
        assert_eq!(Rgb8::BLACK.luma(), 0);
        assert_eq!(Rgb8::WHITE.luma(), 255);
        // green dominates luma
        assert!(Rgb8::GREEN.luma() > Rgb8::RED.luma());
        assert_eq!(Rgb8::new(100, 100, 100).luma(), 100);
    }

    #[test]
    fn test_abs_diff_is_symmetric() {
        let a = Rgb8::new(10, 200, 30);
        let b = Rgb8::new(50, 20, 30);
        assert_eq!(a.abs_diff(b), Rgb8::new(40, 180, 0));
        assert_eq!(b.abs_diff(a), a.abs_diff(b));
    }

    #[test]
    fn test_sum_mean_rounds_half_up() {
        let sum = RgbSum { r: 9, g: 13, b: 4 };
        // 9/9 = 1, 13/9 = 1.44, 4/9 = 0.44
        assert_eq!(sum.mean(9), Rgb8::new(1, 1, 0));
        let sum = RgbSum { r: 5, g: 0, b: 0 };
        assert_eq!(sum.mean(2), Rgb8::new(3, 0, 0));
    }

    #[test]
    fn test_blend() {
        assert_eq!(Rgb8::WHITE.blend(Rgb8::BLACK, 0.5), Rgb8::new(128, 128, 128));
        assert_eq!(Rgb8::RED.blend(Rgb8::GREEN, 1.0), Rgb8::RED);
    }

    #[test]
    fn test_pod_layout() {
        let bytes = [1u8, 2, 3, 4, 5, 6];
        let pixels: &[Rgb8] = bytemuck::cast_slice(&bytes[..]);
        assert_eq!(pixels, &[Rgb8::new(1, 2, 3), Rgb8::new(4, 5, 6)]);
    }
}

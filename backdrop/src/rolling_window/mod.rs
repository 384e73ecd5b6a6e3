//! Separable rolling box aggregation.
//!
//! Every output pixel receives the sum of a transform over the
//! `(2r+1) x (2r+1)` window centred on it, in time proportional to the image
//! area regardless of `r`: a running sum slides along each row, then down
//! each column of the row sums. Out-of-range coordinates are mirrored
//! without repeating the edge sample (`gfedcb|abcdefgh|gfedcba`), so windows
//! near the border always hold the same number of real samples.
//!
//! Blur and binary morphology are both expressed through [`RollingWindowFilter::aggregate`].


use std::ops::Sub;
use std::sync::atomic::{AtomicUsize, Ordering};

use common::{BitBuffer2, Buffer2};
use num_traits::Zero;
use rayon::prelude::*;

use crate::frame::{Frame, Mask};
use crate::pixel::RgbSum;

/// Read access to a 2D grid of pixels.
pub trait PixelSource: Sync {
    type Pixel: Copy;

    fn size(&self) -> (usize, usize);

    fn pixel(&self, x: usize, y: usize) -> Self::Pixel;
}

impl<T: Copy + Sync> PixelSource for Buffer2<T> {
    type Pixel = T;

    #[inline]
    fn size(&self) -> (usize, usize) {
        Buffer2::size(self)
    }

    #[inline]
    fn pixel(&self, x: usize, y: usize) -> T {
        *self.get(x, y)
    }
}

impl PixelSource for BitBuffer2 {
    type Pixel = bool;

    #[inline]
    fn size(&self) -> (usize, usize) {
        BitBuffer2::size(self)
    }

    #[inline]
    fn pixel(&self, x: usize, y: usize) -> bool {
        self.get_xy(x, y)
    }
}

/// Running-sum value type. Subtraction only ever removes a term that was
/// previously added, so unsigned types are fine.
pub trait Accumulator: Zero + Copy + Sub<Output = Self> + Send + Sync {}

impl<T> Accumulator for T where T: Zero + Copy + Sub<Output = T> + Send + Sync {}

/// Mirror `i` into `[0, extent)` without duplicating the edge sample.
///
/// Coordinates further out than one extent are mirrored repeatedly.
#[inline]
pub fn reflect(i: isize, extent: usize) -> usize {
    debug_assert!(extent > 0);
    if extent == 1 {
        return 0;
    }

    let last = extent as isize - 1;
    if (0..=last).contains(&i) {
        return i as usize;
    }

    let period = 2 * last;
    let m = i.rem_euclid(period);
    if m > last {
        (period - m) as usize
    } else {
        m as usize
    }
}

/// Row sums padded with `radius` mirrored rows above and below.
///
/// Padded row `p` holds the row sums of image row `reflect(p - radius)`.
#[derive(Debug, Clone)]
pub struct RowAggregate<A> {
    pub sums: Buffer2<A>,
    pub radius: usize,
}

impl<A> RowAggregate<A> {
    /// Row sums of image row `y`, which may lie up to `radius` rows outside
    /// the image.
    pub fn row(&self, y: isize) -> &[A] {
        self.sums.row((y + self.radius as isize) as usize)
    }
}

#[derive(Debug)]
pub struct RollingWindowFilter {
    width: usize,
    height: usize,
    aggregations: AtomicUsize,
}

impl RollingWindowFilter {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            aggregations: AtomicUsize::new(0),
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of full 2D aggregations performed so far.
    pub fn aggregation_count(&self) -> usize {
        self.aggregations.load(Ordering::Relaxed)
    }

    /// Horizontal pass: windowed sums along each row.
    pub fn aggregate_rows<S, A, F>(&self, source: &S, transform: F, radius: usize) -> RowAggregate<A>
    where
        S: PixelSource,
        A: Accumulator,
        F: Fn(S::Pixel) -> A + Sync,
    {
        assert_eq!(
            source.size(),
            (self.width, self.height),
            "source size does not match filter size"
        );

        let (width, height) = (self.width, self.height);
        let padded_height = height + 2 * radius;
        let mut sums = Buffer2::new_filled(width, padded_height, A::zero());
        if width == 0 || height == 0 {
            return RowAggregate { sums, radius };
        }

        let r = radius as isize;
        let interior = &mut sums.pixels_mut()[radius * width..(radius + height) * width];
        interior
            .par_chunks_mut(width)
            .enumerate()
            .for_each(|(y, out)| {
                let row: Vec<A> = (0..width).map(|x| transform(source.pixel(x, y))).collect();

                let mut sum = (-r..=r).fold(A::zero(), |acc, x| acc + row[reflect(x, width)]);
                out[0] = sum;
                for x in 1..width as isize {
                    let entering = row[reflect(x + r, width)];
                    let leaving = row[reflect(x - r - 1, width)];
                    sum = sum + entering - leaving;
                    out[x as usize] = sum;
                }
            });

        // mirror rows are copies of already aggregated interior rows
        for p in (0..radius).chain(radius + height..padded_height) {
            let src = radius + reflect(p as isize - r, height);
            let (src_start, dst_start) = (src * width, p * width);
            sums.pixels_mut()
                .copy_within(src_start..src_start + width, dst_start);
        }

        RowAggregate { sums, radius }
    }

    /// Full 2D windowed sum of `transform` over a `(2*radius+1)^2` box.
    pub fn aggregate<S, A, F>(&self, source: &S, transform: F, radius: usize) -> Buffer2<A>
    where
        S: PixelSource,
        A: Accumulator,
        F: Fn(S::Pixel) -> A + Sync,
    {
        self.aggregations.fetch_add(1, Ordering::Relaxed);

        let rows = self.aggregate_rows(source, transform, radius);
        let (width, height) = (self.width, self.height);
        let mut out = Buffer2::new_filled(width, height, A::zero());
        if width == 0 || height == 0 {
            return out;
        }

        let r = radius as isize;
        let mut sum: Vec<A> = vec![A::zero(); width];
        for y in -r..=r {
            for (acc, &v) in sum.iter_mut().zip(rows.row(y)) {
                *acc = *acc + v;
            }
        }
        out.row_mut(0).copy_from_slice(&sum);

        for y in 1..height as isize {
            let entering = rows.row(y + r);
            let leaving = rows.row(y - r - 1);
            for ((acc, &e), &l) in sum.iter_mut().zip(entering).zip(leaving) {
                *acc = *acc + e - l;
            }
            out.row_mut(y as usize).copy_from_slice(&sum);
        }

        out
    }

    /// Box blur: window mean per channel, rounded half up.
    pub fn mean_blur(&self, frame: &Frame, radius: usize) -> Frame {
        if radius == 0 {
            return frame.clone();
        }

        let side = 2 * radius as u64 + 1;
        let area = side * side;
        self.aggregate(frame, RgbSum::from, radius)
            .map(|sum| sum.mean(area))
    }

    /// Binary morphology through windowed counting.
    ///
    /// A pixel becomes `member` when no pixel in its window differs from
    /// `member`, otherwise `!member`. With `member = true` this is erosion of
    /// the `true` region, with `member = false` it is dilation.
    pub fn morphological_pass(&self, mask: &Mask, radius: usize, member: bool) -> Mask {
        if radius == 0 {
            return mask.clone();
        }

        let outsiders = self.aggregate(mask, |v: bool| (v != member) as u32, radius);
        Mask::from_fn(self.width, self.height, |x, y| {
            if outsiders[(x, y)] == 0 {
                member
            } else {
                !member
            }
        })
    }

    /// Shrinks `true` regions: keeps a pixel only if its whole window is `true`.
    pub fn erode(&self, mask: &Mask, radius: usize) -> Mask {
        self.morphological_pass(mask, radius, true)
    }

    /// Grows `true` regions: sets a pixel if any pixel in its window is `true`.
    pub fn dilate(&self, mask: &Mask, radius: usize) -> Mask {
        self.morphological_pass(mask, radius, false)
    }

    /// Erosion followed by dilation with the same radius.
    pub fn open(&self, mask: &Mask, radius: usize) -> Mask {
        if radius == 0 {
            return mask.clone();
        }
        let eroded = self.erode(mask, radius);
        self.dilate(&eroded, radius)
    }
}

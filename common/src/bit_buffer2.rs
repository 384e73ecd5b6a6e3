//! Bit-packed 2D buffer for binary masks.
//!
//! Stores one bit per pixel in `u64` words (LSB first). Bits past `len` in
//! the last word are kept at zero so word-wise operations and population
//! counts never see them.

const BITS_PER_WORD: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitBuffer2 {
    words: Vec<u64>,
    width: usize,
    height: usize,
    len: usize,
}

impl BitBuffer2 {
    pub fn new_filled(width: usize, height: usize, value: bool) -> Self {
        let len = width * height;
        let mut buffer = Self {
            words: vec![0; len.div_ceil(BITS_PER_WORD)],
            width,
            height,
            len,
        };
        buffer.fill(value);
        buffer
    }

    pub fn new_default(width: usize, height: usize) -> Self {
        Self::new_filled(width, height, false)
    }

    /// The slice length must equal `width * height`.
    pub fn from_slice(width: usize, height: usize, data: &[bool]) -> Self {
        let len = width * height;
        assert_eq!(
            data.len(),
            len,
            "data length {} does not match dimensions {}x{}={}",
            data.len(),
            width,
            height,
            len
        );

        let mut words = vec![0u64; len.div_ceil(BITS_PER_WORD)];
        for (i, &value) in data.iter().enumerate() {
            if value {
                words[i / BITS_PER_WORD] |= 1u64 << (i % BITS_PER_WORD);
            }
        }

        Self {
            words,
            width,
            height,
            len,
        }
    }

    pub fn from_fn<F>(width: usize, height: usize, mut f: F) -> Self
    where
        F: FnMut(usize, usize) -> bool,
    {
        let mut buffer = Self::new_default(width, height);
        for y in 0..height {
            for x in 0..width {
                if f(x, y) {
                    buffer.set_xy(x, y, true);
                }
            }
        }
        buffer
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// `(width, height)`
    #[inline]
    pub fn size(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn get(&self, idx: usize) -> bool {
        debug_assert!(idx < self.len);
        (self.words[idx / BITS_PER_WORD] >> (idx % BITS_PER_WORD)) & 1 != 0
    }

    #[inline]
    pub fn set(&mut self, idx: usize, value: bool) {
        debug_assert!(idx < self.len);
        let bit = 1u64 << (idx % BITS_PER_WORD);
        if value {
            self.words[idx / BITS_PER_WORD] |= bit;
        } else {
            self.words[idx / BITS_PER_WORD] &= !bit;
        }
    }

    #[inline]
    pub fn get_xy(&self, x: usize, y: usize) -> bool {
        debug_assert!(x < self.width && y < self.height);
        self.get(y * self.width + x)
    }

    #[inline]
    pub fn set_xy(&mut self, x: usize, y: usize, value: bool) {
        debug_assert!(x < self.width && y < self.height);
        self.set(y * self.width + x, value);
    }

    pub fn fill(&mut self, value: bool) {
        self.words.fill(if value { !0 } else { 0 });
        self.clear_tail();
    }

    /// Number of set bits.
    pub fn count_ones(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// True when no bit is set.
    pub fn none(&self) -> bool {
        self.words.iter().all(|&w| w == 0)
    }

    /// Bitwise AND of two equally sized masks.
    pub fn and(&self, other: &Self) -> Self {
        self.zip_words(other, |a, b| a & b)
    }

    /// In-place OR with `other`.
    pub fn or_assign(&mut self, other: &Self) {
        self.assert_same_size(other);
        for (a, &b) in self.words.iter_mut().zip(&other.words) {
            *a |= b;
        }
    }

    /// Clears every bit that is set in `other`.
    pub fn clear_where(&mut self, other: &Self) {
        self.assert_same_size(other);
        for (a, &b) in self.words.iter_mut().zip(&other.words) {
            *a &= !b;
        }
    }

    /// Bitwise complement.
    pub fn inverted(&self) -> Self {
        let mut result = Self {
            words: self.words.iter().map(|&w| !w).collect(),
            width: self.width,
            height: self.height,
            len: self.len,
        };
        result.clear_tail();
        result
    }

    pub fn iter(&self) -> BitIter<'_> {
        BitIter {
            buffer: self,
            idx: 0,
        }
    }

    fn zip_words<F>(&self, other: &Self, f: F) -> Self
    where
        F: Fn(u64, u64) -> u64,
    {
        self.assert_same_size(other);
        Self {
            words: self
                .words
                .iter()
                .zip(&other.words)
                .map(|(&a, &b)| f(a, b))
                .collect(),
            width: self.width,
            height: self.height,
            len: self.len,
        }
    }

    fn assert_same_size(&self, other: &Self) {
        assert_eq!(self.width, other.width, "width mismatch");
        assert_eq!(self.height, other.height, "height mismatch");
    }

    fn clear_tail(&mut self) {
        let used = self.len % BITS_PER_WORD;
        if used != 0 {
            if let Some(last) = self.words.last_mut() {
                *last &= (1u64 << used) - 1;
            }
        }
    }
}

impl From<&BitBuffer2> for Vec<bool> {
    fn from(buf: &BitBuffer2) -> Self {
        buf.iter().collect()
    }
}

pub struct BitIter<'a> {
    buffer: &'a BitBuffer2,
    idx: usize,
}

impl Iterator for BitIter<'_> {
    type Item = bool;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.idx < self.buffer.len {
            let value = self.buffer.get(self.idx);
            self.idx += 1;
            Some(value)
        } else {
            None
        }
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.buffer.len - self.idx;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for BitIter<'_> {}

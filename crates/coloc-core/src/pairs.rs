//! Masked pair iteration
//!
//! [`MaskedPairs`] walks the bounding box of a [`Mask`] (first axis
//! fastest) and yields one `(ch1, ch2)` sample pair for every position the
//! mask selects. The walk is deterministic and can be replayed with
//! [`MaskedPairs::reset`] or by cloning the iterator before consuming it.

use crate::channel::Channel;
use crate::error::{Error, Result};
use crate::mask::Mask;

/// Iterator over the sample pairs selected by a mask
#[derive(Debug, Clone)]
pub struct MaskedPairs<'a> {
    ch1: &'a [f64],
    ch2: &'a [f64],
    dims: &'a [usize],
    mask: &'a Mask,
    coord: Vec<usize>,
    remaining: usize,
}

impl<'a> MaskedPairs<'a> {
    /// Pairs of two channels under a mask
    ///
    /// # Errors
    ///
    /// Returns `Error::DimensionMismatch` if the channels or the mask
    /// disagree in shape.
    pub fn new(ch1: &'a Channel, ch2: &'a Channel, mask: &'a Mask) -> Result<Self> {
        if ch1.dims() != ch2.dims() {
            return Err(Error::DimensionMismatch {
                expected: ch1.dims().to_vec(),
                actual: ch2.dims().to_vec(),
            });
        }
        Self::from_slices(ch1.dims(), ch1.data(), ch2.data(), mask)
    }

    /// Pairs of two raw sample buffers sharing the extents `dims`
    ///
    /// # Errors
    ///
    /// Returns `Error::DimensionMismatch` if the mask was built for other
    /// extents and `Error::DataLength` if a buffer has the wrong length.
    pub fn from_slices(
        dims: &'a [usize],
        ch1: &'a [f64],
        ch2: &'a [f64],
        mask: &'a Mask,
    ) -> Result<Self> {
        if mask.dims() != dims {
            return Err(Error::DimensionMismatch {
                expected: dims.to_vec(),
                actual: mask.dims().to_vec(),
            });
        }
        let len: usize = dims.iter().product();
        for buf in [ch1, ch2] {
            if buf.len() != len {
                return Err(Error::DataLength {
                    expected: len,
                    actual: buf.len(),
                });
            }
        }
        Ok(Self::unchecked(dims, ch1, ch2, mask))
    }

    /// Construction for shapes that are already known to agree
    pub(crate) fn unchecked(
        dims: &'a [usize],
        ch1: &'a [f64],
        ch2: &'a [f64],
        mask: &'a Mask,
    ) -> Self {
        let bbox = mask.bounding_box();
        Self {
            ch1,
            ch2,
            dims,
            mask,
            coord: bbox.offset().to_vec(),
            remaining: bbox.volume(),
        }
    }

    /// Restart the walk from the first position
    pub fn reset(&mut self) {
        let bbox = self.mask.bounding_box();
        self.coord.copy_from_slice(bbox.offset());
        self.remaining = bbox.volume();
    }

    /// Current coordinate, i.e. the position the next call to `next` looks at
    pub fn position(&self) -> &[usize] {
        &self.coord
    }

    fn linear(&self) -> usize {
        let mut index = 0;
        for axis in (0..self.dims.len()).rev() {
            index = index * self.dims[axis] + self.coord[axis];
        }
        index
    }

    fn step(&mut self) {
        let bbox = self.mask.bounding_box();
        for axis in 0..self.coord.len() {
            self.coord[axis] += 1;
            if self.coord[axis] < bbox.end(axis) {
                return;
            }
            self.coord[axis] = bbox.offset()[axis];
        }
    }
}

impl Iterator for MaskedPairs<'_> {
    type Item = (f64, f64);

    fn next(&mut self) -> Option<Self::Item> {
        while self.remaining > 0 {
            let index = self.linear();
            self.remaining -= 1;
            self.step();
            if self.mask.contains_index(index) {
                return Some((self.ch1[index], self.ch2[index]));
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.remaining))
    }
}

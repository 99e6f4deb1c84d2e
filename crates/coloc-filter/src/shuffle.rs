//! Spatial block shuffling
//!
//! The bounding box of the analysed region is tiled with equally sized
//! blocks, starting at the box offset. When an extent is not a multiple of
//! the block size the last block along that axis runs past the box; its
//! samples are taken from the mirrored image. Each shuffle permutes which
//! source block lands on which block position.
//!
//! The significance tests use this to destroy the spatial relation between
//! two channels while keeping structure at the block scale.
//!
//! # Examples
//!
//! ```
//! use coloc_core::{BoundingBox, Channel, SampleType};
//! use coloc_filter::BlockShuffler;
//!
//! let ch = Channel::new(&[4, 4], (0..16).map(f64::from).collect(), SampleType::F32).unwrap();
//! let mut shuffler = BlockShuffler::cubic(ch.dims(), &BoundingBox::full(&[4, 4]), 2, 7).unwrap();
//! assert_eq!(shuffler.block_count(), 4);
//! let shuffled = shuffler.shuffled(&ch).unwrap();
//! let mut sorted = shuffled.data().to_vec();
//! sorted.sort_by(f64::total_cmp);
//! assert_eq!(sorted, ch.data());
//! ```

use coloc_core::{BoundingBox, Channel, linear_index};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use tracing::debug;

use crate::boundary::mirror_index;
use crate::{FilterError, FilterResult};

/// Randomly rearranges fixed-size blocks of a channel
#[derive(Debug)]
pub struct BlockShuffler {
    dims: Vec<usize>,
    block_size: Vec<usize>,
    /// Block origins in image coordinates, in tiling order
    origins: Vec<Vec<usize>>,
    /// `order[j]` is the source block copied to block position `j`
    order: Vec<usize>,
    rng: StdRng,
}

impl BlockShuffler {
    /// Create a shuffler
    ///
    /// # Arguments
    ///
    /// * `dims` - Image extents
    /// * `bbox` - Region to tile
    /// * `block_size` - Block extent along each axis
    /// * `seed` - Seed of the permutation generator
    ///
    /// # Errors
    ///
    /// Returns `FilterError::InvalidParameters` if the block size has the
    /// wrong number of axes or a zero extent, or if `bbox` does not fit
    /// the image.
    pub fn new(
        dims: &[usize],
        bbox: &BoundingBox,
        block_size: &[usize],
        seed: u64,
    ) -> FilterResult<Self> {
        if block_size.len() != dims.len() || block_size.contains(&0) {
            return Err(FilterError::InvalidParameters(format!(
                "block size {block_size:?} invalid for image {dims:?}"
            )));
        }
        if !bbox.fits(dims) {
            return Err(FilterError::InvalidParameters(format!(
                "bounding box {:?}+{:?} outside image {dims:?}",
                bbox.offset(),
                bbox.size()
            )));
        }

        let per_axis: Vec<usize> = (0..dims.len())
            .map(|axis| bbox.size()[axis].div_ceil(block_size[axis]))
            .collect();
        let total: usize = per_axis.iter().product();
        let mut origins = Vec::with_capacity(total);
        let mut index = vec![0usize; dims.len()];
        for _ in 0..total {
            origins.push(
                (0..dims.len())
                    .map(|axis| bbox.offset()[axis] + index[axis] * block_size[axis])
                    .collect(),
            );
            for axis in 0..dims.len() {
                index[axis] += 1;
                if index[axis] < per_axis[axis] {
                    break;
                }
                index[axis] = 0;
            }
        }
        debug!(blocks = total, ?block_size, "block shuffler created");

        Ok(Self {
            dims: dims.to_vec(),
            block_size: block_size.to_vec(),
            origins,
            order: (0..total).collect(),
            rng: StdRng::seed_from_u64(seed),
        })
    }

    /// Shuffler with the same block edge along every axis
    pub fn cubic(dims: &[usize], bbox: &BoundingBox, edge: usize, seed: u64) -> FilterResult<Self> {
        Self::new(dims, bbox, &vec![edge; dims.len()], seed)
    }

    pub fn block_count(&self) -> usize {
        self.origins.len()
    }

    pub fn block_size(&self) -> &[usize] {
        &self.block_size
    }

    /// Draw a new permutation and write the rearranged blocks of `source`
    /// into `target`
    ///
    /// Only the block positions are written; samples of `target` outside
    /// the tiled region keep their values.
    ///
    /// # Errors
    ///
    /// Returns `FilterError::InvalidParameters` if either channel does not
    /// match the extents the shuffler was built for.
    pub fn shuffle(&mut self, source: &Channel, target: &mut Channel) -> FilterResult<()> {
        for ch in [source.dims(), target.dims()] {
            if ch != self.dims.as_slice() {
                return Err(FilterError::InvalidParameters(format!(
                    "channel {ch:?} does not match shuffler extents {:?}",
                    self.dims
                )));
            }
        }
        self.order.shuffle(&mut self.rng);

        let n = self.dims.len();
        let volume: usize = self.block_size.iter().product();
        let mut local = vec![0usize; n];
        let mut read = vec![0usize; n];
        let mut write = vec![0usize; n];
        let src = source.data();
        let dst = target.data_mut();

        for (out_block, &in_block) in self.order.iter().enumerate() {
            let out_origin = &self.origins[out_block];
            let in_origin = &self.origins[in_block];
            local.fill(0);
            for _ in 0..volume {
                for axis in 0..n {
                    read[axis] = mirror_index(
                        (in_origin[axis] + local[axis]) as isize,
                        self.dims[axis],
                    );
                    write[axis] = out_origin[axis] + local[axis];
                }
                if let (Some(ri), Some(wi)) = (
                    linear_index(&self.dims, &read),
                    linear_index(&self.dims, &write),
                ) {
                    dst[wi] = src[ri];
                }
                for axis in 0..n {
                    local[axis] += 1;
                    if local[axis] < self.block_size[axis] {
                        break;
                    }
                    local[axis] = 0;
                }
            }
        }
        Ok(())
    }

    /// Shuffle into a fresh zeroed channel
    pub fn shuffled(&mut self, source: &Channel) -> FilterResult<Channel> {
        let mut target = source.zeros_like();
        self.shuffle(source, &mut target)?;
        Ok(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coloc_core::SampleType;

    fn ramp(dims: &[usize]) -> Channel {
        let len: usize = dims.iter().product();
        Channel::new(dims, (0..len).map(|i| i as f64).collect(), SampleType::F32).unwrap()
    }

    #[test]
    fn test_block_grid() {
        let bbox = BoundingBox::new(vec![1, 2], vec![5, 4]).unwrap();
        let s = BlockShuffler::cubic(&[8, 8], &bbox, 2, 0).unwrap();
        assert_eq!(s.block_count(), 3 * 2);
        assert_eq!(s.origins[0], vec![1, 2]);
        assert_eq!(s.origins[1], vec![3, 2]);
        assert_eq!(s.origins[2], vec![5, 2]);
        assert_eq!(s.origins[3], vec![1, 4]);
    }

    #[test]
    fn test_exact_tiling_is_a_permutation() {
        let ch = ramp(&[6, 4]);
        let mut s = BlockShuffler::cubic(ch.dims(), &BoundingBox::full(&[6, 4]), 2, 11).unwrap();
        for _ in 0..5 {
            let out = s.shuffled(&ch).unwrap();
            let mut sorted = out.data().to_vec();
            sorted.sort_by(f64::total_cmp);
            assert_eq!(sorted, ch.data());
        }
    }

    #[test]
    fn test_blocks_stay_intact() {
        let ch = ramp(&[4, 4]);
        let mut s = BlockShuffler::cubic(ch.dims(), &BoundingBox::full(&[4, 4]), 2, 3).unwrap();
        let out = s.shuffled(&ch).unwrap();
        for by in [0, 2] {
            for bx in [0, 2] {
                let top_left = out.get(&[bx, by]).unwrap();
                assert_eq!(out.get(&[bx + 1, by]).unwrap(), top_left + 1.0);
                assert_eq!(out.get(&[bx, by + 1]).unwrap(), top_left + 4.0);
            }
        }
    }

    #[test]
    fn test_same_seed_same_result() {
        let ch = ramp(&[9, 9]);
        let bbox = BoundingBox::full(&[9, 9]);
        let mut a = BlockShuffler::cubic(ch.dims(), &bbox, 3, 42).unwrap();
        let mut b = BlockShuffler::cubic(ch.dims(), &bbox, 3, 42).unwrap();
        assert_eq!(a.shuffled(&ch).unwrap(), b.shuffled(&ch).unwrap());
    }

    #[test]
    fn test_partial_blocks_stay_inside() {
        // 5 is not a multiple of 2: the trailing blocks are read mirrored
        // and their writes past the image are dropped.
        let ch = ramp(&[5, 5]);
        let mut s = BlockShuffler::cubic(ch.dims(), &BoundingBox::full(&[5, 5]), 2, 9).unwrap();
        assert_eq!(s.block_count(), 9);
        let out = s.shuffled(&ch).unwrap();
        assert_eq!(out.dims(), &[5, 5]);
        assert!(out.data().iter().all(|&v| (0.0..25.0).contains(&v)));
    }

    #[test]
    fn test_invalid_parameters() {
        let bbox = BoundingBox::full(&[4, 4]);
        assert!(BlockShuffler::new(&[4, 4], &bbox, &[2], 0).is_err());
        assert!(BlockShuffler::new(&[4, 4], &bbox, &[2, 0], 0).is_err());
        let big = BoundingBox::new(vec![2, 0], vec![4, 4]).unwrap();
        assert!(BlockShuffler::cubic(&[4, 4], &big, 2, 0).is_err());
    }
}

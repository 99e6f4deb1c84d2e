//! Analysis masks and their bounding boxes
//!
//! A [`Mask`] restricts every statistic to a subset of image positions.
//! Three kinds exist:
//!
//! - no mask: every position of the image is used
//! - a regular mask: an axis-aligned rectangle (the "ROI")
//! - an irregular mask: an arbitrary boolean image
//!
//! All of them answer the same two questions: [`Mask::contains`] and
//! [`Mask::bounding_box`].

use crate::channel::{checked_len, linear_index};
use crate::error::{Error, Result};

/// Axis-aligned n-dimensional box
///
/// Invariant: `size[i] >= 1` for every axis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundingBox {
    offset: Vec<usize>,
    size: Vec<usize>,
}

impl BoundingBox {
    /// Create a bounding box
    ///
    /// # Errors
    ///
    /// Returns `Error::DimensionMismatch` if `offset` and `size` differ in
    /// length and `Error::InvalidDimension` if any size is zero.
    pub fn new(offset: Vec<usize>, size: Vec<usize>) -> Result<Self> {
        if offset.len() != size.len() {
            return Err(Error::DimensionMismatch {
                expected: vec![offset.len()],
                actual: vec![size.len()],
            });
        }
        checked_len(&size)?;
        Ok(Self { offset, size })
    }

    /// Box covering a whole image
    pub fn full(dims: &[usize]) -> Self {
        Self {
            offset: vec![0; dims.len()],
            size: dims.to_vec(),
        }
    }

    #[inline]
    pub fn offset(&self) -> &[usize] {
        &self.offset
    }

    #[inline]
    pub fn size(&self) -> &[usize] {
        &self.size
    }

    #[inline]
    pub fn ndim(&self) -> usize {
        self.size.len()
    }

    /// Number of positions inside the box
    pub fn volume(&self) -> usize {
        self.size.iter().product()
    }

    /// One past the last position along an axis
    #[inline]
    pub fn end(&self, axis: usize) -> usize {
        self.offset[axis] + self.size[axis]
    }

    /// Check whether a coordinate lies inside the box
    pub fn contains(&self, coord: &[usize]) -> bool {
        coord.len() == self.ndim()
            && coord
                .iter()
                .enumerate()
                .all(|(axis, &c)| c >= self.offset[axis] && c < self.end(axis))
    }

    /// Check whether the box fits inside an image of the given extents
    pub fn fits(&self, dims: &[usize]) -> bool {
        dims.len() == self.ndim() && (0..dims.len()).all(|axis| self.end(axis) <= dims[axis])
    }
}

/// Which kind of mask is in use
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaskType {
    /// Rectangular region of interest
    Regular,
    /// Arbitrary boolean mask image
    Irregular,
    /// Whole image
    None,
}

impl MaskType {
    /// Label used in reports
    pub fn label(self) -> &'static str {
        match self {
            Self::Regular => "ROI",
            Self::Irregular => "mask image",
            Self::None => "none",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum MaskKind {
    Full,
    Rect,
    Bitmap(Vec<bool>),
}

/// Boolean mask over an image
#[derive(Debug, Clone, PartialEq)]
pub struct Mask {
    dims: Vec<usize>,
    bbox: BoundingBox,
    kind: MaskKind,
}

impl Mask {
    /// Mask accepting every position of an image
    pub fn full(dims: &[usize]) -> Result<Self> {
        checked_len(dims)?;
        Ok(Self {
            dims: dims.to_vec(),
            bbox: BoundingBox::full(dims),
            kind: MaskKind::Full,
        })
    }

    /// Rectangular mask
    ///
    /// `offset` and `size` may be shorter than the image dimensionality:
    /// missing offsets are 0 and missing sizes extend to the end of the
    /// axis.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidParameter` if an offset lies beyond the image,
    /// a size does not fit behind its offset, or more values than axes are
    /// given.
    pub fn rect(dims: &[usize], offset: &[usize], size: &[usize]) -> Result<Self> {
        checked_len(dims)?;
        if offset.len() > dims.len() || size.len() > dims.len() {
            return Err(Error::InvalidParameter(format!(
                "mask has more axes than the image ({} axes)",
                dims.len()
            )));
        }

        let mut full_offset = Vec::with_capacity(dims.len());
        let mut full_size = Vec::with_capacity(dims.len());
        for (axis, &dim) in dims.iter().enumerate() {
            let o = offset.get(axis).copied().unwrap_or(0);
            if o >= dim {
                return Err(Error::InvalidParameter(format!(
                    "mask offset {o} beyond image extent {dim} on axis {axis}"
                )));
            }
            let s = size.get(axis).copied().unwrap_or(dim - o);
            if s == 0 || s > dim - o {
                return Err(Error::InvalidParameter(format!(
                    "mask size {s} does not fit at offset {o} in extent {dim} on axis {axis}"
                )));
            }
            full_offset.push(o);
            full_size.push(s);
        }

        Ok(Self {
            dims: dims.to_vec(),
            bbox: BoundingBox::new(full_offset, full_size)?,
            kind: MaskKind::Rect,
        })
    }

    /// Irregular mask from a boolean image
    ///
    /// The bounding box is the smallest box enclosing every set position.
    ///
    /// # Errors
    ///
    /// Returns `Error::DataLength` if `bits` does not match `dims` and
    /// `Error::EmptyMask` if no position is set.
    pub fn from_bitmap(dims: &[usize], bits: Vec<bool>) -> Result<Self> {
        let len = checked_len(dims)?;
        if bits.len() != len {
            return Err(Error::DataLength {
                expected: len,
                actual: bits.len(),
            });
        }

        let n = dims.len();
        let mut lo = dims.to_vec();
        let mut hi = vec![0usize; n];
        let mut coord = vec![0usize; n];
        let mut any = false;
        for &bit in &bits {
            if bit {
                any = true;
                for axis in 0..n {
                    lo[axis] = lo[axis].min(coord[axis]);
                    hi[axis] = hi[axis].max(coord[axis]);
                }
            }
            advance(&mut coord, dims);
        }
        if !any {
            return Err(Error::EmptyMask);
        }

        let size = (0..n).map(|axis| hi[axis] - lo[axis] + 1).collect();
        Ok(Self {
            dims: dims.to_vec(),
            bbox: BoundingBox::new(lo, size)?,
            kind: MaskKind::Bitmap(bits),
        })
    }

    /// Image extents the mask was built for
    #[inline]
    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    #[inline]
    pub fn bounding_box(&self) -> &BoundingBox {
        &self.bbox
    }

    pub fn mask_type(&self) -> MaskType {
        match self.kind {
            MaskKind::Full => MaskType::None,
            MaskKind::Rect => MaskType::Regular,
            MaskKind::Bitmap(_) => MaskType::Irregular,
        }
    }

    /// Check whether a coordinate is selected by the mask
    pub fn contains(&self, coord: &[usize]) -> bool {
        match &self.kind {
            MaskKind::Full | MaskKind::Rect => self.bbox.contains(coord),
            MaskKind::Bitmap(bits) => linear_index(&self.dims, coord).is_some_and(|i| bits[i]),
        }
    }

    /// Fast path for callers that already know the linear index of a
    /// coordinate inside the bounding box
    #[inline]
    pub(crate) fn contains_index(&self, index: usize) -> bool {
        match &self.kind {
            MaskKind::Full | MaskKind::Rect => true,
            MaskKind::Bitmap(bits) => bits[index],
        }
    }

    /// Number of selected positions
    pub fn count(&self) -> usize {
        match &self.kind {
            MaskKind::Full | MaskKind::Rect => self.bbox.volume(),
            MaskKind::Bitmap(bits) => bits.iter().filter(|&&b| b).count(),
        }
    }
}

/// Step a coordinate to the next position, first axis fastest
pub(crate) fn advance(coord: &mut [usize], dims: &[usize]) {
    for axis in 0..dims.len() {
        coord[axis] += 1;
        if coord[axis] < dims[axis] {
            return;
        }
        coord[axis] = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_mask() {
        let mask = Mask::full(&[4, 3]).unwrap();
        assert_eq!(mask.mask_type(), MaskType::None);
        assert_eq!(mask.count(), 12);
        assert!(mask.contains(&[3, 2]));
        assert!(!mask.contains(&[4, 0]));
        assert_eq!(mask.bounding_box(), &BoundingBox::full(&[4, 3]));
    }

    #[test]
    fn test_rect_padding() {
        let mask = Mask::rect(&[10, 8, 5], &[2, 3], &[4]).unwrap();
        let bbox = mask.bounding_box();
        assert_eq!(bbox.offset(), &[2, 3, 0]);
        assert_eq!(bbox.size(), &[4, 5, 5]);
        assert_eq!(mask.count(), 100);
        assert!(mask.contains(&[5, 7, 4]));
        assert!(!mask.contains(&[6, 3, 0]));
    }

    #[test]
    fn test_rect_out_of_range() {
        assert!(Mask::rect(&[10, 10], &[10, 0], &[]).is_err());
        assert!(Mask::rect(&[10, 10], &[5, 0], &[6, 1]).is_err());
        assert!(Mask::rect(&[10, 10], &[0, 0, 0], &[]).is_err());
    }

    #[test]
    fn test_bitmap_bounding_box() {
        #[rustfmt::skip]
        let bits = vec![
            false, false, false, false,
            false, true,  false, false,
            false, false, true,  false,
        ];
        let mask = Mask::from_bitmap(&[4, 3], bits).unwrap();
        assert_eq!(mask.mask_type(), MaskType::Irregular);
        assert_eq!(mask.bounding_box().offset(), &[1, 1]);
        assert_eq!(mask.bounding_box().size(), &[2, 2]);
        assert_eq!(mask.count(), 2);
        assert!(mask.contains(&[2, 2]));
        assert!(!mask.contains(&[2, 1]));
    }

    #[test]
    fn test_empty_bitmap() {
        assert!(matches!(
            Mask::from_bitmap(&[2, 2], vec![false; 4]),
            Err(Error::EmptyMask)
        ));
    }

    #[test]
    fn test_mask_type_labels() {
        assert_eq!(MaskType::Regular.label(), "ROI");
        assert_eq!(MaskType::Irregular.label(), "mask image");
        assert_eq!(MaskType::None.label(), "none");
    }
}

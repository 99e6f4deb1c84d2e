//! Channel - one n-dimensional image channel
//!
//! A `Channel` stores the samples of one channel of a (possibly
//! multi-dimensional) image as `f64`, together with the [`SampleType`] the
//! data came from. The sample type determines the representable value
//! range, which the threshold search clamps against.
//!
//! # Examples
//!
//! ```
//! use coloc_core::{Channel, SampleType};
//!
//! let ch = Channel::from_u8(&[3, 2], &[0, 1, 2, 3, 4, 5]).unwrap();
//! assert_eq!(ch.sample_type(), SampleType::U8);
//! assert_eq!(ch.get(&[2, 1]), Some(5.0));
//! ```

use crate::error::{Error, Result};

/// Numeric type the samples were stored as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SampleType {
    /// Unsigned 8-bit
    #[default]
    U8,
    /// Signed 8-bit
    I8,
    /// Unsigned 16-bit
    U16,
    /// Signed 16-bit
    I16,
    /// Unsigned 32-bit
    U32,
    /// Signed 32-bit
    I32,
    /// 32-bit float
    F32,
    /// 64-bit float
    F64,
}

impl SampleType {
    /// Smallest representable value
    pub fn min_value(self) -> f64 {
        match self {
            Self::U8 | Self::U16 | Self::U32 => 0.0,
            Self::I8 => i8::MIN as f64,
            Self::I16 => i16::MIN as f64,
            Self::I32 => i32::MIN as f64,
            Self::F32 => f32::MIN as f64,
            Self::F64 => f64::MIN,
        }
    }

    /// Largest representable value
    pub fn max_value(self) -> f64 {
        match self {
            Self::U8 => u8::MAX as f64,
            Self::I8 => i8::MAX as f64,
            Self::U16 => u16::MAX as f64,
            Self::I16 => i16::MAX as f64,
            Self::U32 => u32::MAX as f64,
            Self::I32 => i32::MAX as f64,
            Self::F32 => f32::MAX as f64,
            Self::F64 => f64::MAX,
        }
    }

    /// Whether samples of this type are integers
    pub fn is_integer(self) -> bool {
        !matches!(self, Self::F32 | Self::F64)
    }
}

/// One channel of an n-dimensional image
///
/// # Memory Layout
///
/// Samples are stored with the first axis varying fastest: the sample at
/// `[x, y, z]` is at index `x + w * (y + h * z)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Channel {
    dims: Vec<usize>,
    data: Vec<f64>,
    sample_type: SampleType,
}

impl Channel {
    /// Create a channel from raw `f64` samples
    ///
    /// # Arguments
    ///
    /// * `dims` - Extent of each axis, first axis fastest
    /// * `data` - Samples in storage order
    /// * `sample_type` - Type the samples originate from
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidDimension` if `dims` is empty or contains a
    /// zero, and `Error::DataLength` if `data` does not hold exactly one
    /// sample per position.
    pub fn new(dims: &[usize], data: Vec<f64>, sample_type: SampleType) -> Result<Self> {
        let expected = checked_len(dims)?;
        if data.len() != expected {
            return Err(Error::DataLength {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            dims: dims.to_vec(),
            data,
            sample_type,
        })
    }

    /// Create a channel with every sample set to zero
    pub fn zeros(dims: &[usize], sample_type: SampleType) -> Result<Self> {
        let len = checked_len(dims)?;
        Ok(Self {
            dims: dims.to_vec(),
            data: vec![0.0; len],
            sample_type,
        })
    }

    /// Create a zeroed channel with the same shape and sample type
    pub fn zeros_like(&self) -> Self {
        Self {
            dims: self.dims.clone(),
            data: vec![0.0; self.data.len()],
            sample_type: self.sample_type,
        }
    }

    /// Create an unsigned 8-bit channel
    ///
    /// The typed constructors fail like [`Channel::new`].
    pub fn from_u8(dims: &[usize], data: &[u8]) -> Result<Self> {
        Self::new(dims, data.iter().map(|&v| v as f64).collect(), SampleType::U8)
    }

    /// Create a signed 8-bit channel
    pub fn from_i8(dims: &[usize], data: &[i8]) -> Result<Self> {
        Self::new(dims, data.iter().map(|&v| v as f64).collect(), SampleType::I8)
    }

    /// Create an unsigned 16-bit channel
    pub fn from_u16(dims: &[usize], data: &[u16]) -> Result<Self> {
        Self::new(
            dims,
            data.iter().map(|&v| v as f64).collect(),
            SampleType::U16,
        )
    }

    /// Create a signed 16-bit channel
    pub fn from_i16(dims: &[usize], data: &[i16]) -> Result<Self> {
        Self::new(
            dims,
            data.iter().map(|&v| v as f64).collect(),
            SampleType::I16,
        )
    }

    /// Create an unsigned 32-bit channel
    pub fn from_u32(dims: &[usize], data: &[u32]) -> Result<Self> {
        Self::new(
            dims,
            data.iter().map(|&v| v as f64).collect(),
            SampleType::U32,
        )
    }

    /// Create a signed 32-bit channel
    pub fn from_i32(dims: &[usize], data: &[i32]) -> Result<Self> {
        Self::new(
            dims,
            data.iter().map(|&v| v as f64).collect(),
            SampleType::I32,
        )
    }

    /// Create a 32-bit float channel
    pub fn from_f32(dims: &[usize], data: &[f32]) -> Result<Self> {
        Self::new(
            dims,
            data.iter().map(|&v| v as f64).collect(),
            SampleType::F32,
        )
    }

    /// Create a 64-bit float channel from a copy of `data`
    pub fn from_f64(dims: &[usize], data: &[f64]) -> Result<Self> {
        Self::new(dims, data.to_vec(), SampleType::F64)
    }

    /// Extent of each axis
    #[inline]
    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    /// Number of axes
    #[inline]
    pub fn ndim(&self) -> usize {
        self.dims.len()
    }

    /// Total number of samples
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Always false; a channel holds at least one sample
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn sample_type(&self) -> SampleType {
        self.sample_type
    }

    /// Samples in storage order
    #[inline]
    pub fn data(&self) -> &[f64] {
        &self.data
    }

    /// Mutable samples in storage order
    #[inline]
    pub fn data_mut(&mut self) -> &mut [f64] {
        &mut self.data
    }

    /// Linear index of a coordinate, or `None` if it lies outside
    pub fn index_of(&self, coord: &[usize]) -> Option<usize> {
        linear_index(&self.dims, coord)
    }

    /// Sample at a coordinate
    pub fn get(&self, coord: &[usize]) -> Option<f64> {
        self.index_of(coord).map(|i| self.data[i])
    }

    /// Set the sample at a coordinate
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidParameter` if the coordinate lies outside.
    pub fn set(&mut self, coord: &[usize], value: f64) -> Result<()> {
        let i = self.index_of(coord).ok_or_else(|| {
            Error::InvalidParameter(format!("coordinate {coord:?} outside {:?}", self.dims))
        })?;
        self.data[i] = value;
        Ok(())
    }

    /// Set every sample to `value`
    pub fn fill(&mut self, value: f64) {
        self.data.fill(value);
    }
}

/// Product of the extents, rejecting empty shapes and zero-length axes
pub(crate) fn checked_len(dims: &[usize]) -> Result<usize> {
    if dims.is_empty() || dims.contains(&0) {
        return Err(Error::InvalidDimension(dims.to_vec()));
    }
    Ok(dims.iter().product())
}

/// Linear index for first-axis-fastest storage
pub fn linear_index(dims: &[usize], coord: &[usize]) -> Option<usize> {
    if coord.len() != dims.len() {
        return None;
    }
    let mut index = 0;
    for axis in (0..dims.len()).rev() {
        if coord[axis] >= dims[axis] {
            return None;
        }
        index = index * dims[axis] + coord[axis];
    }
    Some(index)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_validates_length() {
        assert!(Channel::new(&[2, 2], vec![0.0; 4], SampleType::F64).is_ok());
        assert!(matches!(
            Channel::new(&[2, 2], vec![0.0; 3], SampleType::F64),
            Err(Error::DataLength {
                expected: 4,
                actual: 3
            })
        ));
    }

    #[test]
    fn test_typed_constructors() {
        let ch = Channel::from_i16(&[3], &[-5, 0, 7]).unwrap();
        assert_eq!(ch.sample_type(), SampleType::I16);
        assert_eq!(ch.data(), &[-5.0, 0.0, 7.0]);
        let ch = Channel::from_f32(&[2], &[0.5, -1.25]).unwrap();
        assert_eq!(ch.sample_type(), SampleType::F32);
        assert_eq!(ch.data(), &[0.5, -1.25]);
        assert!(matches!(
            Channel::from_u8(&[2, 2], &[1, 2, 3]),
            Err(Error::DataLength {
                expected: 4,
                actual: 3
            })
        ));
    }

    #[test]
    fn test_invalid_dimension() {
        assert!(matches!(
            Channel::zeros(&[4, 0], SampleType::U8),
            Err(Error::InvalidDimension(_))
        ));
        assert!(Channel::zeros(&[], SampleType::U8).is_err());
    }

    #[test]
    fn test_storage_order() {
        let ch = Channel::from_u16(&[2, 3, 2], &(0..12).collect::<Vec<u16>>()).unwrap();
        assert_eq!(ch.get(&[1, 0, 0]), Some(1.0));
        assert_eq!(ch.get(&[0, 1, 0]), Some(2.0));
        assert_eq!(ch.get(&[0, 0, 1]), Some(6.0));
        assert_eq!(ch.get(&[1, 2, 1]), Some(11.0));
        assert_eq!(ch.get(&[2, 0, 0]), None);
        assert_eq!(ch.get(&[0, 0]), None);
    }

    #[test]
    fn test_set_and_fill() {
        let mut ch = Channel::zeros(&[3, 3], SampleType::F32).unwrap();
        ch.set(&[1, 2], 4.5).unwrap();
        assert_eq!(ch.get(&[1, 2]), Some(4.5));
        assert!(ch.set(&[3, 0], 1.0).is_err());
        ch.fill(2.0);
        assert!(ch.data().iter().all(|&v| v == 2.0));
    }

    #[test]
    fn test_sample_type_range() {
        assert_eq!(SampleType::U8.min_value(), 0.0);
        assert_eq!(SampleType::U8.max_value(), 255.0);
        assert_eq!(SampleType::I16.min_value(), -32768.0);
        assert_eq!(SampleType::U16.max_value(), 65535.0);
        assert!(SampleType::U32.is_integer());
        assert!(!SampleType::F32.is_integer());
    }
}

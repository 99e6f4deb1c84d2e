//! Separable convolution kernels
//!
//! A [`Kernel`] is a one-dimensional, odd-length, centred weight vector.
//! n-dimensional smoothing applies it once along each axis.

use crate::{FilterError, FilterResult};

/// A centred 1D convolution kernel
#[derive(Debug, Clone, PartialEq)]
pub struct Kernel {
    /// Half width; the kernel has `2 * radius + 1` taps
    radius: usize,
    data: Vec<f64>,
}

impl Kernel {
    /// Create a kernel from a slice of weights.
    ///
    /// # Errors
    ///
    /// Returns `FilterError::InvalidKernel` unless the slice has odd length.
    pub fn from_slice(data: &[f64]) -> FilterResult<Self> {
        if data.len() % 2 == 0 {
            return Err(FilterError::InvalidKernel(format!(
                "kernel length must be odd, got {}",
                data.len()
            )));
        }
        Ok(Self {
            radius: data.len() / 2,
            data: data.to_vec(),
        })
    }

    /// Create a normalized Gaussian kernel.
    ///
    /// The kernel extends to `ceil(3 * sigma)` on each side.
    ///
    /// # Errors
    ///
    /// Returns `FilterError::InvalidParameters` if `sigma` is not a
    /// positive finite number.
    pub fn gaussian(sigma: f64) -> FilterResult<Self> {
        if !(sigma.is_finite() && sigma > 0.0) {
            return Err(FilterError::InvalidParameters(format!(
                "sigma must be positive, got {sigma}"
            )));
        }

        let radius = (3.0 * sigma).ceil() as usize;
        let two_sigma_sq = 2.0 * sigma * sigma;
        let data = (0..=2 * radius)
            .map(|i| {
                let x = i as f64 - radius as f64;
                (-x * x / two_sigma_sq).exp()
            })
            .collect();

        let mut kernel = Self { radius, data };
        kernel.normalize();
        Ok(kernel)
    }

    #[inline]
    pub fn radius(&self) -> usize {
        self.radius
    }

    /// Number of taps
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn data(&self) -> &[f64] {
        &self.data
    }

    /// Weight at a signed offset from the centre
    pub fn get(&self, offset: isize) -> Option<f64> {
        let i = offset + self.radius as isize;
        if i < 0 {
            return None;
        }
        self.data.get(i as usize).copied()
    }

    pub fn sum(&self) -> f64 {
        self.data.iter().sum()
    }

    /// Scale the weights to sum to 1. A zero-sum kernel is left unchanged.
    pub fn normalize(&mut self) {
        let sum = self.sum();
        if sum.abs() > f64::EPSILON {
            for v in &mut self.data {
                *v /= sum;
            }
        }
    }
}

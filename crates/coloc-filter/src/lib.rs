//! coloc-filter - Smoothing and spatial randomization
//!
//! This crate provides the image-level operations the significance tests
//! need:
//!
//! - 1D convolution kernels (Gaussian)
//! - Separable n-dimensional Gaussian smoothing with mirrored borders
//! - Block shuffling of a channel inside a bounding box

pub mod boundary;
mod error;
pub mod gaussian;
pub mod kernel;
pub mod shuffle;

pub use error::{FilterError, FilterResult};
pub use kernel::Kernel;

pub use boundary::mirror_index;
pub use gaussian::{convolve_axis, convolve_separable, gaussian_smooth};
pub use shuffle::BlockShuffler;

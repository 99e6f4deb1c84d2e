//! Separable Gaussian smoothing of n-dimensional channels
//!
//! The kernel is applied along every axis in turn. Samples beyond the
//! image border are read by mirroring (see [`crate::boundary`]).

use coloc_core::Channel;

use crate::boundary::mirror_index;
use crate::kernel::Kernel;
use crate::FilterResult;

/// Smooth a channel with an isotropic Gaussian
///
/// # Arguments
///
/// * `channel` - Input channel
/// * `sigma` - Standard deviation in pixels, applied to every axis
///
/// # Errors
///
/// Returns `FilterError::InvalidParameters` if `sigma` is not positive.
pub fn gaussian_smooth(channel: &Channel, sigma: f64) -> FilterResult<Channel> {
    let kernel = Kernel::gaussian(sigma)?;
    convolve_separable(channel, &kernel)
}

/// Convolve every axis of a channel with the same 1D kernel
pub fn convolve_separable(channel: &Channel, kernel: &Kernel) -> FilterResult<Channel> {
    let mut out = channel.clone();
    let mut scratch = vec![0.0; channel.len()];
    for axis in 0..channel.ndim() {
        convolve_axis(channel.dims(), out.data(), &mut scratch, axis, kernel);
        out.data_mut().copy_from_slice(&scratch);
    }
    Ok(out)
}

/// Convolve `src` along one axis into `dst`
///
/// Both buffers use first-axis-fastest storage with extents `dims`.
pub fn convolve_axis(dims: &[usize], src: &[f64], dst: &mut [f64], axis: usize, kernel: &Kernel) {
    let n = dims[axis];
    let stride: usize = dims[..axis].iter().product();
    let radius = kernel.radius() as isize;
    let weights = kernel.data();

    // Every line along `axis` starts at an index whose `axis` coordinate is 0.
    let block = stride * n;
    for base in (0..src.len()).step_by(block) {
        for inner in 0..stride {
            let start = base + inner;
            for i in 0..n {
                let mut acc = 0.0;
                for (k, &w) in weights.iter().enumerate() {
                    let j = mirror_index(i as isize + k as isize - radius, n);
                    acc += w * src[start + j * stride];
                }
                dst[start + i * stride] = acc;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coloc_core::SampleType;

    #[test]
    fn test_constant_is_preserved() {
        let ch = Channel::new(&[7, 5], vec![3.0; 35], SampleType::F32).unwrap();
        let out = gaussian_smooth(&ch, 1.5).unwrap();
        assert!(out.data().iter().all(|v| (v - 3.0).abs() < 1e-9));
    }

    #[test]
    fn test_impulse_spreads_symmetrically() {
        let mut ch = Channel::zeros(&[9, 9], SampleType::F32).unwrap();
        ch.set(&[4, 4], 1.0).unwrap();
        let out = gaussian_smooth(&ch, 1.0).unwrap();
        let total: f64 = out.data().iter().sum();
        assert!((total - 1.0).abs() < 1e-9);
        let centre = out.get(&[4, 4]).unwrap();
        assert!(centre < 1.0);
        assert!((out.get(&[3, 4]).unwrap() - out.get(&[5, 4]).unwrap()).abs() < 1e-12);
        assert!((out.get(&[4, 3]).unwrap() - out.get(&[3, 4]).unwrap()).abs() < 1e-12);
    }

    #[test]
    fn test_axis_independence() {
        // A ramp along x is left unchanged by smoothing along y.
        let data: Vec<f64> = (0..12).map(|i| (i % 4) as f64).collect();
        let ch = Channel::new(&[4, 3], data.clone(), SampleType::F64).unwrap();
        let kernel = Kernel::from_slice(&[0.25, 0.5, 0.25]).unwrap();
        let mut dst = vec![0.0; 12];
        convolve_axis(ch.dims(), ch.data(), &mut dst, 1, &kernel);
        assert_eq!(dst, data);
    }

    #[test]
    fn test_three_dimensional() {
        let mut ch = Channel::zeros(&[9, 9, 9], SampleType::F32).unwrap();
        ch.set(&[4, 4, 4], 1.0).unwrap();
        let out = gaussian_smooth(&ch, 0.8).unwrap();
        let total: f64 = out.data().iter().sum();
        assert!((total - 1.0).abs() < 1e-9);
        assert!((out.get(&[4, 4, 3]).unwrap() - out.get(&[3, 4, 4]).unwrap()).abs() < 1e-12);
    }
}

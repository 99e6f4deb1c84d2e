//! Synthetic test channels
//!
//! All fixtures are deterministic for a given seed.

use coloc_core::{Channel, SampleType};
use coloc_filter::gaussian_smooth;
use rand::SeedableRng;
use rand::distr::{Distribution, Uniform};
use rand::rngs::StdRng;

use crate::error::{TestError, TestResult};

fn uniform(name: &str, low: f64, high: f64) -> TestResult<Uniform<f64>> {
    Uniform::new(low, high).map_err(|e| TestError::Fixture {
        name: name.to_string(),
        message: e.to_string(),
    })
}

/// Uniform noise in `[low, high)` as a 32-bit float channel
pub fn uniform_noise(dims: &[usize], low: f64, high: f64, seed: u64) -> TestResult<Channel> {
    let dist = uniform("uniform_noise", low, high)?;
    let mut rng = StdRng::seed_from_u64(seed);
    let len: usize = dims.iter().product();
    let data = (0..len).map(|_| dist.sample(&mut rng)).collect();
    Ok(Channel::new(dims, data, SampleType::F32)?)
}

/// Smooth noise with values spanning `[0, peak]`, stored as 8-bit
///
/// Uniform noise is blurred with a Gaussian of the given sigma and then
/// stretched to the requested range.
pub fn smooth_noise_u8(dims: &[usize], sigma: f64, peak: u8, seed: u64) -> TestResult<Channel> {
    let noise = uniform_noise(dims, 0.0, 1.0, seed)?;
    let smooth = gaussian_smooth(&noise, sigma)?;
    let data = stretch(smooth.data(), peak as f64);
    Ok(Channel::new(dims, data, SampleType::U8)?)
}

/// Two 8-bit channels sharing a smooth structure plus independent noise
///
/// `noise` is the amplitude of the per-channel noise relative to the
/// shared structure, which spans `[0, 200]`.
pub fn correlated_pair(
    dims: &[usize],
    sigma: f64,
    noise: f64,
    seed: u64,
) -> TestResult<(Channel, Channel)> {
    let base = smooth_noise_u8(dims, sigma, 200, seed)?;
    let n1 = uniform_noise(dims, -noise, noise, seed.wrapping_add(1))?;
    let n2 = uniform_noise(dims, -noise, noise, seed.wrapping_add(2))?;
    let to_u8 = |extra: &Channel| -> Vec<f64> {
        base.data()
            .iter()
            .zip(extra.data())
            .map(|(b, e)| (b + e).round().clamp(0.0, 255.0))
            .collect()
    };
    Ok((
        Channel::new(dims, to_u8(&n1), SampleType::U8)?,
        Channel::new(dims, to_u8(&n2), SampleType::U8)?,
    ))
}

/// Two unrelated smooth 8-bit channels
pub fn independent_pair(dims: &[usize], sigma: f64, seed: u64) -> TestResult<(Channel, Channel)> {
    Ok((
        smooth_noise_u8(dims, sigma, 200, seed)?,
        smooth_noise_u8(dims, sigma, 200, seed.wrapping_add(1000))?,
    ))
}

/// Two 8-bit channels whose non-zero supports do not overlap
///
/// Channel 1 is `value` on the left half of the first axis, channel 2 on
/// the right half.
pub fn disjoint_pair(dims: &[usize], value: u8) -> TestResult<(Channel, Channel)> {
    let len: usize = dims.iter().product();
    let half = dims[0] / 2;
    let (mut a, mut b) = (vec![0.0; len], vec![0.0; len]);
    for i in 0..len {
        if i % dims[0] < half {
            a[i] = value as f64;
        } else {
            b[i] = value as f64;
        }
    }
    Ok((
        Channel::new(dims, a, SampleType::U8)?,
        Channel::new(dims, b, SampleType::U8)?,
    ))
}

/// Linear ramp `offset + step * i` over the storage order
pub fn ramp(dims: &[usize], offset: f64, step: f64, sample_type: SampleType) -> TestResult<Channel> {
    let len: usize = dims.iter().product();
    let data = (0..len).map(|i| offset + step * i as f64).collect();
    Ok(Channel::new(dims, data, sample_type)?)
}

fn stretch(values: &[f64], peak: f64) -> Vec<f64> {
    let (lo, hi) = values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    let span = hi - lo;
    values
        .iter()
        .map(|&v| {
            if span > 0.0 {
                ((v - lo) / span * peak).round()
            } else {
                0.0
            }
        })
        .collect()
}

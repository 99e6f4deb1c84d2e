//! Scalar statistics helpers
//!
//! Normal distribution functions used by the significance tests and a few
//! small descriptive statistics.

/// Error function
///
/// Chebyshev approximation with a fractional error below 1.2e-7
/// everywhere (Numerical Recipes `erfcc`).
pub fn erf(x: f64) -> f64 {
    let z = x.abs();
    let t = 1.0 / (1.0 + 0.5 * z);
    let poly = -z * z - 1.26551223
        + t * (1.00002368
            + t * (0.37409196
                + t * (0.09678418
                    + t * (-0.18628806
                        + t * (0.27886807
                            + t * (-1.13520398
                                + t * (1.48851587 + t * (-0.82215223 + t * 0.17087277))))))));
    let ans = 1.0 - t * poly.exp();
    if x >= 0.0 { ans } else { -ans }
}

/// Standard normal cumulative distribution function
pub fn phi(z: f64) -> f64 {
    0.5 * (1.0 + erf(z / std::f64::consts::SQRT_2))
}

/// Normal cumulative distribution function with the given mean and
/// standard deviation
pub fn phi_with(z: f64, mean: f64, sd: f64) -> f64 {
    phi((z - mean) / sd)
}

/// Arithmetic mean, `NaN` for an empty slice
pub fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (`n - 1` denominator)
///
/// `NaN` for fewer than two values.
pub fn std_dev(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return f64::NAN;
    }
    let m = mean(values);
    let ss: f64 = values.iter().map(|v| (v - m) * (v - m)).sum();
    (ss / (n - 1) as f64).sqrt()
}

/// Limit a value to `[min, max]`
///
/// Unlike [`f64::clamp`] this never panics: when `min > max` the lower
/// bound wins. `NaN` maps to `min`.
pub fn clamp(value: f64, min: f64, max: f64) -> f64 {
    if value.is_nan() || min > value {
        min
    } else if max < value {
        max
    } else {
        value
    }
}

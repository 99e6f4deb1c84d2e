//! Automatic background threshold search
//!
//! The thresholds lie on the orthogonal regression line between both
//! channels, at the point below which the remaining pixels no longer
//! correlate.

mod regression;
mod stepper;

pub use regression::{AutoThresholdRegression, RegressionLine};
pub use stepper::{BisectionStepper, SimpleStepper, ThresholdStepper};

/// Search strategy of the threshold regression
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThresholdStrategy {
    /// Halve the step around the zero crossing of r
    #[default]
    Bisection,
    /// Step down by one intensity level, as published by Costes et al.
    Costes,
}

impl ThresholdStrategy {
    pub fn name(self) -> &'static str {
        match self {
            Self::Bisection => "Bisection",
            Self::Costes => "Costes",
        }
    }
}

//! coloc-stats - Colocalization statistics
//!
//! Every statistic is an [`Algorithm`] stage reading a
//! [`coloc_core::Descriptor`]:
//!
//! - [`InputCheck`] - zero-zero and saturation ratios
//! - [`AutoThresholdRegression`] - background thresholds on the regression line
//! - [`PearsonsCorrelation`] - Pearson's r, with and without thresholds
//! - [`MandersColocalization`] - split coefficients M1/M2 and tM1/tM2
//! - [`LiIcq`], [`LiHistogram2D`] - Li's intensity correlation quotient
//! - [`Histogram2D`] - the channel 1 versus channel 2 scatter histogram
//! - [`SpearmanRankCorrelation`], [`KendallTauRankCorrelation`],
//!   [`MaxKendallTau`] - rank correlations
//! - [`CostesSignificanceTest`] - block randomization p-value of r
//!
//! [`Analysis`] runs them in order and collects their results.

pub mod algorithm;
pub mod analysis;
pub mod costes;
pub mod histogram2d;
pub mod input_check;
pub mod kendall;
pub mod li_icq;
pub mod manders;
pub mod pearson;
pub mod spearman;
pub mod threshold;

pub use algorithm::Algorithm;
pub use analysis::{
    Analysis, AnalysisOptions, LiHistogramOptions, ProgressFn, StageSelection, analyze,
};
pub use costes::{CostesOptions, CostesSignificanceTest};
pub use histogram2d::{Histogram2D, LiHistogram2D};
pub use input_check::InputCheck;
pub use kendall::{KendallTauRankCorrelation, MaxKendallTau, MaxTauOptions};
pub use li_icq::LiIcq;
pub use manders::{MandersColocalization, MandersResults};
pub use pearson::{PearsonImplementation, PearsonsCorrelation, ThresholdMode};
pub use spearman::SpearmanRankCorrelation;
pub use threshold::{
    AutoThresholdRegression, BisectionStepper, RegressionLine, SimpleStepper, ThresholdStepper,
    ThresholdStrategy,
};

//! Spearman's rank correlation
//!
//! Both channels are rank transformed (tied samples share the average of
//! their ranks) and Pearson's r of the ranks is reported together with the
//! t statistic for `n - 2` degrees of freedom.

use coloc_core::{AnalysisResults, Descriptor, Error, Result};
use tracing::debug;

use crate::algorithm::Algorithm;
use crate::pearson::fast_pearson;

/// 1-based ranks with ties averaged
pub fn average_ranks(values: &[f64]) -> Vec<f64> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));

    let mut ranks = vec![0.0; values.len()];
    let mut start = 0;
    while start < order.len() {
        let mut end = start + 1;
        while end < order.len() && values[order[end]] == values[order[start]] {
            end += 1;
        }
        // Ranks start..end (0-based) share their mean, 1-based.
        let rank = (start + end + 1) as f64 / 2.0;
        for &i in &order[start..end] {
            ranks[i] = rank;
        }
        start = end;
    }
    ranks
}

/// Spearman's rho over arbitrary pairs
///
/// # Errors
///
/// `Error::MissingPrecondition` for fewer than three pairs or when a
/// channel is constant.
pub fn spearman_rho<I>(pairs: I) -> Result<f64>
where
    I: IntoIterator<Item = (f64, f64)>,
{
    let (xs, ys): (Vec<f64>, Vec<f64>) = pairs.into_iter().unzip();
    if xs.len() < 3 {
        return Err(Error::precondition(format!(
            "Spearman's rank correlation needs at least 3 pixels, got {}",
            xs.len()
        )));
    }
    let (rx, ry) = (average_ranks(&xs), average_ranks(&ys));
    fast_pearson(rx.into_iter().zip(ry), |_, _| true)
}

/// Spearman's rank correlation stage
#[derive(Debug, Clone, Default)]
pub struct SpearmanRankCorrelation {
    rho: f64,
    df: usize,
    t: f64,
}

impl SpearmanRankCorrelation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rho(&self) -> f64 {
        self.rho
    }

    /// Degrees of freedom, `n - 2`
    pub fn degrees_of_freedom(&self) -> usize {
        self.df
    }

    /// t statistic; infinite for a perfect correlation
    pub fn t_statistic(&self) -> f64 {
        self.t
    }
}

impl Algorithm for SpearmanRankCorrelation {
    fn name(&self) -> &str {
        "Spearman correlation"
    }

    fn execute(&mut self, descriptor: &Descriptor) -> Result<()> {
        self.rho = spearman_rho(descriptor.pairs())?;
        self.df = descriptor.pixel_count() - 2;
        self.t = self.rho * (self.df as f64 / (1.0 - self.rho * self.rho)).sqrt();
        debug!(rho = self.rho, t = self.t, "spearman");
        Ok(())
    }

    fn report(&self, results: &mut AnalysisResults) {
        results.add_value("Spearman's rank correlation value", self.rho, 8);
        results.add_value("Spearman's correlation t-statistic", self.t, 4);
        results.add_value("t-statistic degrees of freedom", self.df as f64, 0);
    }
}

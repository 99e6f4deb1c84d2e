//! Li's intensity correlation quotient
//!
//! For every masked pixel the product `(mean1 - ch1) * (mean2 - ch2)` is
//! positive when both channels deviate from their mean in the same
//! direction. ICQ is the fraction of positive products minus 0.5, so it
//! lies in `[-0.5, 0.5]` with 0 for random staining.

use coloc_core::{AnalysisResults, Descriptor, Result};
use tracing::debug;

use crate::algorithm::Algorithm;

/// ICQ over arbitrary pairs with the given means
///
/// Returns `NaN` for an empty input.
pub fn li_icq<I>(pairs: I, mean1: f64, mean2: f64) -> f64
where
    I: IntoIterator<Item = (f64, f64)>,
{
    let (mut positive, mut total) = (0usize, 0usize);
    for (x, y) in pairs {
        if (mean1 - x) * (mean2 - y) > 0.0 {
            positive += 1;
        }
        total += 1;
    }
    positive as f64 / total as f64 - 0.5
}

/// Li's ICQ stage
#[derive(Debug, Clone, Default)]
pub struct LiIcq {
    icq: f64,
}

impl LiIcq {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn icq(&self) -> f64 {
        self.icq
    }
}

impl Algorithm for LiIcq {
    fn name(&self) -> &str {
        "Li ICQ calculation"
    }

    fn execute(&mut self, descriptor: &Descriptor) -> Result<()> {
        self.icq = li_icq(
            descriptor.pairs(),
            descriptor.stats1().mean,
            descriptor.stats2().mean,
        );
        debug!(icq = self.icq, "li icq");
        Ok(())
    }

    fn report(&self, results: &mut AnalysisResults) {
        results.add_value("Li's ICQ value", self.icq, 3);
    }
}

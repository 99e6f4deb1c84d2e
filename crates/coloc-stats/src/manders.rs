//! Manders' split coefficients
//!
//! M1 is the fraction of channel 1 intensity found in pixels where
//! channel 2 is non-zero, M2 the converse. The thresholded forms (tM1,
//! tM2) additionally require the other channel to reach its threshold.

use coloc_core::{Accumulator, AnalysisResults, Descriptor, Error, Result};
use tracing::debug;

use crate::algorithm::Algorithm;
use crate::pearson::ThresholdMode;

/// A pair of split coefficients
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MandersResults {
    pub m1: f64,
    pub m2: f64,
}

/// Split coefficients over arbitrary pairs
///
/// With [`ThresholdMode::Above`] a pixel counts for M1 when channel 2 is
/// positive and at least `t2`; with [`ThresholdMode::Below`] when it is
/// positive and at most `t2`. M2 mirrors this with channel 1 and `t1`.
///
/// # Errors
///
/// `Error::MissingPrecondition` if either channel has zero total intensity.
pub fn manders_coefficients<I>(pairs: I, mode: ThresholdMode, t1: f64, t2: f64) -> Result<MandersResults>
where
    I: Iterator<Item = (f64, f64)> + Clone,
{
    let gate = move |other: f64, threshold: f64| -> bool {
        other > 0.0
            && match mode {
                ThresholdMode::None => true,
                ThresholdMode::Above => other >= threshold,
                ThresholdMode::Below => other <= threshold,
            }
    };

    let totals = Accumulator::new(pairs.clone());
    if totals.x == 0.0 || totals.y == 0.0 {
        return Err(Error::precondition(
            "Manders' coefficients need non-zero total intensity in both channels",
        ));
    }
    let coloc1 = Accumulator::with_predicate(pairs.clone(), |_, y| gate(y, t2));
    let coloc2 = Accumulator::with_predicate(pairs, |x, _| gate(x, t1));

    Ok(MandersResults {
        m1: coloc1.x / totals.x,
        m2: coloc2.y / totals.y,
    })
}

/// Manders' colocalization stage
#[derive(Debug, Clone, Default)]
pub struct MandersColocalization {
    plain: Option<MandersResults>,
    thresholded: Option<MandersResults>,
}

impl MandersColocalization {
    pub fn new() -> Self {
        Self::default()
    }

    /// M1/M2 of the last run
    pub fn coefficients(&self) -> Option<MandersResults> {
        self.plain
    }

    /// tM1/tM2 of the last run, if a threshold pair was available
    pub fn thresholded(&self) -> Option<MandersResults> {
        self.thresholded
    }
}

impl Algorithm for MandersColocalization {
    fn name(&self) -> &str {
        "Manders correlation"
    }

    fn execute(&mut self, descriptor: &Descriptor) -> Result<()> {
        self.plain = None;
        self.thresholded = None;
        self.plain = Some(manders_coefficients(
            descriptor.pairs(),
            ThresholdMode::None,
            0.0,
            0.0,
        )?);
        if let Some(t) = descriptor.threshold() {
            self.thresholded = Some(manders_coefficients(
                descriptor.pairs(),
                ThresholdMode::Above,
                t.ch1_max,
                t.ch2_max,
            )?);
        }
        debug!(plain = ?self.plain, thresholded = ?self.thresholded, "manders");
        Ok(())
    }

    fn report(&self, results: &mut AnalysisResults) {
        if let Some(m) = self.plain {
            results.add_value("Manders' M1 (Above zero intensity of Ch2)", m.m1, 3);
            results.add_value("Manders' M2 (Above zero intensity of Ch1)", m.m2, 3);
        }
        if let Some(m) = self.thresholded {
            results.add_value("Manders' tM1 (Above autothreshold of Ch2)", m.m1, 3);
            results.add_value("Manders' tM2 (Above autothreshold of Ch1)", m.m2, 3);
        }
    }
}

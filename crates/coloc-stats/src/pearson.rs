//! Pearson's correlation coefficient
//!
//! Two numerically equivalent implementations are provided:
//!
//! - [`PearsonImplementation::Classic`] subtracts the channel means before
//!   accumulating, which is the textbook formula
//! - [`PearsonImplementation::Fast`] accumulates raw sums in one pass and
//!   derives the centred moments afterwards
//!
//! Both can be restricted to pixels below or above a [`ThresholdPair`].

use coloc_core::{Accumulator, AnalysisResults, Descriptor, Error, Result, ThresholdPair, Warning};
use tracing::debug;

use crate::algorithm::Algorithm;

/// How Pearson's r is computed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PearsonImplementation {
    /// Mean-subtracted accumulation
    Classic,
    /// Single pass over raw sums
    #[default]
    Fast,
}

/// Which pixels enter a thresholded computation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThresholdMode {
    /// All pixels
    #[default]
    None,
    /// Pixels where either channel lies below its threshold
    Below,
    /// Pixels where either channel lies above its threshold
    Above,
}

impl ThresholdMode {
    /// Pixel predicate for this mode and the given upper thresholds
    pub fn predicate(self, t1: f64, t2: f64) -> impl Fn(f64, f64) -> bool {
        move |x, y| match self {
            Self::None => true,
            Self::Below => x < t1 || y < t2,
            Self::Above => x > t1 || y > t2,
        }
    }
}

/// Pearson's r from mean-subtracted sums
///
/// # Errors
///
/// `Error::MissingPrecondition` if fewer than three pairs are accepted or
/// the result is undefined.
pub fn classic_pearson<I, F>(pairs: I, mean1: f64, mean2: f64, accept: F) -> Result<f64>
where
    I: IntoIterator<Item = (f64, f64)>,
    F: FnMut(f64, f64) -> bool,
{
    let acc = Accumulator::with_offsets(pairs, accept, mean1, mean2);
    check_count(acc.count)?;
    let denominator = (acc.xx * acc.yy).sqrt();
    finish(acc.xy, denominator)
}

/// Pearson's r from raw sums
///
/// # Errors
///
/// `Error::MissingPrecondition` if fewer than three pairs are accepted or
/// the result is undefined.
pub fn fast_pearson<I, F>(pairs: I, accept: F) -> Result<f64>
where
    I: IntoIterator<Item = (f64, f64)>,
    F: FnMut(f64, f64) -> bool,
{
    let acc = Accumulator::with_predicate(pairs, accept);
    check_count(acc.count)?;
    let n = acc.count as f64;
    let numerator = acc.xy - acc.x * acc.y / n;
    let denominator = (acc.xx - acc.x * acc.x / n).sqrt() * (acc.yy - acc.y * acc.y / n).sqrt();
    finish(numerator, denominator)
}

fn check_count(count: usize) -> Result<()> {
    if count < 3 {
        return Err(Error::precondition(format!(
            "Pearson's correlation needs at least 3 pixels, got {count}"
        )));
    }
    Ok(())
}

fn finish(numerator: f64, denominator: f64) -> Result<f64> {
    if !(denominator > 0.0) {
        return Err(Error::precondition(
            "Pearson's correlation denominator is not positive",
        ));
    }
    let r = numerator / denominator;
    if !r.is_finite() {
        return Err(Error::precondition("Pearson's correlation is not a number"));
    }
    Ok(r)
}

/// Pearson's correlation stage
#[derive(Debug, Clone, Default)]
pub struct PearsonsCorrelation {
    implementation: PearsonImplementation,
    r: f64,
    r_below: Option<f64>,
    r_above: Option<f64>,
    warnings: Vec<Warning>,
}

impl PearsonsCorrelation {
    pub fn new(implementation: PearsonImplementation) -> Self {
        Self {
            implementation,
            ..Self::default()
        }
    }

    pub fn implementation(&self) -> PearsonImplementation {
        self.implementation
    }

    /// r over arbitrary pairs
    ///
    /// The classic implementation makes an extra pass for the means.
    pub fn calculate<I>(&self, pairs: I) -> Result<f64>
    where
        I: Iterator<Item = (f64, f64)> + Clone,
    {
        match self.implementation {
            PearsonImplementation::Classic => {
                let acc = Accumulator::new(pairs.clone());
                check_count(acc.count)?;
                let n = acc.count as f64;
                classic_pearson(pairs, acc.x / n, acc.y / n, |_, _| true)
            }
            PearsonImplementation::Fast => fast_pearson(pairs, |_, _| true),
        }
    }

    /// r over the masked pixels of a descriptor, gated by `mode`
    ///
    /// The classic implementation subtracts the means of all masked pixels,
    /// not of the gated subset.
    pub fn calculate_with(
        &self,
        descriptor: &Descriptor,
        mode: ThresholdMode,
        ch1_threshold: f64,
        ch2_threshold: f64,
    ) -> Result<f64> {
        let accept = mode.predicate(ch1_threshold, ch2_threshold);
        match self.implementation {
            PearsonImplementation::Classic => classic_pearson(
                descriptor.pairs(),
                descriptor.stats1().mean,
                descriptor.stats2().mean,
                accept,
            ),
            PearsonImplementation::Fast => fast_pearson(descriptor.pairs(), accept),
        }
    }

    /// r with the upper thresholds of a threshold pair
    pub fn calculate_thresholded(
        &self,
        descriptor: &Descriptor,
        threshold: &ThresholdPair,
        mode: ThresholdMode,
    ) -> Result<f64> {
        self.calculate_with(descriptor, mode, threshold.ch1_max, threshold.ch2_max)
    }

    /// r without threshold from the last run
    pub fn r(&self) -> f64 {
        self.r
    }

    pub fn r_below(&self) -> Option<f64> {
        self.r_below
    }

    pub fn r_above(&self) -> Option<f64> {
        self.r_above
    }
}

impl Algorithm for PearsonsCorrelation {
    fn name(&self) -> &str {
        "Pearson correlation"
    }

    fn execute(&mut self, descriptor: &Descriptor) -> Result<()> {
        self.warnings.clear();
        self.r_below = None;
        self.r_above = None;
        self.r = self.calculate_with(descriptor, ThresholdMode::None, 0.0, 0.0)?;

        if let Some(t) = descriptor.threshold() {
            for mode in [ThresholdMode::Below, ThresholdMode::Above] {
                match self.calculate_thresholded(descriptor, t, mode) {
                    Ok(r) => match mode {
                        ThresholdMode::Below => self.r_below = Some(r),
                        _ => self.r_above = Some(r),
                    },
                    Err(e) if e.is_precondition() => {
                        self.warnings.push(Warning::new(
                            "Thresholded Pearson's R undefined",
                            format!("Pearson's R ({mode:?} threshold) could not be computed: {e}"),
                        ));
                    }
                    Err(e) => return Err(e),
                }
            }
        }
        debug!(r = self.r, below = ?self.r_below, above = ?self.r_above, "pearson");
        Ok(())
    }

    fn report(&self, results: &mut AnalysisResults) {
        for w in &self.warnings {
            results.add_warning(w.clone());
        }
        results.add_value("Pearson's R value (no threshold)", self.r, 2);
        if let Some(r) = self.r_below {
            results.add_value("Pearson's R value (below threshold)", r, 2);
        }
        if let Some(r) = self.r_above {
            results.add_value("Pearson's R value (above threshold)", r, 2);
        }
    }
}

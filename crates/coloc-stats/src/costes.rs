//! Costes' randomization test
//!
//! Channel 1 is cut into PSF-sized blocks over the mask bounding box, the
//! blocks are shuffled, and the result is smoothed with a Gaussian of the
//! PSF width. Pearson's r of many such images against the untouched
//! channel 2 forms the null distribution; the p-value is the normal CDF
//! of the observed r under its mean and standard deviation.

use coloc_core::statistics::{clamp, mean, phi_with, std_dev};
use coloc_core::{AnalysisResults, Descriptor, Error, MaskType, MaskedPairs, Result};
use coloc_filter::{BlockShuffler, gaussian_smooth};
use tracing::{debug, warn};

use crate::algorithm::Algorithm;
use crate::pearson::{PearsonImplementation, PearsonsCorrelation};

/// Rounds with an undefined r that are replaced before the test fails
const MAX_RETRIES: usize = 3;

/// Parameters of the Costes test
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CostesOptions {
    /// Block edge and smoothing sigma, in pixels
    pub psf_radius: usize,
    pub randomizations: usize,
    pub seed: u64,
}

impl Default for CostesOptions {
    fn default() -> Self {
        Self {
            psf_radius: 3,
            randomizations: 10,
            seed: 0,
        }
    }
}

impl CostesOptions {
    /// # Errors
    ///
    /// `Error::InvalidParameter` if the PSF radius is 0 or fewer than two
    /// rounds are requested.
    pub fn validate(&self) -> Result<()> {
        if self.psf_radius == 0 {
            return Err(Error::InvalidParameter(
                "PSF radius must be at least 1".to_string(),
            ));
        }
        if self.randomizations < 2 {
            return Err(Error::InvalidParameter(
                "Costes test needs at least two randomizations".to_string(),
            ));
        }
        Ok(())
    }
}

/// Costes significance test stage
#[derive(Debug, Clone, Default)]
pub struct CostesSignificanceTest {
    options: CostesOptions,
    pearson: PearsonsCorrelation,
    observed: f64,
    shuffled_r: Vec<f64>,
    shuffled_mean: f64,
    shuffled_sd: f64,
    p_value: f64,
    ratio_not_less: f64,
    done: bool,
}

impl CostesSignificanceTest {
    pub fn new(options: CostesOptions, implementation: PearsonImplementation) -> Self {
        Self {
            options,
            pearson: PearsonsCorrelation::new(implementation),
            ..Self::default()
        }
    }

    pub fn options(&self) -> &CostesOptions {
        &self.options
    }

    /// Pearson's r of the unshuffled images
    pub fn observed(&self) -> f64 {
        self.observed
    }

    /// r of every successful randomization round
    pub fn shuffled_r(&self) -> &[f64] {
        &self.shuffled_r
    }

    pub fn shuffled_mean(&self) -> f64 {
        self.shuffled_mean
    }

    pub fn shuffled_std_dev(&self) -> f64 {
        self.shuffled_sd
    }

    pub fn p_value(&self) -> f64 {
        self.p_value
    }

    /// Fraction of rounds whose r is not below the observed r
    pub fn ratio_not_less(&self) -> f64 {
        self.ratio_not_less
    }
}

impl Algorithm for CostesSignificanceTest {
    fn name(&self) -> &str {
        "Costes significance test"
    }

    fn execute(&mut self, descriptor: &Descriptor) -> Result<()> {
        self.done = false;
        self.shuffled_r.clear();
        self.options.validate()?;

        let observed = self.pearson.calculate(descriptor.pairs())?;
        let psf = self.options.psf_radius;
        let mut shuffler = BlockShuffler::cubic(
            descriptor.dims(),
            descriptor.bounding_box(),
            psf,
            self.options.seed,
        )?;
        let source = descriptor.channel1();
        let mut shuffled = source.zeros_like();
        let irregular = descriptor.mask_type() == MaskType::Irregular;

        let mut rounds = self.options.randomizations;
        let mut retries = 0;
        let mut round = 0;
        while round < rounds {
            // Only the bounding box is rewritten.
            if irregular {
                shuffled.fill(0.0);
            }
            shuffler.shuffle(source, &mut shuffled)?;
            let smoothed = gaussian_smooth(&shuffled, psf as f64)?;
            let pairs = MaskedPairs::from_slices(
                descriptor.dims(),
                smoothed.data(),
                descriptor.channel2().data(),
                descriptor.mask(),
            )?;
            match self.pearson.calculate(pairs) {
                Ok(r) => self.shuffled_r.push(r),
                Err(e) if e.is_precondition() => {
                    if retries >= MAX_RETRIES {
                        return Err(Error::precondition(format!(
                            "Costes randomization failed {} times: {e}",
                            retries + 1
                        )));
                    }
                    retries += 1;
                    rounds += 1;
                    warn!(round, retries, error = %e, "Costes round undefined, retrying");
                }
                Err(e) => return Err(e),
            }
            round += 1;
        }

        let not_less = self
            .shuffled_r
            .iter()
            .filter(|&&r| r > observed || (observed - r).abs() < 1e-5)
            .count();
        let shuffled_mean = mean(&self.shuffled_r);
        let shuffled_sd = std_dev(&self.shuffled_r);
        if !(shuffled_sd.is_finite() && shuffled_sd > 0.0) {
            return Err(Error::precondition(format!(
                "Costes randomizations have no spread (sd = {shuffled_sd})"
            )));
        }
        self.observed = observed;
        self.shuffled_mean = shuffled_mean;
        self.shuffled_sd = shuffled_sd;
        self.p_value = clamp(phi_with(observed, shuffled_mean, shuffled_sd), 0.0, 1.0);
        self.ratio_not_less = not_less as f64 / self.shuffled_r.len() as f64;
        self.done = true;
        debug!(
            observed,
            mean = self.shuffled_mean,
            sd = self.shuffled_sd,
            p = self.p_value,
            retries,
            "costes"
        );
        Ok(())
    }

    fn report(&self, results: &mut AnalysisResults) {
        if !self.done {
            return;
        }
        results.add_value("Costes P-Value", self.p_value, 2);
        results.add_value("Costes Shuffled Mean", self.shuffled_mean, 2);
        results.add_value("Costes Shuffled Std.D.", self.shuffled_sd, 2);
        results.add_value(
            "Fraction of rand. Pearsons >= actual Pearsons value",
            self.ratio_not_less,
            2,
        );
    }
}

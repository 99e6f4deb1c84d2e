//! Threshold search along the orthogonal regression line

use coloc_core::statistics::clamp;
use coloc_core::{Accumulator, AnalysisResults, Descriptor, Error, Result, ThresholdPair, Warning};
use tracing::{debug, info};

use super::ThresholdStrategy;
use super::stepper::{BisectionStepper, SimpleStepper, ThresholdStepper};
use crate::algorithm::Algorithm;
use crate::pearson::{PearsonImplementation, PearsonsCorrelation, ThresholdMode};

/// `ch2 = slope * ch1 + intercept`, fitted by orthogonal least squares
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegressionLine {
    pub slope: f64,
    pub intercept: f64,
}

impl RegressionLine {
    /// Fit the line in one pass over the pairs
    ///
    /// The covariance follows from the variance of the channel sum,
    /// `Var(X + Y) = Var(X) + Var(Y) + 2 Cov(X, Y)`.
    ///
    /// # Errors
    ///
    /// `Error::MissingPrecondition` for fewer than two pairs, or when the
    /// covariance vanishes and the line has no defined slope.
    pub fn fit<I>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (f64, f64)>,
    {
        let acc = Accumulator::new(pairs);
        if acc.count < 2 {
            return Err(Error::precondition(
                "threshold regression needs at least 2 pixels",
            ));
        }
        let n = acc.count as f64;
        let (mean1, mean2) = (acc.x / n, acc.y / n);
        let var1 = (acc.xx - acc.x * acc.x / n) / (n - 1.0);
        let var2 = (acc.yy - acc.y * acc.y / n) / (n - 1.0);
        let sum = acc.x + acc.y;
        let var_sum = (acc.xx + 2.0 * acc.xy + acc.yy - sum * sum / n) / (n - 1.0);
        let cov = 0.5 * (var_sum - var1 - var2);

        if (2.0 * cov).abs() <= 1e-12 * (var1 + var2).max(1.0) {
            return Err(Error::precondition(
                "no achievable threshold: the channels do not covary",
            ));
        }
        let diff = var2 - var1;
        let slope = (diff + (diff * diff + 4.0 * cov * cov).sqrt()) / (2.0 * cov);
        if !slope.is_finite() {
            return Err(Error::precondition(
                "no achievable threshold: regression slope is undefined",
            ));
        }
        Ok(Self {
            slope,
            intercept: mean2 - slope * mean1,
        })
    }

    /// Whether channel 1 has the larger dynamic range along the line
    pub fn ch1_drives(&self) -> bool {
        self.slope > -1.0 && self.slope < 1.0
    }

    /// Map a working threshold on the driving channel to both channels
    pub fn thresholds(&self, t: f64) -> (f64, f64) {
        if self.ch1_drives() {
            (t, t * self.slope + self.intercept)
        } else {
            ((t - self.intercept) / self.slope, t)
        }
    }
}

/// Automatic threshold stage
///
/// Searches the point on the regression line below which Pearson's r of
/// the remaining pixels drops to zero. The found pair becomes the
/// [`ThresholdPair`] of the descriptor.
#[derive(Debug, Clone)]
pub struct AutoThresholdRegression {
    strategy: ThresholdStrategy,
    pearson: PearsonsCorrelation,
    line: Option<RegressionLine>,
    threshold: Option<ThresholdPair>,
    y_mean_ratio: f64,
    iterations: usize,
    warnings: Vec<Warning>,
}

impl Default for AutoThresholdRegression {
    fn default() -> Self {
        Self::new(ThresholdStrategy::default(), PearsonImplementation::default())
    }
}

impl AutoThresholdRegression {
    pub fn new(strategy: ThresholdStrategy, implementation: PearsonImplementation) -> Self {
        Self {
            strategy,
            pearson: PearsonsCorrelation::new(implementation),
            line: None,
            threshold: None,
            y_mean_ratio: f64::NAN,
            iterations: 0,
            warnings: Vec::new(),
        }
    }

    pub fn strategy(&self) -> ThresholdStrategy {
        self.strategy
    }

    /// Fitted line of the last run
    pub fn line(&self) -> Option<RegressionLine> {
        self.line
    }

    /// Thresholds found in the last run
    pub fn threshold(&self) -> Option<ThresholdPair> {
        self.threshold
    }

    /// Number of Pearson evaluations of the last search
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    fn stepper(&self, min: f64, max: f64) -> Box<dyn ThresholdStepper> {
        match self.strategy {
            ThresholdStrategy::Bisection => Box::new(BisectionStepper::new((max + min).abs() * 0.5, max)),
            ThresholdStrategy::Costes => Box::new(SimpleStepper::new(max)),
        }
    }
}

impl Algorithm for AutoThresholdRegression {
    fn name(&self) -> &str {
        "Threshold regression"
    }

    fn execute(&mut self, descriptor: &Descriptor) -> Result<()> {
        self.line = None;
        self.threshold = None;
        self.iterations = 0;
        self.warnings.clear();

        let line = RegressionLine::fit(descriptor.pairs())?;
        let (s1, s2) = (descriptor.stats1(), descriptor.stats2());
        let sample_type = descriptor.sample_type();
        let (lo, hi) = (sample_type.min_value(), sample_type.max_value());
        let map = |t: f64| {
            let (a, b) = line.thresholds(t);
            (clamp(a.round(), lo, hi), clamp(b.round(), lo, hi))
        };

        let mut stepper = if line.ch1_drives() {
            self.stepper(s1.min, s1.max)
        } else {
            self.stepper(s2.min, s2.max)
        };
        let (mut t1, mut t2) = map(stepper.value());
        while !stepper.is_finished() {
            (t1, t2) = map(stepper.value());
            let r = match self
                .pearson
                .calculate_with(descriptor, ThresholdMode::Below, t1, t2)
            {
                Ok(r) => r,
                Err(e) if e.is_precondition() => f64::NAN,
                Err(e) => return Err(e),
            };
            debug!(iteration = self.iterations, t1, t2, r, "threshold search");
            stepper.update(r);
            self.iterations += 1;
        }

        self.y_mean_ratio = line.intercept / s2.mean;
        if self.y_mean_ratio.abs() > 0.01 {
            self.warnings.push(Warning::new(
                "y-intercept far from zero",
                "The ratio of the y-intercept of the auto threshold regression line to the mean \
                 value of Channel 2 is high. This means the y-intercept is far from zero, implying \
                 a significant positive or negative zero offset in the image data intensities. \
                 Maybe you should use a ROI. Maybe do a background subtraction in both channels. \
                 Make sure you didn't clip off the low intensities to zero. This might not affect \
                 Pearson's correlation values very much, but might harm other results.",
            ));
        }
        let too_high = "Too few pixels are taken into account for above-threshold calculations. \
                        The threshold is above the channel's mean.";
        if t1 > s1.mean {
            self.warnings
                .push(Warning::new("Threshold of ch. 1 too high", too_high));
        }
        if t2 > s2.mean {
            self.warnings
                .push(Warning::new("Threshold of ch. 2 too high", too_high));
        }
        if t1 < s1.min || t2 < s2.min {
            self.warnings.push(Warning::new(
                "thresholds too low",
                "The auto threshold method could not find a positive threshold, so thresholded \
                 results are meaningless.",
            ));
        }

        info!(
            slope = line.slope,
            intercept = line.intercept,
            t1,
            t2,
            iterations = self.iterations,
            strategy = self.strategy.name(),
            "auto threshold"
        );
        self.line = Some(line);
        self.threshold = Some(ThresholdPair::new(t1, t2, sample_type));
        Ok(())
    }

    fn report(&self, results: &mut AnalysisResults) {
        let (Some(line), Some(t)) = (self.line, self.threshold) else {
            return;
        };
        for w in &self.warnings {
            results.add_warning(w.clone());
        }
        results.add_value("m (slope)", line.slope, 2);
        results.add_value("b (y-intercept)", line.intercept, 2);
        results.add_value("b to y-mean ratio", self.y_mean_ratio, 2);
        results.add_value("Ch1 Max Threshold", t.ch1_max, 2);
        results.add_value("Ch2 Max Threshold", t.ch2_max, 2);
        results.add_text("Threshold regression", self.strategy.name());
    }

    fn threshold_pair(&self) -> Option<ThresholdPair> {
        self.threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coloc_core::{Channel, Mask, SampleType};
    use coloc_test::fixtures::correlated_pair;

    fn descriptor(a: Channel, b: Channel) -> Descriptor {
        let mask = Mask::full(a.dims()).unwrap();
        Descriptor::new(a, b, mask).unwrap()
    }

    #[test]
    fn test_fit_exact_line() {
        let pairs: Vec<(f64, f64)> = (0..50).map(|i| (i as f64, 2.0 * i as f64 + 3.0)).collect();
        let line = RegressionLine::fit(pairs).unwrap();
        assert!((line.slope - 2.0).abs() < 1e-9);
        assert!((line.intercept - 3.0).abs() < 1e-9);
        assert!(!line.ch1_drives());
    }

    #[test]
    fn test_driving_channel_mapping() {
        let line = RegressionLine {
            slope: 0.5,
            intercept: 2.0,
        };
        assert!(line.ch1_drives());
        assert_eq!(line.thresholds(10.0), (10.0, 7.0));

        let line = RegressionLine {
            slope: 2.0,
            intercept: 2.0,
        };
        assert_eq!(line.thresholds(10.0), (4.0, 10.0));
    }

    #[test]
    fn test_no_covariance() {
        let pairs: Vec<(f64, f64)> = (0..20).map(|i| (i as f64, 7.0)).collect();
        assert!(RegressionLine::fit(pairs).unwrap_err().is_precondition());
    }

    #[test]
    fn test_finds_threshold_on_correlated_pair() {
        let (a, b) = correlated_pair(&[48, 48], 3.0, 20.0, 7).unwrap();
        let d = descriptor(a, b);
        for strategy in [ThresholdStrategy::Bisection, ThresholdStrategy::Costes] {
            let mut stage = AutoThresholdRegression::new(strategy, PearsonImplementation::Fast);
            stage.execute(&d).unwrap();
            let t = stage.threshold_pair().unwrap();
            assert!((0.0..=255.0).contains(&t.ch1_max), "{strategy:?}: {t:?}");
            assert!((0.0..=255.0).contains(&t.ch2_max), "{strategy:?}: {t:?}");
            assert_eq!(t.ch1_min, SampleType::U8.min_value());
            assert!(stage.line().unwrap().slope > 0.0);
            assert!(stage.iterations() > 0);

            let mut results = AnalysisResults::new();
            stage.report(&mut results);
            assert_eq!(results.number("Ch1 Max Threshold"), Some(t.ch1_max));
            assert!(results.get("Threshold regression").is_some());
        }
    }

    #[test]
    fn test_offset_warns_about_intercept() {
        let a: Vec<u8> = (0..100).map(|i| (i * 2) as u8).collect();
        let b: Vec<u8> = (0..100).map(|i| (i * 2 + 40) as u8).collect();
        let d = descriptor(
            Channel::from_u8(&[10, 10], &a).unwrap(),
            Channel::from_u8(&[10, 10], &b).unwrap(),
        );
        let mut stage = AutoThresholdRegression::default();
        stage.execute(&d).unwrap();
        let mut results = AnalysisResults::new();
        stage.report(&mut results);
        assert!(results.has_warning("y-intercept far from zero"));
        assert!((results.number("b (y-intercept)").unwrap() - 40.0).abs() < 1e-6);
    }
}

//! Analysis orchestration
//!
//! [`Analysis`] runs the selected stages in a fixed order over one
//! [`Descriptor`]. The threshold found by the regression stage is stored
//! in the descriptor for the stages after it. A stage failing on a
//! precondition becomes a warning and the remaining stages still run.
//!
//! # Examples
//!
//! ```
//! use coloc_core::{Channel, Descriptor, Mask};
//! use coloc_stats::{AnalysisOptions, analyze};
//!
//! let data: Vec<u8> = (0..64).map(|i| (i * 3 % 50) as u8).collect();
//! let ch1 = Channel::from_u8(&[8, 8], &data).unwrap();
//! let ch2 = ch1.clone();
//! let mut d = Descriptor::new(ch1, ch2, Mask::full(&[8, 8]).unwrap()).unwrap();
//!
//! let mut options = AnalysisOptions::default();
//! options.stages.costes = false;
//! let results = analyze(&mut d, options).unwrap();
//! let r = results.number("Pearson's R value (no threshold)").unwrap();
//! assert!((r - 1.0).abs() < 1e-9);
//! ```

use coloc_core::{AnalysisResults, Descriptor, Result, Warning};
use tracing::{debug, info, warn};

use crate::algorithm::Algorithm;
use crate::costes::{CostesOptions, CostesSignificanceTest};
use crate::histogram2d::{Histogram2D, LiHistogram2D};
use crate::input_check::InputCheck;
use crate::kendall::{KendallTauRankCorrelation, MaxKendallTau, MaxTauOptions};
use crate::li_icq::LiIcq;
use crate::manders::MandersColocalization;
use crate::pearson::{PearsonImplementation, PearsonsCorrelation};
use crate::spearman::SpearmanRankCorrelation;
use crate::threshold::{AutoThresholdRegression, ThresholdStrategy};

// ============================================================================
// Option structures
// ============================================================================

/// Which stages run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageSelection {
    pub input_check: bool,
    pub auto_threshold: bool,
    pub pearson: bool,
    pub li_histograms: bool,
    pub li_icq: bool,
    pub spearman: bool,
    pub manders: bool,
    pub kendall_tau: bool,
    pub max_kendall_tau: bool,
    pub histogram_2d: bool,
    pub costes: bool,
}

impl Default for StageSelection {
    fn default() -> Self {
        Self {
            input_check: true,
            auto_threshold: true,
            pearson: true,
            li_histograms: true,
            li_icq: true,
            spearman: true,
            manders: true,
            kendall_tau: true,
            max_kendall_tau: true,
            histogram_2d: true,
            costes: true,
        }
    }
}

/// Which Li histograms are drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LiHistogramOptions {
    /// Product of mean differences against channel 1
    pub channel1: bool,
    /// Product of mean differences against channel 2
    pub channel2: bool,
}

impl Default for LiHistogramOptions {
    fn default() -> Self {
        Self {
            channel1: true,
            channel2: true,
        }
    }
}

/// Options of a full analysis run
#[derive(Debug, Clone, Default)]
pub struct AnalysisOptions {
    pub stages: StageSelection,
    pub pearson_implementation: PearsonImplementation,
    pub threshold_strategy: ThresholdStrategy,
    pub costes: CostesOptions,
    pub max_tau: MaxTauOptions,
    pub li_histograms: LiHistogramOptions,
    /// Plot channel 2 on the x axis of the 2D histogram
    pub swap_histogram_channels: bool,
}

impl AnalysisOptions {
    /// Seed every randomized stage
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.costes.seed = seed;
        self.max_tau.seed = seed;
        self
    }
}

// ============================================================================
// Orchestrator
// ============================================================================

/// Progress callback: stage index, stage count, stage name
pub type ProgressFn = Box<dyn FnMut(usize, usize, &str) + Send>;

/// A configured sequence of analysis stages
pub struct Analysis {
    options: AnalysisOptions,
    progress: Option<ProgressFn>,
}

impl Default for Analysis {
    fn default() -> Self {
        Self::new(AnalysisOptions::default())
    }
}

impl Analysis {
    pub fn new(options: AnalysisOptions) -> Self {
        Self {
            options,
            progress: None,
        }
    }

    /// Report each stage before it runs
    pub fn with_progress(
        mut self,
        progress: impl FnMut(usize, usize, &str) + Send + 'static,
    ) -> Self {
        self.progress = Some(Box::new(progress));
        self
    }

    pub fn options(&self) -> &AnalysisOptions {
        &self.options
    }

    /// The selected stages in execution order
    pub fn stages(&self) -> Vec<Box<dyn Algorithm>> {
        let o = &self.options;
        let s = &o.stages;
        let mut stages: Vec<Box<dyn Algorithm>> = Vec::new();
        if s.input_check {
            stages.push(Box::new(InputCheck::new()));
        }
        if s.auto_threshold {
            stages.push(Box::new(AutoThresholdRegression::new(
                o.threshold_strategy,
                o.pearson_implementation,
            )));
        }
        if s.pearson {
            stages.push(Box::new(PearsonsCorrelation::new(o.pearson_implementation)));
        }
        if s.li_histograms {
            if o.li_histograms.channel1 {
                stages.push(Box::new(LiHistogram2D::new("Histogram of Li - Ch1", true)));
            }
            if o.li_histograms.channel2 {
                stages.push(Box::new(LiHistogram2D::new("Histogram of Li - Ch2", false)));
            }
        }
        if s.li_icq {
            stages.push(Box::new(LiIcq::new()));
        }
        if s.spearman {
            stages.push(Box::new(SpearmanRankCorrelation::new()));
        }
        if s.manders {
            stages.push(Box::new(MandersColocalization::new()));
        }
        if s.kendall_tau {
            stages.push(Box::new(KendallTauRankCorrelation::new()));
        }
        if s.max_kendall_tau {
            stages.push(Box::new(MaxKendallTau::new(o.max_tau)));
        }
        if s.histogram_2d {
            stages.push(Box::new(
                Histogram2D::default().with_swapped_channels(o.swap_histogram_channels),
            ));
        }
        if s.costes {
            stages.push(Box::new(CostesSignificanceTest::new(
                o.costes,
                o.pearson_implementation,
            )));
        }
        stages
    }

    /// Run all selected stages
    ///
    /// # Errors
    ///
    /// Errors other than `Error::MissingPrecondition` abort the run, for
    /// example `Error::InvalidParameter` from the options or
    /// `Error::ThresholdAlreadySet` when the descriptor already carries a
    /// threshold and the regression stage runs again.
    pub fn run(&mut self, descriptor: &mut Descriptor) -> Result<AnalysisResults> {
        let mut stages = self.stages();
        let total = stages.len();
        let mut results = AnalysisResults::new();

        for (index, stage) in stages.iter_mut().enumerate() {
            let name = stage.name().to_string();
            if let Some(progress) = self.progress.as_mut() {
                progress(index, total, &name);
            }
            info!(stage = %name, index, total, "running stage");

            match stage.execute(descriptor) {
                Ok(()) => {
                    if let Some(threshold) = stage.threshold_pair() {
                        descriptor.set_threshold(threshold)?;
                    }
                    stage.report(&mut results);
                    debug!(stage = %name, "stage finished");
                }
                Err(e) if e.is_precondition() => {
                    warn!(stage = %name, error = %e, "stage skipped");
                    results.add_warning(Warning::new(
                        "Problem with input data",
                        format!("{name}: {e}"),
                    ));
                }
                Err(e) => return Err(e),
            }
        }
        info!(
            values = results.values().len(),
            warnings = results.warnings().len(),
            "analysis finished"
        );
        Ok(results)
    }
}

/// Run an analysis with the given options
pub fn analyze(descriptor: &mut Descriptor, options: AnalysisOptions) -> Result<AnalysisResults> {
    Analysis::new(options).run(descriptor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use coloc_core::{Channel, Mask};
    use std::sync::{Arc, Mutex};

    fn descriptor(a: &[u8], b: &[u8]) -> Descriptor {
        let dims = [4, 4];
        Descriptor::new(
            Channel::from_u8(&dims, a).unwrap(),
            Channel::from_u8(&dims, b).unwrap(),
            Mask::full(&dims).unwrap(),
        )
        .unwrap()
    }

    const IMAGE: [u8; 16] = [3, 9, 14, 2, 7, 21, 30, 5, 11, 18, 25, 8, 1, 13, 27, 16];

    #[test]
    fn test_stage_order() {
        let analysis = Analysis::default();
        let names: Vec<String> = analysis
            .stages()
            .iter()
            .map(|s| s.name().to_string())
            .collect();
        assert_eq!(names.len(), 12);
        assert_eq!(names[0], "Input check");
        assert_eq!(names[1], "Threshold regression");
        assert_eq!(names[3], "Histogram of Li - Ch1");
        assert_eq!(names[11], "Costes significance test");
    }

    #[test]
    fn test_threshold_reaches_later_stages() {
        let mut d = descriptor(&IMAGE, &IMAGE);
        let mut options = AnalysisOptions::default().with_seed(9);
        options.stages.costes = false;
        let results = analyze(&mut d, options).unwrap();
        assert!(d.threshold().is_some());
        assert!(results.number("Ch1 Max Threshold").is_some());
        assert!(results.number("Manders' tM1 (Above autothreshold of Ch2)").is_some());
        let r = results.number("Pearson's R value (no threshold)").unwrap();
        assert!((r - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_failing_stage_becomes_warning() {
        let mut d = descriptor(&IMAGE, &[6; 16]);
        let mut options = AnalysisOptions::default();
        options.stages.max_kendall_tau = false;
        let results = analyze(&mut d, options).unwrap();

        assert!(results.has_warning("Problem with input data"));
        assert!(results.number("Pearson's R value (no threshold)").is_none());
        assert!(
            results
                .warnings()
                .iter()
                .any(|w| w.long_message.starts_with("Pearson correlation:"))
        );
        assert_eq!(results.number("Manders' M1 (Above zero intensity of Ch2)"), Some(1.0));
        assert!(results.number("Li's ICQ value").is_some());
        assert_eq!(results.histograms().len(), 3);
        assert!(d.threshold().is_none());
    }

    #[test]
    fn test_progress_callback() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let mut options = AnalysisOptions::default();
        options.stages = StageSelection {
            input_check: true,
            auto_threshold: false,
            pearson: true,
            li_histograms: false,
            li_icq: false,
            spearman: false,
            manders: true,
            kendall_tau: false,
            max_kendall_tau: false,
            histogram_2d: false,
            costes: false,
        };
        let mut analysis = Analysis::new(options)
            .with_progress(move |i, n, name| sink.lock().unwrap().push((i, n, name.to_string())));
        let mut d = descriptor(&IMAGE, &IMAGE);
        // The configured analysis runs on a worker thread.
        std::thread::spawn(move || analysis.run(&mut d).map(|_| ()))
            .join()
            .unwrap()
            .unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 3);
        assert_eq!(seen[0], (0, 3, "Input check".to_string()));
        assert_eq!(seen[2].2, "Manders correlation");
    }

    #[test]
    fn test_threshold_already_set_aborts() {
        let mut d = descriptor(&IMAGE, &IMAGE);
        let mut options = AnalysisOptions::default();
        options.stages.costes = false;
        options.stages.max_kendall_tau = false;
        analyze(&mut d, options.clone()).unwrap();
        assert!(analyze(&mut d, options).is_err());
    }
}

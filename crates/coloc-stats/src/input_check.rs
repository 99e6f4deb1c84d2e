//! Sanity checks of the input data
//!
//! Counts zero-zero and saturated pixels and flags images that are likely
//! to give misleading colocalization values. Also reports the baseline
//! channel statistics of the descriptor.

use coloc_core::{AnalysisResults, Descriptor, Result, Warning};
use tracing::debug;

use crate::algorithm::Algorithm;

const TOLERANCE: f64 = 0.00001;

/// Input check stage
#[derive(Debug, Clone)]
pub struct InputCheck {
    max_zero_zero_ratio: f64,
    max_saturated_ratio: f64,
    zero_zero_ratio: f64,
    saturated_ratio1: f64,
    saturated_ratio2: f64,
    warnings: Vec<Warning>,
    report: Option<Vec<(String, f64, u8)>>,
    job_name: String,
    mask_label: &'static str,
}

impl Default for InputCheck {
    fn default() -> Self {
        Self::new()
    }
}

impl InputCheck {
    pub fn new() -> Self {
        Self {
            max_zero_zero_ratio: 0.1,
            max_saturated_ratio: 0.1,
            zero_zero_ratio: 0.0,
            saturated_ratio1: 0.0,
            saturated_ratio2: 0.0,
            warnings: Vec::new(),
            report: None,
            job_name: String::new(),
            mask_label: "",
        }
    }

    /// Ratios above which a warning is emitted (fractions, not percent)
    pub fn with_limits(mut self, max_zero_zero_ratio: f64, max_saturated_ratio: f64) -> Self {
        self.max_zero_zero_ratio = max_zero_zero_ratio;
        self.max_saturated_ratio = max_saturated_ratio;
        self
    }

    /// Fraction of pixels that are zero in both channels
    pub fn zero_zero_ratio(&self) -> f64 {
        self.zero_zero_ratio
    }

    /// Saturated pixels of each channel per half of all pixels
    pub fn saturated_ratios(&self) -> (f64, f64) {
        (self.saturated_ratio1, self.saturated_ratio2)
    }
}

impl Algorithm for InputCheck {
    fn name(&self) -> &str {
        "Input check"
    }

    fn execute(&mut self, descriptor: &Descriptor) -> Result<()> {
        self.warnings.clear();
        let (s1, s2) = (*descriptor.stats1(), *descriptor.stats2());

        let (mut n, mut zero, mut sat1, mut sat2) = (0usize, 0usize, 0usize, 0usize);
        for (a, b) in descriptor.pairs() {
            if (a + b).abs() < TOLERANCE {
                zero += 1;
            }
            if (s1.max - a).abs() < TOLERANCE {
                sat1 += 1;
            }
            if (s2.max - b).abs() < TOLERANCE {
                sat2 += 1;
            }
            n += 1;
        }
        let n = n as f64;
        self.zero_zero_ratio = zero as f64 / n;
        self.saturated_ratio1 = sat1 as f64 / (n * 0.5);
        self.saturated_ratio2 = sat2 as f64 / (n * 0.5);

        if s1.min < 0.0 || s2.min < 0.0 {
            self.warnings.push(Warning::new(
                "Negative minimum pixel value found.",
                "The minimum pixel value in at least one of the channels is negative. Negative \
                 values might break the logic of some analysis methods by breaking a basic \
                 assumption: The pixel value is assumed to be proportional to the number of \
                 photons detected in a pixel. Negative photon counts make no physical sense. Set \
                 negative pixel values to zero, or shift pixel intensities higher so there are no \
                 negative pixel values.",
            ));
        }
        if self.zero_zero_ratio.abs() > self.max_zero_zero_ratio {
            self.warnings.push(Warning::new(
                "Zero-zero ratio too high",
                format!(
                    "The ratio between zero-zero pixels and other pixels is large: {:.2}. Maybe \
                     you should use a ROI.",
                    self.zero_zero_ratio
                ),
            ));
        }
        for (ratio, short, which) in [
            (self.saturated_ratio1, "Saturated ch1 ratio too high", "one"),
            (self.saturated_ratio2, "Saturated ch2 ratio too high", "two"),
        ] {
            if ratio.abs() > self.max_saturated_ratio {
                self.warnings.push(Warning::new(
                    short,
                    format!(
                        "The ratio between saturated pixels and other pixels in channel {which} \
                         is large: {ratio:.2}. Maybe you should use a ROI."
                    ),
                ));
            }
        }

        self.job_name = descriptor.job_name();
        self.mask_label = descriptor.mask_type().label();
        self.report = Some(vec![
            ("% zero-zero pixels".to_string(), self.zero_zero_ratio * 100.0, 2),
            ("% saturated ch1 pixels".to_string(), self.saturated_ratio1 * 100.0, 2),
            ("% saturated ch2 pixels".to_string(), self.saturated_ratio2 * 100.0, 2),
            ("Channel 1 Max".to_string(), s1.max, 3),
            ("Channel 2 Max".to_string(), s2.max, 3),
            ("Channel 1 Min".to_string(), s1.min, 3),
            ("Channel 2 Min".to_string(), s2.min, 3),
            ("Channel 1 Mean".to_string(), s1.mean, 3),
            ("Channel 2 Mean".to_string(), s2.mean, 3),
            ("Channel 1 Integrated (Sum) Intensity".to_string(), s1.integral, 3),
            ("Channel 2 Integrated (Sum) Intensity".to_string(), s2.integral, 3),
            ("Number of masked pixels".to_string(), n, 0),
        ]);
        debug!(
            zero_zero = self.zero_zero_ratio,
            sat1 = self.saturated_ratio1,
            sat2 = self.saturated_ratio2,
            warnings = self.warnings.len(),
            "input check"
        );
        Ok(())
    }

    fn report(&self, results: &mut AnalysisResults) {
        let Some(values) = &self.report else {
            return;
        };
        for w in &self.warnings {
            results.add_warning(w.clone());
        }
        results.add_text("Coloc_Job_Name", self.job_name.as_str());
        for (name, value, decimals) in values {
            results.add_value(name.as_str(), *value, *decimals);
        }
        results.add_text("Mask Type Used", self.mask_label);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coloc_core::{Channel, Mask, SampleType};

    fn run(a: Vec<f64>, b: Vec<f64>) -> (InputCheck, AnalysisResults) {
        let dims = [a.len()];
        let d = Descriptor::new(
            Channel::new(&dims, a, SampleType::I16).unwrap(),
            Channel::new(&dims, b, SampleType::I16).unwrap(),
            Mask::full(&dims).unwrap(),
        )
        .unwrap();
        let mut check = InputCheck::new();
        check.execute(&d).unwrap();
        let mut results = AnalysisResults::new();
        check.report(&mut results);
        (check, results)
    }

    #[test]
    fn test_clean_input() {
        let a: Vec<f64> = (1..=20).map(f64::from).collect();
        let b: Vec<f64> = (1..=20).map(|v| f64::from(v) * 2.0).collect();
        let (check, results) = run(a, b);
        assert!(results.warnings().is_empty());
        assert_eq!(check.zero_zero_ratio(), 0.0);
        // One saturated pixel per channel out of 10 (half of 20).
        assert_eq!(check.saturated_ratios(), (0.1, 0.1));
        assert_eq!(results.number("Channel 2 Max"), Some(40.0));
        assert_eq!(
            results.get("Mask Type Used").map(|v| v.formatted()),
            Some("none".to_string())
        );
        assert!(results.get("Coloc_Job_Name").is_some());
        assert_eq!(results.number("Number of masked pixels"), Some(20.0));
    }

    #[test]
    fn test_zero_zero_and_saturation_warnings() {
        let a = vec![0.0, 0.0, 0.0, 5.0, 5.0, 1.0];
        let b = vec![0.0, 0.0, 2.0, 3.0, 1.0, 1.0];
        let (check, results) = run(a, b);
        assert!((check.zero_zero_ratio() - 2.0 / 6.0).abs() < 1e-12);
        assert!(results.has_warning("Zero-zero ratio too high"));
        assert!(results.has_warning("Saturated ch1 ratio too high"));
        assert!(results.has_warning("Saturated ch2 ratio too high"));
        assert!(!results.has_warning("Negative minimum pixel value found."));
    }

    #[test]
    fn test_saturated_channel_two_only() {
        let a: Vec<f64> = (0..40).map(|v| f64::from(v) + 1.0).collect();
        let mut b = vec![9.0; 40];
        b[0] = 1.0;
        let (_, results) = run(a, b);
        assert!(!results.has_warning("Saturated ch1 ratio too high"));
        assert!(results.has_warning("Saturated ch2 ratio too high"));
    }

    #[test]
    fn test_negative_minimum() {
        let (_, results) = run(vec![-3.0, 1.0, 2.0, 4.0], vec![1.0, 2.0, 3.0, 4.0]);
        assert!(results.has_warning("Negative minimum pixel value found."));
    }
}

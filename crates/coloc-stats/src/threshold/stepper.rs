//! Threshold search strategies
//!
//! A [`ThresholdStepper`] proposes a threshold, receives Pearson's r of the
//! pixels below it as feedback, and decides where to look next and when to
//! stop. `NaN` feedback marks a rejected trial.

/// Iterative threshold search state machine
pub trait ThresholdStepper {
    /// Current threshold proposal
    fn value(&self) -> f64;

    /// Feed back the correlation measured at the current proposal
    fn update(&mut self, feedback: f64);

    /// Whether the search has converged or given up
    fn is_finished(&self) -> bool;
}

/// Halves the step towards the threshold where r crosses zero
///
/// A positive r means the background still correlates, so the threshold
/// moves down; a negative or undefined r moves it up.
#[derive(Debug, Clone)]
pub struct BisectionStepper {
    threshold: f64,
    last_threshold: f64,
    diff: f64,
    iterations: usize,
    max_iterations: usize,
}

impl BisectionStepper {
    pub const DEFAULT_MAX_ITERATIONS: usize = 100;

    /// Start at `threshold`; `last_threshold` sets the initial step
    pub fn new(threshold: f64, last_threshold: f64) -> Self {
        Self {
            threshold,
            last_threshold,
            diff: (threshold - last_threshold).abs(),
            iterations: 0,
            max_iterations: Self::DEFAULT_MAX_ITERATIONS,
        }
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn iterations(&self) -> usize {
        self.iterations
    }
}

impl ThresholdStepper for BisectionStepper {
    fn value(&self) -> f64 {
        self.threshold
    }

    fn update(&mut self, feedback: f64) {
        self.last_threshold = self.threshold;
        if feedback.is_nan() || feedback < 0.0 {
            self.threshold += self.diff * 0.5;
        } else if feedback > 0.0 {
            self.threshold -= self.diff * 0.5;
        }
        self.diff = (self.threshold - self.last_threshold).abs();
        self.iterations += 1;
    }

    fn is_finished(&self) -> bool {
        self.iterations > self.max_iterations || self.diff < 1.0
    }
}

/// Steps the threshold down by one until r stops improving
///
/// This is the published search of Costes et al.: it ends when r becomes
/// undefined, drops below 0.0001, increases again, or the threshold
/// falls below 1.
#[derive(Debug, Clone)]
pub struct SimpleStepper {
    threshold: f64,
    current: f64,
    last: f64,
}

impl SimpleStepper {
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            current: 1.0,
            last: f64::MAX,
        }
    }
}

impl ThresholdStepper for SimpleStepper {
    fn value(&self) -> f64 {
        self.threshold
    }

    fn update(&mut self, feedback: f64) {
        self.last = self.current;
        self.current = feedback;
        self.threshold -= 1.0;
    }

    fn is_finished(&self) -> bool {
        self.current.is_nan()
            || self.threshold < 1.0
            || self.current < 0.0001
            || self.current > self.last
    }
}

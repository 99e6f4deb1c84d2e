//! The analysis stage abstraction
//!
//! Every statistic is an [`Algorithm`]: it reads a [`Descriptor`],
//! computes its values, and later reports them together with any warnings
//! into an [`AnalysisResults`].

use coloc_core::{AnalysisResults, Descriptor, Result, ThresholdPair};

/// One named analysis stage
pub trait Algorithm {
    /// Human-readable stage name
    fn name(&self) -> &str;

    /// Run the computation
    ///
    /// # Errors
    ///
    /// `Error::MissingPrecondition` when the input does not allow the
    /// statistic; the orchestrator reports it as a warning and continues.
    fn execute(&mut self, descriptor: &Descriptor) -> Result<()>;

    /// Append values and warnings of the last successful run
    fn report(&self, results: &mut AnalysisResults);

    /// Threshold pair produced by this stage, if it produces one
    fn threshold_pair(&self) -> Option<ThresholdPair> {
        None
    }
}

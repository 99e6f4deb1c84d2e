//! Error types for the test framework

use thiserror::Error;

/// Errors that can occur while building fixtures or running regressions
#[derive(Debug, Error)]
pub enum TestError {
    /// Fixture could not be built
    #[error("failed to build fixture '{name}': {message}")]
    Fixture { name: String, message: String },

    /// Value comparison failed
    #[error(
        "value comparison failed at index {index}: expected {expected}, got {actual}, delta {delta}"
    )]
    ValueMismatch {
        index: usize,
        expected: f64,
        actual: f64,
        delta: f64,
    },

    /// Core library error
    #[error("core error: {0}")]
    Core(#[from] coloc_core::Error),

    /// Filter error
    #[error("filter error: {0}")]
    Filter(#[from] coloc_filter::FilterError),
}

/// Result type for test operations
pub type TestResult<T> = Result<T, TestError>;

//! Error types for coloc-filter

use thiserror::Error;

/// Errors that can occur during filtering and shuffling
#[derive(Debug, Error)]
pub enum FilterError {
    /// Core library error
    #[error("core error: {0}")]
    Core(#[from] coloc_core::Error),

    /// Invalid kernel
    #[error("invalid kernel: {0}")]
    InvalidKernel(String),

    /// Invalid parameters
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),
}

impl From<FilterError> for coloc_core::Error {
    fn from(err: FilterError) -> Self {
        match err {
            FilterError::Core(e) => e,
            FilterError::InvalidKernel(msg) | FilterError::InvalidParameters(msg) => {
                coloc_core::Error::InvalidParameter(msg)
            }
        }
    }
}

/// Result type for filter operations
pub type FilterResult<T> = Result<T, FilterError>;

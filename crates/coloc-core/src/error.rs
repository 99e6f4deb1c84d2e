//! Error types for coloc-core
//!
//! Provides a unified error type for the data model and for every
//! statistic built on top of it. Each variant captures enough context for
//! diagnostics without exposing internal implementation details.
//!
//! `MissingPrecondition` is the recoverable failure of an analysis stage:
//! the orchestrator turns it into a warning and carries on.

use thiserror::Error;

use crate::channel::SampleType;

/// Colocalization error type
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid image dimensions (empty shape or a zero-length axis)
    #[error("invalid dimensions: {0:?}")]
    InvalidDimension(Vec<usize>),

    /// Two shapes that must agree do not
    #[error("dimension mismatch: expected {expected:?}, got {actual:?}")]
    DimensionMismatch {
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    /// Buffer length does not match the product of the dimensions
    #[error("data length mismatch: expected {expected}, got {actual}")]
    DataLength { expected: usize, actual: usize },

    /// Channels of different sample types
    #[error("sample type mismatch: {0:?} vs {1:?}")]
    SampleTypeMismatch(SampleType, SampleType),

    /// Invalid parameter value
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Mask selects no pixel
    #[error("mask contains no pixels")]
    EmptyMask,

    /// Input data does not satisfy what a statistic needs
    #[error("{0}")]
    MissingPrecondition(String),

    /// The threshold pair of a descriptor can only be set once
    #[error("threshold pair already set")]
    ThresholdAlreadySet,
}

impl Error {
    /// Shorthand for a [`Error::MissingPrecondition`]
    pub fn precondition(message: impl Into<String>) -> Self {
        Self::MissingPrecondition(message.into())
    }

    /// Whether this error is a recoverable precondition failure
    pub fn is_precondition(&self) -> bool {
        matches!(self, Self::MissingPrecondition(_))
    }
}

/// Result type alias for colocalization operations
pub type Result<T> = std::result::Result<T, Error>;

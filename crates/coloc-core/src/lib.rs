//! coloc-core - Basic data structures for colocalization analysis
//!
//! This crate provides the data model shared by every colocalization
//! statistic:
//!
//! - [`Channel`] / [`SampleType`] - one n-dimensional image channel
//! - [`Mask`] / [`BoundingBox`] - the analysed region
//! - [`MaskedPairs`] - replayable iteration over masked sample pairs
//! - [`Accumulator`] - one-pass sums and cross products
//! - [`Descriptor`] / [`ThresholdPair`] - channels, mask and baseline stats
//! - [`AnalysisResults`] - named values, warnings and histograms
//! - [`statistics`] - normal distribution and descriptive helpers

pub mod accumulator;
pub mod channel;
pub mod descriptor;
pub mod error;
pub mod mask;
pub mod pairs;
pub mod results;
pub mod statistics;

pub use accumulator::Accumulator;
pub use channel::{Channel, SampleType, linear_index};
pub use descriptor::{ChannelStats, Descriptor, ThresholdPair};
pub use error::{Error, Result};
pub use mask::{BoundingBox, Mask, MaskType};
pub use pairs::MaskedPairs;
pub use results::{AnalysisResults, Axis, HistogramResult, Value, ValueResult, Warning};

//! coloc-test - Regression test framework for colocalization analysis
//!
//! This crate provides a small regression test harness and deterministic
//! synthetic channels. Two modes are supported:
//!
//! - **Compare**: Compare results with expected values (default)
//! - **Display**: Additionally print every compared value
//!
//! # Usage
//!
//! ```ignore
//! use coloc_test::{RegParams, fixtures};
//!
//! let mut rp = RegParams::new("pearson");
//! rp.compare_values(1.0, r, 1e-6);
//! assert!(rp.cleanup());
//! ```
//!
//! # Environment Variables
//!
//! - `REGTEST_MODE`: Set to "compare" or "display"

mod error;
pub mod fixtures;
mod params;

pub use error::{TestError, TestResult};
pub use params::{RegParams, RegTestMode};

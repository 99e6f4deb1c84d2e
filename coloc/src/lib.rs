//! Coloc - Colocalization analysis for Rust
//!
//! Measures how strongly the intensities of two image channels co-vary
//! inside a region of interest.
//!
//! # Overview
//!
//! - Channels, masks and masked pair iteration (re-exported from `coloc-core`)
//! - Gaussian smoothing and block shuffling ([`filter`])
//! - Thresholds, correlation coefficients and significance tests ([`stats`])
//!
//! # Example
//!
//! ```
//! use coloc::{Channel, Descriptor, Mask};
//! use coloc::stats::{AnalysisOptions, analyze};
//!
//! let data: Vec<u8> = (0..64).map(|i| (i * 3 % 97) as u8).collect();
//! let ch1 = Channel::from_u8(&[8, 8], &data).unwrap();
//! let ch2 = Channel::from_u8(&[8, 8], &data).unwrap();
//! let mut descriptor = Descriptor::new(ch1, ch2, Mask::full(&[8, 8]).unwrap()).unwrap();
//!
//! let results = analyze(&mut descriptor, AnalysisOptions::default().with_seed(1)).unwrap();
//! let r = results.number("Pearson's R value (no threshold)").unwrap();
//! assert!((r - 1.0).abs() < 1e-6);
//! ```

// Re-export core types (primary data structures used everywhere)
pub use coloc_core::*;

// Re-export domain crates as modules to avoid name conflicts
pub use coloc_filter as filter;
pub use coloc_stats as stats;

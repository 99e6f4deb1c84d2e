//! Kendall rank correlation
//!
//! - [`KendallTauRankCorrelation`] - tie-corrected tau-b of all masked pixels
//! - [`MaxKendallTau`] - maximum normalized tau above the Otsu ranks, with
//!   a block-shuffle p-value

mod max_tau;
mod otsu;
mod tau;

pub use max_tau::{MaxKendallTau, MaxTauIndex, MaxTauOptions, max_tau, random_ranks};
pub use otsu::otsu_rank_threshold;
pub use tau::{KendallTauRankCorrelation, kendall_tau_b, merge_sort_swaps, tau_from_ranks};

//! Maximum of the normalized Kendall tau over the brightest pixels
//!
//! Both channels are ranked (ties broken at random) and cut at their Otsu
//! rank. Above the cut, windows of the highest ranks grow geometrically
//! and the largest normalized tau over all window pairs is the
//! statistic. Its significance comes from block-shuffling channel 1.

use coloc_core::{AnalysisResults, Descriptor, Error, MaskedPairs, Result};
use coloc_filter::BlockShuffler;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use tracing::debug;

use super::otsu::otsu_rank_threshold;
use super::tau::tau_from_ranks;
use crate::algorithm::Algorithm;

/// Value of the statistic when no window holds a positive tau: the
/// smallest positive subnormal `f64`.
pub const TAU_FLOOR: f64 = f64::from_bits(1);

/// Parameters of the max-tau significance test
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaxTauOptions {
    /// Number of block-shuffled rounds
    pub randomizations: usize,
    pub seed: u64,
}

impl Default for MaxTauOptions {
    fn default() -> Self {
        Self {
            randomizations: 10,
            seed: 0,
        }
    }
}

/// The statistic together with the Otsu ranks it was computed above
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaxTauIndex {
    pub tau: f64,
    pub rank_threshold1: usize,
    pub rank_threshold2: usize,
}

/// 1-based ranks, ties in random order
pub fn random_ranks(values: &[f64], rng: &mut StdRng) -> Vec<f64> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.shuffle(rng);
    // Stable sort keeps the shuffled order within ties.
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));
    let mut ranks = vec![0.0; values.len()];
    for (rank, &i) in order.iter().enumerate() {
        ranks[i] = (rank + 1) as f64;
    }
    ranks
}

/// Compute the max-tau statistic of two sample vectors
///
/// # Errors
///
/// `Error::MissingPrecondition` for fewer than three samples.
pub fn max_tau(values1: &[f64], values2: &[f64], rng: &mut StdRng) -> Result<MaxTauIndex> {
    let n = values1.len().min(values2.len());
    if n < 3 {
        return Err(Error::precondition(format!(
            "max Kendall tau needs at least 3 pixels, got {n}"
        )));
    }
    let thr1 = otsu_rank_threshold(&values1[..n]);
    let thr2 = otsu_rank_threshold(&values2[..n]);
    let rank1 = random_ranks(&values1[..n], rng);
    let rank2 = random_ranks(&values2[..n], rng);

    let kept: Vec<(f64, f64)> = rank1
        .into_iter()
        .zip(rank2)
        .filter(|&(a, b)| a >= thr1 as f64 && b >= thr2 as f64)
        .collect();

    let nf = n as f64;
    let step = 1.0 + 1.0 / nf.ln().ln();
    let mut best = TAU_FLOOR;
    let mut off1 = 1.0;
    while off1 * step + (thr1 as f64) < nf {
        off1 *= step;
        let mut off2 = 1.0;
        while off2 * step + (thr2 as f64) < nf {
            off2 *= step;
            let (a, b): (Vec<f64>, Vec<f64>) = kept
                .iter()
                .filter(|&&(r1, r2)| r1 >= nf - off1 && r2 >= nf - off2)
                .copied()
                .unzip();
            let an = a.len() as f64;
            if a.len() > 1 {
                let sd = (2.0 * (2.0 * an + 5.0) / 9.0 / an / (an - 1.0)).sqrt();
                best = best.max(tau_from_ranks(&a, &b) / sd);
            }
        }
    }

    Ok(MaxTauIndex {
        tau: best,
        rank_threshold1: thr1,
        rank_threshold2: thr2,
    })
}

/// Max-tau stage with its block-shuffle p-value
#[derive(Debug, Clone, Default)]
pub struct MaxKendallTau {
    options: MaxTauOptions,
    observed: Option<MaxTauIndex>,
    distribution: Vec<f64>,
    p_value: f64,
}

impl MaxKendallTau {
    pub fn new(options: MaxTauOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    pub fn options(&self) -> &MaxTauOptions {
        &self.options
    }

    pub fn observed(&self) -> Option<MaxTauIndex> {
        self.observed
    }

    /// Statistics of the shuffled rounds
    pub fn distribution(&self) -> &[f64] {
        &self.distribution
    }

    /// Fraction of shuffled rounds exceeding the observed statistic
    pub fn p_value(&self) -> f64 {
        self.p_value
    }
}

impl Algorithm for MaxKendallTau {
    fn name(&self) -> &str {
        "Max Kendall Tau"
    }

    fn execute(&mut self, descriptor: &Descriptor) -> Result<()> {
        self.observed = None;
        self.distribution.clear();
        if self.options.randomizations == 0 {
            return Err(Error::InvalidParameter(
                "max tau needs at least one randomization".to_string(),
            ));
        }

        let mut rng = StdRng::seed_from_u64(self.options.seed.wrapping_add(1));
        let (xs, ys): (Vec<f64>, Vec<f64>) = descriptor.pairs().unzip();
        let observed = max_tau(&xs, &ys, &mut rng)?;

        let bbox = descriptor.bounding_box();
        let block: Vec<usize> = bbox
            .size()
            .iter()
            .map(|&s| ((s as f64).sqrt().floor() as usize).max(1))
            .collect();
        let mut shuffler = BlockShuffler::new(descriptor.dims(), bbox, &block, self.options.seed)?;

        for round in 0..self.options.randomizations {
            let shuffled = shuffler.shuffled(descriptor.channel1())?;
            let pairs = MaskedPairs::from_slices(
                descriptor.dims(),
                shuffled.data(),
                descriptor.channel2().data(),
                descriptor.mask(),
            )?;
            let (xs, ys): (Vec<f64>, Vec<f64>) = pairs.unzip();
            let tau = max_tau(&xs, &ys, &mut rng)?.tau;
            debug!(round, tau, "max tau randomization");
            self.distribution.push(tau);
        }

        let exceeding = self
            .distribution
            .iter()
            .filter(|&&t| t > observed.tau)
            .count();
        self.p_value = exceeding as f64 / self.distribution.len() as f64;
        debug!(
            tau = observed.tau,
            p = self.p_value,
            thr1 = observed.rank_threshold1,
            thr2 = observed.rank_threshold2,
            "max tau"
        );
        self.observed = Some(observed);
        Ok(())
    }

    fn report(&self, results: &mut AnalysisResults) {
        if let Some(observed) = self.observed {
            results.add_value("Max Kendall Tau correlation value", observed.tau, 4);
            results.add_value("Max Kendall Tau P-value", self.p_value, 4);
        }
    }
}

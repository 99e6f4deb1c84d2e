//! Kendall's tau with an O(n log n) discordance count

use coloc_core::{AnalysisResults, Descriptor, Error, Result};
use tracing::debug;

use crate::algorithm::Algorithm;

/// Sort `values` ascending and return the number of adjacent swaps a
/// bubble sort would need
///
/// Bottom-up merge sort; equal elements are not counted as inversions.
pub fn merge_sort_swaps(values: &mut [f64]) -> u64 {
    let n = values.len();
    let mut src = values.to_vec();
    let mut dst = vec![0.0; n];
    let mut swaps = 0u64;

    let mut width = 1;
    while width < n {
        let mut begin = 0;
        while begin < n {
            let mid = (begin + width).min(n);
            let end = (begin + 2 * width).min(n);
            let (mut i, mut j, mut k) = (begin, mid, begin);
            while i < mid && j < end {
                if src[i] > src[j] {
                    swaps += (mid - i) as u64;
                    dst[k] = src[j];
                    j += 1;
                } else {
                    dst[k] = src[i];
                    i += 1;
                }
                k += 1;
            }
            dst[k..k + (mid - i)].copy_from_slice(&src[i..mid]);
            k += mid - i;
            dst[k..end].copy_from_slice(&src[j..end]);
            begin = end;
        }
        std::mem::swap(&mut src, &mut dst);
        width *= 2;
    }
    values.copy_from_slice(&src);
    swaps
}

/// Plain tau of two tie-free rank vectors
///
/// Returns `NaN` for fewer than two ranks.
pub fn tau_from_ranks(rank1: &[f64], rank2: &[f64]) -> f64 {
    let n = rank1.len().min(rank2.len());
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| rank1[a].total_cmp(&rank1[b]));
    let mut ys: Vec<f64> = order.iter().map(|&i| rank2[i]).collect();

    let n0 = (n * n.saturating_sub(1) / 2) as f64;
    let swaps = merge_sort_swaps(&mut ys) as f64;
    (n0 - 2.0 * swaps) / n0
}

/// Sum of `t (t - 1) / 2` over the runs of equal elements
fn tied_pairs<T: PartialEq>(sorted: &[T]) -> u64 {
    let mut total = 0u64;
    let mut start = 0;
    while start < sorted.len() {
        let mut end = start + 1;
        while end < sorted.len() && sorted[end] == sorted[start] {
            end += 1;
        }
        let t = (end - start) as u64;
        total += t * (t - 1) / 2;
        start = end;
    }
    total
}

/// Kendall's tau-b over arbitrary pairs, corrected for ties (Knight)
///
/// # Errors
///
/// `Error::MissingPrecondition` for fewer than two pairs or when one of
/// the channels is constant.
pub fn kendall_tau_b<I>(pairs: I) -> Result<f64>
where
    I: IntoIterator<Item = (f64, f64)>,
{
    let mut pairs: Vec<(f64, f64)> = pairs.into_iter().collect();
    let n = pairs.len() as u64;
    if n < 2 {
        return Err(Error::precondition(format!(
            "Kendall's tau needs at least 2 pixels, got {n}"
        )));
    }
    pairs.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.total_cmp(&b.1)));

    let xs: Vec<f64> = pairs.iter().map(|p| p.0).collect();
    let n0 = n * (n - 1) / 2;
    let n1 = tied_pairs(&xs);
    let n3 = tied_pairs(&pairs);
    let mut ys: Vec<f64> = pairs.iter().map(|p| p.1).collect();
    let swaps = merge_sort_swaps(&mut ys);
    let n2 = tied_pairs(&ys);

    let denominator = ((n0 - n1) as f64 * (n0 - n2) as f64).sqrt();
    if !(denominator > 0.0) {
        return Err(Error::precondition(
            "Kendall's tau is undefined for a constant channel",
        ));
    }
    let numerator = n0 as f64 - n1 as f64 - n2 as f64 + n3 as f64 - 2.0 * swaps as f64;
    Ok(numerator / denominator)
}

/// Kendall's tau-b stage
#[derive(Debug, Clone, Default)]
pub struct KendallTauRankCorrelation {
    tau: f64,
}

impl KendallTauRankCorrelation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tau(&self) -> f64 {
        self.tau
    }
}

impl Algorithm for KendallTauRankCorrelation {
    fn name(&self) -> &str {
        "Kendall's Tau calculation"
    }

    fn execute(&mut self, descriptor: &Descriptor) -> Result<()> {
        self.tau = kendall_tau_b(descriptor.pairs())?;
        debug!(tau = self.tau, "kendall tau-b");
        Ok(())
    }

    fn report(&self, results: &mut AnalysisResults) {
        results.add_value("Kendall's Tau-b rank correlation value", self.tau, 4);
    }
}

//! Otsu threshold on sorted samples, expressed as a rank

/// Number of samples in the lower class of the Otsu split
///
/// The sorted samples are split between runs of equal values; the split
/// maximizing the between-class variance wins, the first one on ties.
/// The result never falls below `len / 2`, so at most the upper half of
/// the ranks is discarded as background.
pub fn otsu_rank_threshold(values: &[f64]) -> usize {
    let len = values.len();
    let mut sorted: Vec<f64> = values.iter().map(|v| v / 100.0).collect();
    sorted.sort_by(f64::total_cmp);
    let total: f64 = sorted.iter().sum();

    let mut best = 0usize;
    let mut best_var = -1.0;
    let (mut less_sum, mut less_num) = (0.0, 0usize);
    let (mut start, mut end) = (0usize, 0usize);
    while end + 1 < len {
        while end < len && sorted[end] == sorted[start] {
            end += 1;
        }
        let run = end - start;
        less_num += run;
        less_sum += run as f64 * sorted[start];
        let large_num = len - less_num;
        let diff = (total - less_sum) / large_num as f64 - less_sum / less_num as f64;
        let var_between = less_num as f64 * large_num as f64 * diff * diff;
        // NaN (empty upper class) never wins.
        if var_between > best_var {
            best_var = var_between;
            best = less_num;
        }
        start = end;
    }

    best.max(len / 2)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bimodal_split() {
        let mut values = vec![1.0, 2.0, 1.5, 2.5, 1.2, 1.8, 2.2, 1.1];
        values.extend([90.0, 95.0, 91.0]);
        assert_eq!(otsu_rank_threshold(&values), 8);
    }

    #[test]
    fn test_floor_at_half() {
        let mut values = vec![0.0; 10];
        values.extend(vec![50.0; 90]);
        assert_eq!(otsu_rank_threshold(&values), 50);
    }

    #[test]
    fn test_degenerate_inputs() {
        assert_eq!(otsu_rank_threshold(&[]), 0);
        assert_eq!(otsu_rank_threshold(&[7.0; 9]), 4);
        assert_eq!(otsu_rank_threshold(&[3.0]), 0);
    }
}

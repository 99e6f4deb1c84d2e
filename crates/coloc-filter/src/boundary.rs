//! Out-of-bounds access by mirroring
//!
//! Positions outside `[0, n)` are reflected at the borders without
//! repeating the border sample: for `n = 5`, `-1 -> 1`, `-2 -> 2`,
//! `5 -> 3`, `6 -> 2`.

/// Map any position onto `[0, n)` by single-sample mirroring
///
/// Returns 0 for `n <= 1`.
pub fn mirror_index(i: isize, n: usize) -> usize {
    if n <= 1 {
        return 0;
    }
    let period = 2 * (n as isize - 1);
    let mut k = i.rem_euclid(period);
    if k >= n as isize {
        k = period - k;
    }
    k as usize
}

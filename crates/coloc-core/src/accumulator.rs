//! One-pass sums over sample pairs
//!
//! The correlation and split-coefficient statistics all need the same
//! handful of sums. [`Accumulator`] computes them in one pass, optionally
//! skipping pairs rejected by a predicate and optionally subtracting
//! constant offsets (typically the channel means) from each sample.

/// Sums and cross products of accepted sample pairs
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Accumulator {
    /// Number of accepted pairs
    pub count: usize,
    /// Σx
    pub x: f64,
    /// Σy
    pub y: f64,
    /// Σx²
    pub xx: f64,
    /// Σxy
    pub xy: f64,
    /// Σy²
    pub yy: f64,
}

impl Accumulator {
    /// Accumulate every pair
    pub fn new<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (f64, f64)>,
    {
        Self::with_offsets(pairs, |_, _| true, 0.0, 0.0)
    }

    /// Accumulate the pairs accepted by `accept`
    pub fn with_predicate<I, F>(pairs: I, accept: F) -> Self
    where
        I: IntoIterator<Item = (f64, f64)>,
        F: FnMut(f64, f64) -> bool,
    {
        Self::with_offsets(pairs, accept, 0.0, 0.0)
    }

    /// Accumulate `(x - x_diff, y - y_diff)` for the pairs accepted by
    /// `accept`
    ///
    /// The predicate sees the raw samples, before the offsets are applied.
    pub fn with_offsets<I, F>(pairs: I, mut accept: F, x_diff: f64, y_diff: f64) -> Self
    where
        I: IntoIterator<Item = (f64, f64)>,
        F: FnMut(f64, f64) -> bool,
    {
        let mut acc = Self::default();
        for (x, y) in pairs {
            if accept(x, y) {
                acc.add(x - x_diff, y - y_diff);
            }
        }
        acc
    }

    /// Add one pair
    #[inline]
    pub fn add(&mut self, x: f64, y: f64) {
        self.count += 1;
        self.x += x;
        self.y += y;
        self.xx += x * x;
        self.xy += x * y;
        self.yy += y * y;
    }

    /// Combine with the sums of a disjoint set of pairs
    pub fn merge(&mut self, other: &Self) {
        self.count += other.count;
        self.x += other.x;
        self.y += other.y;
        self.xx += other.xx;
        self.xy += other.xy;
        self.yy += other.yy;
    }
}

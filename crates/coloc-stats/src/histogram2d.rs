//! 2D intensity histograms
//!
//! [`Histogram2D`] bins channel 1 against channel 2 on a 256x256 grid (the
//! scatter plot of colocalization analysis). [`LiHistogram2D`] bins Li's
//! product of mean differences against one of the channels.
//!
//! In both the y axis is inverted so that row 0 holds the largest values.
//! Pixels falling outside the grid are ignored and reported in a warning.

use coloc_core::{AnalysisResults, Axis, Descriptor, HistogramResult, Result, Warning};
use tracing::debug;

use crate::algorithm::Algorithm;

/// Number of bins along each axis
pub const BINS: usize = 256;

/// Bins per data unit for a channel with maximum `max`
///
/// Values up to 255 map one-to-one; larger ranges are compressed so the
/// maximum still lands inside the last bin.
pub fn bin_width(max: f64) -> f64 {
    if max < BINS as f64 {
        1.0
    } else {
        (BINS as f64 - 0.50001) / max
    }
}

/// Accumulates counts on the 256x256 grid
#[derive(Debug, Clone)]
struct Grid {
    counts: Vec<u64>,
    ignored: usize,
}

impl Grid {
    fn new() -> Self {
        Self {
            counts: vec![0; BINS * BINS],
            ignored: 0,
        }
    }

    /// Count a pixel at truncated bin positions; `y` is still upright
    fn add(&mut self, x: f64, y: f64) {
        // Truncation toward zero, not flooring.
        let bx = x.trunc();
        let by = (BINS as f64 - 1.0) - y.trunc();
        if (0.0..BINS as f64).contains(&bx) && (0.0..BINS as f64).contains(&by) {
            self.counts[by as usize * BINS + bx as usize] += 1;
        } else {
            self.ignored += 1;
        }
    }

    fn into_result(self, title: &str, x_axis: Axis, y_axis: Axis) -> HistogramResult {
        HistogramResult {
            title: title.to_string(),
            x_bins: BINS,
            y_bins: BINS,
            counts: self.counts,
            x_axis,
            y_axis,
        }
    }
}

fn ignored_warning(ignored: usize, title: &str) -> Warning {
    Warning::new(
        "Ignored pixels while generating histogram.",
        format!(
            "{ignored} pixels were ignored while generating the 2D histogram \"{title}\" \
             because the grey values were out of range. This may happen if an image \
             contains negative values or if the range of intensities exceeds the bins."
        ),
    )
}

/// Channel 1 versus channel 2 histogram stage
#[derive(Debug, Clone)]
pub struct Histogram2D {
    title: String,
    swap_channels: bool,
    result: Option<HistogramResult>,
    ignored: usize,
}

impl Default for Histogram2D {
    fn default() -> Self {
        Self::new("2D intensity histogram")
    }
}

impl Histogram2D {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            swap_channels: false,
            result: None,
            ignored: 0,
        }
    }

    /// Plot channel 2 on the x axis instead of channel 1
    pub fn with_swapped_channels(mut self, swap: bool) -> Self {
        self.swap_channels = swap;
        self
    }

    pub fn histogram(&self) -> Option<&HistogramResult> {
        self.result.as_ref()
    }

    /// Pixels that fell outside the grid in the last run
    pub fn ignored(&self) -> usize {
        self.ignored
    }

    /// Build the histogram of a descriptor
    pub fn compute(&self, descriptor: &Descriptor) -> (HistogramResult, usize) {
        let (sx, sy) = (descriptor.stats1(), descriptor.stats2());
        let (xmax, ymax, xlabel, ylabel) = if self.swap_channels {
            (sy.max, sx.max, "Channel 2", "Channel 1")
        } else {
            (sx.max, sy.max, "Channel 1", "Channel 2")
        };
        let (wx, wy) = (bin_width(xmax), bin_width(ymax));

        let mut grid = Grid::new();
        for (a, b) in descriptor.pairs() {
            let (x, y) = if self.swap_channels { (b, a) } else { (a, b) };
            grid.add(x * wx + 0.5, y * wy + 0.5);
        }
        let ignored = grid.ignored;
        let axis = |label: &str, max: f64, width: f64| Axis {
            label: label.to_string(),
            min: 0.0,
            max,
            bin_width: width,
        };
        let result = grid.into_result(
            &self.title,
            axis(xlabel, xmax, wx),
            axis(ylabel, ymax, wy),
        );
        (result, ignored)
    }
}

impl Algorithm for Histogram2D {
    fn name(&self) -> &str {
        &self.title
    }

    fn execute(&mut self, descriptor: &Descriptor) -> Result<()> {
        let (result, ignored) = self.compute(descriptor);
        debug!(title = %self.title, ignored, "2d histogram");
        self.result = Some(result);
        self.ignored = ignored;
        Ok(())
    }

    fn report(&self, results: &mut AnalysisResults) {
        if self.ignored > 0 {
            results.add_warning(ignored_warning(self.ignored, &self.title));
        }
        if let Some(h) = &self.result {
            results.add_histogram(h.clone());
        }
    }
}

/// Li's product of mean differences versus one channel
#[derive(Debug, Clone)]
pub struct LiHistogram2D {
    title: String,
    use_ch1: bool,
    result: Option<HistogramResult>,
    ignored: usize,
    li_min: f64,
    li_max: f64,
}

impl LiHistogram2D {
    /// Histogram against channel 1 (`use_ch1`) or channel 2
    pub fn new(title: impl Into<String>, use_ch1: bool) -> Self {
        Self {
            title: title.into(),
            use_ch1,
            result: None,
            ignored: 0,
            li_min: f64::INFINITY,
            li_max: f64::NEG_INFINITY,
        }
    }

    pub fn histogram(&self) -> Option<&HistogramResult> {
        self.result.as_ref()
    }

    pub fn ignored(&self) -> usize {
        self.ignored
    }

    /// Range of the product of mean differences in the last run
    pub fn li_range(&self) -> (f64, f64) {
        (self.li_min, self.li_max)
    }
}

impl Algorithm for LiHistogram2D {
    fn name(&self) -> &str {
        &self.title
    }

    fn execute(&mut self, descriptor: &Descriptor) -> Result<()> {
        let (m1, m2) = (descriptor.stats1().mean, descriptor.stats2().mean);
        let product = |a: f64, b: f64| (a - m1) * (b - m2);

        let (mut lo, mut hi) = (f64::INFINITY, f64::NEG_INFINITY);
        for (a, b) in descriptor.pairs() {
            let p = product(a, b);
            lo = lo.min(p);
            hi = hi.max(p);
        }

        let stats = if self.use_ch1 {
            descriptor.stats1()
        } else {
            descriptor.stats2()
        };
        let wx = BINS as f64 / ((hi - lo).abs() + 1.0);
        let wy = BINS as f64 / (stats.max + 1.0);

        let mut grid = Grid::new();
        for (a, b) in descriptor.pairs() {
            let value = if self.use_ch1 { a } else { b };
            grid.add((product(a, b) - lo) * wx, value * wy);
        }

        self.li_min = lo;
        self.li_max = hi;
        self.ignored = grid.ignored;
        let x_axis = Axis {
            label: "(Ch1-MeanCh1)*(Ch2-MeanCh2)".to_string(),
            min: lo,
            max: hi,
            bin_width: wx,
        };
        let y_axis = Axis {
            label: if self.use_ch1 { "Channel 1" } else { "Channel 2" }.to_string(),
            min: stats.min,
            max: stats.max,
            bin_width: wy,
        };
        self.result = Some(grid.into_result(&self.title, x_axis, y_axis));
        debug!(title = %self.title, lo, hi, ignored = self.ignored, "li histogram");
        Ok(())
    }

    fn report(&self, results: &mut AnalysisResults) {
        if self.ignored > 0 {
            results.add_warning(ignored_warning(self.ignored, &self.title));
        }
        if let Some(h) = &self.result {
            results.add_histogram(h.clone());
        }
    }
}

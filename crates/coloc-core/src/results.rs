//! Analysis results
//!
//! Every stage reports into one [`AnalysisResults`]: named values (numbers
//! with a display precision, or text), advisory [`Warning`]s, and 2D
//! histograms. Consumers render or export the list as they see fit.

/// Advisory message emitted by a stage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    pub short_message: String,
    pub long_message: String,
}

impl Warning {
    pub fn new(short_message: impl Into<String>, long_message: impl Into<String>) -> Self {
        Self {
            short_message: short_message.into(),
            long_message: long_message.into(),
        }
    }
}

/// Payload of a named result
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Number with the number of decimals to display
    Number { value: f64, decimals: u8 },
    Text(String),
}

/// One named result
#[derive(Debug, Clone, PartialEq)]
pub struct ValueResult {
    pub name: String,
    pub value: Value,
}

impl ValueResult {
    pub fn number(name: impl Into<String>, value: f64, decimals: u8) -> Self {
        Self {
            name: name.into(),
            value: Value::Number { value, decimals },
        }
    }

    pub fn text(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: Value::Text(text.into()),
        }
    }

    /// Numeric value, if any
    pub fn as_number(&self) -> Option<f64> {
        match self.value {
            Value::Number { value, .. } => Some(value),
            Value::Text(_) => None,
        }
    }

    /// Value formatted with its display precision
    pub fn formatted(&self) -> String {
        match &self.value {
            Value::Number { value, decimals } => format!("{:.*}", *decimals as usize, value),
            Value::Text(text) => text.clone(),
        }
    }
}

/// Calibration of one histogram axis
#[derive(Debug, Clone, PartialEq)]
pub struct Axis {
    pub label: String,
    /// Data value at the first bin
    pub min: f64,
    /// Data value at the last bin
    pub max: f64,
    /// Bins per data unit
    pub bin_width: f64,
}

/// 2D histogram with calibrated axes
///
/// `counts` is stored row by row: bin `(x, y)` is at `y * x_bins + x`.
/// Row 0 is the top of the plot.
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramResult {
    pub title: String,
    pub x_bins: usize,
    pub y_bins: usize,
    pub counts: Vec<u64>,
    pub x_axis: Axis,
    pub y_axis: Axis,
}

impl HistogramResult {
    /// Count at bin `(x, y)`
    pub fn count(&self, x: usize, y: usize) -> u64 {
        if x >= self.x_bins || y >= self.y_bins {
            return 0;
        }
        self.counts[y * self.x_bins + x]
    }

    /// Sum of all bins
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// Tab-separated table of the non-empty bins
    ///
    /// The first line is a header; each following line holds the x bin,
    /// the y bin, and the count.
    pub fn data_table(&self) -> String {
        let mut out = format!(
            "{}\t{}\tcount\n",
            self.x_axis.label, self.y_axis.label
        );
        for y in 0..self.y_bins {
            for x in 0..self.x_bins {
                let c = self.counts[y * self.x_bins + x];
                if c > 0 {
                    out.push_str(&format!("{x}\t{y}\t{c}\n"));
                }
            }
        }
        out
    }
}

/// Ordered collection of everything the stages reported
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalysisResults {
    values: Vec<ValueResult>,
    warnings: Vec<Warning>,
    histograms: Vec<HistogramResult>,
}

impl AnalysisResults {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_value(&mut self, name: impl Into<String>, value: f64, decimals: u8) {
        self.values.push(ValueResult::number(name, value, decimals));
    }

    pub fn add_text(&mut self, name: impl Into<String>, text: impl Into<String>) {
        self.values.push(ValueResult::text(name, text));
    }

    pub fn add_warning(&mut self, warning: Warning) {
        self.warnings.push(warning);
    }

    pub fn add_histogram(&mut self, histogram: HistogramResult) {
        self.histograms.push(histogram);
    }

    pub fn values(&self) -> &[ValueResult] {
        &self.values
    }

    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    pub fn histograms(&self) -> &[HistogramResult] {
        &self.histograms
    }

    /// First result with the given name
    pub fn get(&self, name: &str) -> Option<&ValueResult> {
        self.values.iter().find(|v| v.name == name)
    }

    /// Numeric value of the first result with the given name
    pub fn number(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(ValueResult::as_number)
    }

    /// Whether a warning with the given short message was reported
    pub fn has_warning(&self, short_message: &str) -> bool {
        self.warnings.iter().any(|w| w.short_message == short_message)
    }
}

//! Fixed-width histogram with under/overflow counters.

use crate::error::{AggregatorError, AggregatorResult};

/// Largest bin count accepted for one band histogram.
pub const MAX_HISTOGRAM_BINS: usize = 1_000_000;

/// Binning parameters for a band histogram.
///
/// Always holds `1 <= num_bins <= MAX_HISTOGRAM_BINS` and finite bounds with `low < high`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistogramSpec {
    num_bins: usize,
    low: f64,
    high: f64,
}

impl HistogramSpec {
    /// Checked constructor for `num_bins` equal-width bins over `[low, high)`.
    pub fn new(num_bins: usize, low: f64, high: f64) -> AggregatorResult<Self> {
        if num_bins == 0 || num_bins > MAX_HISTOGRAM_BINS {
            return Err(AggregatorError::Configuration(format!(
                "Histogram bin count must be in [1, {}], got {}",
                MAX_HISTOGRAM_BINS, num_bins
            )));
        }
        if !low.is_finite() || !high.is_finite() || low >= high {
            return Err(AggregatorError::Configuration(format!(
                "Histogram requires finite bounds with low < high, got [{}, {}]",
                low, high
            )));
        }
        Ok(Self { num_bins, low, high })
    }

    pub fn num_bins(&self) -> usize {
        self.num_bins
    }

    pub fn low(&self) -> f64 {
        self.low
    }

    pub fn high(&self) -> f64 {
        self.high
    }

    pub fn bin_width(&self) -> f64 {
        (self.high - self.low) / self.num_bins as f64
    }
}

/// Binned counts of the samples of one band in one cell.
///
/// Values below `low` go to `below`, values at or above `high` to `above`,
/// everything else to one of the `num_bins` equal-width bins.
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramAccumulator {
    spec: HistogramSpec,
    below: u64,
    above: u64,
    bins: Vec<u64>,
}

impl HistogramAccumulator {
    pub fn new(spec: HistogramSpec) -> Self {
        Self {
            spec,
            below: 0,
            above: 0,
            bins: vec![0; spec.num_bins],
        }
    }

    pub fn add(&mut self, value: f64) {
        if value < self.spec.low {
            self.below += 1;
        } else if value >= self.spec.high {
            self.above += 1;
        } else {
            let raw = ((value - self.spec.low) / self.spec.bin_width()).floor();
            let index = (raw.max(0.0) as usize).min(self.spec.num_bins - 1);
            self.bins[index] += 1;
        }
    }

    pub fn extend(&mut self, values: &[f64]) {
        for &value in values {
            self.add(value);
        }
    }

    pub fn spec(&self) -> &HistogramSpec {
        &self.spec
    }

    pub fn below(&self) -> u64 {
        self.below
    }

    pub fn above(&self) -> u64 {
        self.above
    }

    pub fn bins(&self) -> &[u64] {
        &self.bins
    }

    /// Number of samples fed so far.
    pub fn total(&self) -> u64 {
        self.below + self.above + self.bins.iter().sum::<u64>()
    }
}

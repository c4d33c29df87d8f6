//! Per-band sample accumulation and statistics.
//!
//! - [`accumulator`]: append-only sample store
//! - [`band_statistics`]: count/min/max/mean/sigma/geometric mean/percentiles
//! - [`histogram`]: fixed-width binning with under/overflow counters
//!
//! A band either produces statistics only, or statistics plus a histogram.
//! That choice is made once per band from its configuration and carried as
//! [`BandMode`]; each cell then holds a matching [`BandAccumulator`].

pub mod accumulator;
pub mod band_statistics;
pub mod histogram;

pub use accumulator::SampleAccumulator;
pub use band_statistics::{percentile, BandStatistics};
pub use histogram::{HistogramAccumulator, HistogramSpec, MAX_HISTOGRAM_BINS};

/// Output mode of a band, fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BandMode {
    StatsOnly,
    WithHistogram(HistogramSpec),
}

impl BandMode {
    pub fn histogram(&self) -> Option<&HistogramSpec> {
        match self {
            BandMode::StatsOnly => None,
            BandMode::WithHistogram(spec) => Some(spec),
        }
    }
}

/// Samples of one band within one cell.
#[derive(Debug, Clone, PartialEq)]
pub enum BandAccumulator {
    StatsOnly(SampleAccumulator),
    WithHistogram(SampleAccumulator, HistogramAccumulator),
}

impl BandAccumulator {
    pub fn new(mode: &BandMode) -> Self {
        match mode {
            BandMode::StatsOnly => BandAccumulator::StatsOnly(SampleAccumulator::new()),
            BandMode::WithHistogram(spec) => {
                BandAccumulator::WithHistogram(SampleAccumulator::new(), HistogramAccumulator::new(*spec))
            }
        }
    }

    pub fn extend(&mut self, samples: &[f64]) {
        match self {
            BandAccumulator::StatsOnly(accu) => accu.extend(samples),
            BandAccumulator::WithHistogram(accu, histo) => {
                accu.extend(samples);
                histo.extend(samples);
            }
        }
    }

    pub fn samples(&self) -> &SampleAccumulator {
        match self {
            BandAccumulator::StatsOnly(accu) | BandAccumulator::WithHistogram(accu, _) => accu,
        }
    }

    pub fn histogram(&self) -> Option<&HistogramAccumulator> {
        match self {
            BandAccumulator::StatsOnly(_) => None,
            BandAccumulator::WithHistogram(_, histo) => Some(histo),
        }
    }
}

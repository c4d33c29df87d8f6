//! Region/time-window statistics aggregation.
//!
//! The [`RegionStatisticsAggregator`] owns one [`Cell`] per (region, time
//! window) and is driven through a strict lifecycle:
//!
//! ```text
//! Idle --start_region--> RegionOpen --end_region--> Idle --close--> Closed
//!                          |    ^
//!                          +----+ add_data
//! ```
//!
//! Regions must be started in ascending declared order, each at most once.
//! At [`close`](RegionStatisticsAggregator::close) every declared region is
//! reported for every window, including regions and windows that never
//! received data.

use chrono::{DateTime, Utc};

use crate::completion::CompletionTracker;
use crate::config::RegionAnalysisConfig;
use crate::error::{AggregatorError, AggregatorResult};
use crate::report::{BandReport, ReportRow, ReportWriter, WriterFactory};
use crate::stats::{BandAccumulator, BandMode, BandStatistics};
use crate::time::TimeWindowIndex;

/// Aggregation unit for one (region, time window).
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    num_passes: u64,
    num_obs: u64,
    last_seen: Option<DateTime<Utc>>,
    bands: Vec<BandAccumulator>,
}

impl Cell {
    fn new(band_modes: &[BandMode]) -> Self {
        Self {
            num_passes: 0,
            num_obs: 0,
            last_seen: None,
            bands: band_modes.iter().map(BandAccumulator::new).collect(),
        }
    }

    fn add<S: AsRef<[f64]>>(&mut self, time: DateTime<Utc>, obs_count: u64, samples: &[S]) {
        self.num_obs += obs_count;
        if self.last_seen != Some(time) {
            self.num_passes += 1;
            self.last_seen = Some(time);
        }
        for (band, band_samples) in self.bands.iter_mut().zip(samples) {
            band.extend(band_samples.as_ref());
        }
    }

    fn finalize(&self, percentiles: &[u32]) -> Vec<BandReport> {
        self.bands
            .iter()
            .map(|band| BandReport {
                statistics: BandStatistics::compute(band.samples(), percentiles),
                histogram: band.histogram().cloned(),
            })
            .collect()
    }

    pub fn num_passes(&self) -> u64 {
        self.num_passes
    }

    pub fn num_obs(&self) -> u64 {
        self.num_obs
    }

    pub fn bands(&self) -> &[BandAccumulator] {
        &self.bands
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Idle,
    RegionOpen(usize),
    Closed,
}

/// Outcome of [`RegionStatisticsAggregator::close`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloseSummary {
    pub rows: usize,
    pub sinks: usize,
    /// Declared regions that were never started, reported empty
    pub empty_regions: Vec<usize>,
}

/// Condenses chunked per-pixel samples into one report row per declared
/// (region, time window).
///
/// Not safe for concurrent use: run one instance per worker or serialize calls.
pub struct RegionStatisticsAggregator<F: WriterFactory> {
    windows: TimeWindowIndex,
    region_names: Vec<String>,
    band_names: Vec<String>,
    band_modes: Vec<BandMode>,
    percentiles: Vec<u32>,
    report: ReportWriter,
    writer_factory: F,
    tracker: CompletionTracker,
    skipped: Vec<usize>,
    cells: Vec<Vec<Option<Cell>>>,
    state: State,
}

impl<F: WriterFactory> RegionStatisticsAggregator<F> {
    /// Pre-registers the declared regions; nothing is written until `close`.
    pub fn new(
        windows: TimeWindowIndex,
        config: &RegionAnalysisConfig,
        writer_factory: F,
    ) -> AggregatorResult<Self> {
        config.validate()?;

        let region_names = config.analysis.regions.clone();
        let band_names = config.band_names();
        let band_modes = config.band_modes()?;
        let percentiles = config.analysis.percentiles.clone();

        let report = ReportWriter::new(
            band_names.clone(),
            band_modes.clone(),
            percentiles.clone(),
            config.output.layout(),
            config.output.bin_values_as_ratio,
        );

        let cells = vec![vec![None; windows.len()]; region_names.len()];

        Ok(Self {
            tracker: CompletionTracker::new(region_names.len()),
            windows,
            region_names,
            band_names,
            band_modes,
            percentiles,
            report,
            writer_factory,
            skipped: Vec::new(),
            cells,
            state: State::Idle,
        })
    }

    /// Build the time-window index from the configuration as well.
    pub fn from_config(config: &RegionAnalysisConfig, writer_factory: F) -> AggregatorResult<Self> {
        Self::new(config.time_window_index()?, config, writer_factory)
    }

    /// Opens the declared region at `index`.
    ///
    /// Regions must be started in ascending index order; regions jumped over
    /// are remembered and reported empty at close.
    pub fn start_region(&mut self, index: usize, name: &str) -> AggregatorResult<()> {
        match self.state {
            State::Closed => return Err(AggregatorError::Closed),
            State::RegionOpen(open) => {
                return Err(AggregatorError::RegionAlreadyOpen {
                    open: self.region_names[open].clone(),
                    requested: name.to_string(),
                })
            }
            State::Idle => {}
        }

        let declared = self
            .region_names
            .get(index)
            .ok_or(AggregatorError::UnknownRegion {
                index,
                count: self.region_names.len(),
            })?;
        if declared != name {
            return Err(AggregatorError::RegionNameMismatch {
                index,
                declared: declared.clone(),
                given: name.to_string(),
            });
        }

        let skipped = self.tracker.advance(index)?;
        if !skipped.is_empty() {
            log::debug!("Regions {:?} skipped before region '{}'", skipped, name);
        }
        self.skipped.extend(skipped);

        self.state = State::RegionOpen(index);
        Ok(())
    }

    /// Adds one chunk of samples for the open region.
    ///
    /// `samples` holds one list per configured band. Chunks whose timestamp
    /// lies outside every time window are dropped without looking at their
    /// samples. Otherwise all samples must be finite and positive; an invalid
    /// chunk is rejected without changing any state.
    pub fn add_data<S: AsRef<[f64]>>(
        &mut self,
        time: DateTime<Utc>,
        obs_count: u64,
        samples: &[S],
    ) -> AggregatorResult<()> {
        let region = match self.state {
            State::RegionOpen(region) => region,
            State::Idle => return Err(AggregatorError::NoRegionOpen),
            State::Closed => return Err(AggregatorError::Closed),
        };

        if samples.len() != self.band_names.len() {
            return Err(AggregatorError::BandCountMismatch {
                expected: self.band_names.len(),
                actual: samples.len(),
            });
        }

        let window = match self.windows.lookup(&time) {
            Some(window) => window,
            None => {
                log::debug!(
                    "Dropping data for region '{}' at {}: outside all time windows",
                    self.region_names[region],
                    time
                );
                return Ok(());
            }
        };

        for (band_name, band_samples) in self.band_names.iter().zip(samples) {
            if let Some(&value) = band_samples
                .as_ref()
                .iter()
                .find(|v| !(v.is_finite() && **v > 0.0))
            {
                return Err(AggregatorError::InvalidSample {
                    band: band_name.clone(),
                    value,
                });
            }
        }

        let band_modes = &self.band_modes;
        self.cells[region][window]
            .get_or_insert_with(|| Cell::new(band_modes))
            .add(time, obs_count, samples);
        Ok(())
    }

    /// Closes the open region.
    pub fn end_region(&mut self) -> AggregatorResult<()> {
        match self.state {
            State::RegionOpen(_) => {
                self.state = State::Idle;
                Ok(())
            }
            State::Idle => Err(AggregatorError::NoRegionOpen),
            State::Closed => Err(AggregatorError::Closed),
        }
    }

    /// Finalizes every declared (region, window) cell and writes the report.
    ///
    /// Terminal: every later call fails with [`AggregatorError::Closed`].
    pub fn close(&mut self) -> AggregatorResult<CloseSummary> {
        match self.state {
            State::Closed => return Err(AggregatorError::Closed),
            State::RegionOpen(open) => {
                return Err(AggregatorError::RegionStillOpen(self.region_names[open].clone()))
            }
            State::Idle => {}
        }
        self.state = State::Closed;

        let mut empty_regions = self.skipped.clone();
        empty_regions.extend(self.tracker.remaining());
        if !empty_regions.is_empty() {
            let names: Vec<&str> = empty_regions
                .iter()
                .map(|&r| self.region_names[r].as_str())
                .collect();
            log::info!("{} declared regions received no data: {:?}", names.len(), names);
        }
        log::info!(
            "Finalizing {} regions x {} time windows",
            self.region_names.len(),
            self.windows.len()
        );

        let empty_cell = Cell::new(&self.band_modes);
        let mut rows = Vec::with_capacity(self.region_names.len() * self.windows.len());
        for (region, region_cells) in self.cells.iter().enumerate() {
            for (window, cell) in region_cells.iter().enumerate() {
                let cell = cell.as_ref().unwrap_or(&empty_cell);
                let (window_start, window_end) = self.windows.format(window).unwrap_or_default();
                rows.push(ReportRow {
                    region,
                    region_name: self.region_names[region].clone(),
                    window_start,
                    window_end,
                    num_passes: cell.num_passes,
                    num_obs: cell.num_obs,
                    bands: cell.finalize(&self.percentiles),
                });
            }
        }

        let sinks = self
            .report
            .write_all(&mut self.writer_factory, &self.region_names, &rows)?;
        log::info!("Wrote {} rows to {} report sinks", rows.len(), sinks);

        Ok(CloseSummary {
            rows: rows.len(),
            sinks,
            empty_regions,
        })
    }

    /// The cell of (`region`, `window`), if it received data.
    pub fn cell(&self, region: usize, window: usize) -> Option<&Cell> {
        self.cells.get(region)?.get(window)?.as_ref()
    }

    pub fn is_closed(&self) -> bool {
        self.state == State::Closed
    }

    pub fn region_names(&self) -> &[String] {
        &self.region_names
    }

    pub fn time_windows(&self) -> &TimeWindowIndex {
        &self.windows
    }

    pub fn writer_factory(&self) -> &F {
        &self.writer_factory
    }

    pub fn into_writer_factory(self) -> F {
        self.writer_factory
    }
}

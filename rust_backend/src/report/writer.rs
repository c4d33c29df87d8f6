//! Tab-separated report tables.
//!
//! Each finalized cell becomes one [`ReportRow`]. The [`ReportWriter`] turns
//! rows into text lines and routes their columns to sinks according to the
//! [`OutputLayout`]:
//!
//! | layout                       | statistics sink            | histogram columns             |
//! |------------------------------|----------------------------|-------------------------------|
//! | shared, inline               | `region-statistics.csv`    | inline after each band        |
//! | shared, separate             | `region-statistics.csv`    | `region-histogram-B.csv`      |
//! | per region, inline           | `region-R-statistics.csv`  | inline after each band        |
//! | per region, separate         | `region-R-statistics.csv`  | `region-R-histogram-B.csv`    |

use std::io::Write;

use super::format::format_value;
use super::sink::{sink_name, OutputLayout, SinkKey, SinkKind, WriterFactory};
use crate::error::AggregatorResult;
use crate::stats::{BandMode, BandStatistics, HistogramAccumulator};

const FIELD_SEPARATOR: &str = "\t";
const RECORD_SEPARATOR: &str = "\n";

/// Finalized values of one band in one cell.
#[derive(Debug, Clone, PartialEq)]
pub struct BandReport {
    pub statistics: BandStatistics,
    pub histogram: Option<HistogramAccumulator>,
}

/// One finalized (region, time window) cell.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportRow {
    pub region: usize,
    pub region_name: String,
    pub window_start: String,
    pub window_end: String,
    pub num_passes: u64,
    pub num_obs: u64,
    pub bands: Vec<BandReport>,
}

/// Formats report rows and writes them to their sinks.
#[derive(Debug, Clone)]
pub struct ReportWriter {
    band_names: Vec<String>,
    band_modes: Vec<BandMode>,
    percentiles: Vec<u32>,
    layout: OutputLayout,
    bin_values_as_ratio: bool,
}

impl ReportWriter {
    pub fn new(
        band_names: Vec<String>,
        band_modes: Vec<BandMode>,
        percentiles: Vec<u32>,
        layout: OutputLayout,
        bin_values_as_ratio: bool,
    ) -> Self {
        Self {
            band_names,
            band_modes,
            percentiles,
            layout,
            bin_values_as_ratio,
        }
    }

    pub fn layout(&self) -> &OutputLayout {
        &self.layout
    }

    /// Indices of bands with an enabled histogram.
    pub fn histogram_bands(&self) -> Vec<usize> {
        self.band_modes
            .iter()
            .enumerate()
            .filter(|(_, mode)| mode.histogram().is_some())
            .map(|(i, _)| i)
            .collect()
    }

    /// Column names of a sink.
    pub fn header(&self, kind: SinkKind) -> Vec<String> {
        let mut columns: Vec<String> = ["RegionId", "TimeWindow_start", "TimeWindow_end", "numPasses", "numObs"]
            .iter()
            .map(|s| s.to_string())
            .collect();

        match kind {
            SinkKind::Statistics => {
                for (band, name) in self.band_names.iter().enumerate() {
                    columns.extend(self.statistics_header(name));
                    if self.histogram_inline(band) {
                        columns.extend(self.histogram_header(band));
                    }
                }
            }
            SinkKind::Histogram(band) => columns.extend(self.histogram_header(band)),
        }
        columns
    }

    /// Field values of `row` for a sink.
    pub fn record(&self, kind: SinkKind, row: &ReportRow) -> Vec<String> {
        let mut fields = vec![
            row.region_name.clone(),
            row.window_start.clone(),
            row.window_end.clone(),
            row.num_passes.to_string(),
            row.num_obs.to_string(),
        ];

        match kind {
            SinkKind::Statistics => {
                for (band, report) in row.bands.iter().enumerate() {
                    fields.extend(self.statistics_record(&report.statistics));
                    if self.histogram_inline(band) {
                        fields.extend(self.histogram_record(report));
                    }
                }
            }
            SinkKind::Histogram(band) => fields.extend(self.histogram_record(&row.bands[band])),
        }
        fields
    }

    /// Write every sink in order, each one complete before the next is opened.
    ///
    /// `rows` must be ordered by region. Returns the number of sinks written.
    pub fn write_all<F: WriterFactory + ?Sized>(
        &self,
        factory: &mut F,
        region_names: &[String],
        rows: &[ReportRow],
    ) -> AggregatorResult<usize> {
        let sinks = self.layout.sinks(region_names.len(), &self.histogram_bands());

        for key in &sinks {
            let name = sink_name(key, region_names, &self.band_names);
            log::debug!("Opening report sink {}", name);

            let mut writer = factory.create_writer(&name)?;
            write_line(writer.as_mut(), &self.header(key.kind))?;
            for row in self.rows_for(key, rows) {
                write_line(writer.as_mut(), &self.record(key.kind, row))?;
            }
            writer.flush()?;
            log::debug!("Closed report sink {}", name);
        }

        Ok(sinks.len())
    }

    /// The run of region-ordered `rows` routed to `key`.
    fn rows_for<'a>(&self, key: &SinkKey, rows: &'a [ReportRow]) -> &'a [ReportRow] {
        let selected = match key.region {
            Some(region) => {
                let start = rows.partition_point(|row| row.region < region);
                let len = rows[start..].partition_point(|row| row.region == region);
                &rows[start..start + len]
            }
            None => rows,
        };
        debug_assert!(selected.iter().all(|row| self.routes_to(row, key)));
        selected
    }

    fn routes_to(&self, row: &ReportRow, key: &SinkKey) -> bool {
        let band = match key.kind {
            SinkKind::Statistics => None,
            SinkKind::Histogram(band) => Some(band),
        };
        self.layout.route(row.region, band) == *key
    }

    fn histogram_inline(&self, band: usize) -> bool {
        !self.layout.write_separate_histogram && self.band_modes[band].histogram().is_some()
    }

    fn statistics_header(&self, band_name: &str) -> Vec<String> {
        let mut columns: Vec<String> = ["count", "min", "max", "arithMean", "sigma", "geomMean"]
            .iter()
            .map(|stat| format!("{}_{}", band_name, stat))
            .collect();
        columns.extend(self.percentiles.iter().map(|p| format!("{}_p{}", band_name, p)));
        columns
    }

    fn histogram_header(&self, band: usize) -> Vec<String> {
        let spec = match self.band_modes[band].histogram() {
            Some(spec) => spec,
            None => return Vec::new(),
        };
        let name = &self.band_names[band];

        let mut columns: Vec<String> = ["belowHistogram", "aboveHistogram", "numBins", "lowValue", "highValue"]
            .iter()
            .map(|col| format!("{}_{}", name, col))
            .collect();
        columns.extend((0..spec.num_bins()).map(|i| format!("{}_bin_{}", name, i)));
        columns
    }

    fn statistics_record(&self, stats: &BandStatistics) -> Vec<String> {
        let mut fields = vec![
            stats.count.to_string(),
            format_value(stats.min),
            format_value(stats.max),
            format_value(stats.arith_mean),
            format_value(stats.sigma),
            format_value(stats.geom_mean),
        ];
        fields.extend(stats.percentiles.iter().map(|&p| format_value(p)));
        fields
    }

    fn histogram_record(&self, report: &BandReport) -> Vec<String> {
        let histo = match &report.histogram {
            Some(histo) => histo,
            None => return Vec::new(),
        };
        let spec = histo.spec();
        let num_valid = report.statistics.count as f64;
        let render = |count: u64| {
            if self.bin_values_as_ratio {
                format_value(count as f64 / num_valid)
            } else {
                count.to_string()
            }
        };

        let mut fields = vec![
            render(histo.below()),
            render(histo.above()),
            spec.num_bins().to_string(),
            format_value(spec.low()),
            format_value(spec.high()),
        ];
        fields.extend(histo.bins().iter().map(|&bin| render(bin)));
        fields
    }
}

fn write_line(writer: &mut dyn Write, fields: &[String]) -> std::io::Result<()> {
    writer.write_all(fields.join(FIELD_SEPARATOR).as_bytes())?;
    writer.write_all(RECORD_SEPARATOR.as_bytes())
}

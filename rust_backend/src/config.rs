//! Region analysis configuration file support.
//!
//! This module reads the analysis configuration (time windows, bands,
//! percentiles, declared regions and output routing) from TOML.
//!
//! ```toml
//! [analysis]
//! time_windows = "2010-01-01:2010-01-10,2010-01-11:2010-01-20"
//! percentiles = [5, 25, 50, 75, 95]
//! regions = ["north", "south"]
//!
//! [output]
//! write_per_region = false
//! write_separate_histogram = true
//!
//! [[bands]]
//! name = "chl"
//! num_bins = 5
//! min = 0.0
//! max = 10.0
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{AggregatorError, AggregatorResult};
use crate::report::OutputLayout;
use crate::stats::{BandMode, HistogramSpec, MAX_HISTOGRAM_BINS};
use crate::time::TimeWindowIndex;

/// Analysis configuration from file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegionAnalysisConfig {
    pub analysis: AnalysisSettings,
    #[serde(default)]
    pub output: OutputSettings,
    #[serde(default)]
    pub bands: Vec<BandConfig>,
}

/// What to aggregate and over which regions/time windows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisSettings {
    pub time_windows: String,
    #[serde(default = "default_percentiles")]
    pub percentiles: Vec<u32>,
    #[serde(default)]
    pub regions: Vec<String>,
}

/// Output routing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputSettings {
    #[serde(default = "default_true")]
    pub write_per_region: bool,
    #[serde(default = "default_true")]
    pub write_separate_histogram: bool,
    #[serde(default)]
    pub bin_values_as_ratio: bool,
    #[serde(default = "default_directory")]
    pub directory: PathBuf,
}

/// A band to aggregate, with optional histogram binning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BandConfig {
    pub name: String,
    #[serde(default)]
    pub num_bins: Option<i64>,
    #[serde(default)]
    pub min: Option<f64>,
    #[serde(default)]
    pub max: Option<f64>,
}

fn default_percentiles() -> Vec<u32> {
    vec![5, 25, 50, 75, 95]
}

fn default_true() -> bool {
    true
}

fn default_directory() -> PathBuf {
    PathBuf::from(".")
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            write_per_region: default_true(),
            write_separate_histogram: default_true(),
            bin_values_as_ratio: false,
            directory: default_directory(),
        }
    }
}

impl OutputSettings {
    pub fn layout(&self) -> OutputLayout {
        OutputLayout {
            write_per_region: self.write_per_region,
            write_separate_histogram: self.write_separate_histogram,
        }
    }
}

impl BandConfig {
    /// A band with a histogram of `num_bins` bins over `[min, max)`.
    pub fn new(name: impl Into<String>, num_bins: i64, min: f64, max: f64) -> Self {
        Self {
            name: name.into(),
            num_bins: Some(num_bins),
            min: Some(min),
            max: Some(max),
        }
    }

    /// A band reported with statistics only.
    pub fn stats_only(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            num_bins: None,
            min: None,
            max: None,
        }
    }

    /// Decide once whether this band carries a histogram.
    ///
    /// A histogram is enabled only when `num_bins`, `min` and `max` are all
    /// given and `num_bins > 0`.
    pub fn mode(&self) -> AggregatorResult<BandMode> {
        let (num_bins, low, high) = match (self.num_bins, self.min, self.max) {
            (Some(n), Some(low), Some(high)) if n > 0 => (n, low, high),
            _ => return Ok(BandMode::StatsOnly),
        };

        let num_bins = usize::try_from(num_bins)
            .ok()
            .filter(|&n| n <= MAX_HISTOGRAM_BINS)
            .ok_or_else(|| {
                AggregatorError::Configuration(format!(
                    "Band '{}' has {} histogram bins, at most {} are supported",
                    self.name, num_bins, MAX_HISTOGRAM_BINS
                ))
            })?;

        if !low.is_finite() || !high.is_finite() || low >= high {
            return Err(AggregatorError::Configuration(format!(
                "Band '{}' requires finite histogram bounds with min < max, got [{}, {}]",
                self.name, low, high
            )));
        }

        Ok(BandMode::WithHistogram(HistogramSpec::new(num_bins, low, high)?))
    }
}

impl RegionAnalysisConfig {
    /// Build a configuration in code with default output settings.
    pub fn new(
        time_windows: impl Into<String>,
        regions: Vec<String>,
        bands: Vec<BandConfig>,
    ) -> Self {
        Self {
            analysis: AnalysisSettings {
                time_windows: time_windows.into(),
                percentiles: default_percentiles(),
                regions,
            },
            output: OutputSettings::default(),
            bands,
        }
    }

    /// Load the configuration from a TOML file.
    ///
    /// # Arguments
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    /// * `Ok(RegionAnalysisConfig)` if the file was read, parsed and validated
    /// * `Err(AggregatorError::Configuration)` otherwise
    pub fn from_file<P: AsRef<Path>>(path: P) -> AggregatorResult<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            AggregatorError::Configuration(format!(
                "Failed to read config file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;

        Self::from_toml_str(&content)
    }

    /// Parse and validate a configuration from TOML text.
    pub fn from_toml_str(content: &str) -> AggregatorResult<Self> {
        let config: RegionAnalysisConfig = toml::from_str(content).map_err(|e| {
            AggregatorError::Configuration(format!("Failed to parse config file: {}", e))
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Check bands, percentiles and region names for consistency.
    pub fn validate(&self) -> AggregatorResult<()> {
        if self.bands.is_empty() {
            return Err("At least one band must be configured".into());
        }

        let mut band_names = HashSet::new();
        for band in &self.bands {
            if band.name.trim().is_empty() {
                return Err("Band names must not be empty".into());
            }
            if !band_names.insert(band.name.as_str()) {
                return Err(format!("Duplicate band name: {}", band.name).into());
            }
            band.mode()?;
        }

        for &p in &self.analysis.percentiles {
            if p > 100 {
                return Err(format!("Percentile {} is outside [0, 100]", p).into());
            }
        }
        if self.analysis.percentiles.windows(2).any(|w| w[0] >= w[1]) {
            return Err("Percentiles must be strictly ascending".into());
        }

        let mut region_names = HashSet::new();
        for region in &self.analysis.regions {
            if !region_names.insert(region.as_str()) {
                return Err(format!("Duplicate region name: {}", region).into());
            }
        }

        Ok(())
    }

    pub fn time_window_index(&self) -> AggregatorResult<TimeWindowIndex> {
        TimeWindowIndex::parse(&self.analysis.time_windows)
    }

    pub fn band_names(&self) -> Vec<String> {
        self.bands.iter().map(|b| b.name.clone()).collect()
    }

    pub fn band_modes(&self) -> AggregatorResult<Vec<BandMode>> {
        self.bands.iter().map(BandConfig::mode).collect()
    }
}

/// Parse percentiles from comma-separated text such as `"5,25,50,75,95"`.
///
/// Blank text yields an empty list (no percentile columns).
pub fn parse_percentiles(text: &str) -> AggregatorResult<Vec<u32>> {
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }

    text.split(',')
        .map(|part| {
            part.trim().parse::<u32>().map_err(|e| {
                AggregatorError::Configuration(format!("Invalid percentile '{}': {}", part.trim(), e))
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL_CONFIG: &str = r#"
[analysis]
time_windows = "2010-01-01:2010-01-10,2010-01-11:2010-01-20"
percentiles = [10, 50, 90]
regions = ["north", "south"]

[output]
write_per_region = false
write_separate_histogram = false
bin_values_as_ratio = true
directory = "reports"

[[bands]]
name = "chl"
num_bins = 5
min = 0.0
max = 10.0

[[bands]]
name = "tsm"
"#;

    #[test]
    fn test_parse_full_config() {
        let config = RegionAnalysisConfig::from_toml_str(FULL_CONFIG).unwrap();
        assert_eq!(config.analysis.percentiles, vec![10, 50, 90]);
        assert_eq!(config.analysis.regions, vec!["north", "south"]);
        assert!(!config.output.write_per_region);
        assert!(!config.output.write_separate_histogram);
        assert!(config.output.bin_values_as_ratio);
        assert_eq!(config.output.directory, PathBuf::from("reports"));
        assert_eq!(config.band_names(), vec!["chl", "tsm"]);

        let modes = config.band_modes().unwrap();
        assert!(matches!(modes[0], BandMode::WithHistogram(spec) if spec.num_bins() == 5));
        assert_eq!(modes[1], BandMode::StatsOnly);
        assert_eq!(config.time_window_index().unwrap().len(), 2);
    }

    #[test]
    fn test_defaults() {
        let toml = r#"
[analysis]
time_windows = "2010-01-01:2010-01-10"

[[bands]]
name = "b1"
"#;
        let config = RegionAnalysisConfig::from_toml_str(toml).unwrap();
        assert_eq!(config.analysis.percentiles, vec![5, 25, 50, 75, 95]);
        assert!(config.analysis.regions.is_empty());
        assert!(config.output.write_per_region);
        assert!(config.output.write_separate_histogram);
        assert!(!config.output.bin_values_as_ratio);
    }

    #[test]
    fn test_histogram_disabled_without_bounds_or_bins() {
        let missing_max = BandConfig {
            name: "b".to_string(),
            num_bins: Some(4),
            min: Some(0.0),
            max: None,
        };
        assert_eq!(missing_max.mode().unwrap(), BandMode::StatsOnly);
        assert_eq!(BandConfig::new("b", 0, 0.0, 1.0).mode().unwrap(), BandMode::StatsOnly);
        assert_eq!(BandConfig::new("b", -3, 0.0, 1.0).mode().unwrap(), BandMode::StatsOnly);
    }

    #[test]
    fn test_reject_inverted_histogram_bounds() {
        assert!(BandConfig::new("b", 5, 10.0, 0.0).mode().is_err());
        assert!(BandConfig::new("b", 5, 1.0, 1.0).mode().is_err());
    }

    #[test]
    fn test_reject_oversized_bin_count() {
        assert!(BandConfig::new("b", i64::MAX, 0.0, 1.0).mode().is_err());
        assert!(BandConfig::new("b", MAX_HISTOGRAM_BINS as i64 + 1, 0.0, 1.0).mode().is_err());

        let config = RegionAnalysisConfig::new(
            "2010-01-01:2010-01-10",
            vec!["r1".to_string()],
            vec![BandConfig::new("b1", i64::MAX, 0.0, 10.0)],
        );
        assert!(matches!(config.validate(), Err(AggregatorError::Configuration(_))));
    }

    #[test]
    fn test_reject_no_bands() {
        let toml = r#"
[analysis]
time_windows = "2010-01-01:2010-01-10"
"#;
        assert!(matches!(
            RegionAnalysisConfig::from_toml_str(toml),
            Err(AggregatorError::Configuration(_))
        ));
    }

    #[test]
    fn test_reject_duplicate_names() {
        let config = RegionAnalysisConfig::new(
            "2010-01-01:2010-01-10",
            vec!["r1".to_string()],
            vec![BandConfig::stats_only("b1"), BandConfig::stats_only("b1")],
        );
        assert!(config.validate().is_err());

        let config = RegionAnalysisConfig::new(
            "2010-01-01:2010-01-10",
            vec!["r1".to_string(), "r1".to_string()],
            vec![BandConfig::stats_only("b1")],
        );
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_reject_bad_percentiles() {
        let mut config = RegionAnalysisConfig::new(
            "2010-01-01:2010-01-10",
            vec![],
            vec![BandConfig::stats_only("b1")],
        );
        config.analysis.percentiles = vec![50, 25];
        assert!(config.validate().is_err());
        config.analysis.percentiles = vec![50, 101];
        assert!(config.validate().is_err());
        config.analysis.percentiles = vec![];
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_percentiles() {
        assert_eq!(parse_percentiles("5,25, 50 ,75,95").unwrap(), vec![5, 25, 50, 75, 95]);
        assert!(parse_percentiles("  ").unwrap().is_empty());
        assert!(parse_percentiles("5,x").is_err());
    }

    #[test]
    fn test_from_file() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(FULL_CONFIG.as_bytes()).unwrap();
        let config = RegionAnalysisConfig::from_file(file.path()).unwrap();
        assert_eq!(config.bands.len(), 2);

        assert!(RegionAnalysisConfig::from_file("/nonexistent/region-stats.toml").is_err());
    }
}

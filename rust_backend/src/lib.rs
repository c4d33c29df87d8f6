//! Region statistics aggregation.
//!
//! Condenses chunked per-pixel band samples, grouped by geographic region
//! and by calendar time window, into tab-separated summary tables: per band
//! count/min/max/mean/sigma/geometric mean/percentiles, plus an optional
//! fixed-width histogram.
//!
//! # Modules
//!
//! - [`time`]: time window parsing and lookup
//! - [`stats`]: per-band sample accumulation, statistics and histograms
//! - [`completion`]: tracking of declared regions not yet visited
//! - [`aggregator`]: the region/window aggregation lifecycle
//! - [`report`]: table layout and output sinks
//! - [`config`]: TOML configuration
//! - [`replay`]: replay of recorded sample chunks from JSON lines
//!
//! # Example
//!
//! ```
//! use chrono::{TimeZone, Utc};
//! use region_stats::config::{BandConfig, RegionAnalysisConfig};
//! use region_stats::report::MemoryWriterFactory;
//! use region_stats::RegionStatisticsAggregator;
//!
//! let config = RegionAnalysisConfig::new(
//!     "2010-01-01:2010-01-10",
//!     vec!["r1".to_string()],
//!     vec![BandConfig::new("b1", 5, 0.0, 10.0)],
//! );
//! let outputs = MemoryWriterFactory::new();
//! let mut ra = RegionStatisticsAggregator::from_config(&config, outputs.clone()).unwrap();
//!
//! ra.start_region(0, "r1").unwrap();
//! let time = Utc.with_ymd_and_hms(2010, 1, 1, 10, 0, 0).unwrap();
//! ra.add_data(time, 7, &[[1.0, 2.0, 3.0]]).unwrap();
//! ra.end_region().unwrap();
//! ra.close().unwrap();
//!
//! let stats = outputs.contents("region-r1-statistics.csv").unwrap();
//! assert_eq!(stats.lines().count(), 2);
//! ```

pub mod aggregator;
pub mod completion;
pub mod config;
pub mod error;
pub mod replay;
pub mod report;
pub mod stats;
pub mod time;

pub use aggregator::{Cell, CloseSummary, RegionStatisticsAggregator};
pub use config::RegionAnalysisConfig;
pub use error::{AggregatorError, AggregatorResult};

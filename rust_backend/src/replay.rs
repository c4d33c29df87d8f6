//! Replay of recorded sample chunks.
//!
//! Chunks are read from JSON lines, one chunk per line:
//!
//! ```text
//! {"region_index":0,"region_name":"r1","time":"2010-01-01T10:00:00Z","obs_count":7,"samples":[[1,2,3]]}
//! ```
//!
//! Each run of consecutive lines with the same region index becomes one
//! `start_region` / `add_data`... / `end_region` sequence. Blank lines are
//! skipped.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use crate::aggregator::{CloseSummary, RegionStatisticsAggregator};
use crate::config::RegionAnalysisConfig;
use crate::report::{DirectoryWriterFactory, WriterFactory};

/// One recorded chunk of samples.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkRecord {
    pub region_index: usize,
    pub region_name: String,
    pub time: DateTime<Utc>,
    pub obs_count: u64,
    pub samples: Vec<Vec<f64>>,
}

/// Feed every chunk from `reader` to the aggregator.
///
/// Returns the number of chunks replayed. The aggregator is left idle, ready
/// for `close`.
pub fn replay<F: WriterFactory, R: BufRead>(
    ra: &mut RegionStatisticsAggregator<F>,
    reader: R,
) -> Result<usize> {
    let mut open_region: Option<usize> = None;
    let mut count = 0;

    for (line_no, line) in reader.lines().enumerate() {
        let line_no = line_no + 1;
        let line = line.with_context(|| format!("Failed to read line {}", line_no))?;
        if line.trim().is_empty() {
            continue;
        }
        let chunk: ChunkRecord = serde_json::from_str(&line)
            .with_context(|| format!("Invalid chunk record on line {}", line_no))?;

        if open_region != Some(chunk.region_index) {
            if open_region.is_some() {
                ra.end_region()?;
            }
            ra.start_region(chunk.region_index, &chunk.region_name)
                .with_context(|| format!("Cannot start region on line {}", line_no))?;
            open_region = Some(chunk.region_index);
        }

        ra.add_data(chunk.time, chunk.obs_count, &chunk.samples)
            .with_context(|| format!("Rejected chunk on line {}", line_no))?;
        count += 1;
    }

    if open_region.is_some() {
        ra.end_region()?;
    }
    Ok(count)
}

/// Directory the report is written to: `override_dir` if given, else `[output].directory`.
pub fn output_directory(config: &RegionAnalysisConfig, override_dir: Option<&Path>) -> PathBuf {
    override_dir
        .map(Path::to_path_buf)
        .unwrap_or_else(|| config.output.directory.clone())
}

/// Replay a chunk file against a configuration and write the report.
pub fn replay_file(
    config: &RegionAnalysisConfig,
    chunks_path: &Path,
    output_dir: &Path,
) -> Result<CloseSummary> {
    let file = File::open(chunks_path)
        .with_context(|| format!("Failed to open chunk file {}", chunks_path.display()))?;

    let factory = DirectoryWriterFactory::new(output_dir);
    let mut ra = RegionStatisticsAggregator::from_config(config, factory)?;

    let chunks = replay(&mut ra, BufReader::new(file))?;
    log::info!("Replayed {} chunks from {}", chunks, chunks_path.display());

    Ok(ra.close()?)
}

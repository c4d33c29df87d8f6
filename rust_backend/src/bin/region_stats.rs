use anyhow::{Context, Result};
use env_logger::{Builder, Env};
use std::path::Path;

use region_stats::replay::{output_directory, replay_file};
use region_stats::RegionAnalysisConfig;

fn main() -> Result<()> {
    let mut builder = Builder::from_env(Env::default().default_filter_or("info"));
    builder.format_timestamp_secs();
    builder.init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 3 {
        let program = args.first().map(String::as_str).unwrap_or("region-stats");
        anyhow::bail!("Usage: {} <config.toml> <chunks.jsonl> [output-dir]", program);
    }
    let config_path = &args[1];
    let chunks_path = Path::new(&args[2]);

    let config = RegionAnalysisConfig::from_file(config_path)
        .with_context(|| format!("Failed to load configuration {}", config_path))?;
    let output_dir = output_directory(&config, args.get(3).map(|dir| Path::new(dir.as_str())));

    log::info!("Configuration: {}", config_path);
    log::info!("Chunks: {}", chunks_path.display());
    log::info!("Output directory: {}", output_dir.display());

    let summary = replay_file(&config, chunks_path, &output_dir)?;
    log::info!(
        "Done: {} rows in {} files under {}",
        summary.rows,
        summary.sinks,
        output_dir.display()
    );
    Ok(())
}

//! Ingest subcommand - load PubMed XML files into the store

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use pubstore_core::{SharedProgress, discover_sources, fmt_num};
use pubstore_store::DimensionPolicy;

use super::print_table;
use crate::config::Config;

#[derive(Args, Debug)]
pub struct IngestArgs {
    /// Source documents (.xml or .xml.gz); defaults to the data directory contents
    pub files: Vec<PathBuf>,

    /// DuckDB database file
    #[arg(long)]
    pub db: Option<PathBuf>,

    /// Directory searched for source documents when no files are given
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Files extracted in parallel
    #[arg(short, long)]
    pub workers: Option<usize>,

    /// Maximum number of files to ingest
    #[arg(short, long)]
    pub limit: Option<usize>,

    /// Handling of duplicate authors, references and mesh terms (strict or merge)
    #[arg(long)]
    pub policy: Option<DimensionPolicy>,
}

pub fn run(args: IngestArgs, config: &Config, progress: &SharedProgress) -> Result<()> {
    let inputs = if args.files.is_empty() {
        let data_dir = args
            .data_dir
            .unwrap_or_else(|| config.input.data_dir.clone());
        let found = discover_sources(&data_dir, &config.input.patterns)
            .with_context(|| format!("Failed to list sources in {}", data_dir.display()))?;
        log::info!("Found {} source files in {}", found.len(), data_dir.display());
        found
    } else {
        args.files
    };

    let ingest_config = pubstore_ingest::IngestConfig {
        db_path: args.db.unwrap_or_else(|| config.store.path.clone()),
        inputs,
        workers: config.workers.resolve(args.workers),
        policy: args.policy.unwrap_or(config.store.policy),
        max_files: args.limit,
    };

    let summary = pubstore_ingest::run(&ingest_config, progress)?;

    let mut rows = vec![
        (
            "Files",
            format!(
                "{}/{} ({} failed)",
                summary.completed_files, summary.total_files, summary.failed_files
            ),
        ),
        ("Papers", fmt_num(summary.total_papers)),
        ("Skipped articles", fmt_num(summary.skipped_records)),
        ("Database", ingest_config.db_path.display().to_string()),
        ("Time", format!("{:.1}s", summary.elapsed.as_secs_f64())),
    ];
    if summary.interrupted {
        rows.push(("Status", "interrupted".to_string()));
    }
    print_table("Ingest", "Value", &rows);

    for path in &summary.failures {
        log::warn!("Failed: {}", path.display());
    }

    if summary.failed_files > 0 {
        anyhow::bail!("{} of {} files failed", summary.failed_files, summary.total_files);
    }
    if summary.interrupted {
        anyhow::bail!("Interrupted");
    }

    Ok(())
}

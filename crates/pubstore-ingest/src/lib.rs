//! pubstore-ingest: PubMed XML files into the relational store
//!
//! Files are extracted in parallel rounds of `workers` files on a rayon pool;
//! each file's papers then go to the store as one batch, sequentially and in
//! input order. A shutdown request is honored between batches.

mod config;
mod worker;

pub use config::IngestConfig;
pub use worker::{FileBatch, extract_file};

use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use pubstore_core::{ProgressContext, fmt_num, is_shutdown_requested};
use pubstore_store::PaperStore;
use rayon::prelude::*;

/// Ingest run summary
#[derive(Debug, Default)]
pub struct Summary {
    pub total_files: usize,
    pub completed_files: usize,
    pub failed_files: usize,
    /// Files that failed, in input order
    pub failures: Vec<PathBuf>,
    pub total_papers: usize,
    /// Articles dropped for lacking a PMID
    pub skipped_records: usize,
    /// Stopped early on a shutdown request
    pub interrupted: bool,
    pub elapsed: Duration,
}

/// Run the ingest pipeline.
///
/// Per-file failures are logged and counted; only setup failures (opening the
/// store, creating the schema) abort the run.
pub fn run(config: &IngestConfig, progress: &ProgressContext) -> Result<Summary> {
    run_until(config, progress, is_shutdown_requested)
}

/// [`run`], stopping before the next batch once `stop` returns true.
fn run_until(
    config: &IngestConfig,
    progress: &ProgressContext,
    stop: impl Fn() -> bool,
) -> Result<Summary> {
    let start = Instant::now();

    if let Some(parent) = config.db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    let mut store = PaperStore::open(&config.db_path, config.policy)
        .with_context(|| format!("Failed to open store {}", config.db_path.display()))?;
    store.ensure_schema().context("Failed to create schema")?;

    let inputs: &[PathBuf] = match config.max_files {
        Some(limit) => &config.inputs[..limit.min(config.inputs.len())],
        None => &config.inputs,
    };
    let workers = config.workers.max(1);

    log::info!(
        "Ingesting {} files into {} with {} workers ({} policy)",
        inputs.len(),
        config.db_path.display(),
        workers,
        config.policy
    );

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .build()
        .context("Failed to create thread pool")?;

    let mut summary = Summary {
        total_files: inputs.len(),
        ..Default::default()
    };
    let pb = progress.files_bar("ingest", inputs.len());

    'rounds: for round in inputs.chunks(workers) {
        if stop() {
            interrupt(&mut summary);
            break;
        }

        let extracted: Vec<Result<FileBatch>> =
            pool.install(|| round.par_iter().map(|path| extract_file(path)).collect());

        for (path, result) in round.iter().zip(extracted) {
            if stop() {
                interrupt(&mut summary);
                break 'rounds;
            }
            if let Some(name) = path.file_name() {
                pb.set_message(name.to_string_lossy().into_owned());
            }

            match result.and_then(|batch| store_batch(&mut store, batch)) {
                Ok((papers, skipped)) => {
                    summary.completed_files += 1;
                    summary.total_papers += papers;
                    summary.skipped_records += skipped;
                }
                Err(e) => {
                    log::error!("{e:#}");
                    summary.failed_files += 1;
                    summary.failures.push(path.clone());
                }
            }
            pb.inc(1);
        }
    }

    pb.finish_and_clear();
    summary.elapsed = start.elapsed();

    log::info!("=== Ingest Summary ===");
    log::info!(
        "Files: {}/{} completed ({} failed)",
        summary.completed_files,
        summary.total_files,
        summary.failed_files
    );
    log::info!(
        "Papers: {} ({} skipped)",
        fmt_num(summary.total_papers),
        fmt_num(summary.skipped_records)
    );
    log::info!("Time: {:.1}s", summary.elapsed.as_secs_f64());

    Ok(summary)
}

fn interrupt(summary: &mut Summary) {
    log::warn!(
        "Shutdown requested, {} files not ingested",
        summary.total_files - summary.completed_files - summary.failed_files
    );
    summary.interrupted = true;
}

/// Write one file's papers as a single transaction.
fn store_batch(store: &mut PaperStore, batch: FileBatch) -> Result<(usize, usize)> {
    let written = store
        .insert_batch(&batch.papers)
        .with_context(|| format!("Failed to store {}", batch.path.display()))?;
    log::debug!(
        "{}: stored {} papers, {} authors, {} references, {} mesh terms",
        batch.path.display(),
        written.papers,
        written.authors,
        written.references,
        written.mesh_terms
    );
    Ok((batch.papers.len(), batch.skipped))
}

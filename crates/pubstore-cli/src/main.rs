//! pubstore - Load PubMed XML into a relational store
//!
//! Extracts article records from PubMed article-set documents and writes
//! them to a seven-table DuckDB schema, one transaction per file.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

mod cmd;
mod config;

use config::Config;

#[derive(Parser)]
#[command(name = "pubstore")]
#[command(about = "Load PubMed XML into a relational store")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    /// Config file path (default: ./pubstore.toml or ~/.config/pubstore/config.toml)
    #[arg(short, long, global = true)]
    config: Option<std::path::PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Extract papers from XML files and store them
    Ingest(cmd::ingest::IngestArgs),
    /// Print the papers of one XML file without storing them
    Extract(cmd::extract::ExtractArgs),
    /// Show row counts per table
    Stats(cmd::stats::StatsArgs),
    /// Show current configuration
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Progress context (TTY auto-detect)
    let progress = Arc::new(pubstore_core::ProgressContext::new());

    // Logging:
    //   TTY:     quiet (warn) unless --debug, progress bars show activity
    //   non-TTY: info unless --debug, logs are the only progress indicator
    let is_tty = progress.is_tty();
    let multi = if is_tty { Some(progress.multi()) } else { None };
    let quiet = is_tty && !cli.debug;
    pubstore_core::init_logging(quiet, cli.debug, multi).context("Failed to initialize logging")?;

    pubstore_core::install_signal_handlers().context("Failed to install signal handlers")?;

    let config = if let Some(path) = cli.config {
        Config::from_file(&path)?
    } else {
        Config::load()?
    };

    match cli.command {
        Command::Ingest(args) => cmd::ingest::run(args, &config, &progress),
        Command::Extract(args) => cmd::extract::run(args),
        Command::Stats(args) => cmd::stats::run(args, &config),
        Command::Config => {
            cmd::print_table(
                "Setting",
                "Value",
                &[
                    ("Data directory", config.input.data_dir.display().to_string()),
                    ("Patterns", config.input.patterns.join(", ")),
                    ("Database", config.store.path.display().to_string()),
                    ("Dimension policy", config.store.policy.to_string()),
                    (
                        "Workers",
                        format!("{} (max: {})", config.workers.default, config.workers.max),
                    ),
                ],
            );
            Ok(())
        }
    }
}

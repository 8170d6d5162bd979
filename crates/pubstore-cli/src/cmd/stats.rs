//! Stats subcommand - row counts per table

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use pubstore_core::fmt_num;
use pubstore_store::PaperStore;

use super::print_table;
use crate::config::Config;

#[derive(Args, Debug)]
pub struct StatsArgs {
    /// DuckDB database file
    #[arg(long)]
    pub db: Option<PathBuf>,
}

pub fn run(args: StatsArgs, config: &Config) -> Result<()> {
    let db_path = args.db.unwrap_or_else(|| config.store.path.clone());
    if !db_path.exists() {
        anyhow::bail!("No database at {}", db_path.display());
    }

    let mut store = PaperStore::open(&db_path, config.store.policy)
        .with_context(|| format!("Failed to open store {}", db_path.display()))?;
    store.ensure_schema().context("Failed to create schema")?;
    let counts = store.table_counts().context("Failed to count rows")?;

    let rows: Vec<_> = counts
        .iter()
        .map(|(table, n)| (table.name(), fmt_num(*n as usize)))
        .collect();
    print_table("Table", "Rows", &rows);
    Ok(())
}

//! Ingest pipeline configuration

use std::path::PathBuf;

use pubstore_store::DimensionPolicy;

/// Runtime configuration for an ingest run
#[derive(Debug, Clone)]
pub struct IngestConfig {
    /// DuckDB database file; created if missing
    pub db_path: PathBuf,
    /// Source documents, ingested in this order
    pub inputs: Vec<PathBuf>,
    /// Files extracted in parallel per round
    pub workers: usize,
    pub policy: DimensionPolicy,
    /// Maximum files to process (for testing)
    pub max_files: Option<usize>,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("pubstore.duckdb"),
            inputs: Vec::new(),
            workers: 4,
            policy: DimensionPolicy::Strict,
            max_files: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = IngestConfig::default();
        assert_eq!(config.db_path, PathBuf::from("pubstore.duckdb"));
        assert!(config.inputs.is_empty());
        assert_eq!(config.workers, 4);
        assert_eq!(config.policy, DimensionPolicy::Strict);
        assert!(config.max_files.is_none());
    }
}

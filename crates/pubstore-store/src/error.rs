//! Store errors

use crate::schema::Table;

/// Error from writing to or reading from the store.
#[derive(Debug)]
pub enum StoreError {
    /// A natural key collided; the batch was rolled back.
    UniqueViolation { table: Table, message: String },
    Database {
        context: String,
        source: duckdb::Error,
    },
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UniqueViolation { table, message } => {
                write!(f, "uniqueness violation in {table}: {message}")
            }
            Self::Database { context, source } => write!(f, "{context}: {source}"),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Database { source, .. } => Some(source),
            Self::UniqueViolation { .. } => None,
        }
    }
}

impl StoreError {
    pub fn is_unique_violation(&self) -> bool {
        matches!(self, Self::UniqueViolation { .. })
    }

    pub(crate) fn database(context: impl Into<String>, source: duckdb::Error) -> Self {
        Self::Database {
            context: context.into(),
            source,
        }
    }

    /// Classify a failure while inserting into `table`.
    pub(crate) fn insert(table: Table, source: duckdb::Error) -> Self {
        let message = source.to_string();
        if is_duplicate_key(&message) {
            Self::UniqueViolation { table, message }
        } else {
            Self::database(format!("insert into {table}"), source)
        }
    }
}

// DuckDB reports key collisions as "Constraint Error: Duplicate key ..." (or
// "PRIMARY KEY or UNIQUE constraint violated: duplicate key" in older builds)
fn is_duplicate_key(message: &str) -> bool {
    message.to_ascii_lowercase().contains("duplicate key")
}

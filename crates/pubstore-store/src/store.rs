use std::path::Path;

use duckdb::{Connection, Statement, Transaction, params};
use pubstore_pubmed::Paper;

use crate::error::StoreError;
use crate::policy::DimensionPolicy;
use crate::rows::BatchRows;
use crate::schema::{self, Table};

/// Rows written by one [`PaperStore::insert_batch`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub papers: u64,
    pub authors: u64,
    pub author_papers: u64,
    pub references: u64,
    pub reference_papers: u64,
    pub mesh_terms: u64,
    pub paper_mesh_terms: u64,
    /// References without a pmid, kept on the paper but not stored
    pub unkeyed_references: u64,
}

/// Exclusive connection to a DuckDB database holding the paper tables.
pub struct PaperStore {
    conn: Connection,
    policy: DimensionPolicy,
}

impl PaperStore {
    /// Open (or create) an on-disk database.
    pub fn open(path: &Path, policy: DimensionPolicy) -> Result<Self, StoreError> {
        let conn = Connection::open(path).map_err(|e| {
            StoreError::database(format!("open database {}", path.display()), e)
        })?;
        log::debug!("Opened store at {} ({policy} policy)", path.display());
        Ok(Self { conn, policy })
    }

    pub fn open_in_memory(policy: DimensionPolicy) -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| StoreError::database("open in-memory database", e))?;
        Ok(Self { conn, policy })
    }

    pub fn policy(&self) -> DimensionPolicy {
        self.policy
    }

    /// Create any missing tables. Idempotent; commits on its own.
    pub fn ensure_schema(&mut self) -> Result<(), StoreError> {
        let tx = self
            .conn
            .transaction()
            .map_err(|e| StoreError::database("begin schema transaction", e))?;
        tx.execute_batch(schema::CREATE_TABLES)
            .map_err(|e| StoreError::database("create tables", e))?;
        tx.commit()
            .map_err(|e| StoreError::database("commit schema", e))?;
        log::debug!("Schema ready");
        Ok(())
    }

    /// Write one batch atomically.
    ///
    /// On any error the transaction is rolled back and the store is left as
    /// it was before the call.
    pub fn insert_batch(&mut self, papers: &[Paper]) -> Result<BatchSummary, StoreError> {
        let mut rows = BatchRows::from_papers(papers);
        if self.policy == DimensionPolicy::Merge {
            rows.dedup_dimensions();
        }
        let policy = self.policy;

        let tx = self
            .conn
            .transaction()
            .map_err(|e| StoreError::database("begin batch transaction", e))?;

        let summary = BatchSummary {
            papers: insert_rows(&tx, Table::Paper, policy, &rows.papers, |stmt, p| {
                stmt.execute(params![
                    p.pmc_id,
                    p.title,
                    p.journal,
                    p.journal_abbreviation,
                    p.year,
                    p.month,
                    p.day,
                    p.pub_date,
                    p.page_numbers,
                    p.doi,
                    p.abstract_text,
                    p.quick_summary,
                    p.full_xml,
                ])
            })?,
            authors: insert_rows(&tx, Table::Author, policy, &rows.authors, |stmt, a| {
                stmt.execute(params![a.name, a.affiliation])
            })?,
            author_papers: insert_rows(
                &tx,
                Table::AuthorPaper,
                policy,
                &rows.author_papers,
                |stmt, l| stmt.execute(params![l.key, l.pmc_id]),
            )?,
            references: insert_rows(&tx, Table::Reference, policy, &rows.references, |stmt, r| {
                stmt.execute(params![r.pmid, r.citation])
            })?,
            reference_papers: insert_rows(
                &tx,
                Table::ReferencePaper,
                policy,
                &rows.reference_papers,
                |stmt, l| stmt.execute(params![l.key, l.pmc_id]),
            )?,
            mesh_terms: insert_rows(&tx, Table::MeshTerm, policy, &rows.mesh_terms, |stmt, t| {
                stmt.execute(params![t])
            })?,
            paper_mesh_terms: insert_rows(
                &tx,
                Table::PaperMeshTerm,
                policy,
                &rows.paper_mesh_terms,
                |stmt, l| stmt.execute(params![l.pmc_id, l.key]),
            )?,
            unkeyed_references: rows.unkeyed_references as u64,
        };

        tx.commit()
            .map_err(|e| StoreError::database("commit batch", e))?;

        log::debug!(
            "Committed batch: {} papers, {} authors, {} references, {} mesh terms",
            summary.papers,
            summary.authors,
            summary.references,
            summary.mesh_terms
        );
        Ok(summary)
    }

    /// Row count of every table, in insert order.
    pub fn table_counts(&self) -> Result<Vec<(Table, u64)>, StoreError> {
        Table::ALL
            .into_iter()
            .map(|table| Ok((table, self.count(table)?)))
            .collect()
    }

    /// Row count of one table.
    pub fn count(&self, table: Table) -> Result<u64, StoreError> {
        self.conn
            .query_row(&schema::count_sql(table), [], |row| row.get::<_, i64>(0))
            .map(|n| n as u64)
            .map_err(|e| StoreError::database(format!("count rows in {table}"), e))
    }
}

/// Run one prepared insert per row, returning the number of rows written.
fn insert_rows<T>(
    tx: &Transaction<'_>,
    table: Table,
    policy: DimensionPolicy,
    rows: &[T],
    mut execute: impl FnMut(&mut Statement<'_>, &T) -> duckdb::Result<usize>,
) -> Result<u64, StoreError> {
    if rows.is_empty() {
        return Ok(0);
    }

    let mut stmt = tx
        .prepare(&schema::insert_sql(table, policy))
        .map_err(|e| StoreError::database(format!("prepare insert into {table}"), e))?;

    let mut written = 0u64;
    for row in rows {
        written += execute(&mut stmt, row).map_err(|e| StoreError::insert(table, e))? as u64;
    }
    Ok(written)
}

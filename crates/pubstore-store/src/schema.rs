//! Table definitions and statement text

use crate::policy::DimensionPolicy;

/// The seven tables of the store, in parent-before-child insert order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Paper,
    Author,
    AuthorPaper,
    Reference,
    ReferencePaper,
    MeshTerm,
    PaperMeshTerm,
}

impl Table {
    pub const ALL: [Table; 7] = [
        Table::Paper,
        Table::Author,
        Table::AuthorPaper,
        Table::Reference,
        Table::ReferencePaper,
        Table::MeshTerm,
        Table::PaperMeshTerm,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Table::Paper => "paper",
            Table::Author => "author",
            Table::AuthorPaper => "author_paper",
            Table::Reference => "reference",
            Table::ReferencePaper => "reference_paper",
            Table::MeshTerm => "mesh_term",
            Table::PaperMeshTerm => "paper_mesh_term",
        }
    }

    /// Identifier as written in SQL; always quoted.
    pub(crate) fn ident(self) -> String {
        format!("\"{}\"", self.name())
    }

    /// Natural-key dimension tables (subject to [`DimensionPolicy`]).
    pub fn is_dimension(self) -> bool {
        matches!(self, Table::Author | Table::Reference | Table::MeshTerm)
    }
}

impl std::fmt::Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Create-if-absent DDL for all tables. Every column is text.
pub(crate) const CREATE_TABLES: &str = r#"
CREATE TABLE IF NOT EXISTS "paper" (
    pmc_id VARCHAR PRIMARY KEY,
    title VARCHAR,
    journal VARCHAR,
    journal_abbreviation VARCHAR,
    year VARCHAR,
    month VARCHAR,
    day VARCHAR,
    pub_date VARCHAR,
    page_numbers VARCHAR,
    doi VARCHAR,
    abstract VARCHAR,
    quick_summary VARCHAR,
    full_xml VARCHAR
);

CREATE TABLE IF NOT EXISTS "author" (
    name VARCHAR PRIMARY KEY,
    affiliation VARCHAR
);

CREATE TABLE IF NOT EXISTS "author_paper" (
    name VARCHAR REFERENCES "author" (name),
    pmc_id VARCHAR REFERENCES "paper" (pmc_id)
);

CREATE TABLE IF NOT EXISTS "reference" (
    pmid VARCHAR PRIMARY KEY,
    citation VARCHAR
);

CREATE TABLE IF NOT EXISTS "reference_paper" (
    pmid VARCHAR REFERENCES "reference" (pmid),
    pmc_id VARCHAR REFERENCES "paper" (pmc_id)
);

CREATE TABLE IF NOT EXISTS "mesh_term" (
    term VARCHAR PRIMARY KEY
);

CREATE TABLE IF NOT EXISTS "paper_mesh_term" (
    pmc_id VARCHAR REFERENCES "paper" (pmc_id),
    term VARCHAR REFERENCES "mesh_term" (term)
);
"#;

/// Parameterized insert for `table`.
///
/// Under [`DimensionPolicy::Merge`] the dimension tables ignore rows whose key
/// already exists. `paper` never does.
pub(crate) fn insert_sql(table: Table, policy: DimensionPolicy) -> String {
    let columns = match table {
        Table::Paper => {
            "pmc_id, title, journal, journal_abbreviation, year, month, day, pub_date, \
             page_numbers, doi, abstract, quick_summary, full_xml"
        }
        Table::Author => "name, affiliation",
        Table::AuthorPaper => "name, pmc_id",
        Table::Reference => "pmid, citation",
        Table::ReferencePaper => "pmid, pmc_id",
        Table::MeshTerm => "term",
        Table::PaperMeshTerm => "pmc_id, term",
    };
    let placeholders = vec!["?"; columns.split(',').count()].join(", ");
    let on_conflict = if table.is_dimension() && policy == DimensionPolicy::Merge {
        " ON CONFLICT DO NOTHING"
    } else {
        ""
    };

    format!(
        "INSERT INTO {} ({columns}) VALUES ({placeholders}){on_conflict}",
        table.ident()
    )
}

pub(crate) fn count_sql(table: Table) -> String {
    format!("SELECT count(*) FROM {}", table.ident())
}

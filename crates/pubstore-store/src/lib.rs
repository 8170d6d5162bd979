//! pubstore-store: relational projection of PubMed papers into DuckDB
//!
//! Each batch of [`Paper`](pubstore_pubmed::Paper) records is decomposed into
//! rows for seven tables and written under a single transaction: either the
//! whole batch lands or none of it does.

mod error;
mod policy;
mod rows;
mod schema;
mod store;

pub use error::StoreError;
pub use policy::DimensionPolicy;
pub use rows::{AuthorRow, BatchRows, LinkRow, ReferenceRow};
pub use schema::Table;
pub use store::{BatchSummary, PaperStore};

//! Pubstore PubMed - PubMed article-set extraction
//!
//! Turns a PubMed article-set XML document (E-utilities `efetch` output or a
//! baseline file) into a lazy sequence of flat [`Paper`] records.
//!
//! Missing optional elements never fail a record: absent scalars become empty
//! strings (or `None`), absent lists become empty vectors. Only malformed XML
//! and articles without a PMID are reported as errors.
//!
//! # Example
//!
//! ```
//! use pubstore_pubmed::extract_papers;
//!
//! let xml = "<PubmedArticleSet><PubmedArticle><MedlineCitation>\
//!            <PMID>42</PMID></MedlineCitation></PubmedArticle></PubmedArticleSet>";
//!
//! let papers: Vec<_> = extract_papers(xml).collect::<Result<_, _>>().unwrap();
//! assert_eq!(papers[0].pmc_id, "42");
//! assert_eq!(papers[0].abstract_text, "");
//! ```

pub mod error;
pub mod extract;
pub mod model;

// Re-exports
pub use error::ExtractError;
pub use extract::{PaperReader, extract_papers};
pub use model::{Author, NameParts, Paper, Reference, compose_pub_date, quick_summary};

//! Per-file extraction

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use pubstore_core::SourceDocument;
use pubstore_pubmed::{ExtractError, Paper, extract_papers};

/// Papers extracted from one source document.
#[derive(Debug)]
pub struct FileBatch {
    pub path: PathBuf,
    pub papers: Vec<Paper>,
    /// Articles dropped for lacking a PMID
    pub skipped: usize,
}

/// Load and extract one source document.
///
/// A malformed or truncated document fails the whole file; articles without
/// a PMID are skipped with a warning.
pub fn extract_file(path: &Path) -> Result<FileBatch> {
    let doc = SourceDocument::open(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let mut papers = Vec::new();
    let mut skipped = 0;

    for item in extract_papers(doc.as_str()) {
        match item {
            Ok(paper) => papers.push(paper),
            Err(e @ ExtractError::MissingPmid { .. }) => {
                log::warn!("{}: {e}, skipped", path.display());
                skipped += 1;
            }
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to parse {}", path.display()));
            }
        }
    }

    log::debug!(
        "{}: {} papers ({} skipped)",
        path.display(),
        papers.len(),
        skipped
    );

    Ok(FileBatch {
        path: path.to_path_buf(),
        papers,
        skipped,
    })
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn extract_counts_skipped() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "a.xml",
            "<PubmedArticleSet>\
             <PubmedArticle><MedlineCitation><PMID>1</PMID></MedlineCitation></PubmedArticle>\
             <PubmedArticle><MedlineCitation></MedlineCitation></PubmedArticle>\
             </PubmedArticleSet>",
        );

        let batch = extract_file(&path).unwrap();
        assert_eq!(batch.papers.len(), 1);
        assert_eq!(batch.skipped, 1);
        assert_eq!(batch.path, path);
    }

    #[test]
    fn malformed_file_fails_with_path() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "bad.xml",
            "<PubmedArticleSet><PubmedArticle><MedlineCitation><PMID>1</PMID></Oops>",
        );

        let err = extract_file(&path).unwrap_err();
        assert!(format!("{err:#}").contains("bad.xml"));
        assert!(err.downcast_ref::<ExtractError>().is_some());
    }

    #[test]
    fn missing_file_fails() {
        let dir = TempDir::new().unwrap();
        assert!(extract_file(&dir.path().join("absent.xml")).is_err());
    }
}

//! Source document discovery and loading
//!
//! Plain `.xml` files are memory-mapped; `.gz` files are decompressed into
//! memory. Either way the document is exposed as one `&str`.

use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;
use memmap2::Mmap;

/// Default glob patterns for source discovery.
pub const DEFAULT_PATTERNS: &[&str] = &["*.xml", "*.xml.gz"];

/// Find source files in `dir` matching any of `patterns`.
///
/// Results are deduplicated and sorted by path so ingest order is stable.
pub fn discover_sources(dir: &Path, patterns: &[String]) -> io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for pattern in patterns {
        let full = dir.join(pattern);
        let paths = glob::glob(&full.to_string_lossy())
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
        for entry in paths {
            let path = entry.map_err(glob::GlobError::into_error)?;
            if path.is_file() {
                files.push(path);
            }
        }
    }
    files.sort();
    files.dedup();
    Ok(files)
}

/// An article-set document held in memory.
pub enum SourceDocument {
    Mapped(Mmap),
    Owned(String),
}

impl std::fmt::Debug for SourceDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self {
            Self::Mapped(_) => "Mapped",
            Self::Owned(_) => "Owned",
        };
        f.debug_struct("SourceDocument")
            .field("kind", &kind)
            .field("len", &self.len())
            .finish()
    }
}

impl SourceDocument {
    /// Open a source file, decompressing `.gz` files.
    ///
    /// Fails with `InvalidData` if the content is not UTF-8.
    pub fn open(path: &Path) -> io::Result<Self> {
        let file = File::open(path)?;

        if path.extension().is_some_and(|ext| ext == "gz") {
            let mut text = String::new();
            GzDecoder::new(file).read_to_string(&mut text)?;
            return Ok(Self::Owned(text));
        }

        // mmap of an empty file fails on some platforms
        if file.metadata()?.len() == 0 {
            return Ok(Self::Owned(String::new()));
        }

        // SAFETY: the map is read-only and dropped with the document; files are
        // not expected to be modified while an ingest is running.
        let mmap = unsafe { Mmap::map(&file)? };
        std::str::from_utf8(&mmap).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        Ok(Self::Mapped(mmap))
    }

    /// Document text.
    pub fn as_str(&self) -> &str {
        match self {
            // SAFETY: validated as UTF-8 in `open`
            Self::Mapped(mmap) => unsafe { std::str::from_utf8_unchecked(mmap) },
            Self::Owned(text) => text,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Mapped(mmap) => mmap.len(),
            Self::Owned(text) => text.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use flate2::Compression;
    use flate2::write::GzEncoder;
    use tempfile::TempDir;

    use super::*;

    const DOC: &str = "<PubmedArticleSet></PubmedArticleSet>";

    fn patterns() -> Vec<String> {
        DEFAULT_PATTERNS.iter().map(|p| (*p).to_string()).collect()
    }

    #[test]
    fn open_plain_file_is_mapped() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a.xml");
        std::fs::write(&path, DOC).unwrap();

        let doc = SourceDocument::open(&path).unwrap();
        assert!(matches!(doc, SourceDocument::Mapped(_)));
        assert_eq!(doc.as_str(), DOC);
    }

    #[test]
    fn open_gzip_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a.xml.gz");
        let mut enc = GzEncoder::new(File::create(&path).unwrap(), Compression::default());
        enc.write_all(DOC.as_bytes()).unwrap();
        enc.finish().unwrap();

        let doc = SourceDocument::open(&path).unwrap();
        assert_eq!(doc.as_str(), DOC);
    }

    #[test]
    fn open_empty_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("empty.xml");
        std::fs::write(&path, "").unwrap();

        let doc = SourceDocument::open(&path).unwrap();
        assert!(doc.is_empty());
    }

    #[test]
    fn open_non_utf8_is_invalid_data() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.xml");
        std::fs::write(&path, [0xff, 0xfe, 0x00]).unwrap();

        let err = SourceDocument::open(&path).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn discover_sorted_and_filtered() {
        let dir = TempDir::new().unwrap();
        for name in ["b.xml", "a.xml", "c.xml.gz", "notes.txt"] {
            std::fs::write(dir.path().join(name), "").unwrap();
        }

        let found = discover_sources(dir.path(), &patterns()).unwrap();
        let names: Vec<_> = found
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.xml", "b.xml", "c.xml.gz"]);
    }

    #[test]
    fn discover_empty_dir() {
        let dir = TempDir::new().unwrap();
        assert!(discover_sources(dir.path(), &patterns()).unwrap().is_empty());
    }
}

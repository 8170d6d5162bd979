//! Extraction errors

/// Error from extracting papers out of an article-set document.
///
/// `Xml` and `UnexpectedEof` are fatal for the document: the reader yields
/// them once and then stops. `MissingPmid` concerns one article only.
#[derive(Debug)]
pub enum ExtractError {
    Xml {
        position: usize,
        source: quick_xml::Error,
    },
    UnexpectedEof {
        position: usize,
    },
    MissingPmid {
        /// 1-based position of the article in the document
        ordinal: usize,
    },
}

impl std::fmt::Display for ExtractError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Xml { position, source } => {
                write!(f, "malformed XML at byte {position}: {source}")
            }
            Self::UnexpectedEof { position } => {
                write!(f, "document ended inside PubmedArticle at byte {position}")
            }
            Self::MissingPmid { ordinal } => write!(f, "article #{ordinal} has no PMID"),
        }
    }
}

impl std::error::Error for ExtractError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Xml { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl ExtractError {
    /// Whether the rest of the document is unusable.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::MissingPmid { .. })
    }
}

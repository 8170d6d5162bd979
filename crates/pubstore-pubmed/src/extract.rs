//! PubMed XML extraction using quick-xml
//!
//! Streaming, path-scoped descent: each element handler only looks at the
//! children it knows and skips every other subtree, so a nested element with
//! a familiar name (a `PMID` inside `CommentsCorrections`, say) is never
//! mistaken for a field. Values found along a path land in `Option` slots of
//! a draft; missing paths simply leave the slot empty and the draft fills in
//! defaults when it is finished.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::error::ExtractError;
use crate::model::{Author, NameParts, Paper, Reference, compose_pub_date, quick_summary};

type XmlResult<T> = Result<T, quick_xml::Error>;

/// Lazy, single-pass iterator over the papers of one article-set document.
///
/// Yields one item per `PubmedArticle`. After a fatal error (malformed XML,
/// truncated document) it yields that error once and then ends.
pub struct PaperReader<'a> {
    source: &'a str,
    reader: Reader<&'a [u8]>,
    ordinal: usize,
    /// Open elements outside of any article
    depth: usize,
    finished: bool,
}

/// Iterate the papers in `xml`.
pub fn extract_papers(xml: &str) -> PaperReader<'_> {
    PaperReader::new(xml)
}

impl<'a> PaperReader<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            reader: Reader::from_str(source),
            ordinal: 0,
            depth: 0,
            finished: false,
        }
    }

    /// A fresh reader over the same document, starting from the top.
    pub fn restart(&self) -> Self {
        Self::new(self.source)
    }

    /// Number of `PubmedArticle` elements seen so far.
    pub fn articles_seen(&self) -> usize {
        self.ordinal
    }

    fn read_article(&mut self, start: usize) -> Result<Paper, ExtractError> {
        let mut draft = PaperDraft::default();
        let closed = parse_article(&mut self.reader, &mut draft)
            .map_err(|source| xml_error(&self.reader, source))?;
        let end = offset(&self.reader);
        if !closed {
            return Err(ExtractError::UnexpectedEof { position: end });
        }
        draft.finish(&self.source[start..end], self.ordinal)
    }
}

impl Iterator for PaperReader<'_> {
    type Item = Result<Paper, ExtractError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        let mut buf = Vec::new();
        loop {
            match self.reader.read_event_into(&mut buf) {
                // only the document root or a direct child of it is a record
                Ok(Event::Start(e)) if self.depth <= 1 && e.name().as_ref() == b"PubmedArticle" => {
                    let tag_end = offset(&self.reader);
                    // no raw '<' can appear inside a well-formed start tag
                    let start = self.source[..tag_end].rfind('<').unwrap_or(0);
                    self.ordinal += 1;

                    let item = self.read_article(start);
                    if item.as_ref().is_err_and(ExtractError::is_fatal) {
                        self.finished = true;
                    }
                    return Some(item);
                }
                Ok(Event::Start(_)) => self.depth += 1,
                Ok(Event::End(_)) => self.depth = self.depth.saturating_sub(1),
                Ok(Event::Eof) => {
                    self.finished = true;
                    return None;
                }
                Ok(_) => {}
                Err(source) => {
                    self.finished = true;
                    return Some(Err(xml_error(&self.reader, source)));
                }
            }
            buf.clear();
        }
    }
}

impl std::iter::FusedIterator for PaperReader<'_> {}

fn offset(reader: &Reader<&[u8]>) -> usize {
    reader.buffer_position() as usize
}

fn xml_error(reader: &Reader<&[u8]>, source: quick_xml::Error) -> ExtractError {
    ExtractError::Xml {
        position: offset(reader),
        source,
    }
}

/// Values collected for one article before defaults are applied.
#[derive(Debug, Default)]
struct PaperDraft {
    pmid: Option<String>,
    title: Option<String>,
    journal: Option<String>,
    journal_abbreviation: Option<String>,
    year: Option<String>,
    month: Option<String>,
    day: Option<String>,
    medline_date: Option<String>,
    page_numbers: Option<String>,
    elocation_doi: Option<String>,
    article_id_doi: Option<String>,
    authors: Vec<Author>,
    abstract_sections: Vec<String>,
    mesh_terms: Vec<String>,
    references: Vec<Reference>,
}

impl PaperDraft {
    fn finish(self, full_xml: &str, ordinal: usize) -> Result<Paper, ExtractError> {
        let pmc_id = self
            .pmid
            .filter(|pmid| !pmid.is_empty())
            .ok_or(ExtractError::MissingPmid { ordinal })?;

        let title = self.title.unwrap_or_default();
        let journal_abbreviation = self.journal_abbreviation.unwrap_or_default();
        let year = non_empty(self.year);
        let month = non_empty(self.month);
        let day = non_empty(self.day);
        let pub_date = compose_pub_date(
            year.as_deref(),
            month.as_deref(),
            day.as_deref(),
            self.medline_date.as_deref(),
        );
        let quick_summary = quick_summary(&pmc_id, &pub_date, &title, &journal_abbreviation);

        Ok(Paper {
            pmc_id,
            title,
            journal: self.journal.unwrap_or_default(),
            journal_abbreviation,
            year,
            month,
            day,
            pub_date,
            page_numbers: self.page_numbers,
            doi: self.elocation_doi.or(self.article_id_doi),
            authors: self.authors,
            abstract_text: self
                .abstract_sections
                .into_iter()
                .filter(|section| !section.is_empty())
                .collect::<Vec<_>>()
                .join(" "),
            mesh_terms: self.mesh_terms,
            references: self.references,
            quick_summary,
            full_xml: full_xml.to_string(),
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

/// Returns `false` if the document ended before `</PubmedArticle>`.
fn parse_article(reader: &mut Reader<&[u8]>, draft: &mut PaperDraft) -> XmlResult<bool> {
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => match e.name().as_ref() {
                b"MedlineCitation" => parse_medline_citation(reader, draft)?,
                b"PubmedData" => parse_pubmed_data(reader, draft)?,
                _ => skip_element(reader)?,
            },
            Event::End(e) if e.name().as_ref() == b"PubmedArticle" => return Ok(true),
            Event::Eof => return Ok(false),
            _ => {}
        }
        buf.clear();
    }
}

fn parse_medline_citation(reader: &mut Reader<&[u8]>, draft: &mut PaperDraft) -> XmlResult<()> {
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => match e.name().as_ref() {
                b"PMID" => {
                    let pmid = read_text(reader)?;
                    draft.pmid.get_or_insert(pmid);
                }
                b"Article" => parse_article_element(reader, draft)?,
                b"MeshHeadingList" => parse_mesh_list(reader, &mut draft.mesh_terms)?,
                _ => skip_element(reader)?,
            },
            Event::End(e) if e.name().as_ref() == b"MedlineCitation" => break,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(())
}

fn parse_article_element(reader: &mut Reader<&[u8]>, draft: &mut PaperDraft) -> XmlResult<()> {
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => match e.name().as_ref() {
                b"Journal" => parse_journal(reader, draft)?,
                b"ArticleTitle" => draft.title = Some(read_text(reader)?),
                b"Pagination" => parse_pagination(reader, draft)?,
                b"ELocationID" => {
                    let is_doi = attr_value(&e, b"EIdType").as_deref() == Some("doi");
                    let value = read_text(reader)?;
                    if is_doi && draft.elocation_doi.is_none() {
                        draft.elocation_doi = Some(value);
                    }
                }
                b"Abstract" => parse_abstract(reader, &mut draft.abstract_sections)?,
                b"AuthorList" => parse_author_list(reader, &mut draft.authors)?,
                _ => skip_element(reader)?,
            },
            Event::End(e) if e.name().as_ref() == b"Article" => break,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(())
}

fn parse_journal(reader: &mut Reader<&[u8]>, draft: &mut PaperDraft) -> XmlResult<()> {
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => match e.name().as_ref() {
                b"Title" => draft.journal = Some(read_text(reader)?),
                b"ISOAbbreviation" => draft.journal_abbreviation = Some(read_text(reader)?),
                b"JournalIssue" => parse_journal_issue(reader, draft)?,
                _ => skip_element(reader)?,
            },
            Event::End(e) if e.name().as_ref() == b"Journal" => break,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(())
}

fn parse_journal_issue(reader: &mut Reader<&[u8]>, draft: &mut PaperDraft) -> XmlResult<()> {
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => match e.name().as_ref() {
                b"PubDate" => parse_pub_date(reader, draft)?,
                _ => skip_element(reader)?,
            },
            Event::End(e) if e.name().as_ref() == b"JournalIssue" => break,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(())
}

fn parse_pub_date(reader: &mut Reader<&[u8]>, draft: &mut PaperDraft) -> XmlResult<()> {
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => match e.name().as_ref() {
                b"Year" => draft.year = Some(read_text(reader)?),
                b"Month" => draft.month = Some(read_text(reader)?),
                b"Day" => draft.day = Some(read_text(reader)?),
                b"MedlineDate" => draft.medline_date = Some(read_text(reader)?),
                _ => skip_element(reader)?,
            },
            Event::End(e) if e.name().as_ref() == b"PubDate" => break,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(())
}

fn parse_pagination(reader: &mut Reader<&[u8]>, draft: &mut PaperDraft) -> XmlResult<()> {
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => match e.name().as_ref() {
                b"MedlinePgn" => draft.page_numbers = Some(read_text(reader)?),
                _ => skip_element(reader)?,
            },
            Event::End(e) if e.name().as_ref() == b"Pagination" => break,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(())
}

fn parse_abstract(reader: &mut Reader<&[u8]>, sections: &mut Vec<String>) -> XmlResult<()> {
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => match e.name().as_ref() {
                b"AbstractText" => sections.push(read_text(reader)?),
                _ => skip_element(reader)?,
            },
            Event::End(e) if e.name().as_ref() == b"Abstract" => break,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(())
}

fn parse_author_list(reader: &mut Reader<&[u8]>, authors: &mut Vec<Author>) -> XmlResult<()> {
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => match e.name().as_ref() {
                b"Author" => authors.push(parse_author(reader)?),
                _ => skip_element(reader)?,
            },
            Event::End(e) if e.name().as_ref() == b"AuthorList" => break,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(())
}

fn parse_author(reader: &mut Reader<&[u8]>) -> XmlResult<Author> {
    let mut parts = NameParts::default();
    let mut affiliation = None;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => match e.name().as_ref() {
                b"LastName" => parts.last_name = Some(read_text(reader)?),
                b"ForeName" => parts.fore_name = Some(read_text(reader)?),
                b"Initials" => parts.initials = Some(read_text(reader)?),
                b"CollectiveName" => parts.collective_name = Some(read_text(reader)?),
                // several AffiliationInfo blocks: the last one wins
                b"AffiliationInfo" => {
                    if let Some(aff) = parse_affiliation(reader)? {
                        affiliation = Some(aff);
                    }
                }
                _ => skip_element(reader)?,
            },
            Event::End(e) if e.name().as_ref() == b"Author" => break,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(Author {
        name: parts.resolve(),
        affiliation: affiliation.unwrap_or_default(),
    })
}

fn parse_affiliation(reader: &mut Reader<&[u8]>) -> XmlResult<Option<String>> {
    let mut buf = Vec::new();
    let mut affiliation = None;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => match e.name().as_ref() {
                b"Affiliation" => affiliation = Some(read_text(reader)?),
                _ => skip_element(reader)?,
            },
            Event::End(e) if e.name().as_ref() == b"AffiliationInfo" => break,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(affiliation)
}

fn parse_mesh_list(reader: &mut Reader<&[u8]>, terms: &mut Vec<String>) -> XmlResult<()> {
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => match e.name().as_ref() {
                b"MeshHeading" => {
                    if let Some(term) = parse_mesh_heading(reader)? {
                        terms.push(term);
                    }
                }
                _ => skip_element(reader)?,
            },
            Event::End(e) if e.name().as_ref() == b"MeshHeadingList" => break,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(())
}

/// Descriptor name of a `MeshHeading`; qualifiers are not kept.
fn parse_mesh_heading(reader: &mut Reader<&[u8]>) -> XmlResult<Option<String>> {
    let mut buf = Vec::new();
    let mut descriptor = None;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => match e.name().as_ref() {
                b"DescriptorName" => descriptor = Some(read_text(reader)?),
                _ => skip_element(reader)?,
            },
            Event::End(e) if e.name().as_ref() == b"MeshHeading" => break,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(descriptor.filter(|d| !d.is_empty()))
}

fn parse_pubmed_data(reader: &mut Reader<&[u8]>, draft: &mut PaperDraft) -> XmlResult<()> {
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => match e.name().as_ref() {
                b"ArticleIdList" => {
                    let doi = parse_article_ids(reader)?
                        .into_iter()
                        .find(|(id_type, _)| id_type.as_deref() == Some("doi"));
                    if let Some((_, doi)) = doi {
                        draft.article_id_doi = Some(doi);
                    }
                }
                b"ReferenceList" => parse_reference_list(reader, &mut draft.references)?,
                _ => skip_element(reader)?,
            },
            Event::End(e) if e.name().as_ref() == b"PubmedData" => break,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(())
}

/// `(IdType, value)` pairs of an `ArticleIdList`, in document order.
fn parse_article_ids(reader: &mut Reader<&[u8]>) -> XmlResult<Vec<(Option<String>, String)>> {
    let mut ids = Vec::new();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => match e.name().as_ref() {
                b"ArticleId" => {
                    let id_type = attr_value(&e, b"IdType");
                    ids.push((id_type, read_text(reader)?));
                }
                _ => skip_element(reader)?,
            },
            Event::End(e) if e.name().as_ref() == b"ArticleIdList" => break,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(ids)
}

/// Reference lists may be nested (sectioned bibliographies); all levels are flattened.
fn parse_reference_list(
    reader: &mut Reader<&[u8]>,
    references: &mut Vec<Reference>,
) -> XmlResult<()> {
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => match e.name().as_ref() {
                b"Reference" => references.push(parse_reference(reader)?),
                b"ReferenceList" => parse_reference_list(reader, references)?,
                _ => skip_element(reader)?,
            },
            Event::End(e) if e.name().as_ref() == b"ReferenceList" => break,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(())
}

fn parse_reference(reader: &mut Reader<&[u8]>) -> XmlResult<Reference> {
    let mut citation = None;
    let mut pmid = None;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => match e.name().as_ref() {
                b"Citation" => citation = Some(read_text(reader)?),
                b"ArticleIdList" => pmid = cited_pmid(parse_article_ids(reader)?),
                _ => skip_element(reader)?,
            },
            Event::End(e) if e.name().as_ref() == b"Reference" => break,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(Reference {
        citation: citation.unwrap_or_default(),
        pmid,
    })
}

/// Prefer the `pubmed`-typed id, else the first id listed.
fn cited_pmid(ids: Vec<(Option<String>, String)>) -> Option<String> {
    let pubmed = ids
        .iter()
        .position(|(id_type, _)| id_type.as_deref() == Some("pubmed"))
        .unwrap_or(0);
    ids.into_iter()
        .nth(pubmed)
        .map(|(_, value)| value)
        .filter(|value| !value.is_empty())
}

fn attr_value(e: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.as_ref() == key)
        .map(|attr| String::from_utf8_lossy(&attr.value).into_owned())
}

/// Skip the rest of the element whose start tag was just read.
fn skip_element(reader: &mut Reader<&[u8]>) -> XmlResult<()> {
    let mut buf = Vec::new();
    let mut depth = 1usize;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(_) => depth += 1,
            Event::End(_) => {
                depth -= 1;
                if depth == 0 {
                    break;
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(())
}

/// Text of the element whose start tag was just read, including text of
/// nested inline markup (`<i>`, `<sup>`, ...), trimmed.
fn read_text(reader: &mut Reader<&[u8]>) -> XmlResult<String> {
    let mut text = String::new();
    collect_text(reader, &mut text)?;
    Ok(text.trim().to_string())
}

fn collect_text(reader: &mut Reader<&[u8]>, text: &mut String) -> XmlResult<()> {
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Text(e) => text.push_str(&e.unescape()?),
            Event::CData(e) => text.push_str(&String::from_utf8_lossy(&e)),
            Event::Start(_) => collect_text(reader, text)?,
            Event::End(_) | Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(())
}

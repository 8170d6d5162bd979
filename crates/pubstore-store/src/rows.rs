//! Decomposition of papers into per-table rows

use pubstore_pubmed::Paper;
use rustc_hash::FxHashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthorRow<'a> {
    pub name: &'a str,
    pub affiliation: &'a str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferenceRow<'a> {
    pub pmid: &'a str,
    pub citation: &'a str,
}

/// Join-table row: a dimension key paired with the citing paper.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkRow<'a> {
    pub key: &'a str,
    pub pmc_id: &'a str,
}

/// Rows for all seven tables, borrowed from a batch of papers.
///
/// Row order follows input order: papers in batch order, nested entities in
/// document order within each paper.
#[derive(Debug, Default)]
pub struct BatchRows<'a> {
    pub papers: Vec<&'a Paper>,
    pub authors: Vec<AuthorRow<'a>>,
    pub author_papers: Vec<LinkRow<'a>>,
    pub references: Vec<ReferenceRow<'a>>,
    pub reference_papers: Vec<LinkRow<'a>>,
    pub mesh_terms: Vec<&'a str>,
    pub paper_mesh_terms: Vec<LinkRow<'a>>,
    /// References left out because they carry no pmid
    pub unkeyed_references: usize,
}

impl<'a> BatchRows<'a> {
    pub fn from_papers(papers: &'a [Paper]) -> Self {
        let mut rows = Self::default();

        for paper in papers {
            let pmc_id = paper.pmc_id.as_str();
            rows.papers.push(paper);

            for author in &paper.authors {
                rows.authors.push(AuthorRow {
                    name: &author.name,
                    affiliation: &author.affiliation,
                });
                rows.author_papers.push(LinkRow {
                    key: &author.name,
                    pmc_id,
                });
            }

            for reference in &paper.references {
                let Some(pmid) = reference.pmid.as_deref() else {
                    rows.unkeyed_references += 1;
                    continue;
                };
                rows.references.push(ReferenceRow {
                    pmid,
                    citation: &reference.citation,
                });
                rows.reference_papers.push(LinkRow { key: pmid, pmc_id });
            }

            for term in &paper.mesh_terms {
                rows.mesh_terms.push(term);
                rows.paper_mesh_terms.push(LinkRow { key: term, pmc_id });
            }
        }

        rows
    }

    /// Drop repeated author, reference and mesh_term rows, keeping the first
    /// occurrence of each key. Join-table rows are untouched.
    pub fn dedup_dimensions(&mut self) {
        let mut seen = FxHashSet::default();
        self.authors.retain(|row| seen.insert(row.name));

        seen.clear();
        self.references.retain(|row| seen.insert(row.pmid));

        seen.clear();
        self.mesh_terms.retain(|term| seen.insert(*term));
    }
}

#[cfg(test)]
mod tests {
    use pubstore_pubmed::{Author, Reference};

    use super::*;

    fn paper(pmc_id: &str, authors: &[&str], refs: &[Option<&str>], terms: &[&str]) -> Paper {
        Paper {
            pmc_id: pmc_id.to_string(),
            title: format!("Title {pmc_id}"),
            journal: String::new(),
            journal_abbreviation: String::new(),
            year: None,
            month: None,
            day: None,
            pub_date: String::new(),
            page_numbers: None,
            doi: None,
            authors: authors
                .iter()
                .map(|name| Author {
                    name: (*name).to_string(),
                    affiliation: String::new(),
                })
                .collect(),
            abstract_text: String::new(),
            mesh_terms: terms.iter().map(|t| (*t).to_string()).collect(),
            references: refs
                .iter()
                .map(|pmid| Reference {
                    citation: "cited".to_string(),
                    pmid: pmid.map(String::from),
                })
                .collect(),
            quick_summary: String::new(),
            full_xml: String::new(),
        }
    }

    #[test]
    fn one_row_per_nested_entity() {
        let papers = vec![
            paper("1", &["A", "B"], &[Some("10")], &["Humans"]),
            paper("2", &["C"], &[], &["Humans", "Mice"]),
        ];
        let rows = BatchRows::from_papers(&papers);

        assert_eq!(rows.papers.len(), 2);
        assert_eq!(rows.authors.len(), 3);
        assert_eq!(rows.author_papers.len(), 3);
        assert_eq!(rows.references.len(), 1);
        assert_eq!(rows.reference_papers.len(), 1);
        assert_eq!(rows.mesh_terms.len(), 3);
        assert_eq!(rows.paper_mesh_terms.len(), 3);
    }

    #[test]
    fn rows_follow_input_order() {
        let papers = vec![paper("1", &["A", "B"], &[], &[]), paper("2", &["C"], &[], &[])];
        let rows = BatchRows::from_papers(&papers);

        let links: Vec<_> = rows.author_papers.iter().map(|l| (l.key, l.pmc_id)).collect();
        assert_eq!(links, vec![("A", "1"), ("B", "1"), ("C", "2")]);
    }

    #[test]
    fn unkeyed_references_are_counted_not_projected() {
        let papers = vec![paper("1", &[], &[None, Some("7"), None], &[])];
        let rows = BatchRows::from_papers(&papers);

        assert_eq!(rows.references.len(), 1);
        assert_eq!(rows.references[0].pmid, "7");
        assert_eq!(rows.unkeyed_references, 2);
    }

    #[test]
    fn dedup_keeps_first_and_links() {
        let papers = vec![
            paper("1", &["A"], &[Some("10")], &["Humans"]),
            paper("2", &["A", "B"], &[Some("10")], &["Humans"]),
        ];
        let mut rows = BatchRows::from_papers(&papers);
        rows.dedup_dimensions();

        let names: Vec<_> = rows.authors.iter().map(|a| a.name).collect();
        assert_eq!(names, vec!["A", "B"]);
        assert_eq!(rows.references.len(), 1);
        assert_eq!(rows.mesh_terms, vec!["Humans"]);
        assert_eq!(rows.author_papers.len(), 3);
        assert_eq!(rows.reference_papers.len(), 2);
        assert_eq!(rows.paper_mesh_terms.len(), 2);
    }

    #[test]
    fn empty_batch() {
        let rows = BatchRows::from_papers(&[]);
        assert!(rows.papers.is_empty());
        assert!(rows.authors.is_empty());
    }
}

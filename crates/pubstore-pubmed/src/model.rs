//! Flat records extracted from PubMed XML

use serde::Serialize;

/// Separator used in [`quick_summary`].
pub const SUMMARY_SEPARATOR: &str = " - ";

/// Suffix appended to collective (group) author names.
pub const COLLECTIVE_SUFFIX: &str = " (Collective)";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Author {
    /// Rendered name; natural key of the `author` table
    pub name: String,
    /// Empty when the author has no `AffiliationInfo`
    pub affiliation: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reference {
    pub citation: String,
    /// PMID of the cited work, when the reference carries one
    pub pmid: Option<String>,
}

/// One `PubmedArticle`, flattened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Paper {
    /// PubMed identifier (PMID). Never empty.
    pub pmc_id: String,
    pub title: String,
    pub journal: String,
    pub journal_abbreviation: String,
    pub year: Option<String>,
    pub month: Option<String>,
    pub day: Option<String>,
    pub pub_date: String,
    pub page_numbers: Option<String>,
    pub doi: Option<String>,
    pub authors: Vec<Author>,
    pub abstract_text: String,
    pub mesh_terms: Vec<String>,
    pub references: Vec<Reference>,
    pub quick_summary: String,
    /// The `<PubmedArticle>` element exactly as it appears in the source
    pub full_xml: String,
}

/// Name components of an `<Author>` element, as found.
#[derive(Debug, Default, Clone)]
pub struct NameParts {
    pub last_name: Option<String>,
    pub fore_name: Option<String>,
    pub initials: Option<String>,
    pub collective_name: Option<String>,
}

impl NameParts {
    /// Render the author name.
    ///
    /// A collective name wins outright. Otherwise: last name, then
    /// `" " + fore name`, then `" " + initials`, each only if present. A
    /// missing last name leaves an empty leading component.
    pub fn resolve(&self) -> String {
        if let Some(collective) = &self.collective_name {
            return format!("{collective}{COLLECTIVE_SUFFIX}");
        }

        let mut name = self.last_name.clone().unwrap_or_default();
        for part in [&self.fore_name, &self.initials].into_iter().flatten() {
            name.push(' ');
            name.push_str(part);
        }
        name
    }
}

/// Build the display publication date.
///
/// `medline_date` (free text) replaces the numeric composition when present.
/// Otherwise the longest present prefix of year, month, day joined by `-`:
/// month only counts after a year, day only after a month. Empty parts count
/// as absent.
pub fn compose_pub_date(
    year: Option<&str>,
    month: Option<&str>,
    day: Option<&str>,
    medline_date: Option<&str>,
) -> String {
    fn present(part: Option<&str>) -> Option<&str> {
        part.filter(|s| !s.is_empty())
    }
    let (year, month, day) = (present(year), present(month), present(day));

    if let Some(medline) = present(medline_date) {
        return medline.to_string();
    }

    let Some(year) = year else {
        return String::new();
    };
    match (month, day) {
        (Some(month), Some(day)) => format!("{year}-{month}-{day}"),
        (Some(month), None) => format!("{year}-{month}"),
        (None, _) => year.to_string(),
    }
}

/// One-line display string: `pmid - date - title - journal abbreviation`.
pub fn quick_summary(
    pmc_id: &str,
    pub_date: &str,
    title: &str,
    journal_abbreviation: &str,
) -> String {
    [pmc_id, pub_date, title, journal_abbreviation].join(SUMMARY_SEPARATOR)
}

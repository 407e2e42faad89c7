//! External bibliography evidence.
//!
//! The crawler that talks to the remote bibliography service lives outside
//! this crate. What the reconciliation core sees is the
//! [`BibliographySource`] trait: publication records per author key,
//! already fetched and cleaned. A read-through [`ResponseCache`] can sit in
//! front of any source.

pub mod cache;
pub mod memory;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

pub use cache::{CachedBibliography, InMemoryResponseCache, ResponseCache};
pub use memory::StaticBibliography;

use crate::config::BibliographyConfig;
use crate::error::CoiResult;
use crate::publication::Publication;
use crate::reviewer::ReviewerEvidence;

/// One co-author as returned by the bibliography service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoAuthor {
    /// Name as printed on the paper.
    pub name: String,

    /// The service's stable author key, when it could be resolved.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
}

impl CoAuthor {
    /// Creates a co-author without a key.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            key: None,
        }
    }

    /// Creates a co-author with a key.
    #[must_use]
    pub fn with_key(name: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            key: Some(key.into()),
        }
    }
}

/// A publication as returned by the bibliography service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicationRecord {
    /// Bibliography key, e.g. `conf/isca/DoeS17`.
    pub key: String,

    /// Title.
    pub title: String,

    /// Year of publication.
    pub year: i32,

    /// Co-authors in author-list order.
    #[serde(default)]
    pub authors: Vec<CoAuthor>,

    /// Edited volumes list editors, not authors, and are not evidence.
    #[serde(default)]
    pub edited_volume: bool,
}

/// Read-only access to pre-materialized bibliography data.
pub trait BibliographySource {
    /// Returns every publication of the author with the given key.
    ///
    /// An unknown key yields an empty list.
    ///
    /// # Errors
    /// Implementation-specific; the in-crate sources only fail on cache
    /// corruption.
    fn fetch_publications_for_author_key(&self, key: &str) -> CoiResult<Vec<PublicationRecord>>;
}

/// Pulls the reviewer's publications from `source` into the augmented view.
///
/// Reviewers without an author key are left untouched. Returns the number
/// of publications accepted.
///
/// # Errors
/// Propagates source errors.
pub fn collect_evidence<S: BibliographySource + ?Sized>(
    source: &S,
    evidence: &mut ReviewerEvidence,
    config: &BibliographyConfig,
) -> CoiResult<usize> {
    let Some(key) = evidence.declared.identity.key().map(str::to_string) else {
        warn!(email = %evidence.email(), "reviewer has no bibliography key");
        return Ok(0);
    };

    let records = source.fetch_publications_for_author_key(&key)?;
    let mut accepted = 0;
    for record in &records {
        if evidence.add_publication(Publication::from(record), config) {
            accepted += 1;
        }
    }
    debug!(
        email = %evidence.email(),
        key = %key,
        fetched = records.len(),
        accepted,
        "collected bibliography evidence"
    );
    Ok(accepted)
}

/// Replaces commas in a title so it survives a CSV round trip.
#[must_use]
pub fn sanitize_title(title: &str) -> String {
    title.replace(',', " ")
}

/// Repairs an author list that the service split into single characters.
///
/// A list made only of one-character entries is one name spelled out and is
/// joined back together.
#[must_use]
pub fn sanitize_coauthors(authors: Vec<String>) -> Vec<String> {
    if !authors.is_empty() && authors.iter().all(|a| a.chars().count() == 1) {
        return vec![authors.concat()];
    }
    authors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ParserConfig;
    use crate::conflict::DeclarationParser;
    use crate::identity::InstitutionRoster;
    use crate::reviewer::Reviewer;

    fn evidence(key: Option<&str>) -> ReviewerEvidence {
        let parser = DeclarationParser::new(&ParserConfig::default()).unwrap();
        let mut builder = Reviewer::builder().name("Jane", "Doe").email("jane@example.org");
        if let Some(key) = key {
            builder = builder.key(key);
        }
        ReviewerEvidence::new(builder.build(&parser, &InstitutionRoster::new()).unwrap())
    }

    fn source() -> StaticBibliography {
        let mut source = StaticBibliography::new();
        source.insert(
            "d/JaneDoe",
            PublicationRecord {
                key: "conf/isca/DoeS17".to_string(),
                title: "Fast Caches".to_string(),
                year: 2017,
                authors: vec![
                    CoAuthor::with_key("Jane Doe", "d/JaneDoe"),
                    CoAuthor::with_key("John Smith", "s/JohnSmith"),
                ],
                edited_volume: false,
            },
        );
        source.insert(
            "d/JaneDoe",
            PublicationRecord {
                key: "conf/micro/Doe09".to_string(),
                title: "Old Caches".to_string(),
                year: 2009,
                authors: vec![CoAuthor::new("Alan Turing")],
                edited_volume: false,
            },
        );
        source
    }

    #[test]
    fn test_collect_evidence_with_cutoff() {
        let mut ev = evidence(Some("d/JaneDoe"));
        let config = BibliographyConfig { min_year: Some(2012) };
        let accepted = collect_evidence(&source(), &mut ev, &config).unwrap();
        assert_eq!(accepted, 1);
        assert!(ev.augmented.conflicts_with_person("John Smith").is_some());
        assert!(ev.augmented.conflicts_with_person("Alan Turing").is_none());
        assert!(ev.declared.conflicts.is_empty());
    }

    #[test]
    fn test_collect_evidence_without_key() {
        let mut ev = evidence(None);
        let accepted = collect_evidence(&source(), &mut ev, &BibliographyConfig::default()).unwrap();
        assert_eq!(accepted, 0);
        assert!(ev.augmented.publications.is_empty());
    }

    #[test]
    fn test_sanitize_title() {
        assert_eq!(sanitize_title("Caches, Revisited"), "Caches  Revisited");
    }

    #[test]
    fn test_sanitize_coauthors() {
        let split: Vec<String> = ["J", "a", "n", "e"].iter().map(ToString::to_string).collect();
        assert_eq!(sanitize_coauthors(split), vec!["Jane".to_string()]);

        let normal = vec!["Jane Doe".to_string(), "X".to_string()];
        assert_eq!(sanitize_coauthors(normal.clone()), normal);
        assert!(sanitize_coauthors(Vec::new()).is_empty());
    }

    #[test]
    fn test_record_deserialize_defaults() {
        let record: PublicationRecord =
            serde_json::from_str(r#"{"key":"k","title":"t","year":2020}"#).unwrap();
        assert!(record.authors.is_empty());
        assert!(!record.edited_volume);
    }
}

//! In-memory bibliography source.

use std::collections::HashMap;

use super::{BibliographySource, PublicationRecord};
use crate::error::CoiResult;

/// A bibliography fully loaded into memory, keyed by author key.
#[derive(Debug, Clone, Default)]
pub struct StaticBibliography {
    by_author: HashMap<String, Vec<PublicationRecord>>,
}

impl StaticBibliography {
    /// Creates an empty bibliography.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a publication to an author's list.
    pub fn insert(&mut self, author_key: impl Into<String>, record: PublicationRecord) {
        self.by_author.entry(author_key.into()).or_default().push(record);
    }

    /// Number of authors with at least one publication.
    #[must_use]
    pub fn author_count(&self) -> usize {
        self.by_author.len()
    }
}

impl BibliographySource for StaticBibliography {
    fn fetch_publications_for_author_key(&self, key: &str) -> CoiResult<Vec<PublicationRecord>> {
        Ok(self.by_author.get(key).cloned().unwrap_or_default())
    }
}

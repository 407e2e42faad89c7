//! The institution roster: known institutions and their aliases.

use tracing::trace;

use super::institution::Institution;
use super::similarity::is_similar;

/// Known institutions in roster order.
///
/// Lookups scan in insertion order and return the first institution with an
/// alias matching the raw string, so an earlier roster row wins ties.
#[derive(Debug, Clone, Default)]
pub struct InstitutionRoster {
    entries: Vec<(String, Institution)>,
}

impl InstitutionRoster {
    /// Creates an empty roster.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) the institution stored under `key`.
    pub fn insert(&mut self, key: impl Into<String>, aliases: Vec<String>) {
        let key = key.into();
        let institution = Institution::new(aliases);
        if let Some(slot) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            slot.1 = institution;
        } else {
            self.entries.push((key, institution));
        }
    }

    /// Returns the institution stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Institution> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, i)| i)
    }

    /// Resolves a raw affiliation string.
    ///
    /// Falls back to a singleton institution built from `raw` when nothing
    /// in the roster matches.
    #[must_use]
    pub fn resolve(&self, raw: &str) -> Institution {
        for (key, institution) in &self.entries {
            if institution.aliases().iter().any(|alias| is_similar(alias, raw)) {
                trace!(raw, key = key.as_str(), "resolved institution");
                return institution.clone();
            }
        }
        Institution::singleton(raw)
    }

    /// Number of roster entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the roster has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<Vec<String>> for InstitutionRoster {
    /// Builds a roster from rows whose first column is the key and whose
    /// columns are all aliases.
    fn from_iter<I: IntoIterator<Item = Vec<String>>>(rows: I) -> Self {
        let mut roster = Self::new();
        for row in rows {
            let aliases: Vec<String> = row.into_iter().filter(|c| !c.trim().is_empty()).collect();
            if let Some(key) = aliases.first().cloned() {
                roster.insert(key, aliases);
            }
        }
        roster
    }
}

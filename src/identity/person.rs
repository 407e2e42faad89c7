//! People: authors, reviewers and declared collaborators.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::similarity::is_similar;
use super::Identity;

/// A person referenced by a declaration, an author list, or a bibliography
/// record.
///
/// When both sides of a comparison carry a canonical key (for example a
/// bibliography author key) the keys decide alone. Two "John Smith" entries
/// with different keys are different people; one person whose name changed
/// between papers is still one person.
///
/// # Examples
///
/// ```
/// use coi_recon::{Identity, Person};
///
/// let a = Person::with_key("Jane Doe", "d/JaneDoe");
/// let b = Person::with_key("J. Doe-Smith", "d/JaneDoe");
/// assert!(a.matches(&b));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    /// Display name as it appeared in the source.
    pub name: String,

    /// Stable external identifier, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    key: Option<String>,

    /// Free-form provenance, e.g. the publication the name was taken from.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub note: String,
}

impl Person {
    /// Creates a person known only by name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            key: None,
            note: String::new(),
        }
    }

    /// Creates a person with a canonical key. An empty key is ignored.
    #[must_use]
    pub fn with_key(name: impl Into<String>, key: impl Into<String>) -> Self {
        let mut person = Self::new(name);
        person.set_key(key);
        person
    }

    /// Attaches a provenance note.
    #[must_use]
    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.note = note.into();
        self
    }

    /// Attaches a canonical key discovered after construction.
    pub fn set_key(&mut self, key: impl Into<String>) {
        let key = key.into();
        self.key = if key.is_empty() { None } else { Some(key) };
    }

    /// Returns the canonical key, if any.
    #[must_use]
    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    /// Returns true if a canonical key is attached.
    #[must_use]
    pub const fn has_key(&self) -> bool {
        self.key.is_some()
    }
}

impl Identity for Person {
    fn matches(&self, other: &Self) -> bool {
        match (&self.key, &other.key) {
            (Some(a), Some(b)) => a == b,
            _ => is_similar(&self.name, &other.name),
        }
    }

    fn matches_text(&self, text: &str) -> bool {
        is_similar(&self.name, text)
    }
}

impl fmt::Display for Person {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if let Some(key) = &self.key {
            write!(f, " : {key}")?;
        }
        if !self.note.is_empty() {
            write!(f, " : {}", self.note)?;
        }
        Ok(())
    }
}

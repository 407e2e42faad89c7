//! Bibliographic records: submitted papers and external publications.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::bibliography::PublicationRecord;
use crate::conflict::ConflictProfile;
use crate::identity::{Identity, Person};
use crate::reviewer::Reviewer;

/// A paper with its author list modeled as a collaborator-only profile.
///
/// Each author carries the publication key as its note, so a conflict found
/// through a bibliography record names the paper it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Publication {
    /// Bibliography key; empty for submissions.
    pub key: String,

    /// Title.
    pub title: String,

    /// Year of publication.
    pub year: i32,

    /// Authors, as collaborator conflicts.
    pub authors: ConflictProfile,

    /// False for records that must not count as evidence (e.g. edited
    /// volumes, whose "authors" are editors).
    pub valid: bool,
}

impl Publication {
    /// Creates a valid publication from `(name, author key)` pairs.
    #[must_use]
    pub fn new<I, N>(key: impl Into<String>, title: impl Into<String>, year: i32, authors: I) -> Self
    where
        I: IntoIterator<Item = (N, Option<String>)>,
        N: Into<String>,
    {
        let key = key.into();
        let mut profile = ConflictProfile::new();
        for (name, author_key) in authors {
            let mut person = Person::new(name).note(key.clone());
            if let Some(author_key) = author_key {
                person.set_key(author_key);
            }
            profile.add_collaborator(person);
        }

        Self {
            key,
            title: title.into(),
            year,
            authors: profile,
            valid: true,
        }
    }

    /// Creates a record that is kept for reporting but never used as
    /// evidence.
    #[must_use]
    pub fn invalid(key: impl Into<String>, title: impl Into<String>, year: i32) -> Self {
        Self {
            key: key.into(),
            title: title.into(),
            year,
            authors: ConflictProfile::new(),
            valid: false,
        }
    }

    /// Returns true if `author` is on the author list.
    #[must_use]
    pub fn has_author(&self, author: &Person) -> bool {
        self.authors.has_collaborator(author)
    }

    /// Returns true if an author's name matches `name`.
    #[must_use]
    pub fn has_author_named(&self, name: &str) -> bool {
        self.authors.collaborators.identities().any(|a| a.matches_text(name))
    }

    /// Authors of this paper that the reviewer declared as collaborators.
    #[must_use]
    pub fn check_against_reviewer(&self, reviewer: &Reviewer) -> Option<ConflictProfile> {
        let conflicts = self.authors.collaborator_conflicts(&reviewer.conflicts);
        if conflicts.is_empty() {
            None
        } else {
            Some(conflicts)
        }
    }
}

impl From<&PublicationRecord> for Publication {
    fn from(record: &PublicationRecord) -> Self {
        if record.edited_volume {
            return Self::invalid(record.key.clone(), record.title.clone(), record.year);
        }
        Self::new(
            record.key.clone(),
            record.title.clone(),
            record.year,
            record.authors.iter().map(|a| (a.name.clone(), a.key.clone())),
        )
    }
}

impl fmt::Display for Publication {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Title: {}, key:{}", self.title, self.key)
    }
}

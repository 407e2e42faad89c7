//! Program committee members and the evidence gathered about them.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::BibliographyConfig;
use crate::conflict::{ConflictProfile, DeclarationParser};
use crate::error::ParseError;
use crate::identity::{Institution, InstitutionRoster, Person};
use crate::publication::Publication;

/// A reviewer as registered with the conference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reviewer {
    /// The reviewer as a person, keyed when a bibliography key is known.
    pub identity: Person,

    /// Given name.
    pub first: String,

    /// Family name.
    pub last: String,

    /// Contact email; the reviewer's identifier across all datasets.
    pub email: String,

    /// Conference-system tags.
    #[serde(default)]
    pub tags: String,

    /// Home institution.
    pub affiliation: Institution,

    /// Institutional and personal conflicts.
    pub conflicts: ConflictProfile,

    /// Publications merged into `conflicts`.
    #[serde(default)]
    pub publications: Vec<Publication>,

    /// Topics the reviewer registered interest in.
    #[serde(default)]
    pub topics: Vec<String>,
}

impl Reviewer {
    /// Starts building a reviewer.
    #[must_use]
    pub fn builder() -> ReviewerBuilder {
        ReviewerBuilder::default()
    }

    /// Display name, "first last".
    #[must_use]
    pub fn name(&self) -> &str {
        &self.identity.name
    }

    /// Records a publication and merges its authors into the collaborator
    /// conflicts.
    pub fn add_publication(&mut self, publication: Publication) {
        self.conflicts.merge_collaborators(&publication.authors);
        self.publications.push(publication);
    }

    /// Returns the declared collaborator matching `name`.
    #[must_use]
    pub fn conflicts_with_person(&self, name: &str) -> Option<&Person> {
        self.conflicts.find_collaborator(name)
    }

    /// Returns the declared institution matching `name`.
    #[must_use]
    pub fn conflicts_with_institution(&self, name: &str) -> Option<&Institution> {
        self.conflicts.find_institution(name)
    }

    /// Compares collaborator sets with another view of the same reviewer.
    ///
    /// Returns `(only_in_self, only_in_other)`.
    #[must_use]
    pub fn compare_collaborators(&self, other: &Self) -> (Vec<Person>, Vec<Person>) {
        self.conflicts.diff_collaborators(&other.conflicts)
    }
}

/// Builder for [`Reviewer`].
#[derive(Debug, Clone, Default)]
pub struct ReviewerBuilder {
    first: String,
    last: String,
    email: String,
    key: Option<String>,
    tags: String,
    affiliation: String,
    collaborators: String,
    topics: Vec<String>,
}

impl ReviewerBuilder {
    /// Sets the given and family names.
    #[must_use]
    pub fn name(mut self, first: impl Into<String>, last: impl Into<String>) -> Self {
        self.first = first.into();
        self.last = last.into();
        self
    }

    /// Sets the email.
    #[must_use]
    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = email.into();
        self
    }

    /// Sets the bibliography author key.
    #[must_use]
    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Sets the tags string.
    #[must_use]
    pub fn tags(mut self, tags: impl Into<String>) -> Self {
        self.tags = tags.into();
        self
    }

    /// Sets the raw affiliation string.
    #[must_use]
    pub fn affiliation(mut self, affiliation: impl Into<String>) -> Self {
        self.affiliation = affiliation.into();
        self
    }

    /// Sets the free-text collaborator declaration.
    #[must_use]
    pub fn collaborators(mut self, text: impl Into<String>) -> Self {
        self.collaborators = text.into();
        self
    }

    /// Adds a topic.
    #[must_use]
    pub fn topic(mut self, topic: impl Into<String>) -> Self {
        self.topics.push(topic.into());
        self
    }

    /// Parses the declaration and resolves the affiliation.
    ///
    /// The reviewer's own affiliation is always an institutional conflict.
    ///
    /// # Errors
    /// Propagates declaration parse errors.
    pub fn build(
        self,
        parser: &DeclarationParser,
        roster: &InstitutionRoster,
    ) -> Result<Reviewer, ParseError> {
        let mut conflicts = ConflictProfile::parse(parser, &self.collaborators, roster)?;
        let affiliation = roster.resolve(&self.affiliation);
        if !self.affiliation.trim().is_empty() {
            conflicts.add_institution(affiliation.clone());
        }

        let mut identity = Person::new(format!("{} {}", self.first, self.last).trim().to_string());
        if let Some(key) = self.key {
            identity.set_key(key);
        }

        Ok(Reviewer {
            identity,
            first: self.first,
            last: self.last,
            email: self.email,
            tags: self.tags,
            affiliation,
            conflicts,
            publications: Vec::new(),
            topics: self.topics,
        })
    }
}

/// The two parallel views of one reviewer used by reconciliation.
///
/// `declared` holds only what the reviewer declared; `augmented` holds the
/// same plus the author list of every accepted external publication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewerEvidence {
    /// Self-declared conflicts only.
    pub declared: Reviewer,

    /// Self-declared conflicts plus bibliography co-authors.
    pub augmented: Reviewer,
}

impl ReviewerEvidence {
    /// Creates both views from the registered reviewer.
    #[must_use]
    pub fn new(reviewer: Reviewer) -> Self {
        Self {
            augmented: reviewer.clone(),
            declared: reviewer,
        }
    }

    /// The reviewer's email.
    #[must_use]
    pub fn email(&self) -> &str {
        &self.declared.email
    }

    /// Merges a publication into the augmented view.
    ///
    /// Invalid records and records older than the configured cutoff are
    /// ignored. Returns true if the publication was accepted.
    pub fn add_publication(&mut self, publication: Publication, config: &BibliographyConfig) -> bool {
        if !publication.valid {
            debug!(email = %self.email(), key = %publication.key, "skipping invalid publication");
            return false;
        }
        if !config.accepts_year(publication.year) {
            debug!(
                email = %self.email(),
                key = %publication.key,
                year = publication.year,
                "skipping publication before cutoff"
            );
            return false;
        }
        self.augmented.add_publication(publication);
        true
    }
}

//! Submitted papers.

use serde::Serialize;

use crate::conflict::{ConflictProfile, DeclarationParser};
use crate::error::ParseError;
use crate::identity::InstitutionRoster;
use crate::publication::Publication;
use crate::reconcile::ConflictClassification;

/// Year recorded on the author-list record of a submission.
const SUBMISSION_YEAR: i32 = 0;

/// A paper under review.
///
/// Composes the author list (a [`Publication`]) with what the authors
/// declared and, after reconciliation, the classification of every reviewer.
#[derive(Debug, Clone, Serialize)]
pub struct Submission {
    /// Conference-system paper id.
    pub id: u64,

    /// Title and authors.
    pub paper: Publication,

    /// Free-text conflicts plus the authors' own affiliations.
    pub declared: ConflictProfile,

    /// Reviewer emails declared through the structured conflict field.
    pub declared_pc: Vec<String>,

    /// Paper topics.
    pub topics: Vec<String>,

    classification: ConflictClassification,
}

impl Submission {
    /// Starts building a submission.
    #[must_use]
    pub fn builder(id: u64) -> SubmissionBuilder {
        SubmissionBuilder::new(id)
    }

    /// Title shortcut.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.paper.title
    }

    /// Returns true if `email` is in the structured conflict field.
    #[must_use]
    pub fn declares_pc(&self, email: &str) -> bool {
        self.declared_pc.iter().any(|e| e == email)
    }

    /// Reconciliation results.
    #[must_use]
    pub const fn classification(&self) -> &ConflictClassification {
        &self.classification
    }

    pub(crate) fn classification_mut(&mut self) -> &mut ConflictClassification {
        &mut self.classification
    }
}

/// Builder for [`Submission`].
#[derive(Debug, Clone)]
pub struct SubmissionBuilder {
    id: u64,
    title: String,
    authors: Vec<String>,
    affiliations: Vec<String>,
    collaborators: String,
    declared_pc: Vec<String>,
    topics: Vec<String>,
}

impl SubmissionBuilder {
    /// Creates a builder for paper `id`.
    #[must_use]
    pub fn new(id: u64) -> Self {
        Self {
            id,
            title: String::new(),
            authors: Vec::new(),
            affiliations: Vec::new(),
            collaborators: String::new(),
            declared_pc: Vec::new(),
            topics: Vec::new(),
        }
    }

    /// Sets the title.
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Adds an author.
    #[must_use]
    pub fn author(mut self, name: impl Into<String>) -> Self {
        self.authors.push(name.into());
        self
    }

    /// Adds a raw author affiliation.
    #[must_use]
    pub fn affiliation(mut self, affiliation: impl Into<String>) -> Self {
        self.affiliations.push(affiliation.into());
        self
    }

    /// Sets the free-text collaborator declaration.
    #[must_use]
    pub fn collaborators(mut self, text: impl Into<String>) -> Self {
        self.collaborators = text.into();
        self
    }

    /// Declares a reviewer email through the structured conflict field.
    #[must_use]
    pub fn declared_pc(mut self, email: impl Into<String>) -> Self {
        self.declared_pc.push(email.into());
        self
    }

    /// Adds a topic.
    #[must_use]
    pub fn topic(mut self, topic: impl Into<String>) -> Self {
        self.topics.push(topic.into());
        self
    }

    /// Parses the declaration and resolves affiliations.
    ///
    /// # Errors
    /// Propagates declaration parse errors.
    pub fn build(
        self,
        parser: &DeclarationParser,
        roster: &InstitutionRoster,
    ) -> Result<Submission, ParseError> {
        let mut declared = ConflictProfile::parse(parser, &self.collaborators, roster)?;
        for affiliation in self.affiliations.iter().filter(|a| !a.trim().is_empty()) {
            declared.add_institution(roster.resolve(affiliation));
        }

        let paper = Publication::new(
            String::new(),
            self.title,
            SUBMISSION_YEAR,
            self.authors.into_iter().map(|name| (name, None)),
        );

        Ok(Submission {
            id: self.id,
            paper,
            declared,
            declared_pc: self.declared_pc,
            topics: self.topics,
            classification: ConflictClassification::default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ParserConfig;

    fn parser() -> DeclarationParser {
        DeclarationParser::new(&ParserConfig::default()).unwrap()
    }

    #[test]
    fn test_build_submission() {
        let roster: InstitutionRoster = vec![vec![
            "MIT".to_string(),
            "Massachusetts Institute of Technology".to_string(),
        ]]
        .into_iter()
        .collect();

        let s = Submission::builder(7)
            .title("Fast Caches")
            .author("Jane Doe")
            .author("John Smith")
            .affiliation("Massachusetts Institute of Technology")
            .affiliation("MIT")
            .affiliation("")
            .collaborators("Alice Liddell, Oxford\nETH Zurich")
            .declared_pc("bob@example.org")
            .topic("Caches")
            .build(&parser(), &roster)
            .unwrap();

        assert_eq!(s.id, 7);
        assert_eq!(s.title(), "Fast Caches");
        assert_eq!(s.paper.authors.collaborators.len(), 2);
        // ETH Zurich from the declaration, MIT once for both spellings.
        assert_eq!(s.declared.institutions.len(), 2);
        assert_eq!(s.declared.collaborators.len(), 1);
        assert!(s.declares_pc("bob@example.org"));
        assert!(!s.declares_pc("eve@example.org"));
        assert!(s.classification().is_empty());
    }

    #[test]
    fn test_build_propagates_parse_error() {
        let err = Submission::builder(1)
            .collaborators("Coauthors, Students")
            .build(&parser(), &InstitutionRoster::new());
        assert!(err.is_err());
    }
}

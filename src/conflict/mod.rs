//! Conflict sets, conflict profiles, and the declaration parser.
//!
//! A conflict profile is the pair of conflict sets (institutions,
//! collaborators) attached to one party. Profiles are built from free-text
//! declarations, from author lists, and from bibliography records, and are
//! compared against each other with set algebra.

pub mod parser;
pub mod profile;
pub mod set;

pub use parser::{DeclarationParser, DeclaredConflict};
pub use profile::ConflictProfile;
pub use set::ConflictSet;

use crate::identity::{Institution, Person};

/// Anything a caller might try to file into a conflict profile.
///
/// Only the identity variants are accepted by
/// [`ConflictProfile::insert`]; the container variants exist so that code
/// holding an arbitrary entry gets a typed error instead of a nested set.
#[derive(Debug, Clone)]
pub enum ConflictEntry {
    /// A single collaborator.
    Person(Person),
    /// A single institution.
    Institution(Institution),
    /// A whole collaborator set.
    Collaborators(ConflictSet<Person>),
    /// A whole institution set.
    Institutions(ConflictSet<Institution>),
    /// A whole profile.
    Profile(ConflictProfile),
}

impl ConflictEntry {
    /// Short description of the entry's shape, used in error messages.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Person(_) => "person",
            Self::Institution(_) => "institution",
            Self::Collaborators(_) | Self::Institutions(_) => "conflict set",
            Self::Profile(_) => "conflict profile",
        }
    }
}

impl From<Person> for ConflictEntry {
    fn from(person: Person) -> Self {
        Self::Person(person)
    }
}

impl From<Institution> for ConflictEntry {
    fn from(institution: Institution) -> Self {
        Self::Institution(institution)
    }
}

impl From<ConflictSet<Person>> for ConflictEntry {
    fn from(set: ConflictSet<Person>) -> Self {
        Self::Collaborators(set)
    }
}

impl From<ConflictSet<Institution>> for ConflictEntry {
    fn from(set: ConflictSet<Institution>) -> Self {
        Self::Institutions(set)
    }
}

impl From<ConflictProfile> for ConflictEntry {
    fn from(profile: ConflictProfile) -> Self {
        Self::Profile(profile)
    }
}

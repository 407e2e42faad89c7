//! Conflict profiles: the institutions and collaborators of one party.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::parser::{DeclarationParser, DeclaredConflict};
use super::set::ConflictSet;
use super::ConflictEntry;
use crate::error::{InvariantViolation, ParseError};
use crate::identity::{Identity, Institution, InstitutionRoster, Person};

/// The pair of conflict sets associated with one party.
///
/// # Examples
///
/// ```
/// use coi_recon::{ConflictProfile, DeclarationParser, InstitutionRoster};
/// use coi_recon::config::ParserConfig;
///
/// let parser = DeclarationParser::new(&ParserConfig::default()).unwrap();
/// let roster = InstitutionRoster::new();
/// let profile = ConflictProfile::parse(&parser, "Jane Doe, MIT\nETH Zurich", &roster).unwrap();
/// assert_eq!(profile.collaborators.len(), 1);
/// assert_eq!(profile.institutions.len(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictProfile {
    /// Institutional conflicts.
    #[serde(default)]
    pub institutions: ConflictSet<Institution>,

    /// Personal conflicts: coauthors, advisors, students.
    #[serde(default)]
    pub collaborators: ConflictSet<Person>,
}

impl ConflictProfile {
    /// Creates an empty profile.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a profile from a free-text declaration.
    ///
    /// Institution lines are resolved through `roster`.
    ///
    /// # Errors
    /// Propagates the first [`ParseError`] in the block.
    pub fn parse(
        parser: &DeclarationParser,
        text: &str,
        roster: &InstitutionRoster,
    ) -> Result<Self, ParseError> {
        let mut profile = Self::new();
        for conflict in parser.parse(text)? {
            match conflict {
                DeclaredConflict::Person(name) => {
                    profile.add_collaborator(Person::new(name));
                }
                DeclaredConflict::Institution(name) => {
                    profile.add_institution(roster.resolve(&name));
                }
            }
        }
        Ok(profile)
    }

    /// Adds a collaborator conflict.
    pub fn add_collaborator(&mut self, person: Person) -> bool {
        self.collaborators.add(person, "")
    }

    /// Adds an institutional conflict.
    pub fn add_institution(&mut self, institution: Institution) -> bool {
        self.institutions.add(institution, "")
    }

    /// Files an arbitrary entry into the matching set.
    ///
    /// # Errors
    /// Returns [`InvariantViolation`] for sets and profiles; those must be
    /// combined with the `merge_*` methods instead.
    pub fn insert(&mut self, entry: ConflictEntry) -> Result<bool, InvariantViolation> {
        match entry {
            ConflictEntry::Person(person) => Ok(self.add_collaborator(person)),
            ConflictEntry::Institution(institution) => Ok(self.add_institution(institution)),
            other => Err(InvariantViolation { kind: other.kind() }),
        }
    }

    /// Institutions shared with `other`, labelled with `other`'s entries.
    #[must_use]
    pub fn institution_conflicts(&self, other: &Self) -> Self {
        Self {
            institutions: self.institutions.intersect(&other.institutions),
            collaborators: ConflictSet::new(),
        }
    }

    /// Collaborators shared with `other`, labelled with `other`'s entries.
    #[must_use]
    pub fn collaborator_conflicts(&self, other: &Self) -> Self {
        Self {
            institutions: ConflictSet::new(),
            collaborators: self.collaborators.intersect(&other.collaborators),
        }
    }

    /// Both institution and collaborator intersections with `other`.
    #[must_use]
    pub fn find_conflicts(&self, other: &Self) -> Self {
        Self {
            institutions: self.institutions.intersect(&other.institutions),
            collaborators: self.collaborators.intersect(&other.collaborators),
        }
    }

    /// Merges `other`'s institutions into this profile.
    pub fn merge_institutions(&mut self, other: &Self) {
        self.institutions.merge(&other.institutions);
    }

    /// Merges `other`'s collaborators into this profile.
    pub fn merge_collaborators(&mut self, other: &Self) {
        self.collaborators.merge(&other.collaborators);
    }

    /// Merges both sets of `other` into this profile.
    pub fn merge(&mut self, other: &Self) {
        self.merge_institutions(other);
        self.merge_collaborators(other);
    }

    /// Returns the stored institution matching the raw string.
    #[must_use]
    pub fn find_institution(&self, name: &str) -> Option<&Institution> {
        self.institutions.find_text(name)
    }

    /// Returns the stored collaborator matching the raw name.
    #[must_use]
    pub fn find_collaborator(&self, name: &str) -> Option<&Person> {
        self.collaborators.find_text(name)
    }

    /// Compares collaborator sets.
    ///
    /// Returns `(only_in_self, only_in_other)`.
    #[must_use]
    pub fn diff_collaborators(&self, other: &Self) -> (Vec<Person>, Vec<Person>) {
        let only_in_self = self
            .collaborators
            .identities()
            .filter(|p| !other.collaborators.contains(p))
            .cloned()
            .collect();
        let only_in_other = other
            .collaborators
            .identities()
            .filter(|p| !self.collaborators.contains(p))
            .cloned()
            .collect();
        (only_in_self, only_in_other)
    }

    /// Returns true if a person in this profile matches `person`.
    #[must_use]
    pub fn has_collaborator(&self, person: &Person) -> bool {
        self.collaborators.identities().any(|p| p.matches(person))
    }

    /// Returns true if neither set has members.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.institutions.is_empty() && self.collaborators.is_empty()
    }

    /// Renders the profile on one line, suitable for a CSV cell.
    #[must_use]
    pub fn to_single_line(&self) -> String {
        let mut s = String::new();
        if !self.institutions.is_empty() {
            s.push_str(&format!("institutions:[{}];", self.institutions.to_single_line()));
        }
        if !self.collaborators.is_empty() {
            s.push_str(&format!("collaborators:[{}]", self.collaborators.to_single_line()));
        }
        s
    }
}

impl fmt::Display for ConflictProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.institutions.is_empty() {
            writeln!(f, "Institutions:")?;
            write!(f, "{}", self.institutions)?;
        }
        if !self.collaborators.is_empty() {
            writeln!(f, "Collaborators:")?;
            write!(f, "{}", self.collaborators)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ParserConfig;

    fn parser() -> DeclarationParser {
        DeclarationParser::new(&ParserConfig::default()).unwrap()
    }

    fn roster() -> InstitutionRoster {
        vec![vec![
            "MIT".to_string(),
            "Massachusetts Institute of Technology".to_string(),
        ]]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_parse_profile() {
        let text = "Jane Doe, MIT\nMassachusetts Institute of Technology\nnone\nJohn Smith (IBM)";
        let profile = ConflictProfile::parse(&parser(), text, &roster()).unwrap();
        assert_eq!(profile.collaborators.len(), 2);
        assert_eq!(profile.institutions.len(), 1);
        assert_eq!(profile.institutions.identities().next().unwrap().primary(), "MIT");
    }

    #[test]
    fn test_parse_none_is_empty() {
        let profile = ConflictProfile::parse(&parser(), "None", &roster()).unwrap();
        assert!(profile.is_empty());
        let profile = ConflictProfile::parse(&parser(), "", &roster()).unwrap();
        assert!(profile.is_empty());
    }

    #[test]
    fn test_parse_error_propagates() {
        let err = ConflictProfile::parse(&parser(), "Institution, Advisor, Students", &roster());
        assert!(err.is_err());
    }

    #[test]
    fn test_insert_rejects_containers() {
        let mut profile = ConflictProfile::new();
        assert!(profile.insert(Person::new("Jane Doe").into()).unwrap());
        assert!(profile.insert(Institution::singleton("MIT").into()).unwrap());

        let err = profile.insert(ConflictProfile::new().into()).unwrap_err();
        assert_eq!(err.kind, "conflict profile");
        let err = profile.insert(ConflictSet::<Person>::new().into()).unwrap_err();
        assert_eq!(err.kind, "conflict set");
        assert_eq!(profile.collaborators.len(), 1);
        assert_eq!(profile.institutions.len(), 1);
    }

    #[test]
    fn test_find_conflicts() {
        let mut mine = ConflictProfile::new();
        mine.add_collaborator(Person::new("Jane Doe"));
        mine.add_collaborator(Person::new("Alice Liddell"));
        mine.add_institution(Institution::singleton("MIT"));

        let mut theirs = ConflictProfile::new();
        theirs.add_collaborator(Person::new("Doe, Jane"));
        theirs.add_institution(Institution::singleton("mit"));
        theirs.add_institution(Institution::singleton("IBM Research"));

        let common = mine.find_conflicts(&theirs);
        assert_eq!(common.collaborators.len(), 1);
        assert_eq!(common.institutions.len(), 1);
        assert_eq!(
            common.to_single_line(),
            "institutions:[(MIT: mit);];collaborators:[(Jane Doe: Doe, Jane);]"
        );

        assert!(mine.institution_conflicts(&theirs).collaborators.is_empty());
        assert!(mine.collaborator_conflicts(&theirs).institutions.is_empty());
    }

    #[test]
    fn test_diff_collaborators() {
        let mut a = ConflictProfile::new();
        a.add_collaborator(Person::new("Jane Doe"));
        a.add_collaborator(Person::new("John Smith"));
        let mut b = ConflictProfile::new();
        b.add_collaborator(Person::new("John Smith"));
        b.add_collaborator(Person::new("Alice Liddell"));

        let (only_a, only_b) = a.diff_collaborators(&b);
        assert_eq!(only_a, vec![Person::new("Jane Doe")]);
        assert_eq!(only_b, vec![Person::new("Alice Liddell")]);
    }

    #[test]
    fn test_display() {
        let mut profile = ConflictProfile::new();
        profile.add_institution(Institution::singleton("MIT"));
        profile.add_collaborator(Person::new("Jane Doe"));
        assert_eq!(profile.to_string(), "Institutions:\n- MIT\nCollaborators:\n- Jane Doe\n");
        assert_eq!(ConflictProfile::new().to_string(), "");
    }
}

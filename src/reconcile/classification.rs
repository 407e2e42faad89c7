//! Per-submission conflict buckets.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::conflict::ConflictProfile;
use crate::identity::Person;

/// The five reconciliation buckets, in pass order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictCategory {
    /// Declared by the authors through the structured field.
    ProperlyDeclared,
    /// Written by the authors into the free-text collaborators field.
    DeclaredInFreeText,
    /// Declared by the reviewer, not by the authors.
    DeclaredByReviewer,
    /// Declared by nobody, proven by the bibliography.
    FoundInBibliography,
    /// Claimed by the authors but not supported by any evidence.
    Unverifiable,
}

impl ConflictCategory {
    /// All categories in pass order.
    pub const ALL: [Self; 5] = [
        Self::ProperlyDeclared,
        Self::DeclaredInFreeText,
        Self::DeclaredByReviewer,
        Self::FoundInBibliography,
        Self::Unverifiable,
    ];

    /// Stable report name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ProperlyDeclared => "proper",
            Self::DeclaredInFreeText => "collaborators_field",
            Self::DeclaredByReviewer => "declared_by_pc_members",
            Self::FoundInBibliography => "dblp",
            Self::Unverifiable => "fake_conflicts",
        }
    }
}

impl fmt::Display for ConflictCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConflictCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| format!("unknown conflict category: {s}"))
    }
}

/// Which author-side field made an unverifiable claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimSource {
    /// The structured conflict field.
    PcConflicts,
    /// The free-text collaborators field.
    Collaborators,
}

impl fmt::Display for ClaimSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PcConflicts => write!(f, "pc_conflicts"),
            Self::Collaborators => write!(f, "collaborators"),
        }
    }
}

/// Reconciliation results for one submission, keyed by reviewer email.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConflictClassification {
    /// Bucket 1.
    pub properly_declared: BTreeSet<String>,
    /// Bucket 2, with the declared collaborator the reviewer matched.
    pub declared_in_free_text: BTreeMap<String, Person>,
    /// Bucket 3, with the intersection found.
    pub declared_by_reviewer: BTreeMap<String, ConflictProfile>,
    /// Bucket 4, with the intersection found.
    pub found_in_bibliography: BTreeMap<String, ConflictProfile>,
    /// Bucket 5, with the field that made the claim.
    pub unverifiable: BTreeMap<String, ClaimSource>,
}

impl ConflictClassification {
    /// Returns true if `email` is recorded in `category`.
    #[must_use]
    pub fn contains(&self, category: ConflictCategory, email: &str) -> bool {
        match category {
            ConflictCategory::ProperlyDeclared => self.properly_declared.contains(email),
            ConflictCategory::DeclaredInFreeText => self.declared_in_free_text.contains_key(email),
            ConflictCategory::DeclaredByReviewer => self.declared_by_reviewer.contains_key(email),
            ConflictCategory::FoundInBibliography => self.found_in_bibliography.contains_key(email),
            ConflictCategory::Unverifiable => self.unverifiable.contains_key(email),
        }
    }

    /// Returns true if the authors claimed a conflict with `email`, in
    /// either the structured or the free-text field.
    #[must_use]
    pub fn is_claimed(&self, email: &str) -> bool {
        self.contains(ConflictCategory::ProperlyDeclared, email)
            || self.contains(ConflictCategory::DeclaredInFreeText, email)
    }

    /// Categories in which `email` is recorded.
    #[must_use]
    pub fn categories_of(&self, email: &str) -> Vec<ConflictCategory> {
        ConflictCategory::ALL
            .into_iter()
            .filter(|c| self.contains(*c, email))
            .collect()
    }

    /// Number of entries in `category`.
    #[must_use]
    pub fn count(&self, category: ConflictCategory) -> usize {
        match category {
            ConflictCategory::ProperlyDeclared => self.properly_declared.len(),
            ConflictCategory::DeclaredInFreeText => self.declared_in_free_text.len(),
            ConflictCategory::DeclaredByReviewer => self.declared_by_reviewer.len(),
            ConflictCategory::FoundInBibliography => self.found_in_bibliography.len(),
            ConflictCategory::Unverifiable => self.unverifiable.len(),
        }
    }

    /// Returns true if no bucket has entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        ConflictCategory::ALL.into_iter().all(|c| self.count(c) == 0)
    }

    /// `(email, reason)` pairs of `category`, sorted by email.
    ///
    /// Reasons are empty for bucket 1, the matched collaborator for bucket
    /// 2, a one-line profile for buckets 3 and 4 and the claim tag for
    /// bucket 5.
    #[must_use]
    pub fn reasons(&self, category: ConflictCategory) -> Vec<(String, String)> {
        match category {
            ConflictCategory::ProperlyDeclared => self
                .properly_declared
                .iter()
                .map(|e| (e.clone(), String::new()))
                .collect(),
            ConflictCategory::DeclaredInFreeText => self
                .declared_in_free_text
                .iter()
                .map(|(e, p)| (e.clone(), p.to_string()))
                .collect(),
            ConflictCategory::DeclaredByReviewer => self
                .declared_by_reviewer
                .iter()
                .map(|(e, c)| (e.clone(), c.to_single_line()))
                .collect(),
            ConflictCategory::FoundInBibliography => self
                .found_in_bibliography
                .iter()
                .map(|(e, c)| (e.clone(), c.to_single_line()))
                .collect(),
            ConflictCategory::Unverifiable => self
                .unverifiable
                .iter()
                .map(|(e, s)| (e.clone(), s.to_string()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::Institution;

    #[test]
    fn test_category_names_roundtrip() {
        for category in ConflictCategory::ALL {
            assert_eq!(category.as_str().parse::<ConflictCategory>().unwrap(), category);
        }
        assert!("bogus".parse::<ConflictCategory>().is_err());
        assert_eq!(ConflictCategory::FoundInBibliography.to_string(), "dblp");
    }

    #[test]
    fn test_claim_source_display() {
        assert_eq!(ClaimSource::PcConflicts.to_string(), "pc_conflicts");
        assert_eq!(ClaimSource::Collaborators.to_string(), "collaborators");
    }

    #[test]
    fn test_reasons_per_bucket() {
        let mut c = ConflictClassification::default();
        c.properly_declared.insert("a@x".to_string());
        c.declared_in_free_text
            .insert("b@x".to_string(), Person::new("Jane Doe"));
        let mut profile = ConflictProfile::new();
        profile.add_institution(Institution::singleton("MIT"));
        c.declared_by_reviewer.insert("c@x".to_string(), profile);
        c.unverifiable.insert("a@x".to_string(), ClaimSource::PcConflicts);

        assert_eq!(c.reasons(ConflictCategory::ProperlyDeclared), vec![("a@x".to_string(), String::new())]);
        assert_eq!(
            c.reasons(ConflictCategory::DeclaredInFreeText),
            vec![("b@x".to_string(), "Jane Doe".to_string())]
        );
        assert_eq!(
            c.reasons(ConflictCategory::DeclaredByReviewer),
            vec![("c@x".to_string(), "institutions:[(MIT);];".to_string())]
        );
        assert_eq!(
            c.reasons(ConflictCategory::Unverifiable),
            vec![("a@x".to_string(), "pc_conflicts".to_string())]
        );
        assert!(c.reasons(ConflictCategory::FoundInBibliography).is_empty());

        assert!(c.is_claimed("a@x"));
        assert!(c.is_claimed("b@x"));
        assert!(!c.is_claimed("c@x"));
        assert_eq!(
            c.categories_of("a@x"),
            vec![ConflictCategory::ProperlyDeclared, ConflictCategory::Unverifiable]
        );
        assert_eq!(c.count(ConflictCategory::DeclaredByReviewer), 1);
        assert!(!c.is_empty());
    }
}

//! Ordered, de-duplicating sets of identities with attached reasons.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::identity::Identity;

/// One member of a [`ConflictSet`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member<T> {
    /// The conflicting party.
    pub identity: T,

    /// Why the conflict exists; empty when nothing was recorded.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub reason: String,
}

/// Insertion-ordered collection of identities with set semantics under
/// [`Identity::matches`].
///
/// The first insertion of an entity wins: adding an identity that matches an
/// existing member is a no-op and never replaces the stored reason. No two
/// members match each other.
///
/// # Examples
///
/// ```
/// use coi_recon::{ConflictSet, Person};
///
/// let mut set = ConflictSet::new();
/// assert!(set.add(Person::new("Jane Doe"), "advisor"));
/// assert!(!set.add(Person::new("Doe, Jane"), "coauthor"));
/// assert_eq!(set.len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConflictSet<T> {
    members: Vec<Member<T>>,
}

impl<T> Default for ConflictSet<T> {
    fn default() -> Self {
        Self {
            members: Vec::new(),
        }
    }
}

impl<T: Identity> ConflictSet<T> {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `identity` unless a matching member is already present.
    ///
    /// Returns true if the identity was appended.
    pub fn add(&mut self, identity: T, reason: impl Into<String>) -> bool {
        if self.contains(&identity) {
            return false;
        }
        self.members.push(Member {
            identity,
            reason: reason.into(),
        });
        true
    }

    /// Returns true if some member matches `identity`.
    #[must_use]
    pub fn contains(&self, identity: &T) -> bool {
        self.find(identity).is_some()
    }

    /// Returns the first stored member matching `identity`.
    #[must_use]
    pub fn find(&self, identity: &T) -> Option<&T> {
        self.members
            .iter()
            .map(|m| &m.identity)
            .find(|member| member.matches(identity))
    }

    /// Returns the first stored member matching the bare string `text`.
    #[must_use]
    pub fn find_text(&self, text: &str) -> Option<&T> {
        self.members
            .iter()
            .map(|m| &m.identity)
            .find(|member| member.matches_text(text))
    }

    /// Members of `self` also present in `other`, in `self`'s order.
    ///
    /// Each result member carries, as its reason, the display text of the
    /// member of `other` it matched.
    #[must_use]
    pub fn intersect(&self, other: &Self) -> Self {
        let mut out = Self::new();
        for member in &self.members {
            if let Some(label) = other.find(&member.identity) {
                out.add(member.identity.clone(), label.to_string());
            }
        }
        out
    }

    /// Adds every member of `other`, respecting first-insertion-wins.
    pub fn merge(&mut self, other: &Self) {
        for member in &other.members {
            self.add(member.identity.clone(), member.reason.clone());
        }
    }

    /// Iterates over members and their reasons.
    pub fn iter(&self) -> impl Iterator<Item = (&T, &str)> {
        self.members.iter().map(|m| (&m.identity, m.reason.as_str()))
    }

    /// Iterates over members.
    pub fn identities(&self) -> impl Iterator<Item = &T> {
        self.members.iter().map(|m| &m.identity)
    }

    /// Returns the stored reason for the member matching `identity`.
    #[must_use]
    pub fn reason_for(&self, identity: &T) -> Option<&str> {
        self.members
            .iter()
            .find(|m| m.identity.matches(identity))
            .map(|m| m.reason.as_str())
    }

    /// Number of members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Returns true if the set has no members.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Renders the set on one line as `(a);(b: reason);`.
    #[must_use]
    pub fn to_single_line(&self) -> String {
        self.members
            .iter()
            .map(|m| {
                if m.reason.is_empty() {
                    format!("({});", m.identity)
                } else {
                    format!("({}: {});", m.identity, m.reason)
                }
            })
            .collect()
    }
}

impl<T: Identity> fmt::Display for ConflictSet<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for member in &self.members {
            if member.reason.is_empty() {
                writeln!(f, "- {}", member.identity)?;
            } else {
                writeln!(f, "- {}; {}", member.identity, member.reason)?;
            }
        }
        Ok(())
    }
}

impl<T: Identity> FromIterator<T> for ConflictSet<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = Self::new();
        for identity in iter {
            set.add(identity, "");
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::{Institution, Person};

    fn people(names: &[&str]) -> ConflictSet<Person> {
        names.iter().map(|n| Person::new(*n)).collect()
    }

    fn names(set: &ConflictSet<Person>) -> Vec<String> {
        set.identities().map(|p| p.name.clone()).collect()
    }

    #[test]
    fn test_add_is_idempotent() {
        let mut set = ConflictSet::new();
        assert!(set.add(Person::new("Jane Doe"), "advisor"));
        assert!(!set.add(Person::new("Jane Doe"), "coauthor"));
        assert!(!set.add(Person::new("doe jane"), "student"));
        assert_eq!(set.len(), 1);
        assert_eq!(set.reason_for(&Person::new("Jane Doe")), Some("advisor"));
    }

    #[test]
    fn test_add_keyed_duplicates() {
        let mut set = ConflictSet::new();
        set.add(Person::with_key("John Smith", "s1"), "");
        assert!(set.add(Person::with_key("John Smith", "s2"), ""));
        assert!(!set.add(Person::with_key("J. Smith", "s1"), ""));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_find_returns_stored_member() {
        let set = people(&["Jane Doe", "John Smith"]);
        let found = set.find(&Person::new("Doe, Jane")).unwrap();
        assert_eq!(found.name, "Jane Doe");
        assert!(set.find(&Person::new("Alice Liddell")).is_none());
    }

    #[test]
    fn test_find_text_first_match_wins() {
        let mut set = ConflictSet::new();
        set.add(Person::with_key("Jane Doe", "a"), "first");
        set.add(Person::with_key("Jane Doe", "b"), "second");
        assert_eq!(set.len(), 2);
        assert_eq!(set.find_text("Jane Doe").unwrap().key(), Some("a"));
    }

    #[test]
    fn test_intersect_keeps_self_order_and_labels() {
        let mine = people(&["John Smith", "Jane Doe", "Alice Liddell"]);
        let mut theirs = ConflictSet::new();
        theirs.add(Person::new("Doe, Jane").note("conf/x/1"), "");
        theirs.add(Person::new("John Smith"), "");

        let common = mine.intersect(&theirs);
        assert_eq!(names(&common), vec!["John Smith", "Jane Doe"]);
        assert_eq!(common.reason_for(&Person::new("Jane Doe")), Some("Doe, Jane : conf/x/1"));
    }

    #[test]
    fn test_intersect_empty() {
        let mine = people(&["John Smith"]);
        assert!(mine.intersect(&ConflictSet::new()).is_empty());
        assert!(ConflictSet::<Person>::new().intersect(&mine).is_empty());
    }

    #[test]
    fn test_merge_membership_is_order_independent() {
        let a = people(&["Jane Doe", "John Smith"]);
        let b = people(&["Doe Jane", "Alice Liddell"]);
        let c = people(&["Bob Builder", "John Smith"]);

        let mut abc = ConflictSet::new();
        abc.merge(&a);
        abc.merge(&b);
        abc.merge(&c);

        let mut cba = ConflictSet::new();
        cba.merge(&c);
        cba.merge(&b);
        cba.merge(&a);

        assert_eq!(abc.len(), 4);
        assert_eq!(cba.len(), 4);
        for person in abc.identities() {
            assert!(cba.contains(person));
        }
    }

    #[test]
    fn test_merge_keeps_first_reason() {
        let mut a = ConflictSet::new();
        a.add(Person::new("Jane Doe"), "self-declared");
        let mut b = ConflictSet::new();
        b.add(Person::new("Jane Doe"), "bibliography");
        a.merge(&b);
        assert_eq!(a.reason_for(&Person::new("Jane Doe")), Some("self-declared"));
    }

    #[test]
    fn test_display_and_single_line() {
        let mut set = ConflictSet::new();
        set.add(Institution::singleton("MIT"), "");
        set.add(Institution::singleton("Stanford University"), "former employer");
        assert_eq!(set.to_string(), "- MIT\n- Stanford University; former employer\n");
        assert_eq!(set.to_single_line(), "(MIT);(Stanford University: former employer);");
        assert_eq!(ConflictSet::<Institution>::new().to_string(), "");
    }

    #[test]
    fn test_intersection_single_line_keeps_labels() {
        let mine: ConflictSet<Person> = vec![Person::new("John Smith")].into_iter().collect();
        let mut theirs = ConflictSet::new();
        theirs.add(Person::new("Smith, John").note("conf/x/1"), "");

        let common = mine.intersect(&theirs);
        assert_eq!(common.to_single_line(), "(John Smith: Smith, John : conf/x/1);");
    }
}

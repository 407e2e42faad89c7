//! Institutions and their name variants.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::similarity::is_similar;
use super::Identity;

/// One real institution, known by all of its name variants.
///
/// Matching is permissive: one alias on each side fuzzy-matching is enough.
/// Affiliation strings are too inconsistent for anything stricter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Institution {
    aliases: Vec<String>,
}

impl Institution {
    /// Creates an institution from its known aliases. The first alias is
    /// used for display.
    #[must_use]
    pub fn new(aliases: Vec<String>) -> Self {
        Self { aliases }
    }

    /// Creates an institution known by a single name.
    #[must_use]
    pub fn singleton(name: impl Into<String>) -> Self {
        Self {
            aliases: vec![name.into()],
        }
    }

    /// Returns the display name.
    #[must_use]
    pub fn primary(&self) -> &str {
        self.aliases.first().map_or("", String::as_str)
    }

    /// Returns every known alias.
    #[must_use]
    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }
}

impl Identity for Institution {
    fn matches(&self, other: &Self) -> bool {
        other.aliases.iter().any(|alias| self.matches_text(alias))
    }

    fn matches_text(&self, text: &str) -> bool {
        self.aliases.iter().any(|alias| is_similar(alias, text))
    }
}

impl fmt::Display for Institution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.primary())
    }
}

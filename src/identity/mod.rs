//! Identity layer: people, institutions, and the fuzzy matcher behind them.
//!
//! Names arrive from author self-entry, the bibliography scrape and the
//! institution roster, each formatted differently. Matching is therefore
//! token-order-insensitive fuzzy similarity, with an exact-key override for
//! people whenever a stable external key is known on both sides.

pub mod institution;
pub mod person;
pub mod roster;
pub mod similarity;

use std::fmt;

pub use institution::Institution;
pub use person::Person;
pub use roster::InstitutionRoster;
pub use similarity::{is_similar, token_sort_ratio, MATCH_THRESHOLD};

/// Something that can decide whether another reference denotes the same
/// real-world entity.
///
/// Implementations must be symmetric: `a.matches(b) == b.matches(a)`.
pub trait Identity: fmt::Display + Clone {
    /// Returns true if `other` refers to the same entity.
    fn matches(&self, other: &Self) -> bool;

    /// Returns true if the bare string `text` refers to this entity.
    ///
    /// Keys are never consulted on this path.
    fn matches_text(&self, text: &str) -> bool;
}

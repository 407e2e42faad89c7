//! # coi-recon - Conflict-of-interest reconciliation for peer review
//!
//! Authors and reviewers both declare conflicts, in structured fields and
//! in free text, and a public bibliography holds evidence neither side
//! declared. coi-recon cross-references the three and classifies every
//! (submission, reviewer) pair so that undeclared and unverifiable
//! conflicts surface before assignment.
//!
//! ## Core Concepts
//!
//! - **Identity**: a person or institution, matched by stable key when both
//!   sides have one and by fuzzy token-sorted similarity otherwise
//! - **ConflictSet**: an ordered, deduplicated set of identities with the
//!   reason each was recorded
//! - **ConflictProfile**: the institution and collaborator sets of one party
//! - **Reconciler**: the five-pass classification of submissions against
//!   reviewer evidence
//!
//! ## Usage
//!
//! ```rust
//! use coi_recon::config::ParserConfig;
//! use coi_recon::{
//!     ConflictCategory, DeclarationParser, InstitutionRoster, Reconciler, Reviewer,
//!     ReviewerEvidence, Submission,
//! };
//!
//! let parser = DeclarationParser::new(&ParserConfig::default())?;
//! let roster = InstitutionRoster::new();
//!
//! let reviewer = Reviewer::builder()
//!     .name("Jane", "Doe")
//!     .email("jane@example.org")
//!     .affiliation("Elsewhere")
//!     .build(&parser, &roster)?;
//! let reviewers = vec![ReviewerEvidence::new(reviewer)];
//!
//! let mut submission = Submission::builder(1)
//!     .title("Fast Caches")
//!     .author("John Smith")
//!     .collaborators("Jane Doe, Elsewhere")
//!     .build(&parser, &roster)?;
//!
//! Reconciler::new(&reviewers).classify(&mut submission);
//! assert!(submission
//!     .classification()
//!     .contains(ConflictCategory::DeclaredInFreeText, "jane@example.org"));
//! # Ok::<(), coi_recon::CoiError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Core types
pub mod config;
pub mod conflict;
pub mod error;
pub mod identity;
pub mod publication;
pub mod reviewer;
pub mod submission;

// Evidence and reconciliation
pub mod bibliography;
pub mod reconcile;

// Input and output
pub mod affinity;
pub mod ingest;
pub mod report;

// Re-export primary types at crate root for convenience
pub use bibliography::{
    collect_evidence, BibliographySource, CachedBibliography, CoAuthor, InMemoryResponseCache,
    PublicationRecord, ResponseCache, StaticBibliography,
};
pub use config::{BibliographyConfig, ParseErrorPolicy, ParserConfig, ReconcileConfig};
pub use conflict::{ConflictEntry, ConflictProfile, ConflictSet, DeclarationParser, DeclaredConflict};
pub use error::{
    CoiError, CoiResult, ConfigError, IngestError, InvariantViolation, LookupError, ParseError,
};
pub use identity::{is_similar, token_sort_ratio, Identity, Institution, InstitutionRoster, Person};
pub use publication::Publication;
pub use reconcile::{
    conflicts_between, ClaimSource, ConflictCategory, ConflictClassification, ReconcileSummary,
    Reconciler,
};
pub use report::{Assignment, ReportRow};
pub use reviewer::{Reviewer, ReviewerBuilder, ReviewerEvidence};
pub use submission::{Submission, SubmissionBuilder};

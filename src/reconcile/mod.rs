//! Cross-referencing of author, reviewer and bibliography evidence.
//!
//! Every (submission, reviewer) pair is classified into at most one of four
//! evidence categories, in precedence order, plus an independent check for
//! claimed conflicts that no evidence supports.

pub mod classification;
pub mod pipeline;

pub use classification::{ClaimSource, ConflictCategory, ConflictClassification};
pub use pipeline::{conflicts_between, Reconciler, ReconcileSummary};

//! Error types for coi-recon.
//!
//! All errors are strongly typed using thiserror. A declaration that
//! cannot be parsed, a dataset that references something another dataset
//! does not know about, and a broken input file are distinct failures and
//! callers are expected to match on them.

use thiserror::Error;

/// Errors raised while parsing a free-text conflict declaration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Bad name in string: {token}, line: {line}")]
    BlacklistedToken {
        token: String,
        line: String,
    },

    #[error("Conflict looks like an institution: {name}, line: {line}")]
    InstitutionInNameSlot {
        name: String,
        line: String,
    },

    #[error("Can't parse line: {line}")]
    UnrecognizedLine {
        line: String,
    },
}

impl ParseError {
    /// Returns the raw declaration line that failed to parse.
    #[must_use]
    pub fn line(&self) -> &str {
        match self {
            Self::BlacklistedToken { line, .. }
            | Self::InstitutionInNameSlot { line, .. }
            | Self::UnrecognizedLine { line } => line,
        }
    }
}

/// A conflict container was handed to an API that accepts single identities.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Trying to add a {kind} to a conflict list")]
pub struct InvariantViolation {
    pub kind: &'static str,
}

/// A key referenced by one dataset is absent from another.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("Unknown reviewer email: {email}")]
    UnknownReviewer {
        email: String,
    },

    #[error("Unknown topic: {topic}")]
    UnknownTopic {
        topic: String,
    },

    #[error("Expertise list and expertise db topics do not match: {expected} vs. {actual}")]
    ExpertiseMismatch {
        expected: usize,
        actual: usize,
    },

    #[error("No bibliography entry for author key: {key}")]
    UnknownAuthorKey {
        key: String,
    },
}

/// Errors raised while reading or writing data files.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("IO error on {path}: {message}")]
    Io {
        path: String,
        message: String,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Record {record}: {reason}")]
    MalformedRecord {
        record: String,
        reason: String,
    },
}

impl IngestError {
    /// Builds a malformed-record error.
    #[must_use]
    pub fn malformed(record: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedRecord {
            record: record.into(),
            reason: reason.into(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config parse error: {0}")]
    Parse(String),

    #[error("Config validation error: {0}")]
    Validation(String),

    #[error("IO error on {path}: {message}")]
    Io {
        path: String,
        message: String,
    },
}

/// Top-level error type for coi-recon.
#[derive(Debug, Error)]
pub enum CoiError {
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Invariant violation: {0}")]
    Invariant(#[from] InvariantViolation),

    #[error("Lookup miss: {0}")]
    Lookup(#[from] LookupError),

    #[error("Ingest error: {0}")]
    Ingest(#[from] IngestError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Bibliography error: {message}")]
    Bibliography {
        message: String,
    },
}

impl CoiError {
    /// Creates a bibliography source error.
    #[must_use]
    pub fn bibliography(message: impl Into<String>) -> Self {
        Self::Bibliography {
            message: message.into(),
        }
    }

    /// Returns true if this is a declaration parse error.
    #[must_use]
    pub const fn is_parse(&self) -> bool {
        matches!(self, Self::Parse(_))
    }

    /// Returns true if this is a programming error at the call site.
    #[must_use]
    pub const fn is_invariant(&self) -> bool {
        matches!(self, Self::Invariant(_))
    }

    /// Returns true if this is a cross-dataset lookup miss.
    #[must_use]
    pub const fn is_lookup(&self) -> bool {
        matches!(self, Self::Lookup(_))
    }

    /// Returns true if the failure is confined to a single input record,
    /// so a lenient caller may skip that record and continue.
    #[must_use]
    pub const fn is_record_local(&self) -> bool {
        match self {
            Self::Parse(_) => true,
            Self::Ingest(e) => matches!(e, IngestError::MalformedRecord { .. }),
            _ => false,
        }
    }
}

/// Result type alias for coi-recon operations.
pub type CoiResult<T> = Result<T, CoiError>;

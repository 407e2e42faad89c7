//! Run configuration.
//!
//! Everything has a default, so an empty TOML document is a valid config.
//!
//! ```toml
//! on_parse_error = "skip"
//!
//! [parser]
//! blacklist = ["institution", "advisor"]
//! institution_indicators = ["university", "institute", "college"]
//!
//! [bibliography]
//! min_year = 2012
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

const DEFAULT_BLACKLIST: &[&str] = &[
    "institution",
    "advisor",
    "other",
    "students",
    "coauthors",
    "conflict",
    "collaborators",
    "coi",
    "paper",
    "institutional",
    "student",
    "co-authors",
];

const DEFAULT_INSTITUTION_INDICATORS: &[&str] = &["university", "institute", "college"];

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconcileConfig {
    /// Declaration parser word lists.
    pub parser: ParserConfig,

    /// External bibliography filtering.
    pub bibliography: BibliographyConfig,

    /// What ingestion does with a record whose declaration fails to parse.
    pub on_parse_error: ParseErrorPolicy,
}

/// Word lists driving the declaration parser.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Header words that must never appear as a name token.
    pub blacklist: Vec<String>,

    /// Words that mark a name slot as actually holding an institution.
    pub institution_indicators: Vec<String>,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            blacklist: DEFAULT_BLACKLIST.iter().map(ToString::to_string).collect(),
            institution_indicators: DEFAULT_INSTITUTION_INDICATORS
                .iter()
                .map(ToString::to_string)
                .collect(),
        }
    }
}

/// Bibliography evidence settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BibliographyConfig {
    /// Publications older than this year are not evidence of a conflict.
    pub min_year: Option<i32>,
}

impl BibliographyConfig {
    /// Returns true if a publication from `year` counts as evidence.
    #[must_use]
    pub fn accepts_year(&self, year: i32) -> bool {
        self.min_year.map_or(true, |min| year >= min)
    }
}

/// Handling of per-record declaration parse errors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParseErrorPolicy {
    /// Fail the whole batch.
    #[default]
    Abort,
    /// Log the record and leave it out.
    Skip,
}

impl ReconcileConfig {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    /// `ConfigError::Parse` on malformed TOML, `ConfigError::Validation` if
    /// [`Self::validate`] fails.
    pub fn from_toml(input: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(input).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    ///
    /// # Errors
    /// `ConfigError::Io` if the file cannot be read, otherwise as
    /// [`Self::from_toml`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let input = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_toml(&input)
    }

    /// Checks the word lists for blank entries.
    ///
    /// # Errors
    /// Returns `ConfigError::Validation` naming the offending list.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.parser.blacklist.iter().any(|w| w.trim().is_empty()) {
            return Err(ConfigError::Validation(
                "parser.blacklist contains a blank word".to_string(),
            ));
        }
        if self
            .parser
            .institution_indicators
            .iter()
            .any(|w| w.trim().is_empty())
        {
            return Err(ConfigError::Validation(
                "parser.institution_indicators contains a blank word".to_string(),
            ));
        }
        Ok(())
    }
}

//! Free-text conflict declaration parser.
//!
//! Authors and reviewers type their conflicts into a text box, one per line.
//! Supported line shapes:
//!
//! ```text
//! [ordinal] name [-;,:(] institution / reason ...   -> a person
//! [ordinal] institution                             -> an institution
//! none                                              -> nothing
//! ```
//!
//! Everything after the separator of a person line is ignored.

use regex::Regex;

use crate::config::ParserConfig;
use crate::error::{ConfigError, ParseError};

const ORDINAL_PATTERN: &str = r"^\s*\d*\s*-?\.?(.*)$";
const NAME_TOKEN_PATTERN: &str = r"^\s*\w+-?'?\w*\.?&?\s*";
const SEPARATOR_PATTERN: &str = r"^\s*[,;:\-(]";

/// One parsed declaration line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeclaredConflict {
    /// A person's name.
    Person(String),
    /// An institution name, not yet resolved against the roster.
    Institution(String),
}

/// Line-oriented declaration parser.
#[derive(Debug, Clone)]
pub struct DeclarationParser {
    ordinal: Regex,
    name_token: Regex,
    separator: Regex,
    blacklist: Vec<String>,
    institution_indicators: Vec<String>,
}

impl DeclarationParser {
    /// Builds a parser from configuration.
    ///
    /// # Errors
    /// Returns `ConfigError::Validation` if the line grammar fails to compile.
    pub fn new(config: &ParserConfig) -> Result<Self, ConfigError> {
        let compile = |pattern: &str| {
            Regex::new(pattern)
                .map_err(|e| ConfigError::Validation(format!("declaration grammar: {e}")))
        };

        Ok(Self {
            ordinal: compile(ORDINAL_PATTERN)?,
            name_token: compile(NAME_TOKEN_PATTERN)?,
            separator: compile(SEPARATOR_PATTERN)?,
            blacklist: config.blacklist.iter().map(|w| w.to_lowercase()).collect(),
            institution_indicators: config
                .institution_indicators
                .iter()
                .map(|w| w.to_lowercase())
                .collect(),
        })
    }

    /// Parses a whole declaration block.
    ///
    /// # Errors
    /// The first offending line aborts the block; see [`Self::parse_line`].
    pub fn parse(&self, text: &str) -> Result<Vec<DeclaredConflict>, ParseError> {
        let mut out = Vec::new();
        for line in text.trim().lines() {
            if let Some(conflict) = self.parse_line(line)? {
                out.push(conflict);
            }
        }
        Ok(out)
    }

    /// Parses one declaration line.
    ///
    /// Returns `Ok(None)` for blank lines and for "none".
    ///
    /// # Errors
    /// - `BlacklistedToken`: a header word such as "institution" appears
    ///   among the name tokens, which usually means a table header was
    ///   pasted into the box
    /// - `InstitutionInNameSlot`: the line has the shape of a person but the
    ///   name contains an institution indicator such as "university"
    /// - `UnrecognizedLine`: the line has content but no name tokens
    pub fn parse_line(&self, line: &str) -> Result<Option<DeclaredConflict>, ParseError> {
        let raw = line;
        let line = line.trim_matches('"');
        let mut rest = self
            .ordinal
            .captures(line)
            .and_then(|c| c.get(1))
            .map_or(line, |m| m.as_str());

        let mut tokens = Vec::new();
        while let Some(m) = self.name_token.find(rest) {
            let token = m.as_str().trim();
            if self.blacklist.contains(&token.to_lowercase()) {
                return Err(ParseError::BlacklistedToken {
                    token: token.to_string(),
                    line: raw.to_string(),
                });
            }
            tokens.push(token);
            rest = &rest[m.end()..];
        }
        let name = tokens.join(" ");

        if name.eq_ignore_ascii_case("none") {
            return Ok(None);
        }

        if name.is_empty() {
            if rest.trim().is_empty() {
                return Ok(None);
            }
            return Err(ParseError::UnrecognizedLine {
                line: raw.to_string(),
            });
        }

        if self.separator.is_match(rest) {
            let lowered = name.to_lowercase();
            if self
                .institution_indicators
                .iter()
                .any(|indicator| lowered.contains(indicator.as_str()))
            {
                return Err(ParseError::InstitutionInNameSlot {
                    name,
                    line: raw.to_string(),
                });
            }
            return Ok(Some(DeclaredConflict::Person(name)));
        }

        Ok(Some(DeclaredConflict::Institution(name)))
    }
}

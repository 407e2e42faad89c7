//! Loading of conference-system exports into engine records.
//!
//! Four inputs feed a run:
//! - the institution roster (CSV, one institution per row, header skipped)
//! - submissions (JSON array exported by the conference system)
//! - program committee members (CSV exported by the conference system)
//! - the committee paper database (CSV, one accepted publication per row)
//!
//! Declaration parse failures are per-record; [`ParseErrorPolicy`] decides
//! whether they abort the batch or drop the record.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;
use tracing::{info, warn};

use crate::bibliography::{sanitize_coauthors, sanitize_title};
use crate::config::{BibliographyConfig, ParseErrorPolicy};
use crate::conflict::DeclarationParser;
use crate::error::{CoiError, CoiResult, IngestError, LookupError, ParseError};
use crate::identity::InstitutionRoster;
use crate::publication::Publication;
use crate::reviewer::{Reviewer, ReviewerEvidence};
use crate::submission::Submission;

/// Fixed columns of a committee export before the topic columns.
const PC_FIXED_COLUMNS: usize = 8;

/// Columns of a paper database row.
const PAPER_DB_COLUMNS: usize = 10;

/// Separator between author names in the paper database.
const AUTHOR_SEPARATOR: char = ';';

/// A submission as exported by the conference system.
#[derive(Debug, Clone, Deserialize)]
pub struct SubmissionRecord {
    /// Paper id.
    pub pid: u64,
    /// Title.
    pub title: String,
    /// Authors in byline order.
    #[serde(default)]
    pub authors: Vec<AuthorRecord>,
    /// Structured conflicts, keyed by reviewer email.
    #[serde(default)]
    pub pc_conflicts: BTreeMap<String, serde_json::Value>,
    /// Free-text collaborator declaration.
    #[serde(default)]
    pub collaborators: String,
    /// Topics.
    #[serde(default)]
    pub topics: Vec<String>,
}

/// One author of a [`SubmissionRecord`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthorRecord {
    /// Given name.
    pub first: Option<String>,
    /// Family name.
    pub last: Option<String>,
    /// Raw affiliation.
    pub affiliation: Option<String>,
}

impl AuthorRecord {
    /// "first last", or just "last" when no given name is exported.
    #[must_use]
    pub fn display_name(&self) -> Option<String> {
        match (&self.first, &self.last) {
            (Some(first), Some(last)) => Some(format!("{first} {last}")),
            (None, Some(last)) => Some(last.clone()),
            _ => None,
        }
    }
}

impl SubmissionRecord {
    /// Builds the engine record.
    ///
    /// # Errors
    /// `IngestError::MalformedRecord` if an author has no family name,
    /// `ParseError` if the collaborators field does not parse.
    pub fn into_submission(
        self,
        parser: &DeclarationParser,
        roster: &InstitutionRoster,
    ) -> CoiResult<Submission> {
        let mut builder = Submission::builder(self.pid)
            .title(self.title)
            .collaborators(self.collaborators);

        for author in &self.authors {
            let name = author.display_name().ok_or_else(|| {
                IngestError::malformed(format!("paper {}", self.pid), "author list is broken")
            })?;
            builder = builder.author(name);
            if let Some(affiliation) = &author.affiliation {
                builder = builder.affiliation(affiliation.clone());
            }
        }
        for email in self.pc_conflicts.into_keys() {
            builder = builder.declared_pc(email);
        }
        for topic in self.topics {
            builder = builder.topic(topic);
        }

        Ok(builder.build(parser, roster)?)
    }
}

/// One row of the committee paper database.
///
/// Columns are read by position: `email, id, first, last, keys, valid,
/// pub_key, pub_title, pub_year, pub_authors`. The member id, name and
/// author keys repeat the committee export and are not kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaperDbRow {
    /// Committee member email.
    pub email: String,
    /// `x` if the publication was confirmed as the member's.
    pub valid: String,
    /// Bibliography key of the publication.
    pub pub_key: String,
    /// Publication title.
    pub pub_title: String,
    /// Publication year.
    pub pub_year: i32,
    /// Author names, `;`-separated.
    pub pub_authors: String,
}

impl PaperDbRow {
    /// Reads one positional record. `row` is 1-based and only labels errors.
    ///
    /// # Errors
    /// `IngestError::MalformedRecord` on a short row or a non-numeric year.
    pub fn from_record(record: &csv::StringRecord, row: usize) -> Result<Self, IngestError> {
        let label = || format!("paper db row {row}");
        if record.len() < PAPER_DB_COLUMNS {
            return Err(IngestError::malformed(
                label(),
                format!("expected {PAPER_DB_COLUMNS} columns, got {}", record.len()),
            ));
        }
        let field = |i: usize| record.get(i).unwrap_or_default().trim();
        let pub_year = field(8)
            .parse()
            .map_err(|_| IngestError::malformed(label(), format!("bad year {:?}", field(8))))?;
        Ok(Self {
            email: field(0).to_string(),
            valid: field(5).to_string(),
            pub_key: field(6).to_string(),
            pub_title: field(7).to_string(),
            pub_year,
            pub_authors: field(9).to_string(),
        })
    }

    /// Returns true if the row was confirmed.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.valid == "x"
    }

    /// Builds the publication, with crawler sanitizing applied.
    #[must_use]
    pub fn to_publication(&self) -> Publication {
        let names: Vec<String> = self
            .pub_authors
            .split(AUTHOR_SEPARATOR)
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .map(ToString::to_string)
            .collect();
        Publication::new(
            self.pub_key.clone(),
            sanitize_title(&self.pub_title),
            self.pub_year,
            sanitize_coauthors(names).into_iter().map(|name| (name, None)),
        )
    }
}

/// Reads the institution roster. The first row is a header.
///
/// # Errors
/// Returns `IngestError::Csv` on malformed CSV.
pub fn read_roster<R: Read>(reader: R) -> Result<InstitutionRoster, IngestError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(|c| c.trim().to_string()).collect::<Vec<_>>());
    }
    Ok(rows.into_iter().collect())
}

/// Reads the institution roster from `path`.
///
/// # Errors
/// As [`read_roster`], plus `IngestError::Io`.
pub fn load_roster(path: impl AsRef<Path>) -> Result<InstitutionRoster, IngestError> {
    let roster = read_roster(open(path.as_ref())?)?;
    info!(institutions = roster.len(), "loaded institution roster");
    Ok(roster)
}

/// Reads submissions from a JSON array.
///
/// # Errors
/// `IngestError` on malformed JSON or records. Parse errors follow `policy`.
pub fn read_submissions<R: Read>(
    reader: R,
    parser: &DeclarationParser,
    roster: &InstitutionRoster,
    policy: ParseErrorPolicy,
) -> CoiResult<Vec<Submission>> {
    let records: Vec<SubmissionRecord> =
        serde_json::from_reader(reader).map_err(IngestError::from)?;
    let mut out = Vec::with_capacity(records.len());
    for record in records {
        let label = format!("paper {}", record.pid);
        if let Some(submission) = apply_policy(policy, &label, record.into_submission(parser, roster))? {
            out.push(submission);
        }
    }
    Ok(out)
}

/// Reads submissions from `path`.
///
/// # Errors
/// As [`read_submissions`], plus `IngestError::Io`.
pub fn load_submissions(
    path: impl AsRef<Path>,
    parser: &DeclarationParser,
    roster: &InstitutionRoster,
    policy: ParseErrorPolicy,
) -> CoiResult<Vec<Submission>> {
    let submissions = read_submissions(open(path.as_ref())?, parser, roster, policy)?;
    info!(submissions = submissions.len(), "loaded submissions");
    Ok(submissions)
}

/// Reads committee members from a conference-system export.
///
/// Columns are `first, last, email, roles, tags, affiliation,
/// collaborators, follow`, followed by one column per topic.
///
/// # Errors
/// `IngestError` on malformed CSV or short rows. Parse errors follow
/// `policy`.
pub fn read_reviewers<R: Read>(
    reader: R,
    parser: &DeclarationParser,
    roster: &InstitutionRoster,
    policy: ParseErrorPolicy,
) -> CoiResult<Vec<ReviewerEvidence>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let mut out = Vec::new();
    for (row, record) in reader.records().enumerate() {
        let record = record.map_err(IngestError::from)?;
        if record.len() < PC_FIXED_COLUMNS {
            return Err(IngestError::malformed(
                format!("committee row {}", row + 1),
                format!("expected at least {PC_FIXED_COLUMNS} columns, got {}", record.len()),
            )
            .into());
        }
        let field = |i: usize| record.get(i).unwrap_or_default().trim();

        let mut builder = Reviewer::builder()
            .name(field(0), field(1))
            .email(field(2))
            .tags(field(4))
            .affiliation(field(5))
            .collaborators(field(6));
        for topic in record.iter().skip(PC_FIXED_COLUMNS).map(str::trim).filter(|t| !t.is_empty()) {
            builder = builder.topic(topic);
        }

        let label = format!("committee member {}", field(2));
        if let Some(reviewer) = apply_policy(policy, &label, builder.build(parser, roster).map_err(CoiError::from))? {
            out.push(ReviewerEvidence::new(reviewer));
        }
    }
    Ok(out)
}

/// Reads committee members from `path`.
///
/// # Errors
/// As [`read_reviewers`], plus `IngestError::Io`.
pub fn load_reviewers(
    path: impl AsRef<Path>,
    parser: &DeclarationParser,
    roster: &InstitutionRoster,
    policy: ParseErrorPolicy,
) -> CoiResult<Vec<ReviewerEvidence>> {
    let reviewers = read_reviewers(open(path.as_ref())?, parser, roster, policy)?;
    info!(reviewers = reviewers.len(), "loaded committee members");
    Ok(reviewers)
}

/// Merges confirmed rows of the paper database into the augmented views.
///
/// Returns the number of publications accepted.
///
/// # Errors
/// `LookupError::UnknownReviewer` for a confirmed row whose email is not a
/// committee member; `IngestError` on malformed rows. Header names are
/// ignored.
pub fn apply_paper_db<R: Read>(
    reader: R,
    reviewers: &mut [ReviewerEvidence],
    config: &BibliographyConfig,
) -> CoiResult<usize> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let mut accepted = 0;
    for (index, record) in reader.records().enumerate() {
        let record = record.map_err(IngestError::from)?;
        let row = PaperDbRow::from_record(&record, index + 1)?;
        if !row.is_valid() {
            continue;
        }
        let evidence = reviewers
            .iter_mut()
            .find(|r| r.email() == row.email)
            .ok_or_else(|| LookupError::UnknownReviewer {
                email: row.email.clone(),
            })?;
        if evidence.add_publication(row.to_publication(), config) {
            accepted += 1;
        }
    }
    Ok(accepted)
}

/// Merges the paper database at `path`.
///
/// # Errors
/// As [`apply_paper_db`], plus `IngestError::Io`.
pub fn load_paper_db(
    path: impl AsRef<Path>,
    reviewers: &mut [ReviewerEvidence],
    config: &BibliographyConfig,
) -> CoiResult<usize> {
    let accepted = apply_paper_db(open(path.as_ref())?, reviewers, config)?;
    info!(publications = accepted, "loaded committee paper database");
    Ok(accepted)
}

fn apply_policy<T>(
    policy: ParseErrorPolicy,
    label: &str,
    result: CoiResult<T>,
) -> CoiResult<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(CoiError::Parse(err)) if policy == ParseErrorPolicy::Skip => {
            warn_skipped(label, &err);
            Ok(None)
        }
        Err(err) => Err(err),
    }
}

fn warn_skipped(label: &str, err: &ParseError) {
    warn!(record = %label, line = %err.line(), error = %err, "skipping record");
}

fn open(path: &Path) -> Result<File, IngestError> {
    File::open(path).map_err(|e| IngestError::Io {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

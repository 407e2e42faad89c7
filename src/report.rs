//! Tabular output of reconciliation results.
//!
//! One CSV per category with `valid,pid,email,reasons` rows, a plain-text
//! listing for eyeballing, and the conference-system assignment upload that
//! turns a reviewed report into conflicts.

use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::IngestError;
use crate::reconcile::{ConflictCategory, ConflictClassification};
use crate::submission::Submission;

/// Marker in the `valid` column for rows that should become conflicts.
pub const VALID_MARKER: &str = "x";

const REPORT_HEADER: [&str; 4] = ["valid", "pid", "email", "reasons"];
const ASSIGNMENT_HEADER: [&str; 3] = ["paper", "assignment", "email"];

/// One reported (submission, reviewer) conflict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRow {
    /// [`VALID_MARKER`] when the conflict should be uploaded; a reviewer of
    /// the report clears it to drop the row.
    pub valid: String,
    /// Paper id.
    pub pid: u64,
    /// Reviewer email.
    pub email: String,
    /// Category-specific reason text.
    pub reasons: String,
}

impl ReportRow {
    /// Returns true if the row is marked valid.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.valid == VALID_MARKER
    }
}

/// One line of a conference-system assignment upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    /// Paper id.
    pub paper: u64,
    /// Assignment action, e.g. `conflict`.
    pub assignment: String,
    /// Reviewer email.
    pub email: String,
}

impl Assignment {
    /// A conflict assignment.
    #[must_use]
    pub fn conflict(paper: u64, email: impl Into<String>) -> Self {
        Self {
            paper,
            assignment: "conflict".to_string(),
            email: email.into(),
        }
    }
}

/// Flattens one category of every submission into report rows.
#[must_use]
pub fn report_rows(submissions: &[Submission], category: ConflictCategory) -> Vec<ReportRow> {
    submissions
        .iter()
        .flat_map(|s| {
            s.classification()
                .reasons(category)
                .into_iter()
                .map(move |(email, reasons)| ReportRow {
                    valid: VALID_MARKER.to_string(),
                    pid: s.id,
                    email,
                    reasons,
                })
        })
        .collect()
}

/// Writes report rows as CSV. The header is written even with no rows.
///
/// # Errors
/// Returns `IngestError::Csv` on write failures.
pub fn write_report<W: Write>(writer: W, rows: &[ReportRow]) -> Result<(), IngestError> {
    write_rows(writer, &REPORT_HEADER, rows)
}

/// Writes report rows to `path`.
///
/// # Errors
/// `IngestError::Io` if the file cannot be created, otherwise as
/// [`write_report`].
pub fn write_report_file(path: impl AsRef<Path>, rows: &[ReportRow]) -> Result<(), IngestError> {
    write_report(create(path.as_ref())?, rows)
}

/// Reads a report back, tolerating spaces around fields.
///
/// # Errors
/// Returns `IngestError::Csv` on malformed rows.
pub fn read_report<R: Read>(reader: R) -> Result<Vec<ReportRow>, IngestError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut rows = Vec::new();
    for row in reader.deserialize() {
        rows.push(row?);
    }
    Ok(rows)
}

/// Conflict assignments for every valid row.
#[must_use]
pub fn assignments_from_report(rows: &[ReportRow]) -> Vec<Assignment> {
    rows.iter()
        .filter(|r| r.is_valid())
        .map(|r| Assignment::conflict(r.pid, r.email.clone()))
        .collect()
}

/// Writes an assignment upload as CSV.
///
/// # Errors
/// Returns `IngestError::Csv` on write failures.
pub fn write_assignments<W: Write>(writer: W, assignments: &[Assignment]) -> Result<(), IngestError> {
    write_rows(writer, &ASSIGNMENT_HEADER, assignments)
}

/// Writes an assignment upload to `path`.
///
/// # Errors
/// `IngestError::Io` if the file cannot be created, otherwise as
/// [`write_assignments`].
pub fn write_assignments_file(
    path: impl AsRef<Path>,
    assignments: &[Assignment],
) -> Result<(), IngestError> {
    write_assignments(create(path.as_ref())?, assignments)
}

/// Human-readable listing of one category.
#[must_use]
pub fn format_listing(classification: &ConflictClassification, category: ConflictCategory) -> String {
    let mut out = String::new();
    for (email, reasons) in classification.reasons(category) {
        out.push_str(&format!("====> email: {email}\n"));
        if !reasons.is_empty() {
            out.push_str(&reasons);
            out.push('\n');
        }
    }
    out
}

fn write_rows<W: Write, T: Serialize>(
    writer: W,
    header: &[&str],
    rows: &[T],
) -> Result<(), IngestError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(!rows.is_empty())
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(writer);
    if rows.is_empty() {
        writer.write_record(header)?;
    }
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush().map_err(|e| IngestError::Io {
        path: "<writer>".to_string(),
        message: e.to_string(),
    })
}

fn create(path: &Path) -> Result<BufWriter<File>, IngestError> {
    File::create(path)
        .map(BufWriter::new)
        .map_err(|e| IngestError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::Person;
    use crate::reconcile::ClaimSource;

    fn rows() -> Vec<ReportRow> {
        vec![
            ReportRow {
                valid: "x".to_string(),
                pid: 3,
                email: "ada@example.org".to_string(),
                reasons: "institutions:[(MIT);];".to_string(),
            },
            ReportRow {
                valid: String::new(),
                pid: 4,
                email: "bob@example.org".to_string(),
                reasons: String::new(),
            },
        ]
    }

    #[test]
    fn test_write_report_format() {
        let mut out = Vec::new();
        write_report(&mut out, &rows()).unwrap();
        let text = String::from_utf8(out).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("valid,pid,email,reasons"));
        assert_eq!(lines.next(), Some("x,3,ada@example.org,institutions:[(MIT);];"));
        assert_eq!(lines.next(), Some(",4,bob@example.org,"));
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn test_empty_report_has_header() {
        let mut out = Vec::new();
        write_report(&mut out, &[]).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "valid,pid,email,reasons\n");
    }

    #[test]
    fn test_read_report_tolerates_spaces() {
        let input = "valid, pid, email, reasons\nx, 12, ada@example.org, pc_conflicts\n";
        let rows = read_report(input.as_bytes()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].pid, 12);
        assert_eq!(rows[0].reasons, "pc_conflicts");
        assert!(rows[0].is_valid());
    }

    #[test]
    fn test_assignments_skip_cleared_rows() {
        let assignments = assignments_from_report(&rows());
        assert_eq!(assignments, vec![Assignment::conflict(3, "ada@example.org")]);

        let mut out = Vec::new();
        write_assignments(&mut out, &assignments).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "paper,assignment,email\n3,conflict,ada@example.org\n"
        );
    }

    #[test]
    fn test_file_round_trip_through_upload() {
        let dir = tempfile::tempdir().unwrap();
        let report = dir.path().join("fake.csv");
        let upload = dir.path().join("upload.csv");

        write_report_file(&report, &rows()).unwrap();
        let read = read_report(File::open(&report).unwrap()).unwrap();
        write_assignments_file(&upload, &assignments_from_report(&read)).unwrap();

        let text = std::fs::read_to_string(&upload).unwrap();
        assert_eq!(text, "paper,assignment,email\n3,conflict,ada@example.org\n");
    }

    #[test]
    fn test_format_listing() {
        let mut c = ConflictClassification::default();
        c.properly_declared.insert("a@x".to_string());
        c.declared_in_free_text.insert("b@x".to_string(), Person::new("Jane Doe"));
        c.unverifiable.insert("a@x".to_string(), ClaimSource::Collaborators);

        assert_eq!(format_listing(&c, ConflictCategory::ProperlyDeclared), "====> email: a@x\n");
        assert_eq!(
            format_listing(&c, ConflictCategory::DeclaredInFreeText),
            "====> email: b@x\nJane Doe\n"
        );
        assert_eq!(
            format_listing(&c, ConflictCategory::Unverifiable),
            "====> email: a@x\ncollaborators\n"
        );
        assert!(format_listing(&c, ConflictCategory::FoundInBibliography).is_empty());
    }
}

//! Reviewer-paper affinity from topics, expertise and citations.
//!
//! The expertise database lists, for every committee member, which entries
//! of a fixed expertise vocabulary they cover. A topic map links each
//! expertise to the conference-system topics it corresponds to. A paper's
//! expertise score for a reviewer is the number of (paper topic, expertise)
//! links whose expertise the reviewer covers; the citation score is how
//! often the paper cites the reviewer.

use std::collections::BTreeMap;
use std::io::{Read, Write};

use serde::Serialize;
use tracing::debug;

use crate::error::{CoiResult, IngestError, LookupError};
use crate::submission::Submission;

/// Column holding the email in an expertise database row.
const EXPERTISE_EMAIL_COLUMN: usize = 2;

/// Expertise vocabulary and its topic links.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TopicMap {
    expertise: Vec<String>,
    topic_to_expertise: BTreeMap<String, Vec<String>>,
}

impl TopicMap {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an expertise and the topics it covers.
    pub fn insert<I, T>(&mut self, expertise: impl Into<String>, topics: I)
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let expertise = expertise.into();
        for topic in topics {
            self.topic_to_expertise
                .entry(topic.into())
                .or_default()
                .push(expertise.clone());
        }
        self.expertise.push(expertise);
    }

    /// Expertise vocabulary, in database column order.
    #[must_use]
    pub fn expertise(&self) -> &[String] {
        &self.expertise
    }

    /// Expertise linked to `topic`.
    ///
    /// # Errors
    /// `LookupError::UnknownTopic` if no expertise covers `topic`.
    pub fn expertise_for(&self, topic: &str) -> Result<&[String], LookupError> {
        self.topic_to_expertise
            .get(topic)
            .map(Vec::as_slice)
            .ok_or_else(|| LookupError::UnknownTopic {
                topic: topic.to_string(),
            })
    }

    /// Reads rows of `expertise, topic, topic, ...`. The first row is a
    /// header.
    ///
    /// # Errors
    /// Returns `IngestError::Csv` on malformed CSV.
    pub fn read<R: Read>(reader: R) -> Result<Self, IngestError> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut map = Self::new();
        for record in reader.records() {
            let record = record?;
            let mut fields = record.iter();
            let Some(expertise) = fields.next() else {
                continue;
            };
            map.insert(expertise, fields.filter(|t| !t.is_empty()));
        }
        Ok(map)
    }
}

/// Expertise covered by each committee member.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpertiseDb {
    by_email: BTreeMap<String, Vec<String>>,
}

impl ExpertiseDb {
    /// Creates an empty database.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the expertise of `email`.
    pub fn insert(&mut self, email: impl Into<String>, expertise: Vec<String>) {
        self.by_email.insert(email.into(), expertise);
    }

    /// Expertise of `email`.
    ///
    /// # Errors
    /// `LookupError::UnknownReviewer` if `email` has no row.
    pub fn expertise_of(&self, email: &str) -> Result<&[String], LookupError> {
        self.by_email
            .get(email)
            .map(Vec::as_slice)
            .ok_or_else(|| LookupError::UnknownReviewer {
                email: email.to_string(),
            })
    }

    /// Members in email order.
    pub fn emails(&self) -> impl Iterator<Item = &str> {
        self.by_email.keys().map(String::as_str)
    }

    /// Reads rows whose third column is the email and whose remaining
    /// columns flag, in vocabulary order, each expertise (non-blank means
    /// covered). The first row is a header.
    ///
    /// # Errors
    /// `LookupError::ExpertiseMismatch` if a row's flag count differs from
    /// the vocabulary size, `IngestError` on malformed CSV.
    pub fn read<R: Read>(reader: R, topics: &TopicMap) -> CoiResult<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(reader);
        let vocabulary = topics.expertise();
        let mut db = Self::new();
        for (row, record) in reader.records().enumerate() {
            let record = record.map_err(IngestError::from)?;
            let Some(email) = record.get(EXPERTISE_EMAIL_COLUMN) else {
                return Err(IngestError::malformed(
                    format!("expertise row {}", row + 1),
                    "missing email column",
                )
                .into());
            };
            let flags: Vec<&str> = record.iter().skip(EXPERTISE_EMAIL_COLUMN + 1).collect();
            if flags.len() != vocabulary.len() {
                return Err(LookupError::ExpertiseMismatch {
                    expected: vocabulary.len(),
                    actual: flags.len(),
                }
                .into());
            }
            let covered = vocabulary
                .iter()
                .zip(flags)
                .filter(|(_, flag)| !flag.trim().is_empty())
                .map(|(e, _)| e.clone())
                .collect();
            db.insert(email.trim(), covered);
        }
        Ok(db)
    }
}

/// How often each paper cites each committee member.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Citations {
    by_paper: BTreeMap<u64, BTreeMap<String, u32>>,
}

impl Citations {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `count` citations of `email` by paper `pid`.
    pub fn insert(&mut self, pid: u64, email: impl Into<String>, count: u32) {
        self.by_paper.entry(pid).or_default().insert(email.into(), count);
    }

    /// Citations of `email` by paper `pid`; zero when unknown.
    #[must_use]
    pub fn count(&self, pid: u64, email: &str) -> u32 {
        self.by_paper
            .get(&pid)
            .and_then(|m| m.get(email))
            .copied()
            .unwrap_or(0)
    }

    /// Reads `email, count` rows for paper `pid`. The first row is a header.
    ///
    /// # Errors
    /// Returns `IngestError::Csv` on malformed rows.
    pub fn read_paper<R: Read>(&mut self, pid: u64, reader: R) -> Result<(), IngestError> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        for row in reader.deserialize::<(String, u32)>() {
            let (email, count) = row?;
            self.insert(pid, email, count);
        }
        Ok(())
    }
}

/// Affinity of one reviewer for one paper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AffinityScore {
    /// Expertise links matched.
    pub expertise: u32,
    /// Citations of the reviewer.
    pub citations: u32,
}

impl AffinityScore {
    /// Combined preference.
    #[must_use]
    pub const fn total(&self) -> u32 {
        self.expertise + self.citations
    }
}

/// Which component of [`AffinityScore`] a score matrix reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreKind {
    /// Expertise links matched.
    Expertise,
    /// Citations of the reviewer.
    Citations,
}

impl ScoreKind {
    const fn pick(self, score: AffinityScore) -> u32 {
        match self {
            Self::Expertise => score.expertise,
            Self::Citations => score.citations,
        }
    }
}

/// A preference line of a conference-system upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Preference {
    /// Paper id.
    pub paper: u64,
    /// Reviewer email.
    pub email: String,
    /// Always `preference`.
    pub assignment: &'static str,
    /// Combined affinity.
    pub preference: u32,
}

/// Scores submissions against the expertise database.
#[derive(Debug, Clone, Copy)]
pub struct AffinityScorer<'a> {
    topics: &'a TopicMap,
    expertise: &'a ExpertiseDb,
    citations: &'a Citations,
}

impl<'a> AffinityScorer<'a> {
    /// Creates a scorer.
    #[must_use]
    pub const fn new(topics: &'a TopicMap, expertise: &'a ExpertiseDb, citations: &'a Citations) -> Self {
        Self {
            topics,
            expertise,
            citations,
        }
    }

    /// Affinity of `email` for `submission`.
    ///
    /// # Errors
    /// `LookupError::UnknownReviewer` for an email outside the expertise
    /// database, `LookupError::UnknownTopic` for a paper topic no expertise
    /// covers.
    pub fn score(&self, submission: &Submission, email: &str) -> Result<AffinityScore, LookupError> {
        let covered = self.expertise.expertise_of(email)?;
        let mut expertise = 0;
        for topic in &submission.topics {
            for linked in self.topics.expertise_for(topic)? {
                if covered.contains(linked) {
                    expertise += 1;
                }
            }
        }
        Ok(AffinityScore {
            expertise,
            citations: self.citations.count(submission.id, email),
        })
    }

    /// Preferences for every (submission, member) pair, by paper id then
    /// email.
    ///
    /// # Errors
    /// As [`Self::score`].
    pub fn preferences(&self, submissions: &[Submission]) -> Result<Vec<Preference>, LookupError> {
        let mut ordered: Vec<&Submission> = submissions.iter().collect();
        ordered.sort_by_key(|s| s.id);

        let mut out = Vec::new();
        for submission in ordered {
            for email in self.expertise.emails() {
                let score = self.score(submission, email)?;
                out.push(Preference {
                    paper: submission.id,
                    email: email.to_string(),
                    assignment: "preference",
                    preference: score.total(),
                });
            }
        }
        debug!(preferences = out.len(), "computed affinity");
        Ok(out)
    }
}

/// Writes one row per paper, by paper id: `pid,topics,<email>...,total`.
///
/// Topics are `;`-joined with commas turned into `-`. `total` is the row
/// sum of the `kind` component over all members.
///
/// # Errors
/// `LookupError` as [`AffinityScorer::score`], `IngestError::Csv` on write
/// failures.
pub fn write_score_matrix<W: Write>(
    writer: W,
    scorer: &AffinityScorer<'_>,
    submissions: &[Submission],
    kind: ScoreKind,
) -> CoiResult<()> {
    let emails: Vec<&str> = scorer.expertise.emails().collect();
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(writer);

    let mut header = vec!["pid".to_string(), "topics".to_string()];
    header.extend(emails.iter().map(ToString::to_string));
    header.push("total".to_string());
    writer.write_record(&header).map_err(IngestError::from)?;

    let mut ordered: Vec<&Submission> = submissions.iter().collect();
    ordered.sort_by_key(|s| s.id);
    for submission in ordered {
        let topics = submission
            .topics
            .iter()
            .map(|t| t.replace(',', "-"))
            .collect::<Vec<_>>()
            .join(";");
        let mut row = vec![submission.id.to_string(), topics];
        let mut total = 0;
        for email in &emails {
            let value = kind.pick(scorer.score(submission, email)?);
            total += value;
            row.push(value.to_string());
        }
        row.push(total.to_string());
        writer.write_record(&row).map_err(IngestError::from)?;
    }
    writer.flush().map_err(|e| IngestError::Io {
        path: "<writer>".to_string(),
        message: e.to_string(),
    })?;
    Ok(())
}

/// Writes preferences as `paper,email,assignment,preference` CSV.
///
/// # Errors
/// Returns `IngestError::Csv` on write failures.
pub fn write_preferences<W: Write>(writer: W, preferences: &[Preference]) -> Result<(), IngestError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(writer);
    writer.write_record(["paper", "email", "assignment", "preference"])?;
    for preference in preferences {
        writer.serialize(preference)?;
    }
    writer.flush().map_err(|e| IngestError::Io {
        path: "<writer>".to_string(),
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ParserConfig;
    use crate::conflict::DeclarationParser;
    use crate::error::CoiError;
    use crate::identity::InstitutionRoster;

    fn topics() -> TopicMap {
        let input = "expertise,topics\nMemory,Caches,DRAM\nCompilers,Compilers\nSecurity,Caches\n";
        TopicMap::read(input.as_bytes()).unwrap()
    }

    fn db() -> ExpertiseDb {
        let input = "first,last,email,Memory,Compilers,Security\n\
                     Ada,Lovelace,ada@x,x,,x\n\
                     Grace,Hopper,grace@x,,x,\n";
        ExpertiseDb::read(input.as_bytes(), &topics()).unwrap()
    }

    fn submission(id: u64, topics: &[&str]) -> Submission {
        let parser = DeclarationParser::new(&ParserConfig::default()).unwrap();
        let mut builder = Submission::builder(id).title("T");
        for t in topics {
            builder = builder.topic(*t);
        }
        builder.build(&parser, &InstitutionRoster::new()).unwrap()
    }

    #[test]
    fn test_topic_map() {
        let map = topics();
        assert_eq!(map.expertise(), ["Memory", "Compilers", "Security"]);
        assert_eq!(map.expertise_for("Caches").unwrap(), ["Memory", "Security"]);
        assert!(matches!(map.expertise_for("Quantum"), Err(LookupError::UnknownTopic { .. })));
    }

    #[test]
    fn test_expertise_row_mismatch() {
        let input = "first,last,email,Memory\nAda,Lovelace,ada@x,x\n";
        let err = ExpertiseDb::read(input.as_bytes(), &topics()).unwrap_err();
        assert!(matches!(
            err,
            CoiError::Lookup(LookupError::ExpertiseMismatch { expected: 3, actual: 1 })
        ));
    }

    #[test]
    fn test_score() {
        let (topics, db) = (topics(), db());
        let mut citations = Citations::new();
        citations.read_paper(1, "email,count\nada@x, 4\n".as_bytes()).unwrap();
        let scorer = AffinityScorer::new(&topics, &db, &citations);

        let s = submission(1, &["Caches", "Compilers"]);
        let ada = scorer.score(&s, "ada@x").unwrap();
        assert_eq!(ada, AffinityScore { expertise: 2, citations: 4 });
        assert_eq!(ada.total(), 6);
        assert_eq!(scorer.score(&s, "grace@x").unwrap().total(), 1);

        assert!(matches!(scorer.score(&s, "eve@x"), Err(LookupError::UnknownReviewer { .. })));
        let unknown = submission(2, &["Quantum"]);
        assert!(matches!(scorer.score(&unknown, "ada@x"), Err(LookupError::UnknownTopic { .. })));
    }

    #[test]
    fn test_preferences_upload() {
        let (topics, db, citations) = (topics(), db(), Citations::new());
        let scorer = AffinityScorer::new(&topics, &db, &citations);
        let prefs = scorer
            .preferences(&[submission(5, &["DRAM"]), submission(3, &[])])
            .unwrap();
        assert_eq!(prefs.len(), 4);
        assert_eq!(prefs[0].paper, 3);

        let mut out = Vec::new();
        write_preferences(&mut out, &prefs).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "paper,email,assignment,preference\n\
             3,ada@x,preference,0\n\
             3,grace@x,preference,0\n\
             5,ada@x,preference,1\n\
             5,grace@x,preference,0\n"
        );
    }

    #[test]
    fn test_score_matrices() {
        let (topics, db) = (topics(), db());
        let mut citations = Citations::new();
        citations.insert(1, "grace@x", 2);
        citations.insert(1, "ada@x", 1);
        let scorer = AffinityScorer::new(&topics, &db, &citations);
        let papers = [submission(4, &[]), submission(1, &["Caches", "Compilers"])];

        let mut out = Vec::new();
        write_score_matrix(&mut out, &scorer, &papers, ScoreKind::Expertise).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "pid,topics,ada@x,grace@x,total\n\
             1,Caches;Compilers,2,1,3\n\
             4,,0,0,0\n"
        );

        let mut out = Vec::new();
        write_score_matrix(&mut out, &scorer, &papers, ScoreKind::Citations).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "pid,topics,ada@x,grace@x,total\n\
             1,Caches;Compilers,1,2,3\n\
             4,,0,0,0\n"
        );
    }

    #[test]
    fn test_score_matrix_topic_commas() {
        let mut topics = topics();
        topics.insert("Systems", ["Caches, DRAM"]);
        let db = ExpertiseDb::new();
        let citations = Citations::new();
        let scorer = AffinityScorer::new(&topics, &db, &citations);

        let mut out = Vec::new();
        write_score_matrix(&mut out, &scorer, &[submission(2, &["Caches, DRAM"])], ScoreKind::Expertise).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "pid,topics,total\n2,Caches- DRAM,0\n");
    }
}

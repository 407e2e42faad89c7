//! The five-pass reconciliation over submissions × reviewers.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{debug, info};

use super::classification::{ClaimSource, ConflictCategory, ConflictClassification};
use crate::conflict::ConflictProfile;
use crate::reviewer::{Reviewer, ReviewerEvidence};
use crate::submission::Submission;

/// Conflicts between a submission and one view of a reviewer.
///
/// The submission's declared institutions (free-text plus author
/// affiliations) are intersected with the reviewer's institutions, and the
/// author list with the reviewer's collaborators. Reasons name the
/// reviewer-side entries.
#[must_use]
pub fn conflicts_between(submission: &Submission, reviewer: &Reviewer) -> ConflictProfile {
    let mut conflicts = submission.declared.institution_conflicts(&reviewer.conflicts);
    conflicts.merge_collaborators(
        &submission
            .paper
            .authors
            .collaborator_conflicts(&reviewer.conflicts),
    );
    conflicts
}

/// Outcome of a batch run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconcileSummary {
    /// Submissions classified.
    pub submissions: usize,

    /// Reviewers each submission was checked against.
    pub reviewers: usize,

    /// Entries per category, keyed by report name.
    pub counts: BTreeMap<String, usize>,

    /// Crate version that produced the run.
    pub engine_version: String,

    /// RFC 3339 start time.
    pub run_at: String,
}

impl ReconcileSummary {
    /// Entries recorded in `category`.
    #[must_use]
    pub fn count(&self, category: ConflictCategory) -> usize {
        self.counts.get(category.as_str()).copied().unwrap_or(0)
    }
}

/// Classifies submissions against a fixed reviewer pool.
///
/// Reviewer evidence is read-only; each submission's classification is
/// rebuilt from scratch on every call.
#[derive(Debug, Clone, Copy)]
pub struct Reconciler<'a> {
    reviewers: &'a [ReviewerEvidence],
}

impl<'a> Reconciler<'a> {
    /// Creates a reconciler over `reviewers`.
    #[must_use]
    pub const fn new(reviewers: &'a [ReviewerEvidence]) -> Self {
        Self { reviewers }
    }

    /// Number of reviewers in the pool.
    #[must_use]
    pub const fn reviewer_count(&self) -> usize {
        self.reviewers.len()
    }

    /// Runs all five passes for one submission.
    pub fn classify(&self, submission: &mut Submission) {
        *submission.classification_mut() = ConflictClassification::default();
        Self::record_properly_declared(submission);
        self.record_free_text(submission);
        self.record_declared_by_reviewer(submission);
        self.record_bibliography(submission);
        self.record_unverifiable(submission);
    }

    /// Classifies every submission and summarizes the outcome.
    pub fn run(&self, submissions: &mut [Submission]) -> ReconcileSummary {
        let run_at = chrono::Utc::now().to_rfc3339();
        info!(
            submissions = submissions.len(),
            reviewers = self.reviewers.len(),
            "cross referencing conflicts"
        );

        let mut counts: BTreeMap<String, usize> = ConflictCategory::ALL
            .into_iter()
            .map(|c| (c.as_str().to_string(), 0))
            .collect();
        for submission in submissions.iter_mut() {
            self.classify(submission);
            for category in ConflictCategory::ALL {
                *counts.entry(category.as_str().to_string()).or_default() +=
                    submission.classification().count(category);
            }
        }

        for (category, count) in &counts {
            info!(category = %category, count, "conflicts recorded");
        }

        ReconcileSummary {
            submissions: submissions.len(),
            reviewers: self.reviewers.len(),
            counts,
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at,
        }
    }

    fn record_properly_declared(submission: &mut Submission) {
        let declared = submission.declared_pc.clone();
        let classification = submission.classification_mut();
        for email in declared {
            classification.properly_declared.insert(email);
        }
    }

    fn record_free_text(&self, submission: &mut Submission) {
        for evidence in self.reviewers {
            let email = evidence.email();
            if submission.declares_pc(email) {
                continue;
            }
            let Some(matched) = submission
                .declared
                .find_collaborator(evidence.declared.name())
                .cloned()
            else {
                continue;
            };
            debug!(pid = submission.id, email = %email, matched = %matched, "conflict in collaborators field");
            submission
                .classification_mut()
                .declared_in_free_text
                .insert(email.to_string(), matched);
        }
    }

    fn record_declared_by_reviewer(&self, submission: &mut Submission) {
        for evidence in self.reviewers {
            let email = evidence.email();
            if submission.classification().is_claimed(email) {
                continue;
            }
            let conflicts = conflicts_between(submission, &evidence.declared);
            if conflicts.is_empty() {
                continue;
            }
            debug!(pid = submission.id, email = %email, "conflict declared by reviewer");
            submission
                .classification_mut()
                .declared_by_reviewer
                .insert(email.to_string(), conflicts);
        }
    }

    fn record_bibliography(&self, submission: &mut Submission) {
        for evidence in self.reviewers {
            let email = evidence.email();
            let classification = submission.classification();
            if classification.contains(ConflictCategory::DeclaredByReviewer, email)
                || classification.is_claimed(email)
            {
                continue;
            }
            let conflicts = conflicts_between(submission, &evidence.augmented);
            if conflicts.is_empty() {
                continue;
            }
            debug!(pid = submission.id, email = %email, "conflict found in bibliography");
            submission
                .classification_mut()
                .found_in_bibliography
                .insert(email.to_string(), conflicts);
        }
    }

    fn record_unverifiable(&self, submission: &mut Submission) {
        for evidence in self.reviewers {
            let email = evidence.email();
            let source = if submission
                .classification()
                .contains(ConflictCategory::ProperlyDeclared, email)
            {
                ClaimSource::PcConflicts
            } else if submission
                .classification()
                .contains(ConflictCategory::DeclaredInFreeText, email)
            {
                ClaimSource::Collaborators
            } else {
                continue;
            };

            if !conflicts_between(submission, &evidence.declared).is_empty()
                || !conflicts_between(submission, &evidence.augmented).is_empty()
            {
                continue;
            }
            debug!(pid = submission.id, email = %email, source = %source, "unverifiable conflict");
            submission
                .classification_mut()
                .unverifiable
                .insert(email.to_string(), source);
        }
    }
}

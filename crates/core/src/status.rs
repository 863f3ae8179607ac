//! # Status model
//!
//! The summary types the dashboard builds on every poll: the normalized result
//! of a check run or check suite, the review tally, the per pull request summary
//! and the per repository poll result. They are built fresh on each poll, never
//! mutated once returned, and serialize with absent fields omitted.

use chrono::{DateTime, Utc};
use pr_dashboard_developer_platforms::models::{CheckConclusion, CheckStatus, Review, ReviewState};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;

/// The normalized result of a check run.
///
/// Queued and in-progress runs report their status; everything else reports
/// its conclusion, with `Unknown` standing in for missing or unrecognized ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckRunResult {
    Queued,
    InProgress,
    Success,
    Failure,
    Skipped,
    Neutral,
    TimedOut,
    Unknown,
}

/// The normalized result of a check suite. Suites normalize exactly like runs.
pub type CheckSuiteResult = CheckRunResult;

impl CheckRunResult {
    /// Normalizes a status/conclusion pair.
    ///
    /// # Examples
    ///
    /// ```
    /// use pr_dashboard_core::status::CheckRunResult;
    /// use pr_dashboard_developer_platforms::models::{CheckConclusion, CheckStatus};
    ///
    /// // An in-flight run ignores any stale conclusion
    /// let result = CheckRunResult::from_status(Some(CheckStatus::InProgress), Some(CheckConclusion::Failure));
    /// assert_eq!(result, CheckRunResult::InProgress);
    ///
    /// let result = CheckRunResult::from_status(Some(CheckStatus::Completed), Some(CheckConclusion::Cancelled));
    /// assert_eq!(result, CheckRunResult::Unknown);
    /// ```
    pub fn from_status(status: Option<CheckStatus>, conclusion: Option<CheckConclusion>) -> Self {
        match status {
            Some(CheckStatus::Queued) => CheckRunResult::Queued,
            Some(CheckStatus::InProgress) => CheckRunResult::InProgress,
            _ => conclusion
                .map(Self::from_conclusion)
                .unwrap_or(CheckRunResult::Unknown),
        }
    }

    fn from_conclusion(conclusion: CheckConclusion) -> Self {
        match conclusion {
            CheckConclusion::Success => CheckRunResult::Success,
            CheckConclusion::Failure => CheckRunResult::Failure,
            CheckConclusion::Skipped => CheckRunResult::Skipped,
            CheckConclusion::Neutral => CheckRunResult::Neutral,
            CheckConclusion::TimedOut => CheckRunResult::TimedOut,
            _ => CheckRunResult::Unknown,
        }
    }

    /// Whether the check is still waiting to run or running.
    pub fn is_in_flight(&self) -> bool {
        matches!(self, CheckRunResult::Queued | CheckRunResult::InProgress)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CheckRunResult::Queued => "queued",
            CheckRunResult::InProgress => "in_progress",
            CheckRunResult::Success => "success",
            CheckRunResult::Failure => "failure",
            CheckRunResult::Skipped => "skipped",
            CheckRunResult::Neutral => "neutral",
            CheckRunResult::TimedOut => "timed_out",
            CheckRunResult::Unknown => "unknown",
        }
    }
}

impl fmt::Display for CheckRunResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Folds one more check suite into the overall pull request status.
///
/// An in-flight suite forces `InProgress`, and once a pull request is in
/// progress it stays that way. Otherwise the last completed suite wins. A suite
/// that reports neither progress nor a conclusion does not replace an earlier
/// result, but still makes the status present.
pub fn fold_suite_status(
    current: Option<CheckSuiteResult>,
    status: Option<CheckStatus>,
    conclusion: Option<CheckConclusion>,
) -> Option<CheckSuiteResult> {
    let suite_result = CheckSuiteResult::from_status(status, conclusion);
    let folded = match (current, suite_result) {
        (_, result) if result.is_in_flight() => CheckSuiteResult::InProgress,
        (Some(CheckSuiteResult::InProgress), _) => CheckSuiteResult::InProgress,
        (Some(previous), CheckSuiteResult::Unknown) if conclusion.is_none() => previous,
        (_, result) => result,
    };

    Some(folded)
}

/// Pull request status summary.
///
/// `status` is present only if the head commit has at least one check suite,
/// `checks` only if at least one check run matched a stage, and `reviews` only
/// if at least one counted review exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrSummary {
    pub number: u64,

    pub title: String,

    pub draft: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<CheckSuiteResult>,

    /// Check run results per stage, each list in the order GitHub returned the runs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checks: Option<BTreeMap<String, Vec<CheckRunResult>>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviews: Option<ReviewTally>,
}

/// The outcome of polling one repository.
///
/// When `failed` is set the summaries are empty and mean "unknown", not
/// "no open pull requests".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoPollResult {
    pub repo_id: String,

    pub summaries: Vec<PrSummary>,

    pub failed: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<String>,
}

impl RepoPollResult {
    pub fn succeeded(repo_id: impl Into<String>, summaries: Vec<PrSummary>) -> Self {
        Self {
            repo_id: repo_id.into(),
            summaries,
            failed: false,
            failure: None,
        }
    }

    pub fn failed(repo_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            repo_id: repo_id.into(),
            summaries: Vec::new(),
            failed: true,
            failure: Some(reason.into()),
        }
    }
}

/// Count of reviews per counted review state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewTally {
    #[serde(default, skip_serializing_if = "is_zero")]
    pub approvals: u32,

    #[serde(default, skip_serializing_if = "is_zero")]
    pub comments: u32,

    #[serde(default, skip_serializing_if = "is_zero")]
    pub changes_requested: u32,
}

impl ReviewTally {
    /// Tallies reviews by state. Dismissed, pending and unknown reviews are ignored.
    ///
    /// Returns `None` when no review was counted.
    pub fn from_reviews(reviews: &[Review]) -> Option<Self> {
        let mut tally = ReviewTally::default();
        for review in reviews {
            match review.state {
                ReviewState::Approved => tally.approvals += 1,
                ReviewState::Commented => tally.comments += 1,
                ReviewState::ChangesRequested => tally.changes_requested += 1,
                _ => {}
            }
        }

        if tally.total() == 0 {
            None
        } else {
            Some(tally)
        }
    }

    pub fn total(&self) -> u32 {
        self.approvals + self.comments + self.changes_requested
    }
}

fn is_zero(value: &u32) -> bool {
    *value == 0
}

/// Everything a renderer needs to draw the dashboard once.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardSnapshot {
    pub title: String,

    pub repositories: Vec<RepoPollResult>,

    /// Stage names in configured order, used to lay out check columns
    pub stage_order: Vec<String>,

    pub refresh_seconds: u64,

    pub failure_refresh_seconds: u64,

    pub generated_at: DateTime<Utc>,
}

impl DashboardSnapshot {
    pub fn has_failures(&self) -> bool {
        self.repositories.iter().any(|r| r.failed)
    }

    /// The refresh interval the page should use: the shorter retry interval
    /// while any repository failed, the normal one otherwise.
    pub fn effective_refresh_seconds(&self) -> u64 {
        if self.has_failures() {
            self.failure_refresh_seconds
        } else {
            self.refresh_seconds
        }
    }
}

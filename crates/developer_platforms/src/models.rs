//! # Models
//!
//! This module contains the raw data models read from a developer platform.
//!
//! They mirror the GitHub REST API payloads closely (field names, enum spellings)
//! so the commit, check and review models can be deserialized straight from the
//! API responses. The dashboard core reduces them into its own summary types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[cfg(test)]
#[path = "models_tests.rs"]
mod tests;

/// A check run as reported by the checks API.
///
/// # Examples
///
/// ```
/// use pr_dashboard_developer_platforms::models::{CheckConclusion, CheckRun, CheckStatus};
///
/// let run = CheckRun {
///     id: 4,
///     name: "Build and Test".to_string(),
///     status: CheckStatus::Completed,
///     conclusion: Some(CheckConclusion::Success),
/// };
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckRun {
    /// The unique identifier of the check run
    pub id: u64,

    /// The display name of the check run, e.g. the CI job name
    pub name: String,

    /// The current lifecycle state
    pub status: CheckStatus,

    /// The terminal result, only present once the run has completed
    #[serde(default)]
    pub conclusion: Option<CheckConclusion>,
}

/// Response envelope of `GET /repos/{owner}/{repo}/check-suites/{id}/check-runs`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckRunList {
    pub total_count: u64,
    pub check_runs: Vec<CheckRun>,
}

/// A check suite attached to a commit.
///
/// A check suite groups the check runs that one CI system created for a commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckSuite {
    /// The unique identifier of the check suite
    pub id: u64,

    /// The current lifecycle state. GitHub reports `null` for suites that
    /// were never requested.
    #[serde(default)]
    pub status: Option<CheckStatus>,

    /// The terminal result, only present once the suite has completed
    #[serde(default)]
    pub conclusion: Option<CheckConclusion>,
}

/// Response envelope of `GET /repos/{owner}/{repo}/commits/{ref}/check-suites`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckSuiteList {
    pub total_count: u64,
    pub check_suites: Vec<CheckSuite>,
}

/// The terminal result of a check suite or check run.
///
/// Values GitHub adds in the future deserialize as `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckConclusion {
    ActionRequired,
    Cancelled,
    Failure,
    Neutral,
    Skipped,
    Stale,
    StartupFailure,
    Success,
    TimedOut,
    #[serde(other)]
    Unknown,
}

/// The lifecycle state of a check suite or check run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckStatus {
    Completed,
    InProgress,
    Pending,
    Queued,
    Requested,
    Waiting,
    #[serde(other)]
    Unknown,
}

/// A commit on a pull request.
///
/// Only the SHA is needed to look up the check suites of a commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    /// The full commit SHA
    pub sha: String,
}

/// Represents an open pull request on a repository.
///
/// # Examples
///
/// ```
/// use pr_dashboard_developer_platforms::models::PullRequest;
///
/// let pr = PullRequest {
///     number: 123,
///     title: "Add energy decomposition".to_string(),
///     draft: false,
///     created_at: None,
///     html_url: None,
///     author: Some("octocat".to_string()),
/// };
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequest {
    /// The pull request number
    pub number: u64,

    /// The title of the pull request
    pub title: String,

    /// Whether the pull request is a draft
    #[serde(default)]
    pub draft: bool,

    /// When the pull request was opened
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,

    /// The browser URL of the pull request
    #[serde(default)]
    pub html_url: Option<String>,

    /// The login of the user who opened the pull request
    #[serde(default)]
    pub author: Option<String>,
}

/// A repository resolved on the developer platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    /// The owner (user or organization) of the repository
    pub owner: String,

    /// The name of the repository
    pub name: String,

    /// The default branch, if the platform reported one
    #[serde(default)]
    pub default_branch: Option<String>,

    /// The browser URL of the repository
    #[serde(default)]
    pub html_url: Option<String>,
}

impl Repository {
    /// Returns the `owner/name` form of the repository.
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

/// A review submitted on a pull request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    /// The unique identifier of the review
    pub id: u64,

    /// The state the review was submitted with
    pub state: ReviewState,

    /// The reviewer, if GitHub still knows the account
    #[serde(default)]
    pub user: Option<User>,
}

/// The state of a pull request review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReviewState {
    Approved,
    ChangesRequested,
    Commented,
    Dismissed,
    Pending,
    #[serde(other)]
    Unknown,
}

/// A user account on the developer platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub login: String,
}

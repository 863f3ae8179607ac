//! # Pull request aggregation
//!
//! Reduces one open pull request to a [`PrSummary`]: the overall status of the
//! check suites on its head commit, the results of the check runs grouped by
//! stage, and a tally of its reviews.

use pr_dashboard_developer_platforms::{
    errors::Error,
    models::{CheckRun, CheckSuite, PullRequest, Review},
    PullRequestProvider,
};
use std::collections::BTreeMap;
use tracing::{debug, error, instrument};

use crate::config::RepositoryId;
use crate::errors::DashboardError;
use crate::stages::StageClassifier;
use crate::status::{fold_suite_status, CheckRunResult, PrSummary, ReviewTally};

#[cfg(test)]
#[path = "aggregator_tests.rs"]
mod tests;

/// A check suite on the head commit together with its check runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuiteRuns {
    pub suite: CheckSuite,
    pub runs: Vec<CheckRun>,
}

/// Builds pull request summaries from provider data.
#[derive(Debug)]
pub struct PullRequestAggregator<'a, P: PullRequestProvider + ?Sized> {
    provider: &'a P,
    classifier: &'a StageClassifier,
}

impl<'a, P: PullRequestProvider + ?Sized> PullRequestAggregator<'a, P> {
    pub fn new(provider: &'a P, classifier: &'a StageClassifier) -> Self {
        Self {
            provider,
            classifier,
        }
    }

    /// Fetches everything needed to summarize a pull request and reduces it.
    ///
    /// Calls are made one after the other: commits, then the check suites of
    /// the head commit, then the check runs of each suite in order, then the
    /// reviews.
    ///
    /// # Errors
    ///
    /// * `DashboardError::EmptyCommitHistory` if the pull request has no commits
    /// * `DashboardError::FetchFailure` if any provider call fails
    #[instrument(skip(self, pull_request), fields(repository = %repo, pull_request = pull_request.number))]
    pub async fn aggregate(
        &self,
        repo: &RepositoryId,
        pull_request: &PullRequest,
    ) -> Result<PrSummary, DashboardError> {
        let pr_number = pull_request.number;

        let commits = self
            .provider
            .list_commits(&repo.owner, &repo.name, pr_number)
            .await
            .map_err(|e| fetch_failure(repo, pr_number, "list commits", e))?;

        // The platform lists commits oldest first, so the head is the last one.
        let head = commits
            .last()
            .ok_or(DashboardError::EmptyCommitHistory(pr_number))?;

        debug!(
            repository_owner = repo.owner.as_str(),
            repository = repo.name.as_str(),
            pull_request = pr_number,
            head_sha = head.sha.as_str(),
            commit_count = commits.len(),
            "Resolved head commit"
        );

        let suites = self
            .provider
            .list_check_suites(&repo.owner, &repo.name, &head.sha)
            .await
            .map_err(|e| fetch_failure(repo, pr_number, "list check suites", e))?;

        let mut suite_runs = Vec::with_capacity(suites.len());
        for suite in suites {
            let runs = self
                .provider
                .list_check_runs(&repo.owner, &repo.name, suite.id)
                .await
                .map_err(|e| fetch_failure(repo, pr_number, "list check runs", e))?;
            suite_runs.push(SuiteRuns { suite, runs });
        }

        let reviews = self
            .provider
            .list_reviews(&repo.owner, &repo.name, pr_number)
            .await
            .map_err(|e| fetch_failure(repo, pr_number, "list reviews", e))?;

        Ok(summarize(
            pull_request,
            &suite_runs,
            &reviews,
            self.classifier,
        ))
    }
}

/// Reduces already fetched data to a summary.
///
/// The same input always produces the same summary.
pub fn summarize(
    pull_request: &PullRequest,
    suites: &[SuiteRuns],
    reviews: &[Review],
    classifier: &StageClassifier,
) -> PrSummary {
    let mut status = None;
    let mut checks: BTreeMap<String, Vec<CheckRunResult>> = BTreeMap::new();

    for SuiteRuns { suite, runs } in suites {
        status = fold_suite_status(status, suite.status, suite.conclusion);

        for run in runs {
            let result = CheckRunResult::from_status(Some(run.status), run.conclusion);
            for stage in classifier.classify(&run.name) {
                checks.entry(stage.to_string()).or_default().push(result);
            }
        }
    }

    PrSummary {
        number: pull_request.number,
        title: pull_request.title.clone(),
        draft: pull_request.draft,
        url: pull_request.html_url.clone(),
        author: pull_request.author.clone(),
        status,
        checks: if checks.is_empty() { None } else { Some(checks) },
        reviews: ReviewTally::from_reviews(reviews),
    }
}

fn fetch_failure(
    repo: &RepositoryId,
    pr_number: u64,
    call: &'static str,
    error: Error,
) -> DashboardError {
    error!(
        repository_owner = repo.owner.as_str(),
        repository = repo.name.as_str(),
        pull_request = pr_number,
        error = error.to_string(),
        "Failed to {}",
        call
    );

    DashboardError::FetchFailure {
        pull_request: Some(pr_number),
        call,
        message: error.to_string(),
    }
}

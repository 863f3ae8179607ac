//! # Repository polling
//!
//! Polls the configured repositories for their open pull requests and
//! aggregates each one. A repository that cannot be polled is reported as
//! failed; it never stops the other repositories from being polled.

use chrono::Utc;
use futures::stream::{self, StreamExt};
use pr_dashboard_developer_platforms::{errors::Error, PullRequestProvider};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::time::Instant;
use tracing::{debug, info, instrument, warn};

use crate::aggregator::PullRequestAggregator;
use crate::config::{DashboardConfig, RepositoryConfig, RepositoryId};
use crate::errors::DashboardError;
use crate::stages::StageClassifier;
use crate::status::{DashboardSnapshot, PrSummary, RepoPollResult};

#[cfg(test)]
#[path = "poller_tests.rs"]
mod tests;

/// Failure message for repositories that did not finish before the deadline
pub const TIMED_OUT_MESSAGE: &str = "timed out";

/// What happens to a repository when one of its pull requests cannot be
/// aggregated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregationFailurePolicy {
    /// The whole repository is reported as failed.
    #[default]
    FailRepository,

    /// Only the pull request is left out.
    SkipPullRequest,
}

/// Polls repositories through a provider.
///
/// The provider is shared by every poll, so all of its requests pass the same
/// request gate.
#[derive(Debug)]
pub struct RepositoryPoller<P: PullRequestProvider> {
    provider: P,
    classifier: Arc<StageClassifier>,
    policy: AggregationFailurePolicy,
}

impl<P: PullRequestProvider> RepositoryPoller<P> {
    pub fn new(
        provider: P,
        classifier: Arc<StageClassifier>,
        policy: AggregationFailurePolicy,
    ) -> Self {
        Self {
            provider,
            classifier,
            policy,
        }
    }

    pub fn classifier(&self) -> &StageClassifier {
        &self.classifier
    }

    pub fn policy(&self) -> AggregationFailurePolicy {
        self.policy
    }

    /// Polls one repository.
    ///
    /// Never fails: errors are logged and reported through
    /// `RepoPollResult::failed`.
    #[instrument(skip(self, repository), fields(repository = %repository.id))]
    pub async fn poll(&self, repository: &RepositoryConfig) -> RepoPollResult {
        match self.collect_summaries(repository).await {
            Ok(summaries) => {
                info!(
                    repository = repository.id.as_str(),
                    pull_requests = summaries.len(),
                    "Polled repository"
                );
                RepoPollResult::succeeded(repository.id.clone(), summaries)
            }
            Err(e) => {
                warn!(
                    repository = repository.id.as_str(),
                    error = e.to_string(),
                    "Couldn't retrieve pull requests"
                );
                RepoPollResult::failed(repository.id.clone(), e.to_string())
            }
        }
    }

    async fn collect_summaries(
        &self,
        repository: &RepositoryConfig,
    ) -> Result<Vec<PrSummary>, DashboardError> {
        let repo = repository.repository_id()?;

        let resolved = self
            .provider
            .get_repository(&repo.owner, &repo.name)
            .await
            .map_err(|e| repository_failure(&repo, "get repository", e))?;
        debug!(
            repository = %repo,
            resolved = resolved.full_name().as_str(),
            "Resolved repository"
        );

        let mut pull_requests = self
            .provider
            .list_open_pull_requests(&repo.owner, &repo.name, &repository.base_branch)
            .await
            .map_err(|e| repository_failure(&repo, "list pull requests", e))?;

        // Oldest first. The sort is stable, so the platform order is kept for
        // pull requests without a creation time.
        pull_requests.sort_by_key(|pr| pr.created_at);

        debug!(
            repository_owner = repo.owner.as_str(),
            repository = repo.name.as_str(),
            base_branch = repository.base_branch.as_str(),
            count = pull_requests.len(),
            "Found open pull requests"
        );

        let aggregator = PullRequestAggregator::new(&self.provider, self.classifier.as_ref());
        let mut summaries = Vec::with_capacity(pull_requests.len());
        for pull_request in &pull_requests {
            match aggregator.aggregate(&repo, pull_request).await {
                Ok(summary) => summaries.push(summary),
                Err(e) => match self.policy {
                    AggregationFailurePolicy::FailRepository => return Err(e),
                    AggregationFailurePolicy::SkipPullRequest => {
                        warn!(
                            repository_owner = repo.owner.as_str(),
                            repository = repo.name.as_str(),
                            pull_request = pull_request.number,
                            error = e.to_string(),
                            "Skipping pull request that could not be aggregated"
                        );
                    }
                },
            }
        }

        Ok(summaries)
    }

    /// Polls every repository, at most `concurrency` at a time.
    ///
    /// Results are in the order of `repositories`. Repositories that have not
    /// finished by `deadline` are reported as failed.
    pub async fn poll_all(
        &self,
        repositories: &[RepositoryConfig],
        concurrency: usize,
        deadline: Instant,
    ) -> Vec<RepoPollResult> {
        let polls: Vec<_> = repositories
            .iter()
            .map(|repository| async move {
                match tokio::time::timeout_at(deadline, self.poll(repository)).await {
                    Ok(result) => result,
                    Err(_) => {
                        warn!(
                            repository = repository.id.as_str(),
                            "Repository poll did not finish before the deadline"
                        );
                        RepoPollResult::failed(repository.id.clone(), TIMED_OUT_MESSAGE)
                    }
                }
            })
            .collect();
        stream::iter(polls)
        .buffered(concurrency.max(1))
        .collect()
        .await
    }

    /// Polls everything the configuration lists and builds a dashboard snapshot.
    pub async fn snapshot(&self, config: &DashboardConfig) -> DashboardSnapshot {
        let now = Instant::now();
        let deadline = now
            .checked_add(config.polling.poll_timeout())
            .unwrap_or(now);
        let repositories = self
            .poll_all(
                &config.repositories,
                config.polling.max_concurrent_repositories,
                deadline,
            )
            .await;

        DashboardSnapshot {
            title: config.dashboard.title.clone(),
            repositories,
            stage_order: self.classifier.stage_names(),
            refresh_seconds: config.dashboard.refresh_seconds,
            failure_refresh_seconds: config.dashboard.failure_refresh_seconds,
            generated_at: Utc::now(),
        }
    }
}

fn repository_failure(repo: &RepositoryId, call: &'static str, error: Error) -> DashboardError {
    match error {
        Error::RepositoryNotFound(_) => DashboardError::RepositoryNotFound(repo.to_string()),
        other => DashboardError::FetchFailure {
            pull_request: None,
            call,
            message: other.to_string(),
        },
    }
}

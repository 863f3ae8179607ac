use async_trait::async_trait;
use pr_dashboard_developer_platforms::{
    errors::Error,
    models::{
        CheckConclusion, CheckRun, CheckStatus, CheckSuite, Commit, PullRequest, Repository,
        Review, ReviewState, User,
    },
    pacing::RequestGate,
    PullRequestProvider,
};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// In-memory provider for aggregator and poller tests.
///
/// Failures are keyed by call and argument, e.g. `"commits:5"`,
/// `"pulls:octo/board"` or `"runs:11"`.
#[derive(Debug, Default)]
pub(crate) struct MockProvider {
    repositories: HashMap<String, (String, Vec<PullRequest>)>,
    commits: HashMap<u64, Vec<Commit>>,
    suites: HashMap<String, Vec<CheckSuite>>,
    runs: HashMap<u64, Vec<CheckRun>>,
    reviews: HashMap<u64, Vec<Review>>,
    failures: HashSet<String>,
    delays: HashMap<String, Duration>,
    gate: Arc<RequestGate>,
    calls: Mutex<Vec<String>>,
}

impl MockProvider {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_repository(
        mut self,
        id: &str,
        base_branch: &str,
        pull_requests: Vec<PullRequest>,
    ) -> Self {
        self.repositories.insert(
            id.to_string(),
            (base_branch.to_string(), pull_requests),
        );
        self
    }

    pub(crate) fn with_commits(mut self, pr_number: u64, shas: &[&str]) -> Self {
        self.commits.insert(
            pr_number,
            shas.iter()
                .map(|sha| Commit {
                    sha: sha.to_string(),
                })
                .collect(),
        );
        self
    }

    pub(crate) fn with_suite(mut self, sha: &str, suite: CheckSuite, runs: Vec<CheckRun>) -> Self {
        self.runs.insert(suite.id, runs);
        self.suites.entry(sha.to_string()).or_default().push(suite);
        self
    }

    pub(crate) fn with_reviews(mut self, pr_number: u64, reviews: Vec<Review>) -> Self {
        self.reviews.insert(pr_number, reviews);
        self
    }

    pub(crate) fn failing(mut self, key: &str) -> Self {
        self.failures.insert(key.to_string());
        self
    }

    /// Delays the pull request listing of a repository.
    pub(crate) fn with_delay(mut self, id: &str, delay: Duration) -> Self {
        self.delays.insert(id.to_string(), delay);
        self
    }

    /// Passes `gate` before every call, the way a rate limited provider does.
    pub(crate) fn with_gate(mut self, gate: Arc<RequestGate>) -> Self {
        self.gate = gate;
        self
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    async fn record(&self, key: String) -> Result<(), Error> {
        self.gate.wait().await;
        self.calls.lock().unwrap().push(key.clone());
        if self.failures.contains(&key) {
            Err(Error::ApiError(format!("mock failure for {}", key)))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl PullRequestProvider for MockProvider {
    async fn get_repository(&self, repo_owner: &str, repo_name: &str) -> Result<Repository, Error> {
        let id = format!("{}/{}", repo_owner, repo_name);
        self.record(format!("repository:{}", id)).await?;
        if !self.repositories.contains_key(&id) {
            return Err(Error::RepositoryNotFound(id));
        }

        Ok(Repository {
            owner: repo_owner.to_string(),
            name: repo_name.to_string(),
            default_branch: Some("main".to_string()),
            html_url: None,
        })
    }

    async fn list_open_pull_requests(
        &self,
        repo_owner: &str,
        repo_name: &str,
        base_branch: &str,
    ) -> Result<Vec<PullRequest>, Error> {
        let id = format!("{}/{}", repo_owner, repo_name);
        self.record(format!("pulls:{}", id)).await?;
        if let Some(delay) = self.delays.get(&id) {
            tokio::time::sleep(*delay).await;
        }

        Ok(match self.repositories.get(&id) {
            Some((base, pull_requests)) if base == base_branch => pull_requests.clone(),
            _ => Vec::new(),
        })
    }

    async fn list_commits(
        &self,
        _repo_owner: &str,
        _repo_name: &str,
        pr_number: u64,
    ) -> Result<Vec<Commit>, Error> {
        self.record(format!("commits:{}", pr_number)).await?;
        Ok(self.commits.get(&pr_number).cloned().unwrap_or_default())
    }

    async fn list_check_suites(
        &self,
        _repo_owner: &str,
        _repo_name: &str,
        commit_sha: &str,
    ) -> Result<Vec<CheckSuite>, Error> {
        self.record(format!("suites:{}", commit_sha)).await?;
        Ok(self.suites.get(commit_sha).cloned().unwrap_or_default())
    }

    async fn list_check_runs(
        &self,
        _repo_owner: &str,
        _repo_name: &str,
        check_suite_id: u64,
    ) -> Result<Vec<CheckRun>, Error> {
        self.record(format!("runs:{}", check_suite_id)).await?;
        Ok(self.runs.get(&check_suite_id).cloned().unwrap_or_default())
    }

    async fn list_reviews(
        &self,
        _repo_owner: &str,
        _repo_name: &str,
        pr_number: u64,
    ) -> Result<Vec<Review>, Error> {
        self.record(format!("reviews:{}", pr_number)).await?;
        Ok(self.reviews.get(&pr_number).cloned().unwrap_or_default())
    }
}

pub(crate) fn pull_request(number: u64, title: &str) -> PullRequest {
    PullRequest {
        number,
        title: title.to_string(),
        draft: false,
        created_at: None,
        html_url: None,
        author: None,
    }
}

pub(crate) fn suite(
    id: u64,
    status: CheckStatus,
    conclusion: Option<CheckConclusion>,
) -> CheckSuite {
    CheckSuite {
        id,
        status: Some(status),
        conclusion,
    }
}

pub(crate) fn run(
    id: u64,
    name: &str,
    status: CheckStatus,
    conclusion: Option<CheckConclusion>,
) -> CheckRun {
    CheckRun {
        id,
        name: name.to_string(),
        status,
        conclusion,
    }
}

pub(crate) fn review(id: u64, state: ReviewState) -> Review {
    Review {
        id,
        state,
        user: Some(User {
            id,
            login: format!("reviewer{}", id),
        }),
    }
}

use async_trait::async_trait;
use pr_dashboard_core::config::{DashboardConfig, RepositoryConfig};
use pr_dashboard_developer_platforms::{
    errors::Error,
    models::{
        CheckConclusion, CheckRun, CheckStatus, CheckSuite, Commit, PullRequest, Repository,
        Review,
    },
    PullRequestProvider,
};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Serves `octo/board` with one passing pull request; every other repository
/// is missing.
#[derive(Debug, Default)]
pub(crate) struct BoardProvider {
    repository_lookups: AtomicUsize,
}

impl BoardProvider {
    pub(crate) fn repository_lookups(&self) -> usize {
        self.repository_lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PullRequestProvider for BoardProvider {
    async fn get_repository(&self, repo_owner: &str, repo_name: &str) -> Result<Repository, Error> {
        self.repository_lookups.fetch_add(1, Ordering::SeqCst);
        if repo_owner != "octo" || repo_name != "board" {
            return Err(Error::RepositoryNotFound(format!(
                "{}/{}",
                repo_owner, repo_name
            )));
        }

        Ok(Repository {
            owner: repo_owner.to_string(),
            name: repo_name.to_string(),
            default_branch: Some("develop".to_string()),
            html_url: None,
        })
    }

    async fn list_open_pull_requests(
        &self,
        _repo_owner: &str,
        _repo_name: &str,
        _base_branch: &str,
    ) -> Result<Vec<PullRequest>, Error> {
        Ok(vec![PullRequest {
            number: 7,
            title: "Add dashboard".to_string(),
            draft: false,
            created_at: None,
            html_url: Some("https://github.com/octo/board/pull/7".to_string()),
            author: Some("octocat".to_string()),
        }])
    }

    async fn list_commits(
        &self,
        _repo_owner: &str,
        _repo_name: &str,
        _pr_number: u64,
    ) -> Result<Vec<Commit>, Error> {
        Ok(vec![Commit {
            sha: "abc123".to_string(),
        }])
    }

    async fn list_check_suites(
        &self,
        _repo_owner: &str,
        _repo_name: &str,
        _commit_sha: &str,
    ) -> Result<Vec<CheckSuite>, Error> {
        Ok(vec![CheckSuite {
            id: 1,
            status: Some(CheckStatus::Completed),
            conclusion: Some(CheckConclusion::Failure),
        }])
    }

    async fn list_check_runs(
        &self,
        _repo_owner: &str,
        _repo_name: &str,
        _check_suite_id: u64,
    ) -> Result<Vec<CheckRun>, Error> {
        Ok(vec![CheckRun {
            id: 10,
            name: "Build (Linux)".to_string(),
            status: CheckStatus::Completed,
            conclusion: Some(CheckConclusion::Failure),
        }])
    }

    async fn list_reviews(
        &self,
        _repo_owner: &str,
        _repo_name: &str,
        _pr_number: u64,
    ) -> Result<Vec<Review>, Error> {
        Ok(Vec::new())
    }
}

pub(crate) fn board_config(repository_ids: &[&str]) -> DashboardConfig {
    DashboardConfig {
        repositories: repository_ids
            .iter()
            .map(|id| RepositoryConfig::new(*id, "develop"))
            .collect(),
        ..DashboardConfig::default()
    }
}

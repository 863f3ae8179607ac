use async_trait::async_trait;
use std::sync::Arc;

pub mod errors;

pub mod github;

pub mod models;

pub mod pacing;

use errors::Error;
use models::{CheckRun, CheckSuite, Commit, PullRequest, Repository, Review};

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;

/// Trait for reading pull request data from a developer platform (e.g., GitHub).
///
/// Implementations of this trait provide read-only access to the repositories,
/// open pull requests, commits, check suites, check runs and reviews that the
/// dashboard reduces into its per pull request status summaries.
///
/// Listing methods return every item, reading as many pages as the platform
/// needs. Implementations that talk to a rate limited API pass each request
/// through a shared [`pacing::RequestGate`].
///
/// # Example Implementation
///
/// ```rust,no_run
/// use pr_dashboard_developer_platforms::{PullRequestProvider, errors::Error, models::{CheckRun, CheckSuite, Commit, PullRequest, Repository, Review}};
/// use async_trait::async_trait;
///
/// #[derive(Debug)]
/// struct StaticProvider;
///
/// #[async_trait]
/// impl PullRequestProvider for StaticProvider {
///     async fn get_repository(&self, repo_owner: &str, repo_name: &str) -> Result<Repository, Error> {
///         Ok(Repository {
///             owner: repo_owner.to_string(),
///             name: repo_name.to_string(),
///             default_branch: None,
///             html_url: None,
///         })
///     }
///
///     // Implement other required methods...
///     # async fn list_open_pull_requests(&self, _: &str, _: &str, _: &str) -> Result<Vec<PullRequest>, Error> { unimplemented!() }
///     # async fn list_commits(&self, _: &str, _: &str, _: u64) -> Result<Vec<Commit>, Error> { unimplemented!() }
///     # async fn list_check_suites(&self, _: &str, _: &str, _: &str) -> Result<Vec<CheckSuite>, Error> { unimplemented!() }
///     # async fn list_check_runs(&self, _: &str, _: &str, _: u64) -> Result<Vec<CheckRun>, Error> { unimplemented!() }
///     # async fn list_reviews(&self, _: &str, _: &str, _: u64) -> Result<Vec<Review>, Error> { unimplemented!() }
/// }
/// ```
#[async_trait]
pub trait PullRequestProvider: Send + Sync {
    /// Resolves a repository.
    ///
    /// # Arguments
    ///
    /// * `repo_owner` - The owner of the repository
    /// * `repo_name` - The name of the repository
    ///
    /// # Returns
    ///
    /// The repository, or `Error::RepositoryNotFound` if it cannot be resolved
    async fn get_repository(&self, repo_owner: &str, repo_name: &str)
        -> Result<Repository, Error>;

    /// Lists the open pull requests targeting `base_branch`, oldest first.
    ///
    /// # Arguments
    ///
    /// * `repo_owner` - The owner of the repository
    /// * `repo_name` - The name of the repository
    /// * `base_branch` - Only pull requests that merge into this branch are returned
    ///
    /// # Returns
    ///
    /// A `Result` containing the pull requests sorted by creation time, ascending
    async fn list_open_pull_requests(
        &self,
        repo_owner: &str,
        repo_name: &str,
        base_branch: &str,
    ) -> Result<Vec<PullRequest>, Error>;

    /// Lists the commits of a pull request in the order the platform returns them.
    ///
    /// The last commit in the list is the head of the pull request.
    async fn list_commits(
        &self,
        repo_owner: &str,
        repo_name: &str,
        pr_number: u64,
    ) -> Result<Vec<Commit>, Error>;

    /// Lists the check suites reported for a commit.
    ///
    /// # Arguments
    ///
    /// * `repo_owner` - The owner of the repository
    /// * `repo_name` - The name of the repository
    /// * `commit_sha` - The SHA of the commit
    async fn list_check_suites(
        &self,
        repo_owner: &str,
        repo_name: &str,
        commit_sha: &str,
    ) -> Result<Vec<CheckSuite>, Error>;

    /// Lists the check runs that belong to a check suite.
    async fn list_check_runs(
        &self,
        repo_owner: &str,
        repo_name: &str,
        check_suite_id: u64,
    ) -> Result<Vec<CheckRun>, Error>;

    /// Lists the reviews submitted on a pull request.
    async fn list_reviews(
        &self,
        repo_owner: &str,
        repo_name: &str,
        pr_number: u64,
    ) -> Result<Vec<Review>, Error>;
}

#[async_trait]
impl<P: PullRequestProvider + ?Sized> PullRequestProvider for Arc<P> {
    async fn get_repository(
        &self,
        repo_owner: &str,
        repo_name: &str,
    ) -> Result<Repository, Error> {
        (**self).get_repository(repo_owner, repo_name).await
    }

    async fn list_open_pull_requests(
        &self,
        repo_owner: &str,
        repo_name: &str,
        base_branch: &str,
    ) -> Result<Vec<PullRequest>, Error> {
        (**self)
            .list_open_pull_requests(repo_owner, repo_name, base_branch)
            .await
    }

    async fn list_commits(
        &self,
        repo_owner: &str,
        repo_name: &str,
        pr_number: u64,
    ) -> Result<Vec<Commit>, Error> {
        (**self).list_commits(repo_owner, repo_name, pr_number).await
    }

    async fn list_check_suites(
        &self,
        repo_owner: &str,
        repo_name: &str,
        commit_sha: &str,
    ) -> Result<Vec<CheckSuite>, Error> {
        (**self)
            .list_check_suites(repo_owner, repo_name, commit_sha)
            .await
    }

    async fn list_check_runs(
        &self,
        repo_owner: &str,
        repo_name: &str,
        check_suite_id: u64,
    ) -> Result<Vec<CheckRun>, Error> {
        (**self)
            .list_check_runs(repo_owner, repo_name, check_suite_id)
            .await
    }

    async fn list_reviews(
        &self,
        repo_owner: &str,
        repo_name: &str,
        pr_number: u64,
    ) -> Result<Vec<Review>, Error> {
        (**self).list_reviews(repo_owner, repo_name, pr_number).await
    }
}

use async_trait::async_trait;
use octocrab::{params, Octocrab};
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

use crate::{
    errors::Error,
    models::{
        CheckRun, CheckRunList, CheckSuite, CheckSuiteList, Commit, PullRequest, Repository,
        Review,
    },
    pacing::RequestGate,
    PullRequestProvider,
};

#[cfg(test)]
#[path = "github_tests.rs"]
mod tests;

/// The largest page size the GitHub REST API accepts.
const PAGE_SIZE: u8 = 100;

#[derive(Debug, Serialize)]
struct PageParameters {
    per_page: u8,
    page: u32,
}

/// A list endpoint that wraps its items in an object carrying the total count.
trait ListEnvelope: DeserializeOwned {
    type Item;

    fn total_count(&self) -> u64;

    fn into_items(self) -> Vec<Self::Item>;
}

impl ListEnvelope for CheckSuiteList {
    type Item = CheckSuite;

    fn total_count(&self) -> u64 {
        self.total_count
    }

    fn into_items(self) -> Vec<CheckSuite> {
        self.check_suites
    }
}

impl ListEnvelope for CheckRunList {
    type Item = CheckRun;

    fn total_count(&self) -> u64 {
        self.total_count
    }

    fn into_items(self) -> Vec<CheckRun> {
        self.check_runs
    }
}

/// Creates an `Octocrab` client authenticated with a personal access token.
///
/// # Arguments
///
/// * `token` - A GitHub personal access token with read access to the monitored repositories
///
/// # Errors
///
/// Returns `Error::AuthError` if the client cannot be built from the token.
///
/// # Example
///
/// ```rust,no_run
/// use pr_dashboard_developer_platforms::github::{create_token_client, GitHubProvider};
///
/// # fn main() -> Result<(), pr_dashboard_developer_platforms::errors::Error> {
/// let client = create_token_client("ghp_example")?;
/// let provider = GitHubProvider::new(client);
/// # Ok(())
/// # }
/// ```
#[instrument(skip(token))]
pub fn create_token_client(token: &str) -> Result<Octocrab, Error> {
    Octocrab::builder()
        .personal_token(token.to_string())
        .build()
        .map_err(|e| {
            log_octocrab_error("Failed to create the GitHub client", &e);
            Error::AuthError("Failed to create a GitHub client for the token".to_string())
        })
}

/// Creates an unauthenticated `Octocrab` client.
///
/// Only public repositories can be read, and GitHub applies a much lower rate
/// limit to unauthenticated calls.
pub fn create_anonymous_client() -> Result<Octocrab, Error> {
    Octocrab::builder().build().map_err(|e| {
        log_octocrab_error("Failed to create the GitHub client", &e);
        Error::ApiError("Failed to create an unauthenticated GitHub client".to_string())
    })
}

fn log_octocrab_error(message: &str, e: &octocrab::Error) {
    match e {
        octocrab::Error::GitHub { source, .. } => error!(
            error_message = source.message.as_str(),
            status_code = source.status_code.as_u16(),
            "{}. Received an error from GitHub",
            message
        ),
        octocrab::Error::UriParse { source, .. } => error!(
            error_message = source.to_string(),
            "{}. Failed to parse URI.",
            message
        ),
        octocrab::Error::Uri { source, .. } => error!(
            error_message = source.to_string(),
            "{}. Failed to parse URI.",
            message
        ),
        octocrab::Error::InvalidHeaderValue { source, .. } => error!(
            error_message = source.to_string(),
            "{}. One of the header values was invalid.",
            message
        ),
        octocrab::Error::InvalidUtf8 { source, .. } => error!(
            error_message = source.to_string(),
            "{}. The message wasn't valid UTF-8.",
            message,
        ),
        _ => error!(error_message = e.to_string(), message),
    };
}

/// Translates an octocrab failure into a platform error.
fn to_platform_error(e: &octocrab::Error) -> Error {
    match e {
        octocrab::Error::GitHub { source, .. } => {
            let status = source.status_code.as_u16();
            let is_rate_limited = (status == 403 || status == 429)
                && source.message.to_lowercase().contains("rate limit");
            if is_rate_limited {
                Error::RateLimitExceeded
            } else if status == 401 {
                Error::AuthError(source.message.clone())
            } else {
                Error::ApiError(format!("{} ({})", source.message, status))
            }
        }
        octocrab::Error::Serde { .. } | octocrab::Error::Json { .. } => Error::InvalidResponse,
        _ => Error::ApiError(e.to_string()),
    }
}

fn is_not_found(e: &octocrab::Error) -> bool {
    matches!(e, octocrab::Error::GitHub { source, .. } if source.status_code.as_u16() == 404)
}

/// A [`PullRequestProvider`] backed by the GitHub REST API.
///
/// Every HTTP request, including each page of a listing, first passes the
/// provider's [`RequestGate`]. Providers that share a gate share its interval.
#[derive(Debug, Default)]
pub struct GitHubProvider {
    client: Octocrab,
    gate: Arc<RequestGate>,
}

impl GitHubProvider {
    /// Creates a provider that sends its requests without delay.
    pub fn new(client: Octocrab) -> Self {
        Self::with_gate(client, Arc::new(RequestGate::unthrottled()))
    }

    /// Creates a provider that spaces its requests with `gate`.
    pub fn with_gate(client: Octocrab, gate: Arc<RequestGate>) -> Self {
        Self { client, gate }
    }

    async fn get_page<R: DeserializeOwned>(
        &self,
        route: &str,
        page: u32,
        description: &str,
    ) -> Result<R, Error> {
        let parameters = PageParameters {
            per_page: PAGE_SIZE,
            page,
        };

        self.gate.wait().await;
        self.client
            .get(route, Some(&parameters))
            .await
            .map_err(|e| {
                log_octocrab_error(description, &e);
                to_platform_error(&e)
            })
    }

    /// Reads every page of a list endpoint that returns a bare JSON array.
    ///
    /// Pages are requested until one comes back short, which keeps the last
    /// element of the result the last element GitHub knows about.
    async fn get_all_pages<T: DeserializeOwned>(
        &self,
        route: &str,
        description: &str,
    ) -> Result<Vec<T>, Error> {
        let mut items = Vec::new();
        let mut page = 1;
        loop {
            let batch: Vec<T> = self.get_page(route, page, description).await?;

            let batch_len = batch.len();
            items.extend(batch);
            if batch_len < usize::from(PAGE_SIZE) {
                break;
            }

            page += 1;
        }

        Ok(items)
    }

    /// Reads every page of a list endpoint that wraps its items in an envelope.
    ///
    /// Paging stops once `total_count` items have been read or a page comes
    /// back short.
    async fn get_all_enveloped_pages<E: ListEnvelope>(
        &self,
        route: &str,
        description: &str,
    ) -> Result<Vec<E::Item>, Error> {
        let mut items = Vec::new();
        let mut page = 1;
        loop {
            let envelope: E = self.get_page(route, page, description).await?;
            let total_count = envelope.total_count();
            let batch = envelope.into_items();

            let batch_len = batch.len();
            items.extend(batch);
            if batch_len < usize::from(PAGE_SIZE) || items.len() as u64 >= total_count {
                break;
            }

            page += 1;
        }

        Ok(items)
    }
}

#[async_trait]
impl PullRequestProvider for GitHubProvider {
    #[instrument(skip(self))]
    async fn get_repository(
        &self,
        repo_owner: &str,
        repo_name: &str,
    ) -> Result<Repository, Error> {
        self.gate.wait().await;
        let repo = match self.client.repos(repo_owner, repo_name).get().await {
            Ok(r) => r,
            Err(e) if is_not_found(&e) => {
                warn!(
                    repository_owner = repo_owner,
                    repository = repo_name,
                    "Repository does not exist or is not visible to the token"
                );
                return Err(Error::RepositoryNotFound(format!(
                    "{}/{}",
                    repo_owner, repo_name
                )));
            }
            Err(e) => {
                log_octocrab_error("Failed to get repository information", &e);
                return Err(to_platform_error(&e));
            }
        };

        debug!(
            repository_owner = repo_owner,
            repository = repo_name,
            "Resolved repository"
        );

        Ok(Repository {
            owner: repo
                .owner
                .map(|o| o.login)
                .unwrap_or_else(|| repo_owner.to_string()),
            name: repo.name,
            default_branch: repo.default_branch,
            html_url: repo.html_url.map(|u| u.to_string()),
        })
    }

    #[instrument(skip(self))]
    async fn list_open_pull_requests(
        &self,
        repo_owner: &str,
        repo_name: &str,
        base_branch: &str,
    ) -> Result<Vec<PullRequest>, Error> {
        self.gate.wait().await;
        let mut page = self
            .client
            .pulls(repo_owner, repo_name)
            .list()
            .state(params::State::Open)
            .base(base_branch)
            .sort(params::pulls::Sort::Created)
            .direction(params::Direction::Ascending)
            .per_page(PAGE_SIZE)
            .send()
            .await
            .map_err(|e| {
                log_octocrab_error("Failed to list open pull requests", &e);
                to_platform_error(&e)
            })?;

        let mut pulls = page.take_items();
        while page.next.is_some() {
            self.gate.wait().await;
            page = match self
                .client
                .get_page::<octocrab::models::pulls::PullRequest>(&page.next)
                .await
            {
                Ok(Some(next)) => next,
                Ok(None) => break,
                Err(e) => {
                    log_octocrab_error("Failed to read the next page of open pull requests", &e);
                    return Err(to_platform_error(&e));
                }
            };
            pulls.extend(page.take_items());
        }

        info!(
            repository_owner = repo_owner,
            repository = repo_name,
            base_branch,
            count = pulls.len(),
            "Listed open pull requests"
        );

        let result = pulls
            .into_iter()
            .map(|pr| PullRequest {
                number: pr.number,
                title: pr.title.unwrap_or_default(),
                draft: pr.draft.unwrap_or_default(),
                created_at: pr.created_at,
                html_url: pr.html_url.map(|u| u.to_string()),
                author: pr.user.map(|u| u.login),
            })
            .collect();

        Ok(result)
    }

    #[instrument(skip(self))]
    async fn list_commits(
        &self,
        repo_owner: &str,
        repo_name: &str,
        pr_number: u64,
    ) -> Result<Vec<Commit>, Error> {
        let route = format!("/repos/{}/{}/pulls/{}/commits", repo_owner, repo_name, pr_number);
        self.get_all_pages(&route, "Failed to list pull request commits")
            .await
    }

    #[instrument(skip(self))]
    async fn list_check_suites(
        &self,
        repo_owner: &str,
        repo_name: &str,
        commit_sha: &str,
    ) -> Result<Vec<CheckSuite>, Error> {
        let route = format!(
            "/repos/{}/{}/commits/{}/check-suites",
            repo_owner, repo_name, commit_sha
        );
        self.get_all_enveloped_pages::<CheckSuiteList>(
            &route,
            "Failed to list check suites for commit",
        )
        .await
    }

    #[instrument(skip(self))]
    async fn list_check_runs(
        &self,
        repo_owner: &str,
        repo_name: &str,
        check_suite_id: u64,
    ) -> Result<Vec<CheckRun>, Error> {
        let route = format!(
            "/repos/{}/{}/check-suites/{}/check-runs",
            repo_owner, repo_name, check_suite_id
        );
        self.get_all_enveloped_pages::<CheckRunList>(
            &route,
            "Failed to list check runs for check suite",
        )
        .await
    }

    #[instrument(skip(self))]
    async fn list_reviews(
        &self,
        repo_owner: &str,
        repo_name: &str,
        pr_number: u64,
    ) -> Result<Vec<Review>, Error> {
        let route = format!("/repos/{}/{}/pulls/{}/reviews", repo_owner, repo_name, pr_number);
        self.get_all_pages(&route, "Failed to list pull request reviews")
            .await
    }
}

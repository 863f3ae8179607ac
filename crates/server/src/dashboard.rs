//! The dashboard service shared by the HTTP handlers and the CLI commands.

use chrono::Utc;
use pr_dashboard_core::config::DashboardConfig;
use pr_dashboard_core::poller::RepositoryPoller;
use pr_dashboard_core::status::DashboardSnapshot;
use pr_dashboard_developer_platforms::github::{
    create_anonymous_client, create_token_client, GitHubProvider,
};
use pr_dashboard_developer_platforms::pacing::RequestGate;
use pr_dashboard_developer_platforms::PullRequestProvider;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use crate::errors::ServerError;

#[cfg(test)]
#[path = "dashboard_tests.rs"]
mod tests;

/// The provider type the dashboard runs against.
pub type SharedProvider = Arc<dyn PullRequestProvider>;

/// Creates the paced GitHub provider.
///
/// Without a token the client is unauthenticated, which only works for
/// public repositories.
pub fn create_github_provider(
    token: Option<&str>,
    config: &DashboardConfig,
) -> Result<SharedProvider, ServerError> {
    let client = match token {
        Some(token) => create_token_client(token)
            .map_err(|e| ServerError::AuthError(e.to_string()))?,
        None => {
            warn!("No GitHub token provided. Using unauthenticated access");
            create_anonymous_client().map_err(|e| ServerError::NetworkError(e.to_string()))?
        }
    };

    let gate = Arc::new(RequestGate::new(config.polling.min_request_interval()));
    debug!(
        min_interval_ms = gate.min_interval().as_millis() as u64,
        "Created request gate"
    );

    Ok(Arc::new(GitHubProvider::with_gate(client, gate)))
}

/// Polls the configured repositories and caches the resulting snapshot.
///
/// A cached snapshot is reused until its effective refresh interval has passed.
/// Concurrent callers that find the cache stale wait for a single poll.
pub struct DashboardService {
    config: DashboardConfig,
    poller: RepositoryPoller<SharedProvider>,
    cache: Mutex<Option<DashboardSnapshot>>,
}

impl DashboardService {
    pub fn new(config: DashboardConfig, provider: SharedProvider) -> Result<Self, ServerError> {
        let classifier = Arc::new(config.stage_classifier()?);
        let poller =
            RepositoryPoller::new(provider, classifier, config.polling.on_pull_request_failure);

        Ok(Self {
            config,
            poller,
            cache: Mutex::new(None),
        })
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    /// Polls every repository, bypassing the cache.
    #[instrument(skip(self))]
    pub async fn poll(&self) -> DashboardSnapshot {
        info!(
            repositories = self.config.repositories.len(),
            "Polling repositories"
        );
        let snapshot = self.poller.snapshot(&self.config).await;
        info!(
            failed = snapshot.repositories.iter().filter(|r| r.failed).count(),
            "Finished polling repositories"
        );
        snapshot
    }

    /// Returns the cached snapshot, polling first if it is missing or stale.
    pub async fn current(&self) -> DashboardSnapshot {
        let mut cache = self.cache.lock().await;
        if let Some(snapshot) = cache.as_ref() {
            if is_fresh(snapshot) {
                debug!("Serving cached snapshot");
                return snapshot.clone();
            }
        }

        let snapshot = self.poll().await;
        *cache = Some(snapshot.clone());
        snapshot
    }
}

fn is_fresh(snapshot: &DashboardSnapshot) -> bool {
    let age = Utc::now().signed_duration_since(snapshot.generated_at);
    age.num_seconds() < snapshot.effective_refresh_seconds() as i64
}

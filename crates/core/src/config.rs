//! Configuration settings for the PR dashboard.
//!
//! The dashboard is configured by one TOML file that lists the repositories to
//! watch, the stage rules used to group check runs, and the refresh and pacing
//! intervals. Every setting except the repository list has a default.
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::errors::{ConfigLoadError, DashboardError};
use crate::poller::AggregationFailurePolicy;
use crate::stages::{ClassificationMode, StageClassifier, StageRule};

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;

/// Default configuration file name, looked up in the current directory
pub const DEFAULT_CONFIG_FILENAME: &str = "pr-dashboard.toml";

/// The only configuration schema version this build understands
pub const SUPPORTED_SCHEMA_VERSION: u32 = 1;

/// Upper bound for `min_request_interval_seconds`
pub const MAX_REQUEST_INTERVAL_SECONDS: f64 = 3_600.0;

/// Upper bound for `poll_timeout_seconds`
pub const MAX_POLL_TIMEOUT_SECONDS: u64 = 86_400;

lazy_static! {
    /// Pre-compiled regex for `owner/name` repository ids
    pub static ref REPOSITORY_ID_REGEX: Regex = Regex::new(
        r"^([A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?)/([A-Za-z0-9_.-]+)$"
    ).expect("Failed to compile repository id regex");
}

/// Top-level configuration for the dashboard
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DashboardConfig {
    #[serde(rename = "schemaVersion", default = "default_schema_version")]
    pub schema_version: u32,

    #[serde(default)]
    pub dashboard: DisplayConfig,

    #[serde(default)]
    pub polling: PollingConfig,

    #[serde(default)]
    pub repositories: Vec<RepositoryConfig>,

    /// Stage rules, evaluated in the order listed
    #[serde(default = "default_stages")]
    pub stages: Vec<StageRule>,
}

impl DashboardConfig {
    /// Compiles the configured stage rules.
    pub fn stage_classifier(&self) -> Result<StageClassifier, DashboardError> {
        StageClassifier::new(&self.stages, self.polling.classification)
    }

    /// Checks the settings that serde cannot check on its own.
    pub fn validate(&self) -> Result<(), ConfigLoadError> {
        if self.schema_version != SUPPORTED_SCHEMA_VERSION {
            return Err(ConfigLoadError::UnsupportedSchemaVersion(
                self.schema_version,
            ));
        }

        if self.repositories.is_empty() {
            return Err(ConfigLoadError::Invalid(
                "at least one repository must be configured".to_string(),
            ));
        }

        for repository in &self.repositories {
            repository
                .repository_id()
                .map_err(|e| ConfigLoadError::Invalid(e.to_string()))?;
            if repository.base_branch.trim().is_empty() {
                return Err(ConfigLoadError::Invalid(format!(
                    "repository '{}' has an empty base branch",
                    repository.id
                )));
            }
        }

        self.stage_classifier()
            .map_err(|e| ConfigLoadError::Invalid(e.to_string()))?;

        if self.dashboard.refresh_seconds == 0 || self.dashboard.failure_refresh_seconds == 0 {
            return Err(ConfigLoadError::Invalid(
                "refresh intervals must be at least one second".to_string(),
            ));
        }

        let interval = self.polling.min_request_interval_seconds;
        if !interval.is_finite() || interval < 0.0 {
            return Err(ConfigLoadError::Invalid(format!(
                "min_request_interval_seconds must be a non-negative number, got {}",
                interval
            )));
        }
        if interval > MAX_REQUEST_INTERVAL_SECONDS {
            return Err(ConfigLoadError::Invalid(format!(
                "min_request_interval_seconds must be at most {}, got {}",
                MAX_REQUEST_INTERVAL_SECONDS, interval
            )));
        }

        if self.polling.max_concurrent_repositories == 0 {
            return Err(ConfigLoadError::Invalid(
                "max_concurrent_repositories must be at least 1".to_string(),
            ));
        }

        if self.polling.poll_timeout_seconds == 0 {
            return Err(ConfigLoadError::Invalid(
                "poll_timeout_seconds must be at least 1".to_string(),
            ));
        }
        if self.polling.poll_timeout_seconds > MAX_POLL_TIMEOUT_SECONDS {
            return Err(ConfigLoadError::Invalid(format!(
                "poll_timeout_seconds must be at most {}, got {}",
                MAX_POLL_TIMEOUT_SECONDS, self.polling.poll_timeout_seconds
            )));
        }

        Ok(())
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            dashboard: DisplayConfig::default(),
            polling: PollingConfig::default(),
            repositories: Vec::new(),
            stages: default_stages(),
        }
    }
}

/// How the dashboard page is presented and served
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DisplayConfig {
    /// Page title
    #[serde(default = "DisplayConfig::default_title")]
    pub title: String,

    /// Page auto-refresh interval while every repository polls cleanly
    #[serde(default = "DisplayConfig::default_refresh_seconds")]
    pub refresh_seconds: u64,

    /// Page auto-refresh interval while any repository failed to poll
    #[serde(default = "DisplayConfig::default_failure_refresh_seconds")]
    pub failure_refresh_seconds: u64,

    /// The port the HTTP server listens on
    #[serde(default = "DisplayConfig::default_port")]
    pub port: u16,
}

impl DisplayConfig {
    fn default_title() -> String {
        "Pull Requests".to_string()
    }

    fn default_refresh_seconds() -> u64 {
        300
    }

    fn default_failure_refresh_seconds() -> u64 {
        30
    }

    fn default_port() -> u16 {
        3100
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            title: Self::default_title(),
            refresh_seconds: Self::default_refresh_seconds(),
            failure_refresh_seconds: Self::default_failure_refresh_seconds(),
            port: Self::default_port(),
        }
    }
}

/// How the hosting API is polled
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PollingConfig {
    /// Minimum delay between any two API calls
    #[serde(default = "PollingConfig::default_min_request_interval_seconds")]
    pub min_request_interval_seconds: f64,

    /// How many repositories are polled at the same time
    #[serde(default = "PollingConfig::default_max_concurrent_repositories")]
    pub max_concurrent_repositories: usize,

    /// Repositories still polling after this long are shown as failed
    #[serde(default = "PollingConfig::default_poll_timeout_seconds")]
    pub poll_timeout_seconds: u64,

    /// What a failure to aggregate one pull request does to its repository
    #[serde(default)]
    pub on_pull_request_failure: AggregationFailurePolicy,

    /// How check runs matching several stage rules are filed
    #[serde(default)]
    pub classification: ClassificationMode,
}

impl PollingConfig {
    fn default_min_request_interval_seconds() -> f64 {
        1.0
    }

    fn default_max_concurrent_repositories() -> usize {
        2
    }

    fn default_poll_timeout_seconds() -> u64 {
        120
    }

    /// The request interval, clamped to the accepted range.
    pub fn min_request_interval(&self) -> Duration {
        let seconds = self
            .min_request_interval_seconds
            .clamp(0.0, MAX_REQUEST_INTERVAL_SECONDS);
        Duration::try_from_secs_f64(seconds).unwrap_or(Duration::ZERO)
    }

    /// The poll deadline, clamped to the accepted range.
    pub fn poll_timeout(&self) -> Duration {
        Duration::from_secs(self.poll_timeout_seconds.min(MAX_POLL_TIMEOUT_SECONDS))
    }
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            min_request_interval_seconds: Self::default_min_request_interval_seconds(),
            max_concurrent_repositories: Self::default_max_concurrent_repositories(),
            poll_timeout_seconds: Self::default_poll_timeout_seconds(),
            on_pull_request_failure: AggregationFailurePolicy::default(),
            classification: ClassificationMode::default(),
        }
    }
}

/// A repository to show on the dashboard
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RepositoryConfig {
    /// The `owner/name` id of the repository
    pub id: String,

    /// Only pull requests targeting this branch are shown
    #[serde(default = "RepositoryConfig::default_base_branch")]
    pub base_branch: String,
}

impl RepositoryConfig {
    pub fn new(id: impl Into<String>, base_branch: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            base_branch: base_branch.into(),
        }
    }

    fn default_base_branch() -> String {
        "develop".to_string()
    }

    pub fn repository_id(&self) -> Result<RepositoryId, DashboardError> {
        RepositoryId::parse(&self.id)
    }
}

/// A parsed `owner/name` repository id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryId {
    pub owner: String,
    pub name: String,
}

impl RepositoryId {
    /// Parses an `owner/name` id.
    ///
    /// # Examples
    ///
    /// ```
    /// use pr_dashboard_core::config::RepositoryId;
    ///
    /// let id = RepositoryId::parse("disorderedmaterials/dissolve").unwrap();
    /// assert_eq!(id.owner, "disorderedmaterials");
    /// assert_eq!(id.name, "dissolve");
    ///
    /// assert!(RepositoryId::parse("dissolve").is_err());
    /// ```
    pub fn parse(id: &str) -> Result<Self, DashboardError> {
        let captures = REPOSITORY_ID_REGEX
            .captures(id.trim())
            .ok_or_else(|| DashboardError::InvalidRepositoryId(id.to_string()))?;

        Ok(Self {
            owner: captures[1].to_string(),
            name: captures[2].to_string(),
        })
    }
}

impl fmt::Display for RepositoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

fn default_schema_version() -> u32 {
    SUPPORTED_SCHEMA_VERSION
}

/// The stage rules used when the configuration lists none.
pub fn default_stages() -> Vec<StageRule> {
    vec![
        StageRule::new("CQ", ".*Code Quality Checks.*"),
        StageRule::new("B", ".*Build.*"),
        StageRule::new("T", ".*Tests.*"),
    ]
}

/// Get the path to the configuration file
pub fn get_config_path(config_path: Option<&str>) -> PathBuf {
    if let Some(path) = config_path {
        PathBuf::from(path)
    } else {
        let current_dir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        current_dir.join(DEFAULT_CONFIG_FILENAME)
    }
}

/// Loads and validates the dashboard configuration from the given path.
///
/// # Arguments
/// * `path` - Path to the configuration file
///
/// # Returns
/// * `Ok(DashboardConfig)` if loaded and valid
/// * `Err(ConfigLoadError)` if the file is missing, malformed, has an
///   unsupported schema version, or fails validation
pub fn load_dashboard_config<P: AsRef<Path>>(path: P) -> Result<DashboardConfig, ConfigLoadError> {
    let path_ref = path.as_ref();
    let content = match fs::read_to_string(path_ref) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ConfigLoadError::NotFound(path_ref.display().to_string()));
        }
        Err(e) => return Err(ConfigLoadError::Io(e)),
    };

    let config: DashboardConfig = toml::from_str(&content)?;
    config.validate()?;

    Ok(config)
}

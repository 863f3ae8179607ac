use thiserror::Error;

#[cfg(test)]
#[path = "errors_tests.rs"]
mod tests;

#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("Pull request #{0} has no commits")]
    EmptyCommitHistory(u64),

    #[error("Failed to {call}{}: {message}", pull_request_suffix(.pull_request))]
    FetchFailure {
        pull_request: Option<u64>,
        call: &'static str,
        message: String,
    },

    #[error("Invalid repository id '{0}'. Expected 'owner/name'")]
    InvalidRepositoryId(String),

    #[error("Invalid stage rule '{stage}': {message}")]
    InvalidStageRule { stage: String, message: String },

    #[error("Repository not found: {0}")]
    RepositoryNotFound(String),
}

fn pull_request_suffix(pull_request: &Option<u64>) -> String {
    match pull_request {
        Some(number) => format!(" for pull request #{}", number),
        None => String::new(),
    }
}

/// Errors raised while loading the dashboard configuration file.
#[derive(Error, Debug)]
pub enum ConfigLoadError {
    #[error("Configuration file not found: {0}")]
    NotFound(String),

    #[error("Failed to read configuration file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse configuration file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Unsupported configuration schema version: {0}")]
    UnsupportedSchemaVersion(u32),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

use pr_dashboard_core::errors::{ConfigLoadError, DashboardError};
use thiserror::Error;

#[cfg(test)]
#[path = "errors_tests.rs"]
mod tests;

/// Errors reported by the `pr-dashboard` binary
#[derive(Error, Debug)]
pub enum ServerError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Authentication error
    #[error("Authentication error: {0}")]
    AuthError(String),

    /// Network error
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Other errors
    #[error("Error: {0}")]
    Other(String),
}

impl From<ConfigLoadError> for ServerError {
    fn from(err: ConfigLoadError) -> Self {
        ServerError::ConfigError(err.to_string())
    }
}

impl From<DashboardError> for ServerError {
    fn from(err: DashboardError) -> Self {
        match err {
            DashboardError::InvalidRepositoryId(_)
            | DashboardError::InvalidStageRule { .. } => ServerError::ConfigError(err.to_string()),
            _ => ServerError::Other(err.to_string()),
        }
    }
}

impl std::process::Termination for ServerError {
    fn report(self) -> std::process::ExitCode {
        match self {
            ServerError::ConfigError(_) => std::process::ExitCode::from(2),
            ServerError::AuthError(_) => std::process::ExitCode::from(3),
            ServerError::NetworkError(_) => std::process::ExitCode::from(4),
            ServerError::Other(_) => std::process::ExitCode::FAILURE,
        }
    }
}

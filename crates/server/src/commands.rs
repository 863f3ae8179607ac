//! Command implementations for the `pr-dashboard` binary.

use pr_dashboard_core::config::{get_config_path, load_dashboard_config, DashboardConfig};
use tracing::{error, info};

use crate::errors::ServerError;

/// Shows which stages check run names are filed under.
pub mod check_stages;

/// Runs the dashboard HTTP server.
pub mod serve;

/// Polls once and prints the snapshot as JSON.
pub mod snapshot;

/// Options shared by every command.
#[derive(Debug, Clone, Default)]
pub struct GlobalOptions {
    /// Alternate configuration file
    pub config: Option<String>,

    /// GitHub personal access token
    pub token: Option<String>,
}

/// Loads the configuration file named by the options, or the default one.
pub fn load_config(options: &GlobalOptions) -> Result<DashboardConfig, ServerError> {
    let config_path = get_config_path(options.config.as_deref());
    let config = load_dashboard_config(&config_path).map_err(|e| {
        error!(
            path = config_path.display().to_string(),
            error = e.to_string(),
            "Failed to load configuration"
        );
        ServerError::from(e)
    })?;

    info!(
        path = config_path.display().to_string(),
        repositories = config.repositories.len(),
        stages = config.stages.len(),
        "Loaded configuration"
    );
    Ok(config)
}

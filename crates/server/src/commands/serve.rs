use clap::Args;
use std::sync::Arc;
use tracing::{info, instrument};

use crate::commands::{load_config, GlobalOptions};
use crate::dashboard::{create_github_provider, DashboardService};
use crate::errors::ServerError;
use crate::routes::router;

/// Arguments for the serve command
#[derive(Args, Debug, Default)]
pub struct ServeArgs {
    /// Port to listen on, overriding the configured one
    #[arg(short, long)]
    pub port: Option<u16>,
}

/// Starts the HTTP server and serves the dashboard until stopped.
///
/// # Errors
///
/// Returns a `ServerError` if the configuration cannot be loaded, the GitHub
/// client cannot be created, or the listener cannot be bound.
#[instrument(skip(options))]
pub async fn execute(args: ServeArgs, options: &GlobalOptions) -> Result<(), ServerError> {
    let config = load_config(options)?;
    let port = args.port.unwrap_or(config.dashboard.port);

    let provider = create_github_provider(options.token.as_deref(), &config)?;
    let state = Arc::new(DashboardService::new(config, provider)?);
    let app = router(state);

    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| ServerError::NetworkError(format!("Failed to bind {}: {}", addr, e)))?;

    info!("Listening on {}", addr);
    axum::serve(listener, app)
        .await
        .map_err(|e| ServerError::NetworkError(format!("Server stopped: {}", e)))?;

    Ok(())
}

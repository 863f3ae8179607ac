use clap::Args;
use tracing::instrument;

use crate::commands::{load_config, GlobalOptions};
use crate::dashboard::{create_github_provider, DashboardService};
use crate::errors::ServerError;

/// Arguments for the snapshot command
#[derive(Args, Debug, Default)]
pub struct SnapshotArgs {
    /// Print compact JSON on a single line
    #[arg(long)]
    pub compact: bool,
}

/// Polls every configured repository once and prints the snapshot as JSON.
#[instrument(skip(options))]
pub async fn execute(args: SnapshotArgs, options: &GlobalOptions) -> Result<(), ServerError> {
    let config = load_config(options)?;
    let provider = create_github_provider(options.token.as_deref(), &config)?;
    let service = DashboardService::new(config, provider)?;

    let snapshot = service.poll().await;
    let json = if args.compact {
        serde_json::to_string(&snapshot)
    } else {
        serde_json::to_string_pretty(&snapshot)
    }
    .map_err(|e| ServerError::Other(format!("Failed to serialize the snapshot: {}", e)))?;

    println!("{}", json);
    Ok(())
}

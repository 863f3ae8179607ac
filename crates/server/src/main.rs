//! # PR Dashboard
//!
//! Serves an auto-refreshing status board for the open pull requests of a set
//! of GitHub repositories.
//!
//! # Commands
//!
//! - `serve` - Run the HTTP dashboard (the default)
//! - `snapshot` - Poll once and print the result as JSON
//! - `check-stages` - Show which stages check run names are filed under
//!
//! # Examples
//!
//! ```bash
//! # Serve the dashboard described by ./pr-dashboard.toml
//! GITHUB_TOKEN=<token> pr-dashboard
//!
//! # Poll once with another configuration file
//! pr-dashboard --config team.toml snapshot
//!
//! # Check the stage rules against some check run names
//! pr-dashboard check-stages "Build (Linux)" "Run Tests"
//! ```

#![deny(missing_docs)]

use clap::{Parser, Subcommand};
use std::process::{ExitCode, Termination};
use tracing::{error, info, instrument};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Command implementations for the binary.
mod commands;

/// The polling and caching service behind the HTTP routes.
mod dashboard;

/// Error types specific to the binary.
mod errors;

/// HTML rendering of dashboard snapshots.
mod render;

/// HTTP routes.
mod routes;

#[cfg(test)]
mod test_support;

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;

use commands::{
    check_stages::CheckStagesArgs, serve::ServeArgs, snapshot::SnapshotArgs, GlobalOptions,
};
use errors::ServerError;

/// Environment variable holding the log filter
const LOG_FILTER_VARIABLE: &str = "PR_DASHBOARD_LOG";

/// Command-line interface structure for the PR dashboard.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Alternate configuration file
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// GitHub personal access token
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true, global = true)]
    token: Option<String>,

    /// The subcommand to execute. Defaults to `serve`.
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available commands for the PR dashboard.
#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP dashboard
    Serve(ServeArgs),

    /// Poll every repository once and print the snapshot as JSON
    Snapshot(SnapshotArgs),

    /// Show which stages check run names are filed under
    #[command(name = "check-stages")]
    CheckStages(CheckStagesArgs),
}

/// Main entry point for the PR dashboard.
///
/// Initializes logging, parses the command line and dispatches to the
/// selected command. Failures are logged and turned into the exit code of the
/// error.
#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_env(LOG_FILTER_VARIABLE)
        .unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    if cli.verbose {
        info!("Verbose mode enabled");
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            e.report()
        }
    }
}

/// Executes the selected command.
#[instrument(skip(cli))]
async fn run(cli: Cli) -> Result<(), ServerError> {
    let options = GlobalOptions {
        config: cli.config,
        token: cli.token.filter(|t| !t.trim().is_empty()),
    };

    match cli.command.unwrap_or(Commands::Serve(ServeArgs::default())) {
        Commands::Serve(args) => commands::serve::execute(args, &options).await,
        Commands::Snapshot(args) => commands::snapshot::execute(args, &options).await,
        Commands::CheckStages(args) => commands::check_stages::execute(args, &options).await,
    }
}

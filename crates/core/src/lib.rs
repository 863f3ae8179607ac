//! # PR Dashboard Core
//!
//! Core logic for summarizing the open pull requests of a set of repositories.
//!
//! For every configured repository the dashboard lists the open pull requests
//! that target the configured base branch and reduces each one to:
//! - the overall status of the check suites on its head commit
//! - the results of its check runs, grouped into configurable stages
//! - a tally of its reviews
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use pr_dashboard_core::{
//!     config::load_dashboard_config,
//!     poller::RepositoryPoller,
//! };
//! use pr_dashboard_developer_platforms::PullRequestProvider;
//! use anyhow::Result;
//!
//! async fn print_snapshot<P: PullRequestProvider>(provider: P) -> Result<()> {
//!     let config = load_dashboard_config("pr-dashboard.toml")?;
//!     let classifier = Arc::new(config.stage_classifier()?);
//!
//!     let poller = RepositoryPoller::new(
//!         provider,
//!         classifier,
//!         config.polling.on_pull_request_failure,
//!     );
//!
//!     let snapshot = poller.snapshot(&config).await;
//!     for repository in &snapshot.repositories {
//!         println!("{}: {} open pull requests", repository.repo_id, repository.summaries.len());
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod aggregator;

pub mod config;

pub mod errors;

pub mod poller;

pub mod stages;

pub mod status;

#[cfg(test)]
mod test_support;

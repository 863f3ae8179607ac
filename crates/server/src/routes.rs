//! HTTP routes of the dashboard server.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Html;
use axum::routing::get;
use axum::{Json, Router};
use axum_macros::debug_handler;
use pr_dashboard_core::status::DashboardSnapshot;
use std::sync::Arc;
use tracing::{debug, instrument};

use crate::dashboard::DashboardService;
use crate::render::render_dashboard;

#[cfg(test)]
#[path = "routes_tests.rs"]
mod tests;

pub type AppState = Arc<DashboardService>;

/// Builds the router serving the dashboard page, the JSON status and the
/// health check.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(dashboard_page))
        .route("/api/status", get(dashboard_status))
        .route("/health", get(health))
        .with_state(state)
}

#[debug_handler]
#[instrument(skip(state))]
async fn dashboard_page(State(state): State<AppState>) -> Html<String> {
    debug!("Rendering dashboard page");
    let snapshot = state.current().await;
    Html(render_dashboard(&snapshot))
}

#[debug_handler]
#[instrument(skip(state))]
async fn dashboard_status(State(state): State<AppState>) -> Json<DashboardSnapshot> {
    Json(state.current().await)
}

async fn health() -> StatusCode {
    StatusCode::OK
}

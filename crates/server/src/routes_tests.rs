use super::*;
use crate::render::RETRY_MESSAGE;
use crate::test_support::{board_config, BoardProvider};

fn state(repository_ids: &[&str]) -> AppState {
    Arc::new(
        DashboardService::new(
            board_config(repository_ids),
            Arc::new(BoardProvider::default()),
        )
        .unwrap(),
    )
}

#[tokio::test]
async fn test_dashboard_page_renders_every_repository() {
    let Html(body) = dashboard_page(State(state(&["octo/gone", "octo/board"]))).await;

    assert!(body.contains("<h2>octo/board</h2>"));
    assert!(body.contains("Add dashboard"));
    assert!(body.contains(RETRY_MESSAGE));
    assert!(body.contains("<meta http-equiv=\"refresh\" content=\"30\">"));
}

#[tokio::test]
async fn test_dashboard_status_returns_snapshot() {
    let Json(snapshot) = dashboard_status(State(state(&["octo/board"]))).await;

    assert_eq!(snapshot.repositories.len(), 1);
    assert!(!snapshot.has_failures());

    let json = serde_json::to_value(&snapshot).unwrap();
    assert_eq!(json["repositories"][0]["repo_id"], "octo/board");
    assert_eq!(json["repositories"][0]["summaries"][0]["status"], "failure");
    assert_eq!(
        json["repositories"][0]["summaries"][0]["checks"]["B"][0],
        "failure"
    );
}

#[tokio::test]
async fn test_health_is_ok() {
    assert_eq!(health().await, StatusCode::OK);
}

#[tokio::test]
async fn test_router_builds() {
    let _router = router(state(&["octo/board"]));
}

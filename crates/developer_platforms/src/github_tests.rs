use super::*;
use crate::models::{CheckConclusion, CheckStatus, ReviewState};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn provider_for(server: &MockServer) -> GitHubProvider {
    let client = Octocrab::builder()
        .base_uri(server.uri())
        .expect("valid mock server uri")
        .build()
        .expect("client builds");
    GitHubProvider::new(client)
}

fn check_runs_json(total_count: u64, ids: std::ops::Range<u64>) -> serde_json::Value {
    let runs: Vec<serde_json::Value> = ids
        .map(|id| json!({ "id": id, "name": format!("Build {}", id), "status": "completed", "conclusion": "success" }))
        .collect();
    json!({ "total_count": total_count, "check_runs": runs })
}

fn check_suites_json(total_count: u64, ids: std::ops::Range<u64>) -> serde_json::Value {
    let suites: Vec<serde_json::Value> = ids
        .map(|id| json!({ "id": id, "status": "completed", "conclusion": "success" }))
        .collect();
    json!({ "total_count": total_count, "check_suites": suites })
}

fn commits_json(count: usize, prefix: &str) -> serde_json::Value {
    let commits: Vec<serde_json::Value> = (0..count)
        .map(|i| json!({ "sha": format!("{}{:03}", prefix, i), "commit": { "message": "change" } }))
        .collect();
    json!(commits)
}

#[tokio::test]
async fn test_get_repository_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/octo/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "message": "Not Found",
            "documentation_url": "https://docs.github.com/rest/repos/repos#get-a-repository"
        })))
        .mount(&server)
        .await;

    let provider = provider_for(&server).await;
    let result = provider.get_repository("octo", "missing").await;

    assert!(
        matches!(result, Err(Error::RepositoryNotFound(ref name)) if name == "octo/missing"),
        "Expected RepositoryNotFound, got {:?}",
        result
    );
}

#[tokio::test]
async fn test_list_commits_returns_commits_in_api_order() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/octo/board/pulls/5/commits"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "sha": "first" },
            { "sha": "second" },
            { "sha": "head" }
        ])))
        .mount(&server)
        .await;

    let provider = provider_for(&server).await;
    let commits = provider.list_commits("octo", "board", 5).await.unwrap();

    let shas: Vec<&str> = commits.iter().map(|c| c.sha.as_str()).collect();
    assert_eq!(shas, vec!["first", "second", "head"]);
}

#[tokio::test]
async fn test_list_commits_reads_every_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/octo/board/pulls/5/commits"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(commits_json(100, "a")))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/repos/octo/board/pulls/5/commits"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(commits_json(2, "b")))
        .mount(&server)
        .await;

    let provider = provider_for(&server).await;
    let commits = provider.list_commits("octo", "board", 5).await.unwrap();

    assert_eq!(commits.len(), 102);
    assert_eq!(commits.last().map(|c| c.sha.as_str()), Some("b001"));
}

#[tokio::test]
async fn test_list_check_suites() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/octo/board/commits/head/check-suites"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total_count": 2,
            "check_suites": [
                { "id": 1, "status": "completed", "conclusion": "failure" },
                { "id": 2, "status": "in_progress", "conclusion": null }
            ]
        })))
        .mount(&server)
        .await;

    let provider = provider_for(&server).await;
    let suites = provider
        .list_check_suites("octo", "board", "head")
        .await
        .unwrap();

    assert_eq!(suites.len(), 2);
    assert_eq!(suites[0].conclusion, Some(CheckConclusion::Failure));
    assert_eq!(suites[1].status, Some(CheckStatus::InProgress));
}

#[tokio::test]
async fn test_list_check_runs() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/octo/board/check-suites/2/check-runs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total_count": 1,
            "check_runs": [
                { "id": 20, "name": "Build and Test", "status": "completed", "conclusion": "success" }
            ]
        })))
        .mount(&server)
        .await;

    let provider = provider_for(&server).await;
    let runs = provider.list_check_runs("octo", "board", 2).await.unwrap();

    assert_eq!(runs.len(), 1);
    assert_eq!(runs[0].name, "Build and Test");
    assert_eq!(runs[0].conclusion, Some(CheckConclusion::Success));
}

#[tokio::test]
async fn test_list_check_runs_reads_every_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/octo/board/check-suites/2/check-runs"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(check_runs_json(101, 0..100)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/repos/octo/board/check-suites/2/check-runs"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(check_runs_json(101, 100..101)))
        .expect(1)
        .mount(&server)
        .await;

    let provider = provider_for(&server).await;
    let runs = provider.list_check_runs("octo", "board", 2).await.unwrap();

    assert_eq!(runs.len(), 101);
    assert_eq!(runs.last().map(|r| r.name.as_str()), Some("Build 100"));
}

#[tokio::test]
async fn test_list_check_runs_stops_at_total_count() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/octo/board/check-suites/2/check-runs"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(check_runs_json(100, 0..100)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/repos/octo/board/check-suites/2/check-runs"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(check_runs_json(100, 0..0)))
        .expect(0)
        .mount(&server)
        .await;

    let provider = provider_for(&server).await;
    let runs = provider.list_check_runs("octo", "board", 2).await.unwrap();

    assert_eq!(runs.len(), 100);
}

#[tokio::test]
async fn test_list_check_suites_reads_every_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/octo/board/commits/head/check-suites"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(check_suites_json(102, 0..100)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/repos/octo/board/commits/head/check-suites"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(check_suites_json(102, 100..102)))
        .mount(&server)
        .await;

    let provider = provider_for(&server).await;
    let suites = provider
        .list_check_suites("octo", "board", "head")
        .await
        .unwrap();

    let ids: Vec<u64> = suites.iter().map(|s| s.id).collect();
    assert_eq!(ids.len(), 102);
    assert_eq!(ids[100..], [100, 101]);
}

#[tokio::test]
async fn test_gate_spaces_every_page_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/octo/board/pulls/5/commits"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(commits_json(100, "a")))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/repos/octo/board/pulls/5/commits"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(commits_json(2, "b")))
        .mount(&server)
        .await;

    let interval = std::time::Duration::from_millis(300);
    let client = Octocrab::builder()
        .base_uri(server.uri())
        .expect("valid mock server uri")
        .build()
        .expect("client builds");
    let provider = GitHubProvider::with_gate(client, Arc::new(RequestGate::new(interval)));

    let start = std::time::Instant::now();
    let commits = provider.list_commits("octo", "board", 5).await.unwrap();
    let elapsed = start.elapsed();

    assert_eq!(commits.len(), 102);
    assert_eq!(server.received_requests().await.map(|r| r.len()), Some(2));
    assert!(
        elapsed >= interval,
        "Two page requests completed {:?} apart, expected at least {:?}",
        elapsed,
        interval
    );
}

#[tokio::test]
async fn test_list_reviews() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/octo/board/pulls/5/reviews"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 1, "state": "APPROVED", "user": { "id": 9, "login": "reviewer" } },
            { "id": 2, "state": "COMMENTED", "user": { "id": 9, "login": "reviewer" } }
        ])))
        .mount(&server)
        .await;

    let provider = provider_for(&server).await;
    let reviews = provider.list_reviews("octo", "board", 5).await.unwrap();

    let states: Vec<ReviewState> = reviews.iter().map(|r| r.state).collect();
    assert_eq!(states, vec![ReviewState::Approved, ReviewState::Commented]);
}

#[tokio::test]
async fn test_rate_limited_response_maps_to_rate_limit_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/octo/board/pulls/5/reviews"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "message": "API rate limit exceeded for user ID 1.",
            "documentation_url": "https://docs.github.com/rest/overview/resources-in-the-rest-api#rate-limiting"
        })))
        .mount(&server)
        .await;

    let provider = provider_for(&server).await;
    let result = provider.list_reviews("octo", "board", 5).await;

    assert!(
        matches!(result, Err(Error::RateLimitExceeded)),
        "Expected RateLimitExceeded, got {:?}",
        result
    );
}

#[tokio::test]
async fn test_server_error_maps_to_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/octo/board/check-suites/3/check-runs"))
        .respond_with(ResponseTemplate::new(502).set_body_json(json!({
            "message": "Server Error"
        })))
        .mount(&server)
        .await;

    let provider = provider_for(&server).await;
    let result = provider.list_check_runs("octo", "board", 3).await;

    assert!(
        matches!(result, Err(Error::ApiError(_))),
        "Expected ApiError, got {:?}",
        result
    );
}

#[test]
fn test_create_token_client() {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let _guard = runtime.enter();

    let result = create_token_client("ghp_test_token");

    assert!(result.is_ok());
}

#[test]
fn test_create_anonymous_client() {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let _guard = runtime.enter();

    let result = create_anonymous_client();

    assert!(result.is_ok());
}

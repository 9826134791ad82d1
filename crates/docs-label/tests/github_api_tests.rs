//! Integration tests for the GitHub API client.
//!
//! These tests run the client against a wiremock server standing in for
//! the GitHub REST API.

use docs_label::github_client::{CommitStatus, GitHubClient, GitHubError, StatusState};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> GitHubClient {
    GitHubClient::with_base_url("test-token", &server.uri()).expect("client should build")
}

// =============================================================================
// compare_commits
// =============================================================================

#[tokio::test]
async fn test_compare_commits_parses_file_list() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/repos/uber/docs/compare/base123...head456"))
        .and(header("Authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "ahead",
            "files": [
                { "filename": "README.md", "status": "modified" },
                { "filename": "src/index.js", "status": "added" }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let comparison = client
        .compare_commits("uber", "docs", "base123", "head456")
        .await
        .expect("compare should succeed");

    let filenames: Vec<&str> = comparison
        .files
        .iter()
        .map(|f| f.filename.as_str())
        .collect();
    assert_eq!(filenames, vec!["README.md", "src/index.js"]);
}

#[tokio::test]
async fn test_compare_commits_without_files_field_is_empty() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/repos/uber/docs/compare/aaa...bbb"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "identical" })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let comparison = client
        .compare_commits("uber", "docs", "aaa", "bbb")
        .await
        .expect("compare should succeed");

    assert!(comparison.files.is_empty());
}

// =============================================================================
// Label mutations
// =============================================================================

#[tokio::test]
async fn test_add_labels_posts_label_list() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/repos/uber/docs/issues/42/labels"))
        .and(body_json(json!({ "labels": ["docs"] })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "name": "docs" }])))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    client
        .add_labels("uber", "docs", 42, &["docs"])
        .await
        .expect("add_labels should succeed");
}

#[tokio::test]
async fn test_remove_label_missing_maps_to_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/repos/uber/docs/issues/42/labels/docs"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({ "message": "Label does not exist" })),
        )
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client
        .remove_label("uber", "docs", 42, "docs")
        .await
        .expect_err("removal should fail");

    assert!(matches!(err, GitHubError::NotFound(_)));
}

#[tokio::test]
async fn test_remove_label_server_error_maps_to_api_error() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/repos/uber/docs/issues/42/labels/docs"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client
        .remove_label("uber", "docs", 42, "docs")
        .await
        .expect_err("removal should fail");

    match err {
        GitHubError::Api { status, message } => {
            assert_eq!(status, 500);
            assert_eq!(message, "boom");
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

// =============================================================================
// Commit statuses
// =============================================================================

#[tokio::test]
async fn test_create_status_posts_state_description_and_context() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/repos/uber/docs/statuses/head456"))
        .and(body_json(json!({
            "state": "pending",
            "description": "Checking whether to apply or remove docs label",
            "context": "docs-label/pr-check"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": 1 })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    client
        .create_status(
            "uber",
            "docs",
            "head456",
            &CommitStatus {
                state: StatusState::Pending,
                description: "Checking whether to apply or remove docs label".to_string(),
                context: "docs-label/pr-check".to_string(),
            },
        )
        .await
        .expect("create_status should succeed");
}

// =============================================================================
// Webhook bootstrap
// =============================================================================

#[tokio::test]
async fn test_ensure_webhook_creates_when_absent() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/repos/uber/docs/hooks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/repos/uber/docs/hooks"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": 7,
            "name": "web",
            "active": true,
            "events": ["pull_request"],
            "config": { "url": "https://bot.example.com/webhooks/github", "content_type": "json" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let hook = client
        .ensure_webhook(
            "uber",
            "docs",
            "https://bot.example.com/webhooks/github",
            vec!["pull_request".to_string()],
        )
        .await
        .expect("ensure_webhook should succeed");

    assert_eq!(hook.id, 7);
}

#[tokio::test]
async fn test_ensure_webhook_keeps_matching_hook() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/repos/uber/docs/hooks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": 3,
            "name": "web",
            "active": true,
            "events": ["pull_request"],
            "config": { "url": "https://bot.example.com/webhooks/github", "content_type": "json" }
        }])))
        .mount(&server)
        .await;

    // No POST/PATCH mocks mounted: any mutation would 404 and fail the call
    let client = client_for(&server);
    let hook = client
        .ensure_webhook(
            "uber",
            "docs",
            "https://bot.example.com/webhooks/github",
            vec!["pull_request".to_string()],
        )
        .await
        .expect("ensure_webhook should succeed");

    assert_eq!(hook.id, 3);
}

//! HTTP server for GitHub webhooks.

use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::github_client::GitHubClient;
use crate::handlers::github::handle_github_webhook;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Configuration.
    pub config: Config,
    /// GitHub API client, absent when no token is configured.
    pub github_client: Option<GitHubClient>,
}

/// Build the HTTP router for the docs-label service.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Webhook endpoint
        .route("/webhooks/github", post(handle_github_webhook))
        // Health check
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}

/// Readiness check endpoint.
async fn readiness_check(State(state): State<AppState>) -> Result<Json<Value>, StatusCode> {
    if state.github_client.is_none() {
        return Err(StatusCode::SERVICE_UNAVAILABLE);
    }
    Ok(Json(json!({ "status": "ready" })))
}

//! Configuration for the docs-label service.

use std::env;

/// Default GitHub REST API endpoint.
pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";

/// Docs-label webhook handler configuration.
#[derive(Clone)]
pub struct Config {
    /// HTTP server port.
    pub port: u16,
    /// Webhook signing secret for signature verification.
    pub webhook_secret: Option<String>,
    /// GitHub token for API calls (labels, statuses, diffs).
    pub github_token: Option<String>,
    /// GitHub API base URL (overridable for tests).
    pub github_api_url: String,
    /// Webhook callback URL (public base URL GitHub should deliver webhooks to).
    pub webhook_callback_url: Option<String>,
    /// GitHub repositories to auto-configure webhooks on (comma-separated, e.g., "uber/docs,uber/other").
    pub github_webhook_repos: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: env::var("DOCS_LABEL_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(8080),
            webhook_secret: env::var("GITHUB_WEBHOOK_SECRET")
                .ok()
                .filter(|s| !s.is_empty()),
            github_token: env::var("GITHUB_TOKEN").ok(),
            github_api_url: env::var("GITHUB_API_URL")
                .ok()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| DEFAULT_GITHUB_API_URL.to_string()),
            webhook_callback_url: env::var("WEBHOOK_CALLBACK_URL").ok(),
            github_webhook_repos: env::var("GITHUB_WEBHOOK_REPOS")
                .ok()
                .map(|s| s.split(',').map(|r| r.trim().to_string()).collect())
                .unwrap_or_default(),
        }
    }
}

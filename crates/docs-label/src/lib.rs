//! GitHub webhook service that labels documentation-only pull requests.
//!
//! This crate provides:
//! - A webhook payload model and signature verification for GitHub events
//! - A GitHub REST client for diffs, labels, and commit statuses
//! - The docs-label check: classify a PR's diff and converge its label
//! - HTTP server for webhook handling (standalone service)
//! - GitHub webhook bootstrap for configured repositories

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)] // Many async API methods can fail

pub mod config;
pub mod github_client;
pub mod handlers;
pub mod server;
pub mod webhooks;

pub use config::Config;
pub use github_client::{ensure_github_webhooks, GitHubClient, GitHubError};
pub use handlers::github::{check_pull_request, is_docs_pr, DOCS_LABEL};
pub use webhooks::{verify_webhook_signature, PullRequestEvent};

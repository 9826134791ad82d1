//! GitHub webhook handler and the docs-label check itself.
//!
//! On every pull request lifecycle event the check posts a pending status,
//! fetches the base...head diff, classifies the PR as docs-only or not, and
//! converges the `docs` label and the commit status to match.

use std::ffi::OsStr;
use std::path::Path;

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::Json,
};
use serde_json::{json, Value};
use tracing::{debug, error, info, warn};

use crate::github_client::{CommitStatus, FileChange, GitHubClient, GitHubError, StatusState};
use crate::server::AppState;
use crate::webhooks::{verify_webhook_signature, PullRequest, PullRequestEvent};

/// Label applied to documentation-only pull requests.
pub const DOCS_LABEL: &str = "docs";

/// Status context distinguishing this check from others on the same commit.
pub const STATUS_CONTEXT: &str = "docs-label/pr-check";

/// File extensions that count as documentation.
const DOCS_EXTENSIONS: &[&str] = &["md"];

const PENDING_DESCRIPTION: &str = "Checking whether to apply or remove docs label";
const SUCCESS_DESCRIPTION: &str = "Docs label has been set (or unset)";

/// Check whether a changed file counts as documentation by extension.
///
/// Files without an extension (including dotfiles) do not count.
fn is_docs_file(filename: &str) -> bool {
    Path::new(filename)
        .extension()
        .and_then(OsStr::to_str)
        .is_some_and(|ext| DOCS_EXTENSIONS.contains(&ext))
}

/// Classify a diff: is every changed file a documentation file?
///
/// The check is a plain universal quantifier over the file list, so an
/// empty diff classifies as docs-only.
#[must_use]
pub fn is_docs_pr(files: &[FileChange]) -> bool {
    files.iter().all(|f| is_docs_file(&f.filename))
}

/// Run the docs-label check for one pull request.
///
/// Posts a pending status, fetches the diff, converges the label, then
/// posts a success status. Returns the classification.
///
/// A not-found error while removing the label is the steady state for a
/// non-docs PR that never had it and is swallowed. Any other error
/// propagates, leaving the commit status at pending.
pub async fn check_pull_request(
    client: &GitHubClient,
    owner: &str,
    repo: &str,
    pr: &PullRequest,
) -> Result<bool, GitHubError> {
    client
        .create_status(
            owner,
            repo,
            &pr.head.sha,
            &CommitStatus {
                state: StatusState::Pending,
                description: PENDING_DESCRIPTION.to_string(),
                context: STATUS_CONTEXT.to_string(),
            },
        )
        .await?;

    let comparison = client
        .compare_commits(owner, repo, &pr.base.sha, &pr.head.sha)
        .await?;

    let docs_pr = is_docs_pr(&comparison.files);

    debug!(
        owner = %owner,
        repo = %repo,
        pr_number = pr.number,
        files = comparison.files.len(),
        docs_pr = docs_pr,
        "Classified pull request diff"
    );

    if docs_pr {
        client
            .add_labels(owner, repo, pr.number, &[DOCS_LABEL])
            .await?;
    } else {
        match client.remove_label(owner, repo, pr.number, DOCS_LABEL).await {
            Ok(()) => {}
            Err(GitHubError::NotFound(_)) => {
                debug!(
                    owner = %owner,
                    repo = %repo,
                    pr_number = pr.number,
                    "Docs label was not present"
                );
            }
            Err(e) => return Err(e),
        }
    }

    client
        .create_status(
            owner,
            repo,
            &pr.head.sha,
            &CommitStatus {
                state: StatusState::Success,
                description: SUCCESS_DESCRIPTION.to_string(),
                context: STATUS_CONTEXT.to_string(),
            },
        )
        .await?;

    Ok(docs_pr)
}

/// Handle a GitHub webhook delivery.
pub async fn handle_github_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>, StatusCode> {
    // Get event type from header
    let event_type = headers
        .get("X-GitHub-Event")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown");

    let delivery_id = headers
        .get("X-GitHub-Delivery")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown");

    info!(
        event_type = %event_type,
        delivery_id = %delivery_id,
        "Received GitHub webhook"
    );

    // Verify signature if a secret is configured
    if let Some(secret) = &state.config.webhook_secret {
        let signature = headers
            .get("X-Hub-Signature-256")
            .and_then(|v| v.to_str().ok());

        let Some(sig) = signature else {
            warn!("Missing X-Hub-Signature-256 header");
            return Err(StatusCode::UNAUTHORIZED);
        };

        if !verify_webhook_signature(&body, sig, secret) {
            warn!("Invalid webhook signature");
            return Err(StatusCode::UNAUTHORIZED);
        }
        debug!("Webhook signature verified");
    }

    // Only process pull_request events
    if event_type != "pull_request" {
        debug!(event_type = %event_type, "Ignoring non-pull_request event");
        return Ok(Json(json!({
            "status": "ignored",
            "reason": "not_pull_request_event"
        })));
    }

    // Parse payload
    let payload: PullRequestEvent = serde_json::from_slice(&body).map_err(|e| {
        error!(error = %e, "Failed to parse GitHub webhook payload");
        StatusCode::BAD_REQUEST
    })?;

    // Only the five lifecycle actions re-run the check
    if !payload.action.triggers_check() {
        debug!(action = ?payload.action, "Ignoring pull_request action");
        return Ok(Json(json!({
            "status": "ignored",
            "reason": "action_not_checked"
        })));
    }

    let Some(client) = &state.github_client else {
        error!("GitHub client not configured");
        return Ok(Json(json!({
            "status": "error",
            "error": "GitHub client not configured"
        })));
    };

    let Some((owner, repo)) = payload.repository.owner_and_repo() else {
        warn!(
            full_name = %payload.repository.full_name,
            "Invalid repository full name"
        );
        return Err(StatusCode::BAD_REQUEST);
    };

    info!(
        owner = %owner,
        repo = %repo,
        pr_number = payload.pull_request.number,
        action = ?payload.action,
        head_sha = %payload.pull_request.head.sha,
        "Running docs-label check"
    );

    match check_pull_request(client, owner, repo, &payload.pull_request).await {
        Ok(docs_pr) => Ok(Json(json!({
            "status": "success",
            "pr_number": payload.pull_request.number,
            "repository": payload.repository.full_name,
            "docs_pr": docs_pr
        }))),
        Err(e) => {
            error!(
                pr_number = payload.pull_request.number,
                error = %e,
                "Docs-label check failed"
            );
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

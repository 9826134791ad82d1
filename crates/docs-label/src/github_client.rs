//! GitHub API client for diff, label, status, and webhook operations.

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::{Response, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::DEFAULT_GITHUB_API_URL;

/// GitHub API error taxonomy.
///
/// `NotFound` is split out from the generic API error so callers can match
/// on the benign label-not-present case without inspecting status codes.
#[derive(Debug, Error)]
pub enum GitHubError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("GitHub API error: {status} - {message}")]
    Api { status: u16, message: String },
}

/// One file touched between two commits.
#[derive(Debug, Clone, Deserialize)]
pub struct FileChange {
    /// Full path of the changed file.
    pub filename: String,
}

/// Result of comparing two commits.
#[derive(Debug, Clone, Deserialize)]
pub struct CommitComparison {
    /// Ordered list of files changed between base and head.
    #[serde(default)]
    pub files: Vec<FileChange>,
}

/// Commit status state as GitHub defines it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusState {
    Pending,
    Success,
    Error,
    Failure,
}

/// A commit status to post against a sha.
#[derive(Debug, Clone, Serialize)]
pub struct CommitStatus {
    /// Status state.
    pub state: StatusState,
    /// Human-readable description shown in the status panel.
    pub description: String,
    /// Fixed context string distinguishing this check from others.
    pub context: String,
}

/// Request body for adding labels to an issue or PR.
#[derive(Debug, Serialize)]
struct AddLabelsRequest {
    labels: Vec<String>,
}

/// GitHub API client for the docs-label service.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

impl GitHubClient {
    /// Create a new GitHub client against the public API.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(token: &str) -> Result<Self, GitHubError> {
        Self::with_base_url(token, DEFAULT_GITHUB_API_URL)
    }

    /// Create a new GitHub client against a specific API base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn with_base_url(token: &str, base_url: &str) -> Result<Self, GitHubError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            "X-GitHub-Api-Version",
            HeaderValue::from_static("2022-11-28"),
        );
        headers.insert(USER_AGENT, HeaderValue::from_static("docs-label/1.0"));

        let client = reqwest::Client::builder().default_headers(headers).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        })
    }

    /// Fetch the list of files changed between two commits.
    pub async fn compare_commits(
        &self,
        owner: &str,
        repo: &str,
        base_sha: &str,
        head_sha: &str,
    ) -> Result<CommitComparison, GitHubError> {
        let url = format!(
            "{}/repos/{owner}/{repo}/compare/{base_sha}...{head_sha}",
            self.base_url
        );

        let response = self
            .client
            .get(&url)
            .header(AUTHORIZATION, format!("Bearer {}", self.token))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        Ok(response.json().await?)
    }

    /// Add labels to a pull request (via the issues API).
    ///
    /// Adding a label that is already present is a no-op on GitHub's side;
    /// the response body is not inspected.
    pub async fn add_labels(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
        labels: &[&str],
    ) -> Result<(), GitHubError> {
        let url = format!("{}/repos/{owner}/{repo}/issues/{number}/labels", self.base_url);

        let request = AddLabelsRequest {
            labels: labels.iter().map(ToString::to_string).collect(),
        };

        let response = self
            .client
            .post(&url)
            .header(AUTHORIZATION, format!("Bearer {}", self.token))
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        debug!(owner = %owner, repo = %repo, number = number, ?labels, "Added labels");
        Ok(())
    }

    /// Remove a label from a pull request (via the issues API).
    ///
    /// Returns [`GitHubError::NotFound`] when the label is not currently
    /// attached.
    pub async fn remove_label(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
        name: &str,
    ) -> Result<(), GitHubError> {
        let url = format!(
            "{}/repos/{owner}/{repo}/issues/{number}/labels/{name}",
            self.base_url
        );

        let response = self
            .client
            .delete(&url)
            .header(AUTHORIZATION, format!("Bearer {}", self.token))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        debug!(owner = %owner, repo = %repo, number = number, label = %name, "Removed label");
        Ok(())
    }

    /// Post a commit status for a sha.
    pub async fn create_status(
        &self,
        owner: &str,
        repo: &str,
        sha: &str,
        status: &CommitStatus,
    ) -> Result<(), GitHubError> {
        let url = format!("{}/repos/{owner}/{repo}/statuses/{sha}", self.base_url);

        let response = self
            .client
            .post(&url)
            .header(AUTHORIZATION, format!("Bearer {}", self.token))
            .json(status)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        debug!(
            owner = %owner,
            repo = %repo,
            sha = %sha,
            state = ?status.state,
            "Posted commit status"
        );
        Ok(())
    }

    /// List webhooks for a repository.
    pub async fn list_webhooks(&self, owner: &str, repo: &str) -> Result<Vec<Webhook>, GitHubError> {
        let url = format!("{}/repos/{owner}/{repo}/hooks", self.base_url);

        let response = self
            .client
            .get(&url)
            .header(AUTHORIZATION, format!("Bearer {}", self.token))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        Ok(response.json().await?)
    }

    /// Create a webhook for a repository.
    pub async fn create_webhook(
        &self,
        owner: &str,
        repo: &str,
        webhook_url: &str,
        events: Vec<String>,
    ) -> Result<Webhook, GitHubError> {
        let url = format!("{}/repos/{owner}/{repo}/hooks", self.base_url);

        let request = CreateWebhookRequest {
            name: "web".to_string(),
            active: true,
            events,
            config: WebhookConfig {
                url: webhook_url.to_string(),
                content_type: "json".to_string(),
                insecure_ssl: "0".to_string(),
            },
        };

        let response = self
            .client
            .post(&url)
            .header(AUTHORIZATION, format!("Bearer {}", self.token))
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        Ok(response.json().await?)
    }

    /// Update a webhook's configuration.
    pub async fn update_webhook(
        &self,
        owner: &str,
        repo: &str,
        hook_id: u64,
        webhook_url: &str,
        events: Vec<String>,
    ) -> Result<Webhook, GitHubError> {
        let url = format!("{}/repos/{owner}/{repo}/hooks/{hook_id}", self.base_url);

        let request = CreateWebhookRequest {
            name: "web".to_string(),
            active: true,
            events,
            config: WebhookConfig {
                url: webhook_url.to_string(),
                content_type: "json".to_string(),
                insecure_ssl: "0".to_string(),
            },
        };

        let response = self
            .client
            .patch(&url)
            .header(AUTHORIZATION, format!("Bearer {}", self.token))
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        Ok(response.json().await?)
    }

    /// Ensure a webhook exists for the repository pointing to the given URL.
    ///
    /// If a webhook with the same URL already exists, it will be updated to
    /// ensure it has the correct events. If no webhook exists, a new one
    /// will be created.
    pub async fn ensure_webhook(
        &self,
        owner: &str,
        repo: &str,
        webhook_url: &str,
        events: Vec<String>,
    ) -> Result<Webhook, GitHubError> {
        debug!(
            owner = %owner,
            repo = %repo,
            webhook_url = %webhook_url,
            "Ensuring GitHub webhook exists"
        );

        // List existing webhooks
        let existing = self.list_webhooks(owner, repo).await?;

        // Check if a webhook with this URL already exists
        if let Some(hook) = existing.iter().find(|h| h.config.url == webhook_url) {
            // Check if events match
            let events_match = events.iter().all(|e| hook.events.contains(e));

            if events_match && hook.active {
                info!(
                    owner = %owner,
                    repo = %repo,
                    hook_id = hook.id,
                    "GitHub webhook already exists and is configured correctly"
                );
                return Ok(hook.clone());
            }

            // Update the webhook
            info!(
                owner = %owner,
                repo = %repo,
                hook_id = hook.id,
                "Updating existing GitHub webhook"
            );
            return self
                .update_webhook(owner, repo, hook.id, webhook_url, events)
                .await;
        }

        // Create new webhook
        info!(
            owner = %owner,
            repo = %repo,
            "Creating new GitHub webhook"
        );
        self.create_webhook(owner, repo, webhook_url, events).await
    }
}

/// GitHub webhook configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookConfig {
    pub url: String,
    pub content_type: String,
    #[serde(default)]
    pub insecure_ssl: String,
}

/// GitHub webhook resource.
#[derive(Debug, Clone, Deserialize)]
pub struct Webhook {
    pub id: u64,
    pub name: String,
    pub active: bool,
    pub events: Vec<String>,
    pub config: WebhookConfig,
}

/// Request to create a webhook.
#[derive(Debug, Serialize)]
struct CreateWebhookRequest {
    name: String,
    active: bool,
    events: Vec<String>,
    config: WebhookConfig,
}

/// Map a non-success response to a typed error, consuming the body.
async fn error_from_response(response: Response) -> GitHubError {
    let status = response.status();
    let message = response.text().await.unwrap_or_default();

    if status == StatusCode::NOT_FOUND {
        GitHubError::NotFound(message)
    } else {
        GitHubError::Api {
            status: status.as_u16(),
            message,
        }
    }
}

/// Ensure GitHub webhooks are configured for the given repositories.
///
/// This should be called on service startup to ensure all configured
/// repositories have a `pull_request` webhook pointing to this service.
///
/// # Errors
///
/// Individual repository failures are logged but don't fail the entire
/// operation.
pub async fn ensure_github_webhooks(
    token: &str,
    api_url: &str,
    callback_url: &str,
    repos: &[String],
) -> Result<Vec<(String, bool)>, GitHubError> {
    if repos.is_empty() {
        debug!("No GitHub repos configured for webhook setup");
        return Ok(vec![]);
    }

    let client = GitHubClient::with_base_url(token, api_url)?;
    let webhook_url = format!("{callback_url}/webhooks/github");
    let events = vec!["pull_request".to_string()];

    let mut results = Vec::new();

    for repo in repos {
        let Some((owner, repo_name)) = repo.split_once('/') else {
            warn!(repo = %repo, "Invalid repository format (expected owner/repo)");
            results.push((repo.clone(), false));
            continue;
        };

        match client
            .ensure_webhook(owner, repo_name, &webhook_url, events.clone())
            .await
        {
            Ok(hook) => {
                info!(
                    repo = %repo,
                    hook_id = hook.id,
                    "GitHub webhook configured successfully"
                );
                results.push((repo.clone(), true));
            }
            Err(e) => {
                warn!(
                    repo = %repo,
                    error = %e,
                    "Failed to configure GitHub webhook"
                );
                results.push((repo.clone(), false));
            }
        }
    }

    let success_count = results.iter().filter(|(_, ok)| *ok).count();
    info!(
        total = repos.len(),
        success = success_count,
        "GitHub webhook initialization complete"
    );

    Ok(results)
}

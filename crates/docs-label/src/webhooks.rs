//! Webhook payload parsing and signature verification.

use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// Verify a GitHub webhook signature using HMAC-SHA256.
///
/// # Arguments
/// * `body` - Raw webhook body bytes
/// * `signature` - Signature from the `X-Hub-Signature-256` header
///   (`sha256=<hex digest>`)
/// * `secret` - Webhook signing secret
///
/// # Returns
/// `true` if signature is valid, `false` otherwise
#[must_use]
pub fn verify_webhook_signature(body: &[u8], signature: &str, secret: &str) -> bool {
    // GitHub prefixes the hex digest with the algorithm name
    let Some(hex_signature) = signature.strip_prefix("sha256=") else {
        return false;
    };

    // Decode the hex signature
    let Ok(signature_bytes) = hex::decode(hex_signature) else {
        return false;
    };

    // Compute HMAC-SHA256
    let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
        return false;
    };
    mac.update(body);
    let computed = mac.finalize().into_bytes();

    // Constant-time comparison to prevent timing attacks
    computed.as_slice().ct_eq(&signature_bytes).into()
}

/// Pull request action from the webhook payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PullRequestAction {
    /// PR opened
    Opened,
    /// PR title or body edited
    Edited,
    /// New commits pushed to the PR branch
    Synchronize,
    /// Label added to the PR
    Labeled,
    /// Label removed from the PR
    Unlabeled,
    /// Any other action (catch-all to avoid parse failures)
    #[serde(other)]
    Other,
}

impl PullRequestAction {
    /// Whether this action should trigger the docs-label check.
    #[must_use]
    pub const fn triggers_check(self) -> bool {
        !matches!(self, Self::Other)
    }
}

/// GitHub PR event payload (simplified)
#[derive(Debug, Clone, Deserialize)]
pub struct PullRequestEvent {
    /// Action type
    pub action: PullRequestAction,
    /// Pull request details
    pub pull_request: PullRequest,
    /// Repository info
    pub repository: Repository,
}

/// GitHub Pull Request
#[derive(Debug, Clone, Deserialize)]
pub struct PullRequest {
    /// PR number
    pub number: u64,
    /// Source branch
    pub head: GitRef,
    /// Target branch
    pub base: GitRef,
}

/// Git reference (branch)
#[derive(Debug, Clone, Deserialize)]
pub struct GitRef {
    /// Branch name
    #[serde(rename = "ref")]
    pub ref_name: String,
    /// SHA
    pub sha: String,
}

/// GitHub Repository
#[derive(Debug, Clone, Deserialize)]
pub struct Repository {
    /// Repository name
    pub name: String,
    /// Full name (owner/repo)
    pub full_name: String,
}

impl Repository {
    /// Split the full name into `(owner, repo)`.
    #[must_use]
    pub fn owner_and_repo(&self) -> Option<(&str, &str)> {
        self.full_name.split_once('/')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verify_webhook_signature_valid() {
        let body = b"test payload";
        let secret = "test-secret";

        // Compute expected signature
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(body);
        let signature = format!("sha256={}", hex::encode(mac.finalize().into_bytes()));

        assert!(verify_webhook_signature(body, &signature, secret));
    }

    #[test]
    fn test_verify_webhook_signature_invalid() {
        let body = b"test payload";
        let secret = "test-secret";
        let wrong_signature =
            "sha256=0000000000000000000000000000000000000000000000000000000000000000";

        assert!(!verify_webhook_signature(body, wrong_signature, secret));
    }

    #[test]
    fn test_verify_webhook_signature_missing_prefix() {
        let body = b"test payload";
        let secret = "test-secret";

        let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(body);
        let bare = hex::encode(mac.finalize().into_bytes());

        // Correct digest but no algorithm prefix
        assert!(!verify_webhook_signature(body, &bare, secret));
    }

    #[test]
    fn test_verify_webhook_signature_malformed() {
        let body = b"test payload";
        let secret = "test-secret";

        // Not valid hex
        assert!(!verify_webhook_signature(body, "sha256=not-hex", secret));
    }

    #[test]
    fn test_parse_pull_request_event() {
        let json = r#"{
            "action": "synchronize",
            "number": 42,
            "pull_request": {
                "number": 42,
                "state": "open",
                "head": { "ref": "feature/docs", "sha": "abc123" },
                "base": { "ref": "main", "sha": "def456" }
            },
            "repository": {
                "id": 1,
                "name": "docs",
                "full_name": "uber/docs"
            }
        }"#;

        let event: PullRequestEvent = serde_json::from_str(json).unwrap();

        assert_eq!(event.action, PullRequestAction::Synchronize);
        assert!(event.action.triggers_check());
        assert_eq!(event.pull_request.number, 42);
        assert_eq!(event.pull_request.head.sha, "abc123");
        assert_eq!(event.pull_request.base.sha, "def456");
        assert_eq!(
            event.repository.owner_and_repo(),
            Some(("uber", "docs"))
        );
    }

    #[test]
    fn test_unknown_action_parses_as_other() {
        let json = r#"{
            "action": "review_requested",
            "pull_request": {
                "number": 7,
                "head": { "ref": "topic", "sha": "aaa" },
                "base": { "ref": "main", "sha": "bbb" }
            },
            "repository": { "name": "docs", "full_name": "uber/docs" }
        }"#;

        let event: PullRequestEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.action, PullRequestAction::Other);
        assert!(!event.action.triggers_check());
    }
}

//! Docs-label service binary.
//!
//! Standalone HTTP service that keeps the `docs` label on pull requests in
//! sync with documentation-only diffs.

use anyhow::{Context, Result};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use docs_label::{config::Config, ensure_github_webhooks, server, GitHubClient};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive("docs_label=info".parse()?))
        .init();

    info!("Starting docs-label service...");

    // Load configuration
    let config = Config::default();

    // Initialize GitHub client
    let github_client = if let Some(token) = &config.github_token {
        match GitHubClient::with_base_url(token, &config.github_api_url) {
            Ok(client) => {
                info!("GitHub API client configured");
                Some(client)
            }
            Err(e) => {
                error!(error = %e, "Failed to create GitHub client");
                None
            }
        }
    } else {
        warn!("No GITHUB_TOKEN configured - webhook deliveries will not be processed");
        None
    };

    // Ensure GitHub webhooks are configured
    if let (Some(token), Some(callback_url)) = (&config.github_token, &config.webhook_callback_url)
    {
        if config.github_webhook_repos.is_empty() {
            info!("No GITHUB_WEBHOOK_REPOS configured - skipping GitHub webhook setup");
        } else {
            match ensure_github_webhooks(
                token,
                &config.github_api_url,
                callback_url,
                &config.github_webhook_repos,
            )
            .await
            {
                Ok(results) => {
                    let success = results.iter().filter(|(_, ok)| *ok).count();
                    let failed = results.len() - success;
                    if failed > 0 {
                        info!(
                            success = success,
                            failed = failed,
                            "GitHub webhooks initialization completed with some failures"
                        );
                    } else {
                        info!(
                            count = success,
                            "GitHub webhooks initialized successfully"
                        );
                    }
                }
                Err(e) => {
                    // Non-fatal - continue starting the service
                    info!(
                        error = %e,
                        "Could not initialize GitHub webhooks"
                    );
                }
            }
        }
    } else {
        if config.github_token.is_none() {
            info!("No GITHUB_TOKEN configured - skipping GitHub webhook setup");
        }
        if config.webhook_callback_url.is_none() {
            info!("No WEBHOOK_CALLBACK_URL configured - skipping GitHub webhook setup");
        }
    }

    // Build application state
    let state = server::AppState {
        config: config.clone(),
        github_client,
    };

    // Build router
    let app = server::build_router(state);

    // Bind and serve
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    info!(port = config.port, "Docs-label service listening");

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

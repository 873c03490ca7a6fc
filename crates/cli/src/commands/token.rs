//! Credential check.
//!
//! Authenticates with `TEST_USERNAME` / `TEST_PASSWORD` against the
//! configured auth endpoint. The token itself is never written out.

use ecommerce_harness::{ApiClient, ClientError, ConfigError, HarnessConfig};
use thiserror::Error;

/// Errors that can occur while obtaining a token.
#[derive(Debug, Error)]
pub enum TokenError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Authentication failed.
    #[error("Authentication error: {0}")]
    Client(#[from] ClientError),
}

/// Obtain a token with the configured credentials.
pub async fn run() -> Result<(), TokenError> {
    dotenvy::dotenv().ok();

    let config = HarnessConfig::from_env()?;
    let username = config.credentials.username.clone();
    let auth_url = config.auth_url.clone();
    let client = ApiClient::new(config)?;

    tracing::info!(%username, %auth_url, "Authenticating...");
    client.token().await?;

    if let Some(token) = client.cached_token().await {
        tracing::info!(obtained_at = %token.obtained_at, "Token obtained");
    }
    Ok(())
}

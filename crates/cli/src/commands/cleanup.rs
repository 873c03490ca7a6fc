//! Manual resource deletion.
//!
//! Useful after an aborted run left prefixed test data behind. Keys are
//! numeric ids, or `/`-separated components for composite keys
//! (`userId/productId/likeDate` for favourites).

use ecommerce_harness::{ApiClient, ClientError, ConfigError, HarnessConfig};
use ecommerce_harness_core::{ResourceKey, ResourceKind};
use thiserror::Error;

/// Errors that can occur during manual cleanup.
#[derive(Debug, Error)]
pub enum CleanupError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// HTTP client could not be built.
    #[error("Client error: {0}")]
    Client(#[from] ClientError),

    /// A key has the wrong shape for its kind.
    #[error("Invalid key '{key}' for {kind}: expected {expected} component(s)")]
    InvalidKey {
        kind: ResourceKind,
        key: String,
        expected: usize,
    },

    /// Some deletions failed.
    #[error("{failed} of {total} deletions failed")]
    Failed { failed: usize, total: usize },
}

/// Parse a command-line key for `kind`.
fn parse_key(kind: ResourceKind, raw: &str) -> Result<ResourceKey, CleanupError> {
    let expected = kind.key_fields().len();
    let parts: Vec<String> = raw.split('/').map(str::to_owned).collect();

    if parts.len() != expected || parts.iter().any(String::is_empty) {
        return Err(CleanupError::InvalidKey {
            kind,
            key: raw.to_owned(),
            expected,
        });
    }

    match parts.as_slice() {
        [single] => single
            .parse::<i64>()
            .map(ResourceKey::Id)
            .map_err(|_| CleanupError::InvalidKey {
                kind,
                key: raw.to_owned(),
                expected,
            }),
        _ => Ok(ResourceKey::Composite(parts)),
    }
}

/// Delete every key of `kind`.
///
/// All keys are validated before anything is deleted; a failed deletion
/// does not stop the remaining ones.
pub async fn run(kind: ResourceKind, keys: &[String]) -> Result<(), CleanupError> {
    dotenvy::dotenv().ok();

    let keys = keys
        .iter()
        .map(|raw| parse_key(kind, raw))
        .collect::<Result<Vec<_>, _>>()?;

    let config = HarnessConfig::from_env()?;
    let client = ApiClient::new(config)?;

    let mut failed = 0;
    for key in &keys {
        match client.delete_resource(kind, key).await {
            Ok(response) if response.is_success() => {
                tracing::info!(%kind, %key, "Deleted");
            }
            Ok(response) => {
                tracing::warn!(%kind, %key, status = %response.status(), "Delete rejected");
                failed += 1;
            }
            Err(e) => {
                tracing::warn!(%kind, %key, error = %e, "Delete failed");
                failed += 1;
            }
        }
    }

    if failed > 0 {
        return Err(CleanupError::Failed {
            failed,
            total: keys.len(),
        });
    }
    tracing::info!(%kind, count = keys.len(), "Cleanup complete");
    Ok(())
}

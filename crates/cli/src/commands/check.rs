//! Service connectivity check.
//!
//! # Usage
//!
//! ```bash
//! harness-cli check
//! harness-cli check -s order-service --attempts 10 --delay 3
//! ```
//!
//! # Environment Variables
//!
//! - `API_GATEWAY_URL` - Gateway base URL (default `http://localhost:8080`)
//! - `<SERVICE>_URL` - Per-service overrides, e.g. `USER_SERVICE_URL`

use std::time::Duration;

use ecommerce_harness::{ApiClient, ClientError, ConfigError, HarnessConfig, health};
use ecommerce_harness_core::ServiceName;
use thiserror::Error;

/// Errors that can occur during a connectivity check.
#[derive(Debug, Error)]
pub enum CheckError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// HTTP client could not be built.
    #[error("Client error: {0}")]
    Client(#[from] ClientError),

    /// Some services never answered.
    #[error("Unavailable services: {}", format_services(.0))]
    Unavailable(Vec<ServiceName>),
}

fn format_services(services: &[ServiceName]) -> String {
    services
        .iter()
        .map(|service| service.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Probe `services` (every service when empty) until each answers or runs
/// out of attempts.
pub async fn run(services: &[ServiceName], attempts: u32, delay: u64) -> Result<(), CheckError> {
    dotenvy::dotenv().ok();

    let config = HarnessConfig::from_env()?;
    let client = ApiClient::new(config)?;

    let services = if services.is_empty() {
        ServiceName::ALL.as_slice()
    } else {
        services
    };

    tracing::info!(count = services.len(), "Checking service connectivity...");
    let report =
        health::wait_for_services(&client, services, attempts, Duration::from_secs(delay)).await;

    if report.all_available() {
        tracing::info!("All {} services available", report.available.len());
        Ok(())
    } else {
        Err(CheckError::Unavailable(report.unavailable))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unavailable_message_lists_services() {
        let err = CheckError::Unavailable(vec![ServiceName::UserService, ServiceName::CloudConfig]);
        assert_eq!(
            err.to_string(),
            "Unavailable services: user-service, cloud-config"
        );
    }
}

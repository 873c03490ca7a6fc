//! Integration tests for the e-commerce harness.
//!
//! # Running Tests
//!
//! ```bash
//! # Harness self-tests against wiremock (no platform needed)
//! cargo test -p ecommerce-harness-integration-tests
//!
//! # Live suites against a deployed platform
//! API_GATEWAY_URL=http://localhost:8080 \
//!     cargo test -p ecommerce-harness-integration-tests -- --ignored
//! ```
//!
//! # Test Categories
//!
//! - `harness_*` - Client, cleanup, flows, fixtures and health against mocks
//! - `live_*` - Per-service suites and end-to-end scenarios (`#[ignore]`d)

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::future::Future;
use std::time::Duration;

use ecommerce_harness::fixtures::run_with_teardown;
use ecommerce_harness::registry::CleanupReport;
use ecommerce_harness::{ApiClient, CleanupRegistry, ClientError, HarnessConfig, RetryPolicy};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Token handed out by [`mount_auth`].
pub const MOCK_TOKEN: &str = "test-token";

/// A client and the registry tracking what a test created.
///
/// Clones share the client's token cache and the registry.
#[derive(Debug, Clone)]
pub struct TestContext {
    pub client: ApiClient,
    pub registry: CleanupRegistry,
}

impl TestContext {
    /// Context for a deployed platform, configured from the environment.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration or the HTTP client fails.
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        ecommerce_harness::init_test_tracing();
        let client = ApiClient::new(HarnessConfig::from_env()?)?;
        let registry = CleanupRegistry::from_client(&client);
        Ok(Self { client, registry })
    }

    /// Context routing every service through `base_url`, with a short retry
    /// budget suited to mock servers.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn mocked(base_url: &str) -> Result<Self, ClientError> {
        ecommerce_harness::init_test_tracing();
        let mut config = HarnessConfig::for_base_url(base_url);
        config.retry = RetryPolicy::new(2, Duration::from_millis(10));
        config.request_timeout = Duration::from_secs(5);
        config.wait_timeout = Duration::from_secs(2);
        let client = ApiClient::new(config)?;
        Ok(Self {
            client,
            registry: CleanupRegistry::default(),
        })
    }

    /// Delete everything the test created.
    pub async fn finish(self) -> CleanupReport {
        self.registry.cleanup(&self.client).await
    }

    /// Run a test body, then delete everything it tracked.
    ///
    /// Cleanup also runs when the body panics; the panic is resumed
    /// afterwards so the test still fails.
    pub async fn run<F, Fut, R>(self, body: F) -> R
    where
        F: FnOnce(Self) -> Fut,
        Fut: Future<Output = R>,
    {
        let cleanup = async {
            self.registry.cleanup(&self.client).await;
        };
        run_with_teardown(body(self.clone()), cleanup).await
    }
}

/// Mount the authentication endpoint, answering with [`MOCK_TOKEN`].
pub async fn mount_auth(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/api/authenticate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"jwtToken": MOCK_TOKEN})))
        .mount(server)
        .await;
}

/// Base URL of a local port nothing listens on.
///
/// # Errors
///
/// Returns an error if no ephemeral port can be bound.
pub fn closed_port_url() -> std::io::Result<String> {
    let listener = std::net::TcpListener::bind("127.0.0.1:0")?;
    let port = listener.local_addr()?.port();
    drop(listener);
    Ok(format!("http://127.0.0.1:{port}"))
}

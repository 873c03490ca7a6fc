//! E-commerce harness library.
//!
//! Black-box test harness for the deployed e-commerce microservices
//! (user, product, order, payment, favourite and shipping services behind an
//! API gateway). Nothing here implements business logic; the crate issues
//! HTTP requests and checks what comes back.
//!
//! # Modules
//!
//! - [`config`] - Environment configuration and the service registry
//! - [`client`] - HTTP client with token caching and retries
//! - [`registry`] - Tracking and cleanup of created resources
//! - [`fixtures`] - Ready-made resources with teardown
//! - [`assertions`] - Response checks and polling assertions
//! - [`flows`] - Multi-call business operations
//! - [`generators`] / [`payloads`] - Randomized request bodies
//! - [`health`] - Service connectivity checks

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod assertions;
pub mod client;
pub mod config;
pub mod fixtures;
pub mod flows;
pub mod generators;
pub mod health;
pub mod payloads;
pub mod registry;

pub use client::{ApiClient, ApiRequest, ApiResponse, ClientError, RetryPolicy};
pub use config::{ConfigError, HarnessConfig};
pub use registry::CleanupRegistry;

use tracing_subscriber::EnvFilter;

/// Install a `tracing` subscriber that writes through the test harness.
///
/// Honors `RUST_LOG`; defaults to `ecommerce_harness=info`. Safe to call from
/// every test; only the first call installs the subscriber.
pub fn init_test_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("ecommerce_harness=info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}

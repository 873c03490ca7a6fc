//! E-commerce harness core - Shared types library.
//!
//! This crate provides the types shared by every harness component:
//! - `harness` - HTTP client, fixtures, flows and assertions
//! - `cli` - Connectivity checks and manual cleanup
//! - `integration-tests` - Self-tests and live service suites
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O and no HTTP clients. The
//! platform under test owns every entity; these types only name and address
//! them.
//!
//! # Modules
//!
//! - [`types`] - Typed IDs, prices, statuses, service names and resource keys

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;

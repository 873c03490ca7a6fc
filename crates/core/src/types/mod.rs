//! Core types for the harness.
//!
//! This module provides type-safe wrappers for the resources exposed by the
//! platform under test.

pub mod favourite;
pub mod id;
pub mod price;
pub mod resource;
pub mod service;
pub mod status;

pub use favourite::{FavouriteKey, LikeDate, LikeDateError};
pub use id::*;
pub use price::Price;
pub use resource::{ResourceKey, ResourceKind};
pub use service::{ServiceName, UnknownServiceName};
pub use status::*;

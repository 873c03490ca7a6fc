//! Multi-call business operations.
//!
//! Each flow step performs one request, requires a 2xx status and returns the
//! record the service echoed. Composite flows chain steps, passing
//! identifiers forward; there is no compensation when a later step fails, so
//! attach a [`CleanupRegistry`] to have created resources removed afterwards.
//!
//! Updates are sent as `PUT` on the collection endpoint with the full record,
//! which is what every service accepts. The `*_by_id` variants `PUT` the
//! given fields on the resource's own path instead.

pub mod catalog;
pub mod checkout;
pub mod users;

pub use catalog::{CatalogFlow, ProductLifecycle};
pub use checkout::{CheckoutFlow, CheckoutResult};
pub use users::{UserFlow, UserSetup};

use ecommerce_harness_core::{ResourceKey, ResourceKind};
use reqwest::StatusCode;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};

use crate::client::{ApiClient, ApiResponse, ClientError};
use crate::registry::CleanupRegistry;

/// Errors that can occur while running a flow.
#[derive(Debug, Error)]
pub enum FlowError {
    /// A request could not be completed.
    #[error(transparent)]
    Client(#[from] ClientError),

    /// A step returned a non-2xx status.
    #[error("{operation} failed with HTTP {status}: {body}")]
    Status {
        operation: &'static str,
        status: StatusCode,
        body: String,
    },

    /// A response lacked a field the next step needs.
    #[error("{operation} response is missing '{field}'")]
    MissingField {
        operation: &'static str,
        field: &'static str,
    },
}

/// Shared request plumbing for the flows.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Steps<'a> {
    pub client: &'a ApiClient,
    pub registry: Option<&'a CleanupRegistry>,
}

impl<'a> Steps<'a> {
    pub const fn new(client: &'a ApiClient, registry: Option<&'a CleanupRegistry>) -> Self {
        Self { client, registry }
    }

    /// Turn a response into its record, failing on non-2xx.
    pub fn expect_success(
        operation: &'static str,
        response: &ApiResponse,
    ) -> Result<Value, FlowError> {
        if !response.is_success() {
            return Err(FlowError::Status {
                operation,
                status: response.status(),
                body: response.body().to_string(),
            });
        }
        Ok(response.record()?)
    }

    /// `POST` a new resource and track it for cleanup.
    pub async fn create<B: Serialize + ?Sized>(
        &self,
        operation: &'static str,
        kind: ResourceKind,
        body: &B,
    ) -> Result<Value, FlowError> {
        let response = self
            .client
            .post(kind.service(), kind.endpoint(), body)
            .await?;
        let record = Self::expect_success(operation, &response)?;
        if let Some(registry) = self.registry {
            registry.track_record(kind, &record);
        }
        info!(operation, %kind, "Created resource");
        Ok(record)
    }

    /// `PUT` a full record on the collection endpoint.
    ///
    /// When the update changes a composite key the tracked key is replaced.
    pub async fn update(
        &self,
        operation: &'static str,
        kind: ResourceKind,
        before: &Value,
        changes: Value,
    ) -> Result<Value, FlowError> {
        let body = merge(before, changes);
        let response = self
            .client
            .put(kind.service(), kind.endpoint(), &body)
            .await?;
        let record = Self::expect_success(operation, &response)?;

        if let (Some(registry), Some(old), Some(new)) = (
            self.registry,
            kind.key_from_record(before),
            kind.key_from_record(&record),
        ) && old != new
        {
            registry.replace(kind, &old, new);
        }
        Ok(record)
    }

    /// `PUT` `body` on a single resource's path.
    pub async fn update_by_id(
        &self,
        operation: &'static str,
        kind: ResourceKind,
        key: &ResourceKey,
        body: &Value,
    ) -> Result<Value, FlowError> {
        let response = self
            .client
            .put(kind.service(), &kind.item_path(key), body)
            .await?;
        let record = Self::expect_success(operation, &response)?;
        info!(operation, %kind, %key, "Updated resource by id");
        Ok(record)
    }

    /// `GET` `endpoint/username/{username}`. Any non-2xx status yields `None`.
    pub async fn find_by_username(
        &self,
        kind: ResourceKind,
        username: &str,
    ) -> Result<Option<Value>, FlowError> {
        let response = self
            .client
            .get(kind.service(), &format!("{}/username/{username}", kind.endpoint()))
            .await?;
        if response.is_success() {
            Ok(Some(response.record()?))
        } else {
            warn!(%kind, status = %response.status(), "No match for username");
            Ok(None)
        }
    }

    /// `DELETE` a resource and stop tracking it.
    pub async fn delete(
        &self,
        operation: &'static str,
        kind: ResourceKind,
        key: &ResourceKey,
    ) -> Result<(), FlowError> {
        let response = self.client.delete_resource(kind, key).await?;
        Self::expect_success(operation, &response).map(|_| ())?;
        if let Some(registry) = self.registry {
            registry.untrack(kind, key);
        }
        info!(operation, %kind, %key, "Deleted resource");
        Ok(())
    }
}

/// Overlay `changes` on `record`. Non-object inputs yield `changes`.
#[must_use]
pub fn merge(record: &Value, changes: Value) -> Value {
    match (record, changes) {
        (Value::Object(base), Value::Object(overlay)) => {
            let mut merged = base.clone();
            merged.extend(overlay);
            Value::Object(merged)
        }
        (_, changes) => changes,
    }
}

/// Read an integer id field from a record.
pub(crate) fn id_field<T: From<i32>>(
    operation: &'static str,
    record: &Value,
    field: &'static str,
) -> Result<T, FlowError> {
    record
        .get(field)
        .and_then(Value::as_i64)
        .and_then(|id| i32::try_from(id).ok())
        .map(T::from)
        .ok_or(FlowError::MissingField { operation, field })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use ecommerce_harness_core::CartId;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_merge_overlays_fields() {
        let merged = merge(
            &json!({"paymentId": 1, "isPayed": false, "paymentStatus": "NOT_STARTED"}),
            json!({"paymentStatus": "IN_PROGRESS"}),
        );
        assert_eq!(
            merged,
            json!({"paymentId": 1, "isPayed": false, "paymentStatus": "IN_PROGRESS"})
        );
    }

    #[test]
    fn test_id_field() {
        let cart: CartId = id_field("create_cart", &json!({"cartId": 12}), "cartId").unwrap();
        assert_eq!(cart, CartId::new(12));

        let missing = id_field::<CartId>("create_cart", &json!({}), "cartId").unwrap_err();
        assert_eq!(missing.to_string(), "create_cart response is missing 'cartId'");
    }

    #[test]
    fn test_expect_success_reports_operation() {
        let response = ApiResponse::new(StatusCode::BAD_REQUEST, "http://x", "invalid cart");
        let err = Steps::expect_success("create_order", &response).unwrap_err();
        assert_eq!(err.to_string(), "create_order failed with HTTP 400 Bad Request: invalid cart");
    }
}

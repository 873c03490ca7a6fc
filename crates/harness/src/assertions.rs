//! Response checks and polling assertions.
//!
//! Every check returns `Result<_, AssertionFailure>` so tests can use `?`
//! and get a descriptive message (status and body, missing keys, actual vs
//! expected values) when something does not match.

use std::future::Future;
use std::time::Duration;

use ecommerce_harness_core::{OrderId, PaymentStatus, ResourceKey, ResourceKind};
use reqwest::StatusCode;
use serde_json::{Map, Value};
use thiserror::Error;
use tokio::time::Instant;
use tracing::debug;

use crate::client::{ApiClient, ApiResponse, ClientError};

/// An assertion that did not hold.
#[derive(Debug, Error)]
pub enum AssertionFailure {
    /// The response status was not one of the expected statuses.
    #[error("Expected status {}, got {actual}. Response: {body}", format_statuses(.expected))]
    Status {
        expected: Vec<StatusCode>,
        actual: StatusCode,
        body: String,
    },

    /// The record lacks one or more keys.
    #[error("Missing keys in response: {}", .0.join(", "))]
    MissingKeys(Vec<String>),

    /// The record lacks a key whose value was checked.
    #[error("Key '{0}' not found in entity")]
    MissingKey(String),

    /// A field has the wrong value.
    #[error("Expected {key}={expected}, got {actual}")]
    Value {
        key: String,
        expected: Value,
        actual: Value,
    },

    /// A field has the wrong JSON type.
    #[error("Field '{key}' should be {expected}, got {actual}")]
    Schema {
        key: String,
        expected: JsonType,
        actual: String,
    },

    /// No element of a collection carries the expected identifier.
    #[error("Entity with {field}={id} not found in collection")]
    NotInCollection { field: String, id: Value },

    /// A polled condition did not hold before the timeout.
    #[error("Timed out after {timeout:?}: {message}")]
    Timeout { timeout: Duration, message: String },

    /// A request made while checking failed.
    #[error(transparent)]
    Client(#[from] ClientError),
}

fn format_statuses(statuses: &[StatusCode]) -> String {
    match statuses {
        [single] => single.as_u16().to_string(),
        many => format!(
            "one of [{}]",
            many.iter()
                .map(|s| s.as_u16().to_string())
                .collect::<Vec<_>>()
                .join(", ")
        ),
    }
}

// =============================================================================
// Response checks
// =============================================================================

/// Require an exact status.
///
/// # Errors
///
/// Returns `AssertionFailure::Status` with the response body otherwise.
pub fn assert_status(response: &ApiResponse, expected: StatusCode) -> Result<(), AssertionFailure> {
    assert_status_in(response, &[expected])
}

/// Require one of several statuses.
///
/// # Errors
///
/// Returns `AssertionFailure::Status` with the response body otherwise.
pub fn assert_status_in(
    response: &ApiResponse,
    expected: &[StatusCode],
) -> Result<(), AssertionFailure> {
    if expected.contains(&response.status()) {
        Ok(())
    } else {
        Err(AssertionFailure::Status {
            expected: expected.to_vec(),
            actual: response.status(),
            body: response.body().to_string(),
        })
    }
}

/// Require every key in `keys` to be present on `record`.
///
/// # Errors
///
/// Returns `AssertionFailure::MissingKeys` naming all absent keys.
pub fn assert_contains_keys(record: &Value, keys: &[&str]) -> Result<(), AssertionFailure> {
    let missing: Vec<String> = keys
        .iter()
        .filter(|key| record.get(**key).is_none())
        .map(|key| (*key).to_string())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(AssertionFailure::MissingKeys(missing))
    }
}

/// Require each key of `expected` to be present on `record` with an equal value.
///
/// # Errors
///
/// Returns the first mismatch found.
pub fn assert_entity_values(
    record: &Value,
    expected: &Map<String, Value>,
) -> Result<(), AssertionFailure> {
    for (key, want) in expected {
        let Some(actual) = record.get(key) else {
            return Err(AssertionFailure::MissingKey(key.clone()));
        };
        if actual != want {
            return Err(AssertionFailure::Value {
                key: key.clone(),
                expected: want.clone(),
                actual: actual.clone(),
            });
        }
    }
    Ok(())
}

/// Require some element of `collection` to have `field == id`.
///
/// `collection` may be a bare list or a `{"collection": [...]}` envelope.
///
/// # Errors
///
/// Returns `AssertionFailure::NotInCollection` if no element matches.
pub fn assert_collection_contains(
    collection: &Value,
    field: &str,
    id: impl Into<Value>,
) -> Result<(), AssertionFailure> {
    let id = id.into();
    let found = items(collection).iter().any(|item| item.get(field) == Some(&id));
    if found {
        Ok(())
    } else {
        Err(AssertionFailure::NotInCollection {
            field: field.to_string(),
            id,
        })
    }
}

fn items(value: &Value) -> &[Value] {
    match value {
        Value::Array(items) => items,
        Value::Object(map) => match map.get("collection") {
            Some(Value::Array(items)) => items,
            _ => &[],
        },
        _ => &[],
    }
}

// =============================================================================
// Schema checks
// =============================================================================

/// JSON type expected for a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonType {
    String,
    Integer,
    Number,
    Bool,
    Object,
    Array,
}

impl JsonType {
    /// Whether `value` has this type. `null` always matches.
    #[must_use]
    pub fn matches(self, value: &Value) -> bool {
        match (self, value) {
            (_, Value::Null)
            | (Self::String, Value::String(_))
            | (Self::Number, Value::Number(_))
            | (Self::Bool, Value::Bool(_))
            | (Self::Object, Value::Object(_))
            | (Self::Array, Value::Array(_)) => true,
            (Self::Integer, Value::Number(n)) => n.is_i64() || n.is_u64(),
            _ => false,
        }
    }
}

impl std::fmt::Display for JsonType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Number => "number",
            Self::Bool => "bool",
            Self::Object => "object",
            Self::Array => "array",
        };
        f.write_str(name)
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Check field presence and types on a record.
///
/// For a collection envelope or a list, only the first element is checked
/// and an empty collection passes.
///
/// # Errors
///
/// Returns `AssertionFailure::MissingKey` or `AssertionFailure::Schema` for
/// the first field that does not conform.
pub fn validate_schema(
    record: &Value,
    schema: &[(&str, JsonType)],
) -> Result<(), AssertionFailure> {
    let target = match record {
        Value::Array(list) => list.first(),
        Value::Object(map) if map.contains_key("collection") => items(record).first(),
        other => Some(other),
    };
    let Some(target) = target else {
        return Ok(());
    };

    for (key, expected) in schema {
        let value = target
            .get(*key)
            .ok_or_else(|| AssertionFailure::MissingKey((*key).to_string()))?;
        if !expected.matches(value) {
            return Err(AssertionFailure::Schema {
                key: (*key).to_string(),
                expected: *expected,
                actual: type_name(value).to_string(),
            });
        }
    }
    Ok(())
}

// =============================================================================
// Polling
// =============================================================================

/// Polls a lookup at a constant interval until a predicate holds.
#[derive(Debug, Clone, Copy)]
pub struct Poller {
    pub timeout: Duration,
    pub interval: Duration,
}

impl Default for Poller {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            interval: Duration::from_secs(2),
        }
    }
}

impl Poller {
    #[must_use]
    pub const fn new(timeout: Duration, interval: Duration) -> Self {
        Self { timeout, interval }
    }

    /// Poller with the client's configured wait timeout and a 1 s interval.
    #[must_use]
    pub fn for_client(client: &ApiClient) -> Self {
        Self::new(client.config().wait_timeout, Duration::from_secs(1))
    }

    /// Await `lookup` until `predicate` holds on its output or the timeout
    /// elapses. The lookup runs at least once.
    ///
    /// Returns the last observed value on success.
    ///
    /// # Errors
    ///
    /// Returns `AssertionFailure::Timeout` with `message` and the last
    /// observed value, or the first error the lookup returns.
    pub async fn eventually<T, F, Fut, P>(
        &self,
        message: &str,
        mut lookup: F,
        mut predicate: P,
    ) -> Result<T, AssertionFailure>
    where
        T: std::fmt::Debug,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, AssertionFailure>>,
        P: FnMut(&T) -> bool,
    {
        let deadline = Instant::now() + self.timeout;
        loop {
            let observed = lookup().await?;
            if predicate(&observed) {
                return Ok(observed);
            }
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(AssertionFailure::Timeout {
                    timeout: self.timeout,
                    message: format!("{message} (last observed: {observed:?})"),
                });
            }
            debug!(message, "Condition not met yet, polling again");
            // The last poll lands on the deadline.
            tokio::time::sleep(self.interval.min(remaining)).await;
        }
    }

    /// Wait until a resource can be fetched, returning its record.
    ///
    /// # Errors
    ///
    /// Returns `AssertionFailure::Timeout` if it never appears.
    pub async fn wait_for_entity(
        &self,
        client: &ApiClient,
        kind: ResourceKind,
        key: &ResourceKey,
    ) -> Result<Value, AssertionFailure> {
        let found = self
            .eventually(
                &format!("{kind} {key} should exist"),
                || async move { Ok(client.find(kind, key).await?) },
                Option::is_some,
            )
            .await?;
        found.ok_or_else(|| AssertionFailure::MissingKey(key.to_string()))
    }

    /// Wait until fetching a resource no longer succeeds.
    ///
    /// # Errors
    ///
    /// Returns `AssertionFailure::Timeout` if it is still present.
    pub async fn wait_for_deletion(
        &self,
        client: &ApiClient,
        kind: ResourceKind,
        key: &ResourceKey,
    ) -> Result<(), AssertionFailure> {
        self.eventually(
            &format!("{kind} {key} should be deleted"),
            || async move { Ok(client.find(kind, key).await?.is_some()) },
            |present| !present,
        )
        .await
        .map(|_| ())
    }

    /// Wait until the payment recorded for an order reaches `expected`,
    /// returning the payment record.
    ///
    /// The payment is found by its `order.orderId` in the payments
    /// collection; an order without a payment yet keeps polling.
    ///
    /// # Errors
    ///
    /// Returns `AssertionFailure::Timeout` reporting the last status seen.
    pub async fn wait_for_order_status(
        &self,
        client: &ApiClient,
        order_id: OrderId,
        expected: PaymentStatus,
    ) -> Result<Value, AssertionFailure> {
        let wanted = i64::from(order_id.as_i32());
        let lookup = || async move {
            let payment = client
                .list(ResourceKind::Payment)
                .await?
                .into_iter()
                .find(|p| p.pointer("/order/orderId").and_then(Value::as_i64) == Some(wanted));
            let status = payment
                .as_ref()
                .and_then(|p| p.get("paymentStatus"))
                .and_then(Value::as_str)
                .map(String::from);
            Ok((payment, status))
        };

        let (payment, _) = self
            .eventually(
                &format!("order {order_id} should reach payment status {expected}"),
                lookup,
                |(_, status)| status.as_deref() == Some(expected.as_str()),
            )
            .await?;
        payment.ok_or_else(|| AssertionFailure::MissingKey(format!("payment of order {order_id}")))
    }
}

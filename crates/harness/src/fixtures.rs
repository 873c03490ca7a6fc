//! Ready-made resources with teardown.
//!
//! A [`Fixture`] owns a created record and knows how to delete it.
//! [`with_fixture`] runs a test body with the record and tears the resource
//! down afterwards, even when the body panics.

use std::future::Future;
use std::panic::{AssertUnwindSafe, resume_unwind};

use futures::FutureExt;

use ecommerce_harness_core::{CategoryId, ResourceKey, ResourceKind, UserId};
use serde_json::Value;
use tracing::{info, warn};

use crate::client::ApiClient;
use crate::flows::{CatalogFlow, FlowError, UserFlow, id_field};

/// A created resource and its teardown.
#[derive(Debug, Clone, PartialEq)]
pub struct Fixture<T = Value> {
    record: T,
    kind: ResourceKind,
    key: ResourceKey,
    delete_on_teardown: bool,
}

impl<T> Fixture<T> {
    /// Wrap a created resource that is deleted on teardown.
    #[must_use]
    pub const fn new(kind: ResourceKind, key: ResourceKey, record: T) -> Self {
        Self {
            record,
            kind,
            key,
            delete_on_teardown: true,
        }
    }

    /// Leave the resource in place on teardown.
    #[must_use]
    pub fn kept(mut self) -> Self {
        self.delete_on_teardown = false;
        self
    }

    #[must_use]
    pub const fn record(&self) -> &T {
        &self.record
    }

    #[must_use]
    pub const fn kind(&self) -> ResourceKind {
        self.kind
    }

    #[must_use]
    pub const fn key(&self) -> &ResourceKey {
        &self.key
    }

    #[must_use]
    pub fn into_record(self) -> T {
        self.record
    }

    /// Delete the resource. Failures are logged and swallowed.
    pub async fn teardown(self, client: &ApiClient) {
        if !self.delete_on_teardown {
            return;
        }
        match client.delete_resource(self.kind, &self.key).await {
            Ok(response) if response.is_success() => {
                info!(kind = %self.kind, key = %self.key, "Fixture torn down");
            }
            Ok(response) => {
                warn!(
                    kind = %self.kind,
                    key = %self.key,
                    status = %response.status(),
                    "Fixture teardown returned error status"
                );
            }
            Err(e) => {
                warn!(kind = %self.kind, key = %self.key, error = %e, "Fixture teardown failed");
            }
        }
    }
}

impl Fixture<Value> {
    /// Wrap a record returned by the owning service, extracting its key.
    ///
    /// # Errors
    ///
    /// Returns `FlowError::MissingField` if the record lacks its key fields.
    pub fn from_record(kind: ResourceKind, record: Value) -> Result<Self, FlowError> {
        let key = kind
            .key_from_record(&record)
            .ok_or(FlowError::MissingField {
                operation: "fixture",
                field: kind.key_fields().first().copied().unwrap_or("id"),
            })?;
        Ok(Self::new(kind, key, record))
    }
}

/// Await `body`, then `teardown`, even if `body` panics.
///
/// A panic in `body` is resumed once `teardown` has finished, so a failing
/// test still fails after cleaning up.
pub async fn run_with_teardown<R>(
    body: impl Future<Output = R>,
    teardown: impl Future<Output = ()>,
) -> R {
    let outcome = AssertUnwindSafe(body).catch_unwind().await;
    teardown.await;
    match outcome {
        Ok(result) => result,
        Err(panic) => {
            warn!("Test body panicked, resuming after teardown");
            resume_unwind(panic)
        }
    }
}

/// Run `body` with the fixture's record, then tear the fixture down.
///
/// Teardown also runs when `body` panics; the panic is resumed afterwards.
/// Returns whatever `body` returned.
pub async fn with_fixture<T, F, Fut, R>(client: &ApiClient, fixture: Fixture<T>, body: F) -> R
where
    T: Clone,
    F: FnOnce(T) -> Fut,
    Fut: Future<Output = R>,
{
    let record = fixture.record().clone();
    run_with_teardown(body(record), fixture.teardown(client)).await
}

// =============================================================================
// Ready-made fixtures
// =============================================================================

/// A random user, deleted on teardown.
///
/// # Errors
///
/// Returns an error if the user cannot be created.
pub async fn test_user(client: &ApiClient) -> Result<Fixture, FlowError> {
    let user = UserFlow::new(client).register_user(None).await?;
    Fixture::from_record(ResourceKind::User, user)
}

/// A random category. Not deleted on teardown, as it may still own products.
///
/// # Errors
///
/// Returns an error if the category cannot be created.
pub async fn test_category(client: &ApiClient) -> Result<Fixture, FlowError> {
    let category = CatalogFlow::new(client).create_category(None).await?;
    Ok(Fixture::from_record(ResourceKind::Category, category)?.kept())
}

/// A random product in `category_id`, deleted on teardown.
///
/// # Errors
///
/// Returns an error if the product cannot be created.
pub async fn test_product(
    client: &ApiClient,
    category_id: CategoryId,
) -> Result<Fixture, FlowError> {
    let product = CatalogFlow::new(client)
        .create_product(category_id, None)
        .await?;
    Fixture::from_record(ResourceKind::Product, product)
}

/// `count` random products in `category_id`.
///
/// If one cannot be created, those already created are torn down before
/// the error is returned.
///
/// # Errors
///
/// Returns the first creation error.
pub async fn test_products(
    client: &ApiClient,
    category_id: CategoryId,
    count: usize,
) -> Result<Vec<Fixture>, FlowError> {
    let mut products = Vec::with_capacity(count);
    for _ in 0..count {
        match test_product(client, category_id).await {
            Ok(product) => products.push(product),
            Err(e) => {
                for product in products {
                    product.teardown(client).await;
                }
                return Err(e);
            }
        }
    }
    Ok(products)
}

/// A user with one address.
#[derive(Debug, Clone, PartialEq)]
pub struct UserWithAddress {
    pub user: Fixture,
    pub address: Fixture,
}

impl UserWithAddress {
    /// Delete the address, then the user.
    pub async fn teardown(self, client: &ApiClient) {
        self.address.teardown(client).await;
        self.user.teardown(client).await;
    }
}

/// A random user with a random address, both deleted on teardown.
///
/// # Errors
///
/// Returns an error if either resource cannot be created; a user created
/// before the failure is torn down.
pub async fn test_user_with_address(client: &ApiClient) -> Result<UserWithAddress, FlowError> {
    let user = test_user(client).await?;
    let user_id: UserId = match id_field("test_user_with_address", user.record(), "userId") {
        Ok(id) => id,
        Err(e) => {
            user.teardown(client).await;
            return Err(e);
        }
    };

    let address = match UserFlow::new(client).add_address(user_id, None).await {
        Ok(record) => Fixture::from_record(ResourceKind::Address, record),
        Err(e) => Err(e),
    };
    match address {
        Ok(address) => Ok(UserWithAddress { user, address }),
        Err(e) => {
            user.teardown(client).await;
            Err(e)
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_from_record_extracts_key() {
        let fixture =
            Fixture::from_record(ResourceKind::Product, json!({"productId": 4, "sku": "x"})).unwrap();
        assert_eq!(fixture.key(), &ResourceKey::Id(4));
        assert_eq!(fixture.kind(), ResourceKind::Product);
        assert_eq!(fixture.record()["sku"], "x");
    }

    #[test]
    fn test_from_record_without_key() {
        let err = Fixture::from_record(ResourceKind::Category, json!({"categoryTitle": "x"}))
            .unwrap_err();
        assert_eq!(err.to_string(), "fixture response is missing 'categoryId'");
    }

    #[tokio::test]
    async fn test_kept_fixture_skips_delete() {
        let client = ApiClient::new(crate::HarnessConfig::for_base_url("http://127.0.0.1:9")).unwrap();
        let fixture = Fixture::new(ResourceKind::Category, ResourceKey::Id(1), ()).kept();
        let result = with_fixture(&client, fixture, |()| async { 42 }).await;
        assert_eq!(result, 42);
    }

    #[tokio::test]
    async fn test_run_with_teardown_resumes_panic_after_teardown() {
        let torn_down = std::sync::atomic::AtomicBool::new(false);
        let outcome = AssertUnwindSafe(run_with_teardown::<u8>(
            async { panic!("assertion failed in test body") },
            async {
                torn_down.store(true, std::sync::atomic::Ordering::SeqCst);
            },
        ))
        .catch_unwind()
        .await;

        assert!(outcome.is_err());
        assert!(torn_down.load(std::sync::atomic::Ordering::SeqCst));
    }
}

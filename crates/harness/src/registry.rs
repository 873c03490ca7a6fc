//! Tracking and cleanup of resources created during a test.
//!
//! Tests record every resource they create; [`CleanupRegistry::cleanup`]
//! deletes them afterwards in [`ResourceKind::CLEANUP_ORDER`] so dependents
//! go before the resources they reference. Cleanup never fails the caller:
//! a resource that cannot be deleted is logged and counted.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use ecommerce_harness_core::{ResourceKey, ResourceKind};
use serde_json::Value;
use tracing::{info, instrument, warn};

use crate::client::ApiClient;

/// Outcome of a cleanup pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanupReport {
    /// Resources deleted (2xx on delete).
    pub deleted: Vec<(ResourceKind, ResourceKey)>,
    /// Resources whose deletion failed or returned non-2xx.
    pub failed: Vec<(ResourceKind, ResourceKey)>,
}

/// Per-test record of created resources.
///
/// Clones share one tracked set, so a test body and the code that cleans up
/// after it see the same resources. Keys within a kind keep insertion order.
#[derive(Debug, Clone)]
pub struct CleanupRegistry {
    enabled: bool,
    tracked: Arc<Mutex<BTreeMap<ResourceKind, Vec<ResourceKey>>>>,
}

impl Default for CleanupRegistry {
    fn default() -> Self {
        Self::new(true)
    }
}

impl CleanupRegistry {
    /// Create a registry. When `enabled` is false, [`cleanup`](Self::cleanup)
    /// deletes nothing.
    #[must_use]
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            tracked: Arc::new(Mutex::new(BTreeMap::new())),
        }
    }

    /// Registry honoring the client's `CLEANUP_AFTER_TEST` setting.
    #[must_use]
    pub fn from_client(client: &ApiClient) -> Self {
        Self::new(client.config().cleanup_after_test)
    }

    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<ResourceKind, Vec<ResourceKey>>> {
        // A panicking test must not prevent cleanup of what it created.
        self.tracked.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record a created resource.
    pub fn track(&self, kind: ResourceKind, key: impl Into<ResourceKey>) {
        let key = key.into();
        let mut tracked = self.lock();
        let keys = tracked.entry(kind).or_default();
        if !keys.contains(&key) {
            keys.push(key);
        }
    }

    /// Record a created resource from the record the service returned.
    ///
    /// Returns the extracted key, or `None` (and tracks nothing) when the
    /// record lacks the key fields.
    pub fn track_record(&self, kind: ResourceKind, record: &Value) -> Option<ResourceKey> {
        let key = kind.key_from_record(record);
        match &key {
            Some(key) => self.track(kind, key.clone()),
            None => warn!(%kind, "Created record has no key, not tracked for cleanup"),
        }
        key
    }

    /// Forget a resource, typically because the test deleted it itself.
    pub fn untrack(&self, kind: ResourceKind, key: &ResourceKey) {
        let mut tracked = self.lock();
        if let Some(keys) = tracked.get_mut(&kind) {
            keys.retain(|k| k != key);
            if keys.is_empty() {
                tracked.remove(&kind);
            }
        }
    }

    /// Swap a key in place, keeping its position. Used when an update
    /// changes a composite key (a favourite's `likeDate`).
    pub fn replace(&self, kind: ResourceKind, old: &ResourceKey, new: ResourceKey) {
        let mut tracked = self.lock();
        let keys = tracked.entry(kind).or_default();
        match keys.iter_mut().find(|k| *k == old) {
            Some(slot) => *slot = new,
            None => keys.push(new),
        }
    }

    /// Keys tracked for `kind`, oldest first.
    #[must_use]
    pub fn tracked(&self, kind: ResourceKind) -> Vec<ResourceKey> {
        self.lock().get(&kind).cloned().unwrap_or_default()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().values().all(Vec::is_empty)
    }

    /// Forget everything without deleting.
    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Delete every tracked resource and forget it.
    ///
    /// Kinds are processed in [`ResourceKind::CLEANUP_ORDER`], keys within a
    /// kind newest first. Failures are logged and reported, never returned.
    #[instrument(skip_all)]
    pub async fn cleanup(&self, client: &ApiClient) -> CleanupReport {
        let mut report = CleanupReport::default();
        if !self.enabled {
            info!("Cleanup disabled, leaving tracked resources in place");
            return report;
        }

        let tracked = std::mem::take(&mut *self.lock());

        for kind in ResourceKind::CLEANUP_ORDER {
            let Some(keys) = tracked.get(&kind) else {
                continue;
            };
            for key in keys.iter().rev() {
                match client.delete_resource(kind, key).await {
                    Ok(response) if response.is_success() => {
                        report.deleted.push((kind, key.clone()));
                    }
                    Ok(response) => {
                        warn!(
                            %kind,
                            %key,
                            status = %response.status(),
                            "Failed to cleanup resource"
                        );
                        report.failed.push((kind, key.clone()));
                    }
                    Err(e) => {
                        warn!(%kind, %key, error = %e, "Failed to cleanup resource");
                        report.failed.push((kind, key.clone()));
                    }
                }
            }
        }

        info!(
            deleted = report.deleted.len(),
            failed = report.failed.len(),
            "Cleanup finished"
        );
        report
    }
}

//! Persistence of blockchain data against an untrusted store.

use crate::blockchain::{parse, BlockchainData, ShapeViolation};
use crate::config::ExecutionMode;
use crate::diagnostics::DiagnosticsSink;
use crate::storage::KeyValueStore;
use parking_lot::Mutex;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

/// Cache statistics for monitoring.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CacheStats {
    /// Loads that returned valid cached data.
    pub hits: u64,
    /// Loads that found nothing.
    pub misses: u64,
    /// Loads whose content failed validation.
    pub rejections: u64,
    /// Successful writes.
    pub writes: u64,
    /// Writes the store refused.
    pub write_failures: u64,
    /// Successful removals of the cache entry.
    pub invalidations: u64,
    /// Times the whole store was cleared after a failure.
    pub clears: u64,
}

impl CacheStats {
    /// Calculate hit rate as a percentage of loads that reached the store.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses + self.rejections;
        if total == 0 {
            0.0
        } else {
            (self.hits as f64 / total as f64) * 100.0
        }
    }
}

/// Outcome of reading the cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheLoad {
    /// Caching is off, unavailable, or there is no configuration.
    Disabled,
    /// Nothing stored under the key.
    Miss,
    /// Valid data was found.
    Hit(BlockchainData),
    /// Stored content failed validation and was invalidated.
    Rejected(ShapeViolation),
    /// The store failed to read; carries the outcome of the fail-safe clear.
    Unavailable(Invalidation),
}

/// Outcome of invalidating the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Invalidation {
    /// Nothing was attempted.
    Skipped,
    /// The cache entry was removed.
    Removed,
    /// Removal failed, so the whole store was cleared.
    Cleared,
    /// Removal and clearing both failed.
    Failed,
}

/// Saves, loads and invalidates the single cache entry of one paywall.
///
/// Every operation is total. Storage failures and tampered content degrade
/// to an empty cache.
pub struct CacheController {
    store: Arc<dyn KeyValueStore>,
    diagnostics: Arc<dyn DiagnosticsSink>,
    mode: ExecutionMode,
    /// Runtime toggle.
    enabled: bool,
    /// Cleared for good if the store failed its probe.
    available: bool,
    key: Option<String>,
    stats: Mutex<CacheStats>,
}

impl CacheController {
    /// Create a controller over `store`.
    ///
    /// The store is probed once. A failed probe clears the store and probes
    /// again; if that also fails the controller never touches it again.
    #[must_use]
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        diagnostics: Arc<dyn DiagnosticsSink>,
        mode: ExecutionMode,
        enabled: bool,
    ) -> Self {
        let mut stats = CacheStats::default();
        let available = match store.probe() {
            Ok(()) => true,
            Err(e) => {
                debug!("Store probe failed, clearing and retrying: {e}");
                match store.clear().and_then(|()| store.probe()) {
                    Ok(()) => {
                        stats.clears += 1;
                        true
                    }
                    Err(e) => {
                        warn!("Persistent store unavailable, caching disabled: {e}");
                        false
                    }
                }
            }
        };

        Self {
            store,
            diagnostics,
            mode,
            enabled,
            available,
            key: None,
            stats: Mutex::new(stats),
        }
    }

    /// Set the derived key. `None` disables every operation.
    pub fn set_key(&mut self, key: Option<String>) {
        self.key = key;
    }

    /// The derived key, if any.
    #[must_use]
    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    /// Whether caching is switched on.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Switch caching on or off.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Whether the store passed its probe.
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.available
    }

    /// Get current cache statistics.
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        self.stats.lock().clone()
    }

    fn active_key(&self) -> Option<&str> {
        if self.enabled && self.available {
            self.key.as_deref()
        } else {
            None
        }
    }

    /// Write `data` under the key. Failures are swallowed.
    pub fn save(&self, data: &BlockchainData) {
        let Some(key) = self.active_key() else {
            return;
        };

        let serialized = match serde_json::to_string(data) {
            Ok(serialized) => serialized,
            Err(e) => {
                warn!("Failed to serialize blockchain data: {e}");
                return;
            }
        };

        match self.store.set(key, &serialized) {
            Ok(()) => {
                self.stats.lock().writes += 1;
                debug!("Saved blockchain data under {key}");
            }
            Err(e) => {
                self.stats.lock().write_failures += 1;
                warn!("Failed to save blockchain data: {e}");
            }
        }
    }

    /// Read and validate the cached value.
    ///
    /// Invalid content is invalidated; a failing read clears the store.
    pub fn load(&self) -> CacheLoad {
        let Some(key) = self.active_key() else {
            return CacheLoad::Disabled;
        };

        let raw = match self.store.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                self.stats.lock().misses += 1;
                debug!("Cache miss for {key}");
                return CacheLoad::Miss;
            }
            Err(e) => {
                debug!("Failed to read {key}, clearing store: {e}");
                return CacheLoad::Unavailable(self.clear_store());
            }
        };

        let parsed = serde_json::from_str::<Value>(&raw)
            .map_err(|_| ShapeViolation::Unparseable)
            .and_then(parse);

        match parsed {
            Ok(data) => {
                self.stats.lock().hits += 1;
                debug!("Cache hit for {key}");
                CacheLoad::Hit(data)
            }
            Err(violation) => {
                self.stats.lock().rejections += 1;
                debug!("Rejected cached data for {key}: {violation}");
                self.invalidate();
                CacheLoad::Rejected(violation)
            }
        }
    }

    /// Remove the cache entry, clearing the whole store if removal fails.
    ///
    /// The triggering error is reported to the diagnostics sink only in
    /// development mode.
    pub fn invalidate(&self) -> Invalidation {
        let Some(key) = self.active_key() else {
            return Invalidation::Skipped;
        };
        if !self.store.supports_remove() {
            return Invalidation::Skipped;
        }

        match self.store.remove(key) {
            Ok(()) => {
                self.stats.lock().invalidations += 1;
                Invalidation::Removed
            }
            Err(e) => {
                if self.mode.is_development() {
                    self.diagnostics.report(&e);
                }
                self.clear_store()
            }
        }
    }

    /// Clear the whole store, whether or not a key is set.
    ///
    /// Skipped when caching is off or the store failed its probe.
    pub fn clear(&self) -> Invalidation {
        if !(self.enabled && self.available) {
            return Invalidation::Skipped;
        }
        self.clear_store()
    }

    fn clear_store(&self) -> Invalidation {
        match self.store.clear() {
            Ok(()) => {
                self.stats.lock().clears += 1;
                Invalidation::Cleared
            }
            Err(_) => Invalidation::Failed,
        }
    }
}

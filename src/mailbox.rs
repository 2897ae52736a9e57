//! The mailbox: validated blockchain state for one embedded paywall.

use crate::blockchain::{parse, BlockchainData, ShapeViolation};
use crate::cache::{cache_key, CacheController, CacheLoad, CacheStats, Invalidation};
use crate::config::MailboxConfig;
use crate::diagnostics::{DiagnosticsSink, TracingDiagnostics};
use crate::error::{Error, Result};
use crate::event::{create_event_channel, MailboxEvent, MailboxEventsChannel, MailboxEventsSender};
use crate::paywall::PaywallConfig;
use crate::storage::{FileStore, KeyValueStore};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info};

/// Builder for constructing a mailbox.
pub struct MailboxBuilder {
    config: MailboxConfig,
    store: Option<Arc<dyn KeyValueStore>>,
    diagnostics: Option<Arc<dyn DiagnosticsSink>>,
}

impl MailboxBuilder {
    /// Create a new mailbox builder with the given configuration.
    #[must_use]
    pub fn new(config: MailboxConfig) -> Self {
        Self {
            config,
            store: None,
            diagnostics: None,
        }
    }

    /// Use `store` instead of opening the file store named in the config.
    #[must_use]
    pub fn store(mut self, store: Arc<dyn KeyValueStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Send development diagnostics to `sink` instead of `tracing`.
    #[must_use]
    pub fn diagnostics(mut self, sink: Arc<dyn DiagnosticsSink>) -> Self {
        self.diagnostics = Some(sink);
        self
    }

    /// Build the mailbox.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the file store
    /// cannot be opened.
    pub fn build(self) -> Result<Mailbox> {
        self.config.validate()?;

        let store = match self.store {
            Some(store) => store,
            None => Arc::new(FileStore::open(self.config.store.path.clone())?),
        };
        let diagnostics = self
            .diagnostics
            .unwrap_or_else(|| Arc::new(TracingDiagnostics));

        let cache = CacheController::new(
            store,
            diagnostics,
            self.config.mode,
            self.config.use_local_storage_cache,
        );
        let default_blockchain_data = BlockchainData::empty(self.config.default_network);
        let (events_tx, _) = create_event_channel();

        info!(
            "Mailbox initialized (mode={:?}, cache_enabled={}, store_available={})",
            self.config.mode,
            cache.is_enabled(),
            cache.is_available()
        );

        Ok(Mailbox {
            cache,
            configuration: None,
            blockchain_data: default_blockchain_data.clone(),
            default_blockchain_data,
            events_tx,
        })
    }
}

/// Owner of the validated blockchain state inside an embedded paywall.
///
/// State starts at the default value and only changes on validated fresh
/// data or validated cache hydration.
pub struct Mailbox {
    cache: CacheController,
    configuration: Option<PaywallConfig>,
    blockchain_data: BlockchainData,
    default_blockchain_data: BlockchainData,
    events_tx: MailboxEventsSender,
}

impl Mailbox {
    /// Current blockchain data.
    #[must_use]
    pub fn blockchain_data(&self) -> &BlockchainData {
        &self.blockchain_data
    }

    /// Snapshot of the current data for the transport layer.
    #[must_use]
    pub fn data_to_send(&self) -> BlockchainData {
        self.blockchain_data.clone()
    }

    /// The value substituted for anything that fails validation.
    #[must_use]
    pub fn default_blockchain_data(&self) -> &BlockchainData {
        &self.default_blockchain_data
    }

    /// The active paywall configuration.
    #[must_use]
    pub fn configuration(&self) -> Option<&PaywallConfig> {
        self.configuration.as_ref()
    }

    /// Set the paywall configuration. It cannot change afterwards.
    ///
    /// # Errors
    ///
    /// Returns an error if a configuration is already set or `configuration`
    /// is invalid; the mailbox is left unchanged either way.
    pub fn set_configuration(&mut self, configuration: PaywallConfig) -> Result<()> {
        if self.configuration.is_some() {
            return Err(Error::ConfigurationAlreadySet);
        }
        configuration.validate()?;

        self.cache.set_key(cache_key(Some(&configuration)));
        self.configuration = Some(configuration);
        debug!("Paywall configuration set, cache key {:?}", self.cache.key());
        Ok(())
    }

    /// Whether blockchain data is persisted.
    #[must_use]
    pub fn use_local_storage_cache(&self) -> bool {
        self.cache.is_enabled()
    }

    /// Turn persistence on or off.
    ///
    /// Has no effect on a store that failed its availability probe.
    pub fn set_use_local_storage_cache(&mut self, enabled: bool) {
        self.cache.set_enabled(enabled);
    }

    /// Subscribe to mailbox events.
    #[must_use]
    pub fn subscribe_events(&self) -> MailboxEventsChannel {
        self.events_tx.subscribe()
    }

    /// Get cache statistics.
    #[must_use]
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Validate untrusted data, substituting the default on any violation.
    ///
    /// A rejected candidate also clears the whole persistent store, with or
    /// without a configuration. Nothing is touched while caching is off.
    pub fn sanitize_blockchain_data(&self, candidate: Value) -> BlockchainData {
        match parse(candidate) {
            Ok(data) => data,
            Err(violation) => {
                debug!("Rejected blockchain data: {violation}");
                if self.cache.clear() == Invalidation::Cleared {
                    self.emit(MailboxEvent::CacheCleared);
                }
                self.default_blockchain_data.clone()
            }
        }
    }

    /// Accept fresh data from the fetch collaborator.
    ///
    /// # Errors
    ///
    /// Returns the violation if `candidate` is rejected. The current state is
    /// kept and the persisted cache is invalidated.
    pub fn receive_blockchain_data(
        &mut self,
        candidate: Value,
    ) -> std::result::Result<(), ShapeViolation> {
        match parse(candidate) {
            Ok(data) => {
                self.blockchain_data = data;
                self.save_cache_in_local_storage();
                self.emit(MailboxEvent::BlockchainDataUpdated);
                Ok(())
            }
            Err(violation) => {
                debug!("Rejected fresh blockchain data: {violation}");
                self.invalidate_local_storage_cache();
                Err(violation)
            }
        }
    }

    /// Replace the current state with validated cached data, if any.
    ///
    /// Returns true if the state was hydrated.
    pub fn hydrate_from_cache(&mut self) -> bool {
        match self.load_cache() {
            CacheLoad::Hit(data) => {
                self.blockchain_data = data;
                self.emit(MailboxEvent::CacheHydrated);
                true
            }
            _ => false,
        }
    }

    /// Persist the current state. A no-op when caching is off or there is no
    /// configuration.
    pub fn save_cache_in_local_storage(&self) {
        self.cache.save(&self.blockchain_data);
    }

    /// Read the cache, distinguishing why nothing usable was found.
    pub fn load_cache(&self) -> CacheLoad {
        let load = self.cache.load();
        match &load {
            CacheLoad::Rejected(violation) => self.emit(MailboxEvent::CacheRejected {
                reason: violation.to_string(),
            }),
            CacheLoad::Unavailable(Invalidation::Cleared) => {
                self.emit(MailboxEvent::CacheCleared);
            }
            _ => {}
        }
        load
    }

    /// Validated cached data, or the default if there is none.
    pub fn get_blockchain_data_from_local_storage_cache(&self) -> BlockchainData {
        match self.load_cache() {
            CacheLoad::Hit(data) => data,
            _ => self.default_blockchain_data.clone(),
        }
    }

    /// Remove this paywall's cache entry.
    ///
    /// If removal fails the whole store is cleared.
    pub fn invalidate_local_storage_cache(&self) -> Invalidation {
        let outcome = self.cache.invalidate();
        match outcome {
            Invalidation::Removed => self.emit(MailboxEvent::CacheInvalidated),
            Invalidation::Cleared => self.emit(MailboxEvent::CacheCleared),
            Invalidation::Skipped | Invalidation::Failed => {}
        }
        outcome
    }

    /// The storage key for the current configuration.
    #[must_use]
    pub fn get_cache_key(&self) -> Option<String> {
        cache_key(self.configuration.as_ref())
    }

    fn emit(&self, event: MailboxEvent) {
        let _ = self.events_tx.send(event);
    }
}

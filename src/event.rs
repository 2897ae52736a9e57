//! Mailbox event system.

use tokio::sync::broadcast;

/// Events emitted by the mailbox.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MailboxEvent {
    /// Validated fresh data replaced the current state.
    BlockchainDataUpdated,

    /// State was restored from the persistent cache.
    CacheHydrated,

    /// Persisted content failed validation and was discarded.
    CacheRejected {
        /// Why the content was rejected.
        reason: String,
    },

    /// The cache entry for the current paywall was removed.
    CacheInvalidated,

    /// The entire store was cleared after a storage failure.
    CacheCleared,
}

/// Channel for receiving mailbox events.
pub type MailboxEventsChannel = broadcast::Receiver<MailboxEvent>;

/// Sender for mailbox events.
pub type MailboxEventsSender = broadcast::Sender<MailboxEvent>;

/// Create a new event channel pair.
#[must_use]
pub fn create_event_channel() -> (MailboxEventsSender, MailboxEventsChannel) {
    broadcast::channel(64)
}

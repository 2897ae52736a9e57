//! Key-value persistence backends.
//!
//! The store is shared with other parties on the same origin and can fail on
//! any primitive. Nothing in this module retries or hides failures; the cache
//! controller decides how to degrade.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use thiserror::Error;

/// Key written and removed by [`KeyValueStore::probe`].
pub const PROBE_KEY: &str = "__paywall_mailbox_probe__";

/// Failure of a storage primitive.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Storage is disabled or not present.
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// The write would exceed the storage quota.
    #[error("storage quota exceeded ({needed} bytes needed, {quota} allowed)")]
    QuotaExceeded {
        /// Total bytes the store would hold after the write.
        needed: usize,
        /// Maximum bytes the store may hold.
        quota: usize,
    },

    /// The backing medium holds unreadable content.
    #[error("storage is corrupt: {0}")]
    Corrupt(String),

    /// Filesystem error.
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A string key-value store with fallible primitives.
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove `key`. Removing an absent key succeeds.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    fn remove(&self, key: &str) -> Result<(), StorageError>;

    /// Remove every key in the store.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    fn clear(&self) -> Result<(), StorageError>;

    /// Whether [`remove`](Self::remove) is backed by a working primitive.
    ///
    /// Degraded environments may stub removal out entirely; callers then skip
    /// invalidation instead of falling back to [`clear`](Self::clear).
    fn supports_remove(&self) -> bool {
        true
    }

    /// Check that the store accepts writes by setting and removing
    /// [`PROBE_KEY`].
    ///
    /// # Errors
    ///
    /// Returns the first failing primitive's error.
    fn probe(&self) -> Result<(), StorageError> {
        self.set(PROBE_KEY, "1")?;
        self.remove(PROBE_KEY)
    }
}

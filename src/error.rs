//! Error types for paywall-mailbox.

use crate::storage::StorageError;
use thiserror::Error;

/// Result alias used by the fallible setup paths of the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while setting up a mailbox.
///
/// Cache operations themselves never return these; they degrade to an empty
/// cache instead.
#[derive(Debug, Error)]
pub enum Error {
    /// Filesystem error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid or unreadable mailbox configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// A paywall configuration was rejected.
    #[error("invalid paywall configuration: {0}")]
    InvalidPaywallConfig(String),

    /// The paywall configuration is immutable once set.
    #[error("paywall configuration has already been set")]
    ConfigurationAlreadySet,

    /// JSON (de)serialization failure.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The backing store could not be opened.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

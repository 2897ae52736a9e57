//! # paywall-mailbox
//!
//! Validated blockchain state cache for sandboxed paywall frames.
//!
//! A paywall frame has no wallet access of its own. It keeps a working copy of
//! membership data (account, balance, network and the state of every lock in
//! the paywall) and persists it to a shared key-value store so reloads are
//! fast. That store is writable by anything sharing the origin, so every value
//! read back is treated as untrusted input and re-validated before use.
//!
//! ## Architecture
//!
//! ```text
//!  fetch collaborator          transport collaborator
//!        │ (untrusted JSON)          │ (PaywallConfig)
//!        ▼                           ▼
//! ┌──────────────┐           ┌───────────────┐
//! │  validator   │           │ cache key     │
//! └──────┬───────┘           └───────┬───────┘
//!        ▼                           ▼
//! ┌──────────────┐   save    ┌───────────────┐   get/set/remove/clear
//! │   Mailbox    │ ────────▶ │ CacheController│ ─────────────────────▶ KeyValueStore
//! │   state      │ ◀──────── │               │
//! └──────────────┘  hydrate  └───────────────┘
//! ```
//!
//! Every operation on the cache is total: storage failures and tampered
//! content degrade to "behave as if the cache were empty".

pub mod blockchain;
pub mod cache;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod event;
pub mod mailbox;
pub mod paywall;
pub mod storage;

pub use blockchain::{sanitize, validate, BlockchainData, ShapeViolation};
pub use cache::{CacheController, CacheLoad, CacheStats, Invalidation};
pub use config::{ExecutionMode, MailboxConfig};
pub use diagnostics::{DiagnosticsSink, TracingDiagnostics};
pub use error::{Error, Result};
pub use event::{MailboxEvent, MailboxEventsChannel};
pub use mailbox::{Mailbox, MailboxBuilder};
pub use paywall::PaywallConfig;
pub use storage::{FileStore, KeyValueStore, MemoryStore, StorageError};

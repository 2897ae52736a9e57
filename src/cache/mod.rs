//! Persistent cache of blockchain data.
//!
//! # Flow
//!
//! ```text
//! new()  ── probe fails ──▶ clear store, probe again ── fails ──▶ never touched
//!
//! load()
//!    │
//!    ▼
//! ┌─────────────────────┐
//! │ enabled + key set?  │── no ──▶ Disabled (store untouched)
//! └─────────┬───────────┘
//!           ▼
//!      store.get(key)
//!    ┌──────┼──────────────┐
//!    │      │              │
//!  error  absent        present
//!    │      │              │
//!    ▼      ▼              ▼
//!  clear   Miss     parse + validate
//!  store            ┌──────┴──────┐
//!                 valid        invalid
//!                   │             │
//!                   ▼             ▼
//!                  Hit     invalidate + Rejected
//! ```

mod controller;
mod key;

pub use controller::{CacheController, CacheLoad, CacheStats, Invalidation};
pub use key::{cache_key, CACHE_KEY_PREFIX};

//! Blockchain-derived membership data and its validator.
//!
//! [`types`] is the typed model the rest of the crate works with;
//! [`validator`] is the single gate untrusted JSON must pass to become one.

mod types;
mod validator;

pub use types::{
    is_recognized_network, Address, BlockchainData, KeyState, KeyStatus, LockState, Transaction,
    TransactionStatus, TransactionType, DEV, MAINNET, RECOGNIZED_NETWORKS, STAGING,
};
pub use validator::{is_address, is_numeric_string, parse, sanitize, validate, ShapeViolation};

//! Blockchain-derived membership data as held by the mailbox.
//!
//! These types mirror the JSON produced by the on-chain read service. Their
//! serialized form is exactly what is written to the persistent store, so
//! field names follow the wire format (camelCase) rather than Rust naming.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A hex-encoded account, lock or token contract address (`0x` + 40 hex digits).
pub type Address = String;

/// Ethereum mainnet chain id.
pub const MAINNET: u64 = 1;

/// Staging (rinkeby) chain id.
pub const STAGING: u64 = 4;

/// Local development chain id.
pub const DEV: u64 = 1984;

/// Chain ids the paywall knows how to talk to.
pub const RECOGNIZED_NETWORKS: [u64; 3] = [MAINNET, STAGING, DEV];

/// Returns true if `network` is one of [`RECOGNIZED_NETWORKS`].
#[must_use]
pub fn is_recognized_network(network: u64) -> bool {
    RECOGNIZED_NETWORKS.contains(&network)
}

/// Everything the paywall knows about the chain for the current user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BlockchainData {
    /// Connected account, or `None` when no wallet is connected.
    pub account: Option<Address>,
    /// Account balance as a base-10 numeric string.
    pub balance: String,
    /// Chain id the data was read from.
    pub network: u64,
    /// State of every lock in the paywall, keyed by lock address.
    pub locks: BTreeMap<Address, LockState>,
}

impl BlockchainData {
    /// The unauthenticated, empty value used before any data arrives.
    #[must_use]
    pub fn empty(network: u64) -> Self {
        Self {
            account: None,
            balance: "0".to_string(),
            network,
            locks: BTreeMap::new(),
        }
    }

    /// Returns true if any lock has a key the user can currently use.
    #[must_use]
    pub fn has_valid_key(&self) -> bool {
        self.locks.values().any(|lock| lock.key.status.is_unlocked())
    }
}

/// A membership lock and the user's key on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct LockState {
    /// Lock contract address.
    pub address: Address,
    /// Display name.
    pub name: String,
    /// Key lifetime in seconds.
    pub expiration_duration: u64,
    /// ERC20 token used for payment, `None` for native ether.
    pub currency_contract_address: Option<Address>,
    /// Key price as a numeric string.
    pub key_price: String,
    /// The user's key on this lock.
    pub key: KeyState,
}

/// A user's key on a lock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KeyState {
    /// Current key status.
    pub status: KeyStatus,
    /// Confirmations of the latest purchase transaction.
    pub confirmations: u64,
    /// Unix timestamp (seconds) at which the key expires.
    pub expiration: u64,
    /// Transactions touching this key, most recent first.
    pub transactions: Vec<Transaction>,
    /// Key owner.
    pub owner: Address,
    /// Lock the key belongs to.
    pub lock: Address,
}

/// Status of a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyStatus {
    /// No key has ever been purchased.
    None,
    /// Purchase mined, waiting for confirmations.
    Confirming,
    /// Purchase confirmed.
    Confirmed,
    /// Key has expired.
    Expired,
    /// Key is valid.
    Valid,
    /// Purchase submitted to the wallet.
    Submitted,
    /// Purchase transaction pending.
    Pending,
    /// Purchase failed.
    Failed,
}

impl KeyStatus {
    /// All wire names, in declaration order.
    pub const NAMES: [&'static str; 8] = [
        "none",
        "confirming",
        "confirmed",
        "expired",
        "valid",
        "submitted",
        "pending",
        "failed",
    ];

    /// Returns true if content behind the lock should be shown.
    #[must_use]
    pub fn is_unlocked(self) -> bool {
        matches!(self, Self::Confirming | Self::Confirmed | Self::Valid)
    }
}

/// A transaction related to a key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Transaction {
    /// Transaction status.
    pub status: TransactionStatus,
    /// Confirmations so far.
    pub confirmations: u64,
    /// Transaction hash.
    pub hash: String,
    /// What the transaction does.
    #[serde(rename = "type")]
    pub kind: TransactionType,
    /// Block the transaction was mined in.
    pub block_number: u64,
}

/// Status of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    /// Sent to the wallet.
    Submitted,
    /// In the mempool.
    Pending,
    /// Included in a block.
    Mined,
    /// Dropped from the mempool.
    Stale,
    /// Reverted or rejected.
    Failed,
}

impl TransactionStatus {
    /// All wire names, in declaration order.
    pub const NAMES: [&'static str; 5] = ["submitted", "pending", "mined", "stale", "failed"];
}

/// Kind of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    /// Deploys a lock.
    LockCreation,
    /// Buys a key.
    KeyPurchase,
    /// Withdraws lock funds.
    Withdrawal,
    /// Changes a lock's key price.
    UpdateKeyPrice,
}

impl TransactionType {
    /// All wire names, in declaration order.
    pub const NAMES: [&'static str; 4] = [
        "LOCK_CREATION",
        "KEY_PURCHASE",
        "WITHDRAWAL",
        "UPDATE_KEY_PRICE",
    ];
}

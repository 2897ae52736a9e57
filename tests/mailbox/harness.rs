//! Shared fixtures for mailbox integration tests.
//!
//! [`FaultyStore`] wraps a [`MemoryStore`] and can be told to fail any
//! primitive, which is how a browser's storage misbehaves under quota
//! pressure, privacy modes or tampering.

#![allow(clippy::expect_used, dead_code)]

use parking_lot::Mutex;
use paywall_mailbox::{
    DiagnosticsSink, ExecutionMode, KeyValueStore, Mailbox, MailboxBuilder, MailboxConfig,
    MemoryStore, PaywallConfig, StorageError,
};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

/// Test account address.
pub const ACCOUNT: &str = "0x1234567890123456789012345678901234567890";
/// Lock addresses used by the fixtures.
pub const LOCKS: [&str; 3] = [
    "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa",
    "0xbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb",
    "0xdddddddddddddddddddddddddddddddddddddddd",
];
/// ERC20 token address.
pub const TOKEN: &str = "0xcccccccccccccccccccccccccccccccccccccccc";

/// Store whose primitives can be made to fail on demand.
#[derive(Default)]
pub struct FaultyStore {
    inner: MemoryStore,
    pub fail_get: AtomicBool,
    pub fail_set: AtomicBool,
    pub fail_remove: AtomicBool,
    pub fail_clear: AtomicBool,
    pub remove_stubbed: AtomicBool,
    pub get_calls: AtomicUsize,
    pub set_calls: AtomicUsize,
    pub remove_calls: AtomicUsize,
    pub clear_calls: AtomicUsize,
}

impl FaultyStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// A store that refuses writes from the start.
    pub fn unavailable() -> Arc<Self> {
        let store = Self::default();
        store.fail_set.store(true, Ordering::SeqCst);
        Arc::new(store)
    }

    pub fn fail(flag: &AtomicBool) {
        flag.store(true, Ordering::SeqCst);
    }

    pub fn reset_counters(&self) {
        for counter in [
            &self.get_calls,
            &self.set_calls,
            &self.remove_calls,
            &self.clear_calls,
        ] {
            counter.store(0, Ordering::SeqCst);
        }
    }

    pub fn total_calls(&self) -> usize {
        self.get_calls.load(Ordering::SeqCst)
            + self.set_calls.load(Ordering::SeqCst)
            + self.remove_calls.load(Ordering::SeqCst)
            + self.clear_calls.load(Ordering::SeqCst)
    }

    pub fn calls(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }

    /// Direct access that bypasses fault injection and counters.
    pub fn raw(&self) -> &MemoryStore {
        &self.inner
    }

    fn injected(flag: &AtomicBool, op: &str) -> Result<(), StorageError> {
        if flag.load(Ordering::SeqCst) {
            Err(StorageError::Unavailable(format!("injected {op} failure")))
        } else {
            Ok(())
        }
    }
}

impl KeyValueStore for FaultyStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);
        Self::injected(&self.fail_get, "get")?;
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.set_calls.fetch_add(1, Ordering::SeqCst);
        Self::injected(&self.fail_set, "set")?;
        self.inner.set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.remove_calls.fetch_add(1, Ordering::SeqCst);
        if self.remove_stubbed.load(Ordering::SeqCst) {
            return Ok(());
        }
        Self::injected(&self.fail_remove, "remove")?;
        self.inner.remove(key)
    }

    fn clear(&self) -> Result<(), StorageError> {
        self.clear_calls.fetch_add(1, Ordering::SeqCst);
        Self::injected(&self.fail_clear, "clear")?;
        self.inner.clear()
    }

    fn supports_remove(&self) -> bool {
        !self.remove_stubbed.load(Ordering::SeqCst)
    }
}

/// Diagnostics sink that records every report.
#[derive(Default)]
pub struct RecordingDiagnostics {
    reports: Mutex<Vec<String>>,
}

impl RecordingDiagnostics {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn reports(&self) -> Vec<String> {
        self.reports.lock().clone()
    }
}

impl DiagnosticsSink for RecordingDiagnostics {
    fn report(&self, err: &dyn std::error::Error) {
        self.reports.lock().push(err.to_string());
    }
}

/// A mailbox wired to inspectable test doubles.
pub struct TestMailbox {
    pub mailbox: Mailbox,
    pub store: Arc<FaultyStore>,
    pub diagnostics: Arc<RecordingDiagnostics>,
}

/// Build a mailbox over `store` in `mode`, with caching on and no
/// configuration yet.
pub fn mailbox_with(store: Arc<FaultyStore>, mode: ExecutionMode) -> TestMailbox {
    let diagnostics = RecordingDiagnostics::new();
    let config = MailboxConfig {
        mode,
        default_network: 1984,
        ..MailboxConfig::default()
    };
    let mailbox = MailboxBuilder::new(config)
        .store(store.clone())
        .diagnostics(diagnostics.clone())
        .build()
        .expect("mailbox should build");
    TestMailbox {
        mailbox,
        store,
        diagnostics,
    }
}

/// A production-mode mailbox configured for two locks.
pub fn configured_mailbox() -> TestMailbox {
    configured_mailbox_in(ExecutionMode::Production)
}

/// A mailbox in `mode` configured for two locks.
pub fn configured_mailbox_in(mode: ExecutionMode) -> TestMailbox {
    let mut test = mailbox_with(FaultyStore::new(), mode);
    test.mailbox
        .set_configuration(paywall_config())
        .expect("configuration should be accepted");
    test
}

/// Paywall configuration naming the second and third locks.
pub fn paywall_config() -> PaywallConfig {
    PaywallConfig::from_lock_addresses([LOCKS[1], LOCKS[2]])
}

fn lock(address: &str, status: &str, transactions: Value) -> Value {
    json!({
        "address": address,
        "name": "1",
        "expirationDuration": 5,
        "currencyContractAddress": TOKEN,
        "keyPrice": "1",
        "key": {
            "status": status,
            "confirmations": 1_678_234,
            "expiration": 163_984,
            "transactions": transactions,
            "owner": ACCOUNT,
            "lock": address,
        },
    })
}

/// Valid blockchain data with one lock and no key, one expired key.
pub fn blockchain_data_locked() -> Value {
    json!({
        "account": ACCOUNT,
        "balance": "234",
        "network": 1984,
        "locks": {
            LOCKS[1]: lock(LOCKS[1], "none", json!([])),
            LOCKS[2]: lock(LOCKS[2], "expired", json!([{
                "status": "mined",
                "confirmations": 1_678_234,
                "hash": "hash",
                "type": "KEY_PURCHASE",
                "blockNumber": 123,
            }])),
        },
    })
}

/// Valid blockchain data where the user holds a valid key.
pub fn blockchain_data_unlocked() -> Value {
    let mut data = blockchain_data_locked();
    data["locks"][LOCKS[1]]["key"]["status"] = json!("valid");
    data["locks"][LOCKS[1]]["key"]["expiration"] = json!(4_102_444_800_u64);
    data
}

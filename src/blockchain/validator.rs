//! Shape validation for untrusted blockchain data.
//!
//! Both fresh data from the fetch collaborator and anything read back from the
//! persistent store pass through [`validate`] before the mailbox trusts it.
//! Validation is a chain of small field checks; the first failing check ends
//! the pipeline with a [`ShapeViolation`] naming the reason.

use super::types::{
    is_recognized_network, BlockchainData, KeyStatus, TransactionStatus, TransactionType,
};
use serde_json::{Map, Value};
use thiserror::Error;

const BLOCKCHAIN_DATA_KEYS: &[&str] = &["account", "balance", "locks", "network"];
const LOCK_KEYS: &[&str] = &[
    "address",
    "currencyContractAddress",
    "expirationDuration",
    "key",
    "keyPrice",
    "name",
];
const KEY_KEYS: &[&str] = &[
    "confirmations",
    "expiration",
    "lock",
    "owner",
    "status",
    "transactions",
];
const TRANSACTION_KEYS: &[&str] = &["blockNumber", "confirmations", "hash", "status", "type"];

/// Why a candidate was rejected.
///
/// Offending values are deliberately not echoed back: they come from an
/// attacker-reachable store and may be arbitrarily large.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShapeViolation {
    /// The persisted payload is not JSON at all.
    #[error("cached payload is not valid JSON")]
    Unparseable,

    /// Expected a keyed record.
    #[error("{context} is not a record")]
    NotARecord {
        /// Structure being checked.
        context: &'static str,
    },

    /// The record does not have exactly the expected keys.
    #[error("{context} has the wrong keys (missing: {missing:?}, unexpected: {unexpected:?})")]
    KeySet {
        /// Structure being checked.
        context: &'static str,
        /// Required keys that are absent.
        missing: Vec<String>,
        /// Keys that are not part of the shape.
        unexpected: Vec<String>,
    },

    /// Not a syntactically valid address.
    #[error("{field} is not a valid address")]
    InvalidAddress {
        /// Offending field.
        field: &'static str,
    },

    /// Not a base-10 numeric string.
    #[error("{field} is not a numeric string")]
    InvalidNumericString {
        /// Offending field.
        field: &'static str,
    },

    /// Not a non-negative integer.
    #[error("{field} is not a non-negative integer")]
    InvalidInteger {
        /// Offending field.
        field: &'static str,
    },

    /// Not a string.
    #[error("{field} is not a string")]
    InvalidString {
        /// Offending field.
        field: &'static str,
    },

    /// Not a list.
    #[error("{field} is not a list")]
    NotAList {
        /// Offending field.
        field: &'static str,
    },

    /// Not one of the allowed enumeration values.
    #[error("{field} is not a recognized value")]
    UnknownVariant {
        /// Offending field.
        field: &'static str,
    },

    /// Chain id outside the recognized set.
    #[error("network is not a recognized chain id")]
    UnrecognizedNetwork,

    /// Passed validation but could not be decoded into the typed model.
    #[error("blockchain data could not be decoded: {0}")]
    Malformed(String),
}

/// Returns true if `value` is `0x` followed by exactly 40 hex digits.
#[must_use]
pub fn is_address(value: &str) -> bool {
    value
        .strip_prefix("0x")
        .is_some_and(|digits| digits.len() == 40 && hex::decode(digits).is_ok())
}

/// Returns true if `value` is a base-10 numeric string.
///
/// Accepted: one or more ASCII digits, optionally followed by a `.` and one or
/// more ASCII digits. Signs, exponents, whitespace and hex are rejected.
#[must_use]
pub fn is_numeric_string(value: &str) -> bool {
    let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    match value.split_once('.') {
        Some((whole, fraction)) => all_digits(whole) && all_digits(fraction),
        None => all_digits(value),
    }
}

/// Check `candidate` against the full blockchain data shape.
///
/// # Errors
///
/// Returns the first [`ShapeViolation`] found.
pub fn validate(candidate: &Value) -> Result<(), ShapeViolation> {
    let record = expect_record(candidate, "blockchain data")?;
    expect_exact_keys(record, BLOCKCHAIN_DATA_KEYS, "blockchain data")?;
    check_account(&record["account"])?;
    check_balance(&record["balance"])?;
    check_network(&record["network"])?;
    check_locks(&record["locks"])
}

/// Validate and decode `candidate`.
///
/// # Errors
///
/// Returns a [`ShapeViolation`] if the candidate is rejected.
pub fn parse(candidate: Value) -> Result<BlockchainData, ShapeViolation> {
    validate(&candidate)?;
    serde_json::from_value(candidate).map_err(|e| ShapeViolation::Malformed(e.to_string()))
}

/// The untrusted-input gate: the candidate if it is well formed, otherwise a
/// copy of `default`.
#[must_use]
pub fn sanitize(candidate: Value, default: &BlockchainData) -> BlockchainData {
    parse(candidate).unwrap_or_else(|_| default.clone())
}

fn expect_record<'a>(
    value: &'a Value,
    context: &'static str,
) -> Result<&'a Map<String, Value>, ShapeViolation> {
    value
        .as_object()
        .ok_or(ShapeViolation::NotARecord { context })
}

fn expect_exact_keys(
    record: &Map<String, Value>,
    expected: &[&str],
    context: &'static str,
) -> Result<(), ShapeViolation> {
    let missing: Vec<String> = expected
        .iter()
        .filter(|key| !record.contains_key(**key))
        .map(|key| (*key).to_string())
        .collect();
    let unexpected: Vec<String> = record
        .keys()
        .filter(|key| !expected.contains(&key.as_str()))
        .cloned()
        .collect();

    if missing.is_empty() && unexpected.is_empty() {
        Ok(())
    } else {
        Err(ShapeViolation::KeySet {
            context,
            missing,
            unexpected,
        })
    }
}

fn check_address(value: &Value, field: &'static str) -> Result<(), ShapeViolation> {
    match value.as_str() {
        Some(address) if is_address(address) => Ok(()),
        _ => Err(ShapeViolation::InvalidAddress { field }),
    }
}

fn check_optional_address(value: &Value, field: &'static str) -> Result<(), ShapeViolation> {
    if value.is_null() {
        Ok(())
    } else {
        check_address(value, field)
    }
}

fn check_numeric_string(value: &Value, field: &'static str) -> Result<(), ShapeViolation> {
    match value.as_str() {
        Some(s) if is_numeric_string(s) => Ok(()),
        _ => Err(ShapeViolation::InvalidNumericString { field }),
    }
}

fn check_integer(value: &Value, field: &'static str) -> Result<(), ShapeViolation> {
    value
        .as_u64()
        .map(|_| ())
        .ok_or(ShapeViolation::InvalidInteger { field })
}

fn check_string(value: &Value, field: &'static str) -> Result<(), ShapeViolation> {
    if value.is_string() {
        Ok(())
    } else {
        Err(ShapeViolation::InvalidString { field })
    }
}

fn check_variant(
    value: &Value,
    allowed: &[&str],
    field: &'static str,
) -> Result<(), ShapeViolation> {
    match value.as_str() {
        Some(s) if allowed.contains(&s) => Ok(()),
        _ => Err(ShapeViolation::UnknownVariant { field }),
    }
}

fn check_account(value: &Value) -> Result<(), ShapeViolation> {
    check_optional_address(value, "account")
}

fn check_balance(value: &Value) -> Result<(), ShapeViolation> {
    check_numeric_string(value, "balance")
}

fn check_network(value: &Value) -> Result<(), ShapeViolation> {
    match value.as_u64() {
        Some(network) if is_recognized_network(network) => Ok(()),
        _ => Err(ShapeViolation::UnrecognizedNetwork),
    }
}

fn check_locks(value: &Value) -> Result<(), ShapeViolation> {
    let locks = expect_record(value, "locks")?;
    for (address, lock) in locks {
        if !is_address(address) {
            return Err(ShapeViolation::InvalidAddress { field: "locks" });
        }
        check_lock(lock)?;
    }
    Ok(())
}

fn check_lock(value: &Value) -> Result<(), ShapeViolation> {
    let lock = expect_record(value, "lock")?;
    expect_exact_keys(lock, LOCK_KEYS, "lock")?;
    check_address(&lock["address"], "lock.address")?;
    check_string(&lock["name"], "lock.name")?;
    check_integer(&lock["expirationDuration"], "lock.expirationDuration")?;
    check_optional_address(
        &lock["currencyContractAddress"],
        "lock.currencyContractAddress",
    )?;
    check_numeric_string(&lock["keyPrice"], "lock.keyPrice")?;
    check_key(&lock["key"])
}

fn check_key(value: &Value) -> Result<(), ShapeViolation> {
    let key = expect_record(value, "key")?;
    expect_exact_keys(key, KEY_KEYS, "key")?;
    check_variant(&key["status"], &KeyStatus::NAMES, "key.status")?;
    check_integer(&key["confirmations"], "key.confirmations")?;
    check_integer(&key["expiration"], "key.expiration")?;
    check_address(&key["owner"], "key.owner")?;
    check_address(&key["lock"], "key.lock")?;

    let transactions = key["transactions"]
        .as_array()
        .ok_or(ShapeViolation::NotAList {
            field: "key.transactions",
        })?;
    transactions.iter().try_for_each(check_transaction)
}

fn check_transaction(value: &Value) -> Result<(), ShapeViolation> {
    let tx = expect_record(value, "transaction")?;
    expect_exact_keys(tx, TRANSACTION_KEYS, "transaction")?;
    check_variant(
        &tx["status"],
        &TransactionStatus::NAMES,
        "transaction.status",
    )?;
    check_integer(&tx["confirmations"], "transaction.confirmations")?;
    check_string(&tx["hash"], "transaction.hash")?;
    check_variant(&tx["type"], &TransactionType::NAMES, "transaction.type")?;
    check_integer(&tx["blockNumber"], "transaction.blockNumber")
}

//! Storage key derivation.

use crate::paywall::PaywallConfig;
use sha2::{Digest, Sha256};

/// Prefix shared by every key this crate writes.
pub const CACHE_KEY_PREFIX: &str = "unlock-paywall-cache/";

/// Derive the storage key for `configuration`.
///
/// The key depends only on the set of lock addresses: order, letter case and
/// duplicates do not matter. Returns `None` when there is no configuration,
/// in which case no cache operation may touch storage.
#[must_use]
pub fn cache_key(configuration: Option<&PaywallConfig>) -> Option<String> {
    let configuration = configuration?;

    let mut locks: Vec<String> = configuration
        .lock_addresses()
        .map(str::to_ascii_lowercase)
        .collect();
    locks.sort_unstable();
    locks.dedup();

    let digest = Sha256::digest(locks.join(",").as_bytes());
    Some(format!("{CACHE_KEY_PREFIX}{}", hex::encode(digest)))
}

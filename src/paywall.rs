//! Paywall configuration delivered by the host page.

use crate::blockchain::is_address;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Configuration of one paywall instance.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaywallConfig {
    /// Locks guarding the content, keyed by lock address.
    pub locks: BTreeMap<String, LockConfig>,

    /// Messages shown for each key state.
    #[serde(default)]
    pub call_to_action: CallToAction,
}

/// Per-lock settings.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LockConfig {
    /// Display name override.
    #[serde(default)]
    pub name: String,
}

/// Call-to-action messages.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallToAction {
    /// Shown when the user has no key.
    #[serde(default)]
    pub default: String,
    /// Shown while a purchase is pending.
    #[serde(default)]
    pub pending: String,
    /// Shown when the key has expired.
    #[serde(default)]
    pub expired: String,
    /// Shown once the purchase is confirmed.
    #[serde(default)]
    pub confirmed: String,
    /// Shown when no wallet is available.
    #[serde(default)]
    pub no_wallet: String,
}

impl PaywallConfig {
    /// Build a configuration naming only `addresses`.
    #[must_use]
    pub fn from_lock_addresses<I, S>(addresses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            locks: addresses
                .into_iter()
                .map(|address| (address.into(), LockConfig::default()))
                .collect(),
            call_to_action: CallToAction::default(),
        }
    }

    /// Parse a configuration from its JSON wire form and validate it.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON does not parse or the configuration is
    /// invalid.
    pub fn from_json(json: &str) -> crate::Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Lock addresses named by this configuration.
    pub fn lock_addresses(&self) -> impl Iterator<Item = &str> {
        self.locks.keys().map(String::as_str)
    }

    /// Check the configuration can scope a cache.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPaywallConfig`](crate::Error::InvalidPaywallConfig)
    /// if there are no locks or a lock key is not an address.
    pub fn validate(&self) -> crate::Result<()> {
        if self.locks.is_empty() {
            return Err(crate::Error::InvalidPaywallConfig(
                "no locks configured".to_string(),
            ));
        }
        if let Some(bad) = self.lock_addresses().find(|address| !is_address(address)) {
            return Err(crate::Error::InvalidPaywallConfig(format!(
                "lock key is not an address: {bad}"
            )));
        }
        Ok(())
    }
}

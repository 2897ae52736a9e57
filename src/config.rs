//! Configuration for paywall-mailbox.

use crate::blockchain::{is_recognized_network, MAINNET};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Execution environment of the embedding page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ExecutionMode {
    /// Local development; diagnostics are reported.
    #[serde(rename = "dev")]
    Development,
    /// Automated tests.
    #[serde(rename = "test")]
    Test,
    /// Staging deployment.
    #[serde(rename = "staging")]
    Staging,
    /// Production deployment.
    #[default]
    #[serde(rename = "prod")]
    Production,
}

impl ExecutionMode {
    /// Returns true if diagnostics should be reported.
    #[must_use]
    pub fn is_development(self) -> bool {
        matches!(self, Self::Development)
    }
}

/// Mailbox configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailboxConfig {
    /// Persist blockchain data between reloads.
    #[serde(default = "default_use_local_storage_cache")]
    pub use_local_storage_cache: bool,

    /// Execution environment.
    #[serde(default)]
    pub mode: ExecutionMode,

    /// Chain id reported before any data has been read.
    #[serde(default = "default_network")]
    pub default_network: u64,

    /// Persistent store configuration.
    #[serde(default)]
    pub store: StoreConfig,

    /// Log level.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Persistent store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Path of the JSON store file.
    #[serde(default = "default_store_path")]
    pub path: PathBuf,
}

impl Default for MailboxConfig {
    fn default() -> Self {
        Self {
            use_local_storage_cache: default_use_local_storage_cache(),
            mode: ExecutionMode::default(),
            default_network: default_network(),
            store: StoreConfig::default(),
            log_level: default_log_level(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
        }
    }
}

const fn default_use_local_storage_cache() -> bool {
    true
}

const fn default_network() -> u64 {
    MAINNET
}

fn default_store_path() -> PathBuf {
    directories::ProjectDirs::from("", "", "unlock-paywall")
        .map(|dirs| dirs.data_dir().join("mailbox.json"))
        .unwrap_or_else(|| PathBuf::from(".unlock-paywall/mailbox.json"))
}

fn default_log_level() -> String {
    "info".to_string()
}

impl MailboxConfig {
    /// Check values that serde cannot.
    ///
    /// # Errors
    ///
    /// Returns an error if `default_network` is not a recognized chain id.
    pub fn validate(&self) -> crate::Result<()> {
        if !is_recognized_network(self.default_network) {
            return Err(crate::Error::Config(format!(
                "unrecognized default network: {}",
                self.default_network
            )));
        }
        Ok(())
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or fails
    /// [`validate`](Self::validate).
    pub fn from_file(path: &std::path::Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self =
            toml::from_str(&content).map_err(|e| crate::Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn to_file(&self, path: &std::path::Path) -> crate::Result<()> {
        let content =
            toml::to_string_pretty(self).map_err(|e| crate::Error::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

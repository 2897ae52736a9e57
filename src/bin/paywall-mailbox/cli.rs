//! Command-line interface definition.

use clap::{Parser, Subcommand, ValueEnum};
use paywall_mailbox::{ExecutionMode, MailboxConfig};
use std::path::PathBuf;

/// Inspect and maintain the paywall blockchain data cache.
#[derive(Parser, Debug)]
#[command(name = "paywall-mailbox")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the store file.
    #[arg(long, global = true, env = "PAYWALL_MAILBOX_STORE")]
    pub store: Option<PathBuf>,

    /// Execution environment.
    #[arg(long, value_enum, global = true, env = "UNLOCK_ENV")]
    pub mode: Option<CliMode>,

    /// Disable the persistent cache.
    #[arg(long, global = true)]
    pub no_cache: bool,

    /// Log level, overriding the config file.
    #[arg(long, global = true, env = "RUST_LOG")]
    pub log_level: Option<String>,

    /// Path to configuration file.
    #[arg(long, short, global = true)]
    pub config: Option<PathBuf>,

    /// Command to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Print the cache key for a set of locks.
    Key {
        /// Lock addresses of the paywall.
        #[arg(long = "lock", required = true)]
        locks: Vec<String>,
    },
    /// Print the validated cached data for a set of locks.
    Show {
        /// Lock addresses of the paywall.
        #[arg(long = "lock", required = true)]
        locks: Vec<String>,
    },
    /// Remove the cached data for a set of locks.
    Invalidate {
        /// Lock addresses of the paywall.
        #[arg(long = "lock", required = true)]
        locks: Vec<String>,
    },
    /// Check a JSON file against the blockchain data shape.
    Validate {
        /// File to check.
        file: PathBuf,
    },
}

/// Execution mode CLI enum.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum CliMode {
    /// Development.
    Dev,
    /// Automated tests.
    Test,
    /// Staging.
    Staging,
    /// Production.
    Prod,
}

impl Cli {
    /// Convert CLI arguments into a `MailboxConfig`.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file is specified but cannot be loaded.
    pub fn into_config(self) -> color_eyre::Result<MailboxConfig> {
        // Start with default config or load from file
        let mut config = if let Some(ref path) = self.config {
            MailboxConfig::from_file(path)?
        } else {
            MailboxConfig::default()
        };

        // Override with CLI arguments
        if let Some(store) = self.store {
            config.store.path = store;
        }
        if let Some(mode) = self.mode {
            config.mode = mode.into();
        }
        if self.no_cache {
            config.use_local_storage_cache = false;
        }
        if let Some(log_level) = self.log_level {
            config.log_level = log_level;
        }

        Ok(config)
    }
}

impl From<CliMode> for ExecutionMode {
    fn from(m: CliMode) -> Self {
        match m {
            CliMode::Dev => ExecutionMode::Development,
            CliMode::Test => ExecutionMode::Test,
            CliMode::Staging => ExecutionMode::Staging,
            CliMode::Prod => ExecutionMode::Production,
        }
    }
}

//! paywall-mailbox CLI entry point.

mod cli;

use clap::Parser;
use cli::{Cli, Command};
use color_eyre::eyre::{bail, eyre};
use paywall_mailbox::{validate, CacheLoad, Invalidation, MailboxBuilder, PaywallConfig};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() -> color_eyre::Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    // Parse CLI arguments
    let cli = Cli::parse();
    let command = cli.command.clone();
    let config = cli.into_config()?;

    // Initialize tracing
    let filter = EnvFilter::new(&config.log_level);

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    info!("paywall-mailbox v{}", env!("CARGO_PKG_VERSION"));

    match command {
        Command::Validate { file } => {
            let content = std::fs::read_to_string(&file)?;
            let candidate: serde_json::Value = serde_json::from_str(&content)?;
            match validate(&candidate) {
                Ok(()) => println!("valid"),
                Err(violation) => bail!("invalid blockchain data: {violation}"),
            }
        }
        Command::Key { locks } => {
            let mut mailbox = MailboxBuilder::new(config).build()?;
            mailbox.set_configuration(PaywallConfig::from_lock_addresses(locks))?;
            let key = mailbox
                .get_cache_key()
                .ok_or_else(|| eyre!("no cache key for this configuration"))?;
            println!("{key}");
        }
        Command::Show { locks } => {
            let mut mailbox = MailboxBuilder::new(config).build()?;
            mailbox.set_configuration(PaywallConfig::from_lock_addresses(locks))?;
            match mailbox.load_cache() {
                CacheLoad::Hit(data) => println!("{}", serde_json::to_string_pretty(&data)?),
                CacheLoad::Miss => println!("no cached data"),
                CacheLoad::Disabled => println!("cache disabled or store unavailable"),
                CacheLoad::Rejected(violation) => {
                    println!("cached data rejected and removed: {violation}");
                }
                CacheLoad::Unavailable(Invalidation::Cleared) => {
                    println!("store unreadable; cleared");
                }
                CacheLoad::Unavailable(_) => bail!("store unreadable and could not be cleared"),
            }
        }
        Command::Invalidate { locks } => {
            let mut mailbox = MailboxBuilder::new(config).build()?;
            mailbox.set_configuration(PaywallConfig::from_lock_addresses(locks))?;
            match mailbox.invalidate_local_storage_cache() {
                Invalidation::Removed => println!("cache entry removed"),
                Invalidation::Cleared => println!("removal failed; store cleared"),
                Invalidation::Skipped => println!("nothing to do"),
                Invalidation::Failed => bail!("store could not be cleared"),
            }
        }
    }

    Ok(())
}

//! tiercache - Operator CLI
//!
//! Runs single cache operations against the tiers described by the
//! configuration (file, then `TIERCACHE_*` environment variables) and
//! prints the result as JSON.
//!
//! | Command | Description |
//! |---------|-------------|
//! | `ping` | Ping both tiers |
//! | `get <key>` | Read a value |
//! | `set <key> <value> [--ttl-secs N]` | Write a value (0 = no expiration) |
//! | `delete <key>` | Remove a value from both tiers |
//! | `ttl <key>` | Remaining lifetime of a value |
//! | `health` | Per-tier health report |
//! | `providers` | Registered backends |

// Force-link tiercache-providers to ensure linkme registrations are included
extern crate tiercache_providers;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::{Value, json};
use std::path::PathBuf;
use std::time::Duration;
use tiercache::domain::registry::list_cache_providers;
use tiercache::infrastructure::logging::init_logging;
use tiercache::{Cache, CacheManager, ConfigLoader, KeyTtl, build_cache_manager};

/// Command line interface for tiercache
#[derive(Parser, Debug)]
#[command(name = "tiercache")]
#[command(about = "Two-tier cache operator tool")]
#[command(version)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Emit logs using the configured logging settings
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Operations
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Ping both tiers
    Ping,
    /// Read a value
    Get {
        /// Logical key
        key: String,
    },
    /// Write a value
    Set {
        /// Logical key
        key: String,
        /// Value, stored as UTF-8 bytes
        value: String,
        /// Time to live in seconds, 0 for no expiration
        #[arg(long, default_value_t = 0)]
        ttl_secs: u64,
    },
    /// Remove a value from both tiers
    Delete {
        /// Logical key
        key: String,
    },
    /// Show the remaining lifetime of a value
    Ttl {
        /// Logical key
        key: String,
    },
    /// Probe both tiers and print a health report
    Health,
    /// List registered backends
    Providers,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Command::Providers = cli.command {
        return print(&providers());
    }

    let mut loader = ConfigLoader::new();
    if let Some(path) = &cli.config {
        loader = loader.with_config_path(path);
    }
    let config = loader.load().context("Failed to load configuration")?;
    if cli.verbose {
        init_logging(&config.logging).context("Failed to initialize logging")?;
    }

    let manager = build_cache_manager(&config).context("Failed to build cache manager")?;
    let outcome = execute(&manager, cli.command).await;
    manager.close().await.context("Failed to close cache tiers")?;

    print(&outcome?)
}

async fn execute(manager: &CacheManager, command: Command) -> Result<Value> {
    let output = match command {
        Command::Ping => {
            manager.ping().await.context("Ping failed")?;
            json!({ "status": "ok" })
        }
        Command::Get { key } => {
            let bytes = manager
                .get(&key)
                .await
                .with_context(|| format!("Failed to get '{key}'"))?;
            json!({ "key": key, "value": render(&bytes) })
        }
        Command::Set {
            key,
            value,
            ttl_secs,
        } => {
            let ttl = Duration::from_secs(ttl_secs);
            manager
                .set(&key, value.into_bytes(), ttl)
                .await
                .with_context(|| format!("Failed to set '{key}'"))?;
            json!({ "key": key, "stored": true, "ttl": KeyTtl::from_ttl(ttl) })
        }
        Command::Delete { key } => {
            manager
                .delete(&key)
                .await
                .with_context(|| format!("Failed to delete '{key}'"))?;
            json!({ "key": key, "deleted": true })
        }
        Command::Ttl { key } => {
            let ttl = manager
                .get_ttl(&key)
                .await
                .with_context(|| format!("Failed to read TTL of '{key}'"))?;
            json!({ "key": key, "ttl": ttl })
        }
        Command::Health => serde_json::to_value(manager.health().await)?,
        Command::Providers => providers(),
    };
    Ok(output)
}

fn providers() -> Value {
    Value::Array(
        list_cache_providers()
            .into_iter()
            .map(|(name, description)| json!({ "name": name, "description": description }))
            .collect(),
    )
}

/// Show JSON payloads as JSON and anything else as text
fn render(bytes: &[u8]) -> Value {
    serde_json::from_slice(bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(bytes).into_owned()))
}

fn print(value: &Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

//! CLI module: Clap argument parser, output helpers, and command implementations.

pub mod commands;
pub mod output;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::config::Settings;
use crate::crypto::keyfile;
use crate::errors::Result;
use crate::index::IndexTokenizer;
use crate::store::{Provider, Store};

/// edvault CLI: key/value storage in an encrypted data vault.
#[derive(Parser)]
#[command(
    name = "edvault",
    about = "Key/value storage in an encrypted data vault",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Logical store to operate on (default: from .edvault.toml, else "default")
    #[arg(short, long, global = true)]
    pub store: Option<String>,

    /// Base URL of the vault server
    #[arg(long, env = "EDVAULT_URL", global = true)]
    pub vault_url: Option<String>,

    /// Vault identifier on the server
    #[arg(long, env = "EDVAULT_VAULT_ID", global = true)]
    pub vault_id: Option<String>,

    /// Path to the index keyfile (default: .edvault/index.key)
    #[arg(long, global = true)]
    pub key_file: Option<String>,

    /// Log every vault request to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// All available subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Generate a new random index keyfile
    Keygen {
        /// Path for the keyfile (default: configured key_file)
        path: Option<String>,
    },

    /// Store an encrypted document under a key (create or replace)
    Put {
        /// Key to store the document under
        key: String,
        /// File holding the encrypted document JSON (reads stdin if omitted)
        #[arg(short, long)]
        file: Option<String>,
    },

    /// Print the encrypted document stored under a key
    Get {
        /// Key to look up
        key: String,
    },

    /// Delete the document stored under a key
    Delete {
        /// Key to delete
        key: String,
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },

    /// List every document in the store
    List,

    /// Print the blind index value the vault sees for a key
    Token {
        /// Key to compute the index value for
        key: String,
    },
}

// ---------------------------------------------------------------------------
// Shared helpers used by multiple commands
// ---------------------------------------------------------------------------

/// Install the stderr log subscriber.
///
/// `RUST_LOG` wins when set; otherwise warnings only, or debug output for
/// this crate with `--verbose`.
pub fn init_logging(verbose: bool) {
    let fallback = if verbose { "edvault=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// The directory `.edvault.toml` and relative paths are resolved against.
pub fn project_dir() -> Result<PathBuf> {
    Ok(std::env::current_dir()?)
}

/// Settings from `.edvault.toml`, with command-line overrides applied.
pub fn load_settings(cli: &Cli, project_dir: &Path) -> Result<Settings> {
    let mut settings = Settings::load(project_dir)?;
    if let Some(ref url) = cli.vault_url {
        settings.vault_url = Some(url.clone());
    }
    if let Some(ref id) = cli.vault_id {
        settings.vault_id = Some(id.clone());
    }
    if let Some(ref path) = cli.key_file {
        settings.key_file = path.clone();
    }
    Ok(settings)
}

/// Name of the store the command operates on.
pub fn store_name(cli: &Cli, settings: &Settings) -> String {
    cli.store
        .clone()
        .unwrap_or_else(|| settings.default_store.clone())
}

/// Tokenizer over the configured keying material.
pub fn tokenizer(settings: &Settings, project_dir: &Path) -> Result<IndexTokenizer> {
    let key = keyfile::resolve_key(&settings.key_file_path(project_dir))?;
    let mac = keyfile::index_mac(&key)?;
    Ok(IndexTokenizer::new(Arc::new(mac)))
}

/// Build the provider and open the selected store.
pub fn open_store(cli: &Cli) -> Result<(Provider, Store)> {
    let dir = project_dir()?;
    let settings = load_settings(cli, &dir)?;
    let config = settings.vault_config(&dir)?;

    let key = keyfile::resolve_key(&settings.key_file_path(&dir))?;
    let mac = keyfile::index_mac(&key)?;

    let provider = Provider::new(config, Arc::new(mac))?;
    let store = provider.open_store(&store_name(cli, &settings))?;
    Ok((provider, store))
}

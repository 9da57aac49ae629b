//! Provider: configuration owner and store factory.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tracing::debug;

use super::locks::WriteLocks;
use super::store::Store;
use crate::edv::{HttpTransport, TlsSettings, VaultClient, VaultTransport};
use crate::errors::{EdvError, Result};
use crate::index::{IndexNames, IndexTokenizer, MacPrimitive};

/// Default request timeout for the HTTP transport.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Where the vault lives and how to reach it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VaultConfig {
    /// Base URL of the vault server, e.g. `https://edv.example.com/encrypted-data-vaults`.
    pub base_url: String,

    /// Identifier of the vault on that server.
    pub vault_id: String,

    pub tls: TlsSettings,

    pub timeout: Duration,
}

impl VaultConfig {
    pub fn new(base_url: &str, vault_id: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            vault_id: vault_id.to_string(),
            tls: TlsSettings::default(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_tls(mut self, tls: TlsSettings) -> Self {
        self.tls = tls;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Opens [`Store`]s on one vault.
///
/// Configuration and keying material are fixed at construction. Opening a
/// store makes no network call. The provider holds no connections, so
/// closing is bookkeeping only.
pub struct Provider {
    config: VaultConfig,
    tokenizer: IndexTokenizer,
    names: IndexNames,
    client: VaultClient,
    locks: Arc<WriteLocks>,
    open: Mutex<HashSet<String>>,
}

impl Provider {
    /// Build a provider that talks to the vault over HTTP.
    pub fn new(config: VaultConfig, mac: Arc<dyn MacPrimitive>) -> Result<Self> {
        let transport = HttpTransport::new(&config.base_url, &config.tls, config.timeout)?;
        Self::with_transport(config, mac, Arc::new(transport))
    }

    /// Build a provider on a caller-supplied transport.
    ///
    /// Fails if the index attribute names cannot be computed, which means
    /// the MAC primitive is unusable.
    pub fn with_transport(
        config: VaultConfig,
        mac: Arc<dyn MacPrimitive>,
        transport: Arc<dyn VaultTransport>,
    ) -> Result<Self> {
        let tokenizer = IndexTokenizer::new(mac);
        let names = tokenizer.index_names()?;
        let client = VaultClient::new(&config.base_url, &config.vault_id, transport);

        Ok(Self {
            config,
            tokenizer,
            names,
            client,
            locks: Arc::new(WriteLocks::new()),
            open: Mutex::new(HashSet::new()),
        })
    }

    pub fn config(&self) -> &VaultConfig {
        &self.config
    }

    /// Open the logical store `name`.
    pub fn open_store(&self, name: &str) -> Result<Store> {
        if name.is_empty() {
            return Err(EdvError::Config("store name cannot be empty".into()));
        }

        self.open
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.to_string());
        debug!(store = name, vault = %self.config.vault_id, "opened store");

        Ok(Store::new(
            name,
            self.names.clone(),
            self.tokenizer.clone(),
            self.client.clone(),
            Arc::clone(&self.locks),
        ))
    }

    /// Forget the store `name`. Unknown or already closed names are fine.
    pub fn close_store(&self, name: &str) -> Result<()> {
        let removed = self
            .open
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(name);
        if removed {
            debug!(store = name, "closed store");
        }
        Ok(())
    }

    /// Forget every store. Safe to call repeatedly.
    pub fn close(&self) -> Result<()> {
        self.open
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        Ok(())
    }

    /// Names of the stores currently open, sorted.
    pub fn open_stores(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .open
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .cloned()
            .collect();
        names.sort();
        names
    }
}

impl std::fmt::Debug for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Provider")
            .field("config", &self.config)
            .field("open", &self.open_stores())
            .finish_non_exhaustive()
    }
}

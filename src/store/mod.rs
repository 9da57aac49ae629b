//! Store module: key/value semantics on top of the vault.
//!
//! This module provides:
//! - `KeyValueStore` and its vault-backed `Store` (`store`)
//! - `DocumentIterator`, the cursor returned by `Store::iterator` (`iterator`)
//! - `Provider` and `VaultConfig` for opening stores (`provider`)
//! - Per-key write serialization shared by a provider's stores (`locks`)

pub mod iterator;
pub mod locks;
pub mod provider;
#[allow(clippy::module_inception)]
pub mod store;

pub use iterator::DocumentIterator;
pub use provider::{Provider, VaultConfig, DEFAULT_TIMEOUT};
pub use store::{KeyValueStore, Store};

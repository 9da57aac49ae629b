//! Vault Wire Client: talking to the encrypted data vault.
//!
//! This module provides:
//! - Encrypted document and query wire models (`models`)
//! - The pluggable request/response transport and its HTTP implementation (`transport`)
//! - `VaultClient`, one method per vault operation (`client`)

pub mod client;
pub mod models;
pub mod transport;

pub use client::VaultClient;
pub use models::{EncryptedDocument, IndexedAttribute, IndexedAttributeCollection, Query};
pub use transport::{
    HttpTransport, Method, TlsSettings, TlsVersion, VaultRequest, VaultResponse, VaultTransport,
};

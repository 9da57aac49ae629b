//! Vault Wire Client.
//!
//! One method per vault operation, one round trip per call, no retries.
//! Non-success statuses become [`EdvError::VaultResponse`] with the status
//! and body preserved; transport failures pass through as
//! [`EdvError::Transport`].
//!
//! Endpoints (relative to the vault base URL):
//!
//! ```text
//! POST   {base}/{vault}/documents        create   -> 201 + Location
//! POST   {base}/{vault}/query            query    -> 200 + ["location", ...]
//! GET    {base}/{vault}/documents/{id}   read     -> 200 + document
//! PUT    {base}/{vault}/documents/{id}   update   -> 200
//! DELETE {base}/{vault}/documents/{id}   delete   -> 200
//! ```

use std::sync::Arc;

use tracing::debug;

use super::models::{EncryptedDocument, Query};
use super::transport::{Method, VaultRequest, VaultResponse, VaultTransport};
use crate::errors::{EdvError, Result};

/// Client for a single vault.
#[derive(Clone)]
pub struct VaultClient {
    base_url: String,
    vault_id: String,
    transport: Arc<dyn VaultTransport>,
}

impl VaultClient {
    pub fn new(base_url: &str, vault_id: &str, transport: Arc<dyn VaultTransport>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            vault_id: vault_id.to_string(),
            transport,
        }
    }

    pub fn vault_id(&self) -> &str {
        &self.vault_id
    }

    /// Store a new document. Returns the location the vault assigned.
    pub fn create_document(&self, document: &EncryptedDocument) -> Result<String> {
        self.create_document_raw(document.to_vec()?)
    }

    /// Store a new document from already-encoded bytes.
    pub fn create_document_raw(&self, body: Vec<u8>) -> Result<String> {
        let url = format!("{}/{}/documents", self.base_url, self.vault_id);
        let response = self.round_trip(Method::Post, url, Some(body))?;
        expect_status(&response, &[201])?;
        response.location.ok_or(EdvError::MissingLocation)
    }

    /// Locations of every document carrying the attribute `name = value`.
    pub fn query_vault(&self, name: &str, value: &str) -> Result<Vec<String>> {
        let url = format!("{}/{}/query", self.base_url, self.vault_id);
        let query = Query {
            name: name.to_string(),
            value: value.to_string(),
        };
        let body = serde_json::to_vec(&query).map_err(EdvError::Marshal)?;

        let response = self.round_trip(Method::Post, url, Some(body))?;
        expect_status(&response, &[200])?;
        serde_json::from_slice(&response.body).map_err(EdvError::Unmarshal)
    }

    /// Raw bytes of the document at `location`.
    pub fn read_document(&self, location: &str) -> Result<Vec<u8>> {
        let response = self.round_trip(Method::Get, self.document_url(location), None)?;
        expect_status(&response, &[200])?;
        Ok(response.body)
    }

    /// Replace the document at `location`.
    pub fn update_document(&self, location: &str, document: &EncryptedDocument) -> Result<()> {
        self.update_document_raw(location, document.to_vec()?)
    }

    /// Replace the document at `location` with already-encoded bytes.
    pub fn update_document_raw(&self, location: &str, body: Vec<u8>) -> Result<()> {
        let response = self.round_trip(Method::Put, self.document_url(location), Some(body))?;
        expect_status(&response, &[200, 204])
    }

    /// Remove the document at `location`.
    pub fn delete_document(&self, location: &str) -> Result<()> {
        let response = self.round_trip(Method::Delete, self.document_url(location), None)?;
        expect_status(&response, &[200, 204])
    }

    /// Resolve a location returned by the vault to this vault's document URL.
    ///
    /// Query results may be absolute URLs on another host or bare ids; only
    /// the final path segment is trusted.
    pub fn document_url(&self, location: &str) -> String {
        format!(
            "{}/{}/documents/{}",
            self.base_url,
            self.vault_id,
            document_id(location)
        )
    }

    fn round_trip(&self, method: Method, url: String, body: Option<Vec<u8>>) -> Result<VaultResponse> {
        let response = self.transport.send(VaultRequest {
            method,
            url: url.clone(),
            body,
        })?;
        debug!(%method, %url, status = response.status, "vault request");
        Ok(response)
    }
}

impl std::fmt::Debug for VaultClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VaultClient")
            .field("base_url", &self.base_url)
            .field("vault_id", &self.vault_id)
            .finish_non_exhaustive()
    }
}

/// The document id at the end of a location (URL or bare id).
pub fn document_id(location: &str) -> &str {
    let trimmed = location.trim_end_matches('/');
    trimmed.rsplit('/').next().unwrap_or(trimmed)
}

fn expect_status(response: &VaultResponse, accepted: &[u16]) -> Result<()> {
    if accepted.contains(&response.status) {
        Ok(())
    } else {
        Err(EdvError::VaultResponse {
            status: response.status,
            body: response.body_text(),
        })
    }
}

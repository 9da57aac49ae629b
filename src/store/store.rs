//! Store Adapter: key/value operations over vault queries.
//!
//! The vault has no "get by key". Every operation first turns the key into
//! its blind index token, queries the vault for documents carrying that
//! token, and then acts on the zero, one or many locations it gets back.
//! Nothing is cached between calls.

use std::sync::Arc;

use tracing::{debug, warn};

use super::iterator::DocumentIterator;
use super::locks::WriteLocks;
use crate::edv::client::document_id;
use crate::edv::{EncryptedDocument, IndexedAttribute, IndexedAttributeCollection, VaultClient};
use crate::errors::{EdvError, Result, ResultExt};
use crate::index::{IndexNames, IndexTokenizer};

/// Caller-facing key/value contract.
pub trait KeyValueStore {
    /// Create or replace the document stored under `key`. `value` must be
    /// an encrypted document in its JSON form.
    fn put(&self, key: &str, value: &[u8]) -> Result<()>;

    /// Raw bytes of the document stored under `key`.
    fn get(&self, key: &str) -> Result<Vec<u8>>;

    /// Remove the document stored under `key`.
    fn delete(&self, key: &str) -> Result<()>;

    /// Every document of the store. The bounds are accepted for parity
    /// with ordered stores but do not filter: blind index tokens carry no
    /// order to compare against.
    fn iterator(&self, start_key: &str, end_key: &str) -> DocumentIterator;
}

/// Handle on one logical store inside a vault.
///
/// Created by [`Provider::open_store`](super::Provider::open_store). Holds
/// configuration only; cloning is cheap.
#[derive(Debug, Clone)]
pub struct Store {
    name: String,
    names: IndexNames,
    tokenizer: IndexTokenizer,
    client: VaultClient,
    locks: Arc<WriteLocks>,
}

impl Store {
    pub(crate) fn new(
        name: &str,
        names: IndexNames,
        tokenizer: IndexTokenizer,
        client: VaultClient,
        locks: Arc<WriteLocks>,
    ) -> Self {
        Self {
            name: name.to_string(),
            names,
            tokenizer,
            client,
            locks,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Encoded blind index value the vault sees for `key` in this store.
    pub fn key_token(&self, key: &str) -> Result<String> {
        validate_key(key)?;
        self.tokenizer.encoded_token(&self.name, key)
    }

    /// Locations of all documents indexed under `key_token`.
    fn query_key(&self, key_token: &str) -> Result<Vec<String>> {
        self.client
            .query_vault(&self.names.key, key_token)
            .context(EdvError::QueryVault)
    }

    /// Resolve `key_token` to exactly one location.
    fn locate(&self, key_token: &str) -> Result<String> {
        let mut matches = self.query_key(key_token)?;
        match matches.len() {
            0 => Err(EdvError::NotFound),
            1 => Ok(matches.remove(0)),
            count => {
                warn!(store = %self.name, count, "multiple documents share one key index");
                Err(EdvError::AmbiguousKey { count })
            }
        }
    }

    /// Bytes to send for `document`, with this store's index attributes.
    ///
    /// A document that already carries exactly these attributes is sent as
    /// the caller supplied it.
    fn indexed_body(
        &self,
        mut document: EncryptedDocument,
        raw: &[u8],
        key_token: &str,
    ) -> Result<Vec<u8>> {
        let store_token = self.tokenizer.scope_token(&self.name)?.encode();

        let ours = |a: &IndexedAttribute| a.name == self.names.store || a.name == self.names.key;
        let foreign = document
            .indexed_attribute_collections
            .iter()
            .flat_map(|c| &c.indexed_attributes)
            .filter(|a| ours(a))
            .any(|a| a.value != store_token && a.value != key_token);

        if !foreign
            && document.has_attribute(&self.names.store, &store_token)
            && document.has_attribute(&self.names.key, key_token)
        {
            return Ok(raw.to_vec());
        }

        for collection in &mut document.indexed_attribute_collections {
            collection.indexed_attributes.retain(|a| !ours(a));
        }
        document
            .indexed_attribute_collections
            .retain(|c| !c.indexed_attributes.is_empty());

        document
            .indexed_attribute_collections
            .push(IndexedAttributeCollection {
                sequence: 0,
                indexed_attributes: vec![
                    IndexedAttribute {
                        name: self.names.store.clone(),
                        value: store_token,
                        unique: false,
                    },
                    IndexedAttribute {
                        name: self.names.key.clone(),
                        value: key_token.to_string(),
                        unique: true,
                    },
                ],
            });

        document.to_vec()
    }

    fn read_all(&self) -> Result<Vec<(String, Vec<u8>)>> {
        let store_token = self
            .tokenizer
            .scope_token(&self.name)
            .context(EdvError::ListDocuments)?;

        let locations = self
            .client
            .query_vault(&self.names.store, &store_token.encode())
            .context(EdvError::QueryVault)
            .context(EdvError::ListDocuments)?;

        debug!(store = %self.name, count = locations.len(), "reading all documents");

        locations
            .iter()
            .map(|location| {
                let bytes = self
                    .client
                    .read_document(location)
                    .context(EdvError::RetrieveDocument)
                    .context(EdvError::ReadAllDocuments)?;
                let document =
                    EncryptedDocument::from_slice(&bytes).context(EdvError::ReadAllDocuments)?;

                let key = if document.id.is_empty() {
                    document_id(location).to_string()
                } else {
                    document.id
                };
                Ok((key, bytes))
            })
            .collect()
    }
}

impl KeyValueStore for Store {
    fn put(&self, key: &str, value: &[u8]) -> Result<()> {
        validate_key(key)?;

        let document = EncryptedDocument::from_slice(value).context(EdvError::StoreDocument)?;

        let key_token = self
            .tokenizer
            .encoded_token(&self.name, key)
            .context(EdvError::CheckExisting)?;

        let _guard = self.locks.lock(&key_token);

        let mut matches = self
            .query_key(&key_token)
            .context(EdvError::CheckExisting)?;
        if matches.len() > 1 {
            warn!(store = %self.name, count = matches.len(), "refusing to pick one of several documents");
            return Err(EdvError::AmbiguousKey {
                count: matches.len(),
            }
            .wrap(EdvError::CheckExisting));
        }

        let body = self
            .indexed_body(document, value, &key_token)
            .context(EdvError::IndexedAttributes)
            .context(EdvError::StoreDocument)?;

        match matches.pop() {
            None => {
                let location = self
                    .client
                    .create_document_raw(body)
                    .context(EdvError::CreateDocument)
                    .context(EdvError::StoreDocument)?;
                debug!(store = %self.name, %location, "created document");
            }
            Some(location) => {
                self.client
                    .update_document_raw(&location, body)
                    .context(EdvError::UpdateDocument)
                    .context(EdvError::StoreDocument)?;
                debug!(store = %self.name, %location, "updated document");
            }
        }

        Ok(())
    }

    fn get(&self, key: &str) -> Result<Vec<u8>> {
        validate_key(key)?;

        let key_token = self
            .tokenizer
            .encoded_token(&self.name, key)
            .context(EdvError::RetrieveDocumentId)?;
        let location = self
            .locate(&key_token)
            .context(EdvError::RetrieveDocumentId)?;

        debug!(store = %self.name, %location, "reading document");
        self.client
            .read_document(&location)
            .context(EdvError::RetrieveDocument)
    }

    fn delete(&self, key: &str) -> Result<()> {
        validate_key(key)?;

        let key_token = self
            .tokenizer
            .encoded_token(&self.name, key)
            .context(EdvError::RetrieveDocumentId)?;

        let _guard = self.locks.lock(&key_token);

        let location = self
            .locate(&key_token)
            .context(EdvError::RetrieveDocumentId)?;

        self.client
            .delete_document(&location)
            .context(EdvError::DeleteDocument)?;
        debug!(store = %self.name, %location, "deleted document");
        Ok(())
    }

    fn iterator(&self, _start_key: &str, _end_key: &str) -> DocumentIterator {
        match self.read_all() {
            Ok(entries) => DocumentIterator::new(entries),
            Err(e) => DocumentIterator::failed(e),
        }
    }
}

fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(EdvError::InvalidKey("key cannot be empty".into()));
    }
    Ok(())
}

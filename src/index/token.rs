//! Blind index tokens.
//!
//! The vault only ever sees MACs: the attribute *names* it indexes on are
//! MACs of fixed labels, and the attribute *values* are MACs of the store
//! name (scope) or of scope + key. Without the keying material the vault
//! can match documents but cannot learn which key a document belongs to.
//!
//! Input layout for a value MAC:
//!
//! ```text
//! [scope_len: 4 bytes BE][scope bytes][key bytes]
//! ```
//!
//! The length prefix keeps `("ab", "c")` and `("a", "bc")` apart.

use std::sync::Arc;

use base64::engine::general_purpose::URL_SAFE_NO_PAD as BASE64;
use base64::Engine;
use subtle::ConstantTimeEq;

use super::mac::MacPrimitive;
use crate::errors::{EdvError, Result, ResultExt};

/// Label MACed to produce the name of the per-store attribute.
const STORE_INDEX_LABEL: &[u8] = b"edvault:store-index";

/// Label MACed to produce the name of the per-key attribute.
const KEY_INDEX_LABEL: &[u8] = b"edvault:store-and-key-index";

/// Raw output of the index MAC.
#[derive(Clone)]
pub struct IndexToken(Vec<u8>);

impl IndexToken {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Text-safe form sent on the wire (URL-safe base64, no padding).
    pub fn encode(&self) -> String {
        BASE64.encode(&self.0)
    }
}

impl PartialEq for IndexToken {
    fn eq(&self, other: &Self) -> bool {
        self.0.ct_eq(&other.0).into()
    }
}

impl Eq for IndexToken {}

impl std::fmt::Debug for IndexToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "IndexToken({})", self.encode())
    }
}

/// The two blinded attribute names every stored document is indexed under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexNames {
    /// Attribute whose value identifies the store.
    pub store: String,
    /// Attribute whose value identifies the store + key pair.
    pub key: String,
}

/// Derives index tokens from a caller-supplied MAC primitive.
#[derive(Clone)]
pub struct IndexTokenizer {
    mac: Arc<dyn MacPrimitive>,
}

impl IndexTokenizer {
    pub fn new(mac: Arc<dyn MacPrimitive>) -> Self {
        Self { mac }
    }

    /// Token identifying `key` inside `scope`.
    pub fn token(&self, scope: &str, key: &str) -> Result<IndexToken> {
        self.mac_of(&scoped_input(scope, key.as_bytes()))
    }

    /// Encoded form of [`token`](Self::token).
    pub fn encoded_token(&self, scope: &str, key: &str) -> Result<String> {
        self.token(scope, key).map(|t| t.encode())
    }

    /// Token shared by every document of `scope`.
    pub fn scope_token(&self, scope: &str) -> Result<IndexToken> {
        self.mac_of(&scoped_input(scope, &[]))
    }

    /// Compute the blinded attribute names.
    pub fn index_names(&self) -> Result<IndexNames> {
        let store = self.mac_of(STORE_INDEX_LABEL).context(EdvError::IndexNames)?;
        let key = self.mac_of(KEY_INDEX_LABEL).context(EdvError::IndexNames)?;
        Ok(IndexNames {
            store: store.encode(),
            key: key.encode(),
        })
    }

    fn mac_of(&self, data: &[u8]) -> Result<IndexToken> {
        self.mac
            .compute_mac(data)
            .map(IndexToken)
            .map_err(EdvError::IndexComputation)
    }
}

impl std::fmt::Debug for IndexTokenizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("IndexTokenizer(..)")
    }
}

fn scoped_input(scope: &str, key: &[u8]) -> Vec<u8> {
    let scope = scope.as_bytes();
    // Store names are short; saturate rather than fail on absurd input.
    let len = u32::try_from(scope.len()).unwrap_or(u32::MAX);

    let mut buf = Vec::with_capacity(4 + scope.len() + key.len());
    buf.extend_from_slice(&len.to_be_bytes());
    buf.extend_from_slice(scope);
    buf.extend_from_slice(key);
    buf
}

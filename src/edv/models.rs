//! Wire models for the encrypted data vault.
//!
//! An encrypted document as stored by the vault:
//!
//! ```json
//! {
//!   "id": "AQxbZtTFvFJpLRxCCRUwds",
//!   "sequence": 0,
//!   "indexed": [
//!     { "sequence": 0, "attributes": [ { "name": "...", "value": "...", "unique": true } ] }
//!   ],
//!   "jwe": { ... }
//! }
//! ```
//!
//! The `jwe` payload is kept as raw JSON and never parsed.

use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;

use crate::errors::{EdvError, Result};

/// A vault-resident record: opaque encrypted payload plus the blinded
/// attributes the vault can match on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncryptedDocument {
    #[serde(default)]
    pub id: String,

    #[serde(default)]
    pub sequence: u64,

    #[serde(rename = "indexed", default, skip_serializing_if = "Vec::is_empty")]
    pub indexed_attribute_collections: Vec<IndexedAttributeCollection>,

    /// Encrypted content, passed through untouched.
    #[serde(default)]
    pub jwe: Option<Box<RawValue>>,
}

/// A group of indexed attributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexedAttributeCollection {
    #[serde(default)]
    pub sequence: u64,

    #[serde(rename = "attributes", default)]
    pub indexed_attributes: Vec<IndexedAttribute>,
}

/// One blinded name/value pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexedAttribute {
    pub name: String,
    pub value: String,

    /// Asks the vault to reject a second document with the same pair.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub unique: bool,
}

/// Body of a vault query: match documents carrying `name = value`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    pub name: String,
    pub value: String,
}

impl EncryptedDocument {
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes).map_err(EdvError::Unmarshal)
    }

    pub fn to_vec(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self).map_err(EdvError::Marshal)
    }

    /// `true` if any collection carries an attribute with this name and value.
    pub fn has_attribute(&self, name: &str, value: &str) -> bool {
        self.indexed_attribute_collections
            .iter()
            .flat_map(|c| &c.indexed_attributes)
            .any(|a| a.name == name && a.value == value)
    }
}

use std::path::PathBuf;
use thiserror::Error;

/// Failure reported by a [`MacPrimitive`](crate::index::MacPrimitive).
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct MacError(pub String);

/// All errors that can occur in edvault.
///
/// Leaf variants name what went wrong. Context variants name the operation
/// that was running and box the error that caused it, so `to_string()`
/// renders the whole chain (`"failed to retrieve document id: no document
/// matching query found: data not found"`) while [`EdvError::root_cause`]
/// still allows matching on the innermost kind.
#[derive(Debug, Error)]
pub enum EdvError {
    // --- Index errors ---
    #[error("failed to compute index MAC: {0}")]
    IndexComputation(#[source] MacError),

    #[error("invalid key: {0}")]
    InvalidKey(String),

    // --- Document errors ---
    #[error("failed to marshal encrypted document: {0}")]
    Marshal(#[source] serde_json::Error),

    #[error("failed to unmarshal value into an encrypted document: {0}")]
    Unmarshal(#[source] serde_json::Error),

    // --- Vault wire errors ---
    #[error("failed to send {method} request to {url}: {message}")]
    Transport {
        method: &'static str,
        url: String,
        message: String,
    },

    #[error("status code {status} was returned along with the following message: {body}")]
    VaultResponse { status: u16, body: String },

    #[error("vault response to document creation is missing the Location header")]
    MissingLocation,

    // --- Query resolution errors ---
    #[error("no document matching query found: data not found")]
    NotFound,

    #[error("{count} documents matching query found, expected at most one")]
    AmbiguousKey { count: usize },

    #[error("iterator released")]
    IteratorReleased,

    // --- Operation context ---
    #[error("failed to compute index names: {0}")]
    IndexNames(#[source] Box<EdvError>),

    #[error("failed to check for existing document: {0}")]
    CheckExisting(#[source] Box<EdvError>),

    #[error("failed to store document: {0}")]
    StoreDocument(#[source] Box<EdvError>),

    #[error("failed to create indexed attributes: {0}")]
    IndexedAttributes(#[source] Box<EdvError>),

    #[error("failed to create document in vault: {0}")]
    CreateDocument(#[source] Box<EdvError>),

    #[error("failed to update document in vault: {0}")]
    UpdateDocument(#[source] Box<EdvError>),

    #[error("failed to query vault: {0}")]
    QueryVault(#[source] Box<EdvError>),

    #[error("failed to retrieve document id: {0}")]
    RetrieveDocumentId(#[source] Box<EdvError>),

    #[error("failed to retrieve document from vault: {0}")]
    RetrieveDocument(#[source] Box<EdvError>),

    #[error("failed to delete document in vault: {0}")]
    DeleteDocument(#[source] Box<EdvError>),

    #[error("failed to get all document locations: {0}")]
    ListDocuments(#[source] Box<EdvError>),

    #[error("failed to get all documents: {0}")]
    ReadAllDocuments(#[source] Box<EdvError>),

    // --- Keyfile errors ---
    #[error("Keyfile error: {0}")]
    Keyfile(String),

    // --- Config errors ---
    #[error("Config error: {0}")]
    Config(String),

    // --- IO errors ---
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // --- CLI errors ---
    #[error("Command failed: {0}")]
    CommandFailed(String),

    #[error("Document file not found at {0}")]
    DocumentFileNotFound(PathBuf),
}

impl EdvError {
    /// Wrap `self` in a context variant, e.g. `err.wrap(EdvError::QueryVault)`.
    pub fn wrap(self, context: fn(Box<EdvError>) -> EdvError) -> EdvError {
        context(Box::new(self))
    }

    /// The error directly wrapped by a context variant, if any.
    pub fn cause(&self) -> Option<&EdvError> {
        match self {
            Self::IndexNames(inner)
            | Self::CheckExisting(inner)
            | Self::StoreDocument(inner)
            | Self::IndexedAttributes(inner)
            | Self::CreateDocument(inner)
            | Self::UpdateDocument(inner)
            | Self::QueryVault(inner)
            | Self::RetrieveDocumentId(inner)
            | Self::RetrieveDocument(inner)
            | Self::DeleteDocument(inner)
            | Self::ListDocuments(inner)
            | Self::ReadAllDocuments(inner) => Some(inner),
            _ => None,
        }
    }

    /// The innermost error of the chain.
    pub fn root_cause(&self) -> &EdvError {
        let mut current = self;
        while let Some(inner) = current.cause() {
            current = inner;
        }
        current
    }

    /// `true` when no document exists for the requested key.
    pub fn is_not_found(&self) -> bool {
        matches!(self.root_cause(), Self::NotFound)
    }

    /// `true` when more than one document matched a single key.
    pub fn is_ambiguous(&self) -> bool {
        matches!(self.root_cause(), Self::AmbiguousKey { .. })
    }

    /// The HTTP status of a non-success vault response anywhere in the chain.
    pub fn vault_status(&self) -> Option<u16> {
        match self.root_cause() {
            Self::VaultResponse { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Extension for attaching operation context to a failed result.
pub(crate) trait ResultExt<T> {
    fn context(self, context: fn(Box<EdvError>) -> EdvError) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: fn(Box<EdvError>) -> EdvError) -> Result<T> {
        self.map_err(|e| e.wrap(context))
    }
}

/// Convenience type alias for edvault results.
pub type Result<T> = std::result::Result<T, EdvError>;

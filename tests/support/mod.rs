//! Shared test helpers: an in-memory vault behind the transport seam.
//!
//! `MemoryVault` speaks the same endpoints as a real vault server and can
//! be told to fail any operation with a given status and body.

#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use edvault::edv::{
    EncryptedDocument, Method, Query, VaultRequest, VaultResponse, VaultTransport,
};
use edvault::errors::MacError;
use edvault::index::{HmacSha256, MacPrimitive};
use edvault::{EdvError, Provider, Result, VaultConfig};

pub const BASE_URL: &str = "https://edv.test/encrypted-data-vaults";
pub const VAULT_ID: &str = "vaultID";

/// Vault operation, for failure injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    Create,
    Query,
    Read,
    Update,
    Delete,
}

#[derive(Default)]
struct State {
    /// Documents by id; ids are zero-padded so order follows creation.
    docs: BTreeMap<String, Vec<u8>>,
    next_id: u64,
    failures: HashMap<Op, (u16, String)>,
    extra_matches: Vec<String>,
    hide_matches: bool,
    enforce_unique: bool,
    requests: Vec<VaultRequest>,
}

#[derive(Default)]
pub struct MemoryVault {
    state: Mutex<State>,
}

impl MemoryVault {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Make every `op` answer with `status` and `body`.
    pub fn fail(&self, op: Op, status: u16, body: &str) {
        self.state
            .lock()
            .unwrap()
            .failures
            .insert(op, (status, body.to_string()));
    }

    pub fn clear_failures(&self) {
        self.state.lock().unwrap().failures.clear();
    }

    /// Append `location` to every query result.
    pub fn inject_match(&self, location: &str) {
        self.state
            .lock()
            .unwrap()
            .extra_matches
            .push(location.to_string());
    }

    /// Answer every query with an empty list, as a racing writer would see.
    pub fn hide_matches(&self, hide: bool) {
        self.state.lock().unwrap().hide_matches = hide;
    }

    /// Reject creates that repeat a `unique` attribute, with 409.
    pub fn enforce_unique(&self) {
        self.state.lock().unwrap().enforce_unique = true;
    }

    pub fn document_count(&self) -> usize {
        self.state.lock().unwrap().docs.len()
    }

    pub fn documents(&self) -> Vec<EncryptedDocument> {
        self.state
            .lock()
            .unwrap()
            .docs
            .values()
            .map(|bytes| EncryptedDocument::from_slice(bytes).unwrap())
            .collect()
    }

    pub fn requests(&self) -> Vec<VaultRequest> {
        self.state.lock().unwrap().requests.clone()
    }

    fn location(id: &str) -> String {
        format!("{BASE_URL}/{VAULT_ID}/documents/{id}")
    }
}

fn respond(status: u16, body: &[u8]) -> VaultResponse {
    VaultResponse {
        status,
        location: None,
        body: body.to_vec(),
    }
}

impl VaultTransport for MemoryVault {
    fn send(&self, request: VaultRequest) -> Result<VaultResponse> {
        let mut state = self.state.lock().unwrap();
        state.requests.push(request.clone());

        let prefix = format!("{BASE_URL}/{VAULT_ID}/");
        let path = request
            .url
            .strip_prefix(&prefix)
            .ok_or_else(|| EdvError::Transport {
                method: request.method.as_str(),
                url: request.url.clone(),
                message: "unknown host".into(),
            })?
            .to_string();

        let op = match (request.method, path.as_str()) {
            (Method::Post, "documents") => Op::Create,
            (Method::Post, "query") => Op::Query,
            (Method::Get, _) => Op::Read,
            (Method::Put, _) => Op::Update,
            (Method::Delete, _) => Op::Delete,
            _ => return Ok(respond(404, b"no such endpoint")),
        };

        if let Some((status, body)) = state.failures.get(&op) {
            return Ok(respond(*status, body.as_bytes()));
        }

        let body = request.body.clone().unwrap_or_default();
        let id = path.strip_prefix("documents/").unwrap_or_default().to_string();

        match op {
            Op::Create => {
                let doc = EncryptedDocument::from_slice(&body).unwrap();
                if state.enforce_unique {
                    let taken = doc
                        .indexed_attribute_collections
                        .iter()
                        .flat_map(|c| &c.indexed_attributes)
                        .filter(|a| a.unique)
                        .any(|a| {
                            state.docs.values().any(|stored| {
                                EncryptedDocument::from_slice(stored)
                                    .unwrap()
                                    .has_attribute(&a.name, &a.value)
                            })
                        });
                    if taken {
                        return Ok(respond(409, b"duplicate unique index value"));
                    }
                }

                state.next_id += 1;
                let id = format!("doc-{:04}", state.next_id);
                state.docs.insert(id.clone(), body);
                Ok(VaultResponse {
                    status: 201,
                    location: Some(Self::location(&id)),
                    body: Vec::new(),
                })
            }
            Op::Query => {
                let query: Query = serde_json::from_slice(&body).unwrap();
                let mut matches: Vec<String> = if state.hide_matches {
                    Vec::new()
                } else {
                    state
                        .docs
                        .iter()
                        .filter(|(_, bytes)| {
                            EncryptedDocument::from_slice(bytes)
                                .unwrap()
                                .has_attribute(&query.name, &query.value)
                        })
                        .map(|(id, _)| Self::location(id))
                        .collect()
                };
                matches.extend(state.extra_matches.iter().cloned());
                Ok(respond(200, &serde_json::to_vec(&matches).unwrap()))
            }
            Op::Read => match state.docs.get(&id) {
                Some(bytes) => Ok(respond(200, bytes)),
                None => Ok(respond(404, b"document not found")),
            },
            Op::Update => match state.docs.get_mut(&id) {
                Some(stored) => {
                    *stored = body;
                    Ok(respond(200, b""))
                }
                None => Ok(respond(404, b"document not found")),
            },
            Op::Delete => match state.docs.remove(&id) {
                Some(_) => Ok(respond(200, b"")),
                None => Ok(respond(404, b"document not found")),
            },
        }
    }
}

/// Test keying material.
pub fn mac() -> Arc<HmacSha256> {
    Arc::new(HmacSha256::new(&[0x5Au8; 32]))
}

pub fn provider(vault: &Arc<MemoryVault>) -> Provider {
    provider_with_mac(vault, mac())
}

pub fn provider_with_mac(vault: &Arc<MemoryVault>, mac: Arc<dyn MacPrimitive>) -> Provider {
    let transport: Arc<dyn VaultTransport> = vault.clone();
    Provider::with_transport(VaultConfig::new(BASE_URL, VAULT_ID), mac, transport).unwrap()
}

/// An encrypted document as an external formatter would hand it over.
pub fn document(id: &str, ciphertext: &str) -> Vec<u8> {
    serde_json::to_vec(&serde_json::json!({
        "id": id,
        "sequence": 0,
        "jwe": {
            "protected": "eyJlbmMiOiJDMjBQIn0",
            "ciphertext": ciphertext,
            "tag": "ZFvnH7f"
        }
    }))
    .unwrap()
}

/// Ciphertext carried by a stored document.
pub fn ciphertext_of(bytes: &[u8]) -> String {
    let doc = EncryptedDocument::from_slice(bytes).unwrap();
    let jwe: serde_json::Value = serde_json::from_str(doc.jwe.unwrap().get()).unwrap();
    jwe["ciphertext"].as_str().unwrap().to_string()
}

/// HMAC that works for the first `allowed` calls and then fails.
pub struct FlakyMac {
    inner: HmacSha256,
    allowed: usize,
    calls: AtomicUsize,
}

impl FlakyMac {
    pub fn new(allowed: usize) -> Arc<Self> {
        Arc::new(Self {
            inner: HmacSha256::new(&[0x5Au8; 32]),
            allowed,
            calls: AtomicUsize::new(0),
        })
    }
}

impl MacPrimitive for FlakyMac {
    fn compute_mac(&self, data: &[u8]) -> std::result::Result<Vec<u8>, MacError> {
        if self.calls.fetch_add(1, Ordering::SeqCst) >= self.allowed {
            return Err(MacError("test error".into()));
        }
        self.inner.compute_mac(data)
    }
}

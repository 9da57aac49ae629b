//! Keying material for the blind index.
//!
//! This module provides:
//! - Keyfile generation, loading and the `EDVAULT_INDEX_KEY` override (`keyfile`)

pub mod keyfile;

pub use keyfile::{generate_keyfile, index_mac, load_keyfile, resolve_key};

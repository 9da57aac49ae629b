//! Index keying material on disk.
//!
//! A keyfile is 32 random bytes. The index MAC key is derived from it with
//! HKDF, so the same file yields the same blind indexes on every machine
//! and after every restart. Losing it means losing the ability to locate
//! anything stored under it.

use std::fs;
use std::path::Path;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use rand::RngCore;
use zeroize::Zeroizing;

use crate::errors::{EdvError, Result};
use crate::index::HmacSha256;

/// Expected length of a keyfile in bytes (256 bits).
pub const KEYFILE_LEN: usize = 32;

/// Environment variable holding base64 keying material; overrides the file.
pub const KEY_ENV_VAR: &str = "EDVAULT_INDEX_KEY";

/// HKDF context for the index MAC key.
const INDEX_KEY_CONTEXT: &str = "edvault-index-mac";

/// Generate a new random keyfile and write it to `path`.
///
/// The file is written with restrictive permissions (owner-only read).
/// Returns the raw keyfile bytes so the caller can use them immediately.
pub fn generate_keyfile(path: &Path) -> Result<Zeroizing<Vec<u8>>> {
    if path.exists() {
        return Err(EdvError::Keyfile(format!(
            "keyfile already exists at {}",
            path.display()
        )));
    }

    let mut keyfile = Zeroizing::new(vec![0u8; KEYFILE_LEN]);
    rand::rng().fill_bytes(&mut keyfile);

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).map_err(|e| {
                EdvError::Keyfile(format!("cannot create keyfile directory: {e}"))
            })?;
        }
    }

    fs::write(path, keyfile.as_slice())
        .map_err(|e| EdvError::Keyfile(format!("failed to write keyfile: {e}")))?;

    // On Unix, restrict permissions to owner-only read/write.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = fs::Permissions::from_mode(0o600);
        fs::set_permissions(path, perms).map_err(|e| {
            EdvError::Keyfile(format!("failed to set keyfile permissions: {e}"))
        })?;
    }

    Ok(keyfile)
}

/// Load a keyfile from disk and validate its length.
pub fn load_keyfile(path: &Path) -> Result<Zeroizing<Vec<u8>>> {
    if !path.exists() {
        return Err(EdvError::Keyfile(format!(
            "keyfile not found at {} (run `edvault keygen`)",
            path.display()
        )));
    }

    let data = Zeroizing::new(
        fs::read(path).map_err(|e| EdvError::Keyfile(format!("failed to read keyfile: {e}")))?,
    );
    check_len(&data)?;
    Ok(data)
}

/// Decode keying material given as base64 (the `EDVAULT_INDEX_KEY` form).
pub fn decode_key(encoded: &str) -> Result<Zeroizing<Vec<u8>>> {
    let data = Zeroizing::new(
        BASE64
            .decode(encoded.trim())
            .map_err(|e| EdvError::Keyfile(format!("{KEY_ENV_VAR} is not valid base64: {e}")))?,
    );
    check_len(&data)?;
    Ok(data)
}

/// Keying material from `EDVAULT_INDEX_KEY` if set, else from `path`.
pub fn resolve_key(path: &Path) -> Result<Zeroizing<Vec<u8>>> {
    match std::env::var(KEY_ENV_VAR) {
        Ok(encoded) if !encoded.is_empty() => decode_key(&encoded),
        _ => load_keyfile(path),
    }
}

/// The index MAC for this keying material.
pub fn index_mac(key: &[u8]) -> Result<HmacSha256> {
    HmacSha256::derive(key, INDEX_KEY_CONTEXT)
        .map_err(|e| EdvError::Keyfile(format!("cannot derive index key: {e}")))
}

fn check_len(data: &[u8]) -> Result<()> {
    if data.len() != KEYFILE_LEN {
        return Err(EdvError::Keyfile(format!(
            "keyfile must be exactly {} bytes, got {}",
            KEYFILE_LEN,
            data.len()
        )));
    }
    Ok(())
}

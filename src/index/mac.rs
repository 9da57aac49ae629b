//! Keyed MAC primitive used to blind index values.
//!
//! The store never needs to verify a MAC, only to recompute it, so the
//! seam is a single `compute_mac` call. [`HmacSha256`] is the default
//! implementation; callers holding keys elsewhere (an HSM, a KMS) plug in
//! their own [`MacPrimitive`].

use hkdf::Hkdf;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::errors::MacError;

/// Length of an HMAC-SHA256 key derived by [`HmacSha256::derive`].
pub const MAC_KEY_LEN: usize = 32;

/// A deterministic keyed MAC over arbitrary bytes.
pub trait MacPrimitive: Send + Sync {
    /// Compute the MAC of `data`. Equal inputs under the same key must
    /// always produce equal outputs.
    fn compute_mac(&self, data: &[u8]) -> Result<Vec<u8>, MacError>;
}

/// HMAC-SHA256 keyed with raw keying material.
///
/// The key bytes are zeroed when the value is dropped.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct HmacSha256 {
    key: Vec<u8>,
}

impl HmacSha256 {
    /// Use `key` directly as the HMAC key.
    pub fn new(key: &[u8]) -> Self {
        Self { key: key.to_vec() }
    }

    /// Derive the HMAC key from `master` with HKDF-SHA256, binding it to
    /// `context` so the same master secret can serve several purposes.
    pub fn derive(master: &[u8], context: &str) -> Result<Self, MacError> {
        let hk = Hkdf::<Sha256>::new(None, master);

        let mut okm = [0u8; MAC_KEY_LEN];
        hk.expand(context.as_bytes(), &mut okm)
            .map_err(|e| MacError(format!("HKDF expand failed: {e}")))?;

        let mac = Self::new(&okm);
        okm.zeroize();
        Ok(mac)
    }
}

impl MacPrimitive for HmacSha256 {
    fn compute_mac(&self, data: &[u8]) -> Result<Vec<u8>, MacError> {
        let mut mac = Hmac::<Sha256>::new_from_slice(&self.key)
            .map_err(|e| MacError(format!("invalid HMAC key: {e}")))?;
        mac.update(data);
        Ok(mac.finalize().into_bytes().to_vec())
    }
}

impl std::fmt::Debug for HmacSha256 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("HmacSha256(..)")
    }
}

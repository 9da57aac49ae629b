//! Index Tokenizer: blind index derivation.
//!
//! This module provides:
//! - The keyed MAC seam and its HMAC-SHA256 default (`mac`)
//! - Index tokens and blinded attribute names (`token`)

pub mod mac;
pub mod token;

pub use mac::{HmacSha256, MacPrimitive};
pub use token::{IndexNames, IndexToken, IndexTokenizer};

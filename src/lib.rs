pub mod cli;
pub mod config;
pub mod crypto;
pub mod edv;
pub mod errors;
pub mod index;
pub mod store;

pub use errors::{EdvError, Result};
pub use store::{DocumentIterator, KeyValueStore, Provider, Store, VaultConfig};

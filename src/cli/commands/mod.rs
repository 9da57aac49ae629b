//! One module per `edvault` subcommand.

pub mod delete;
pub mod get;
pub mod keygen;
pub mod list;
pub mod put;
pub mod token;

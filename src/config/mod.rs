//! Configuration: `.edvault.toml` project settings.

pub mod settings;

pub use settings::Settings;

//! `edvault token`: print the blind index value the vault sees for a key.
//!
//! Needs only the keyfile, no vault connection.

use crate::cli::{load_settings, project_dir, store_name, tokenizer, Cli};
use crate::errors::{EdvError, Result};

/// Execute the `token` command.
pub fn execute(cli: &Cli, key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(EdvError::InvalidKey("key cannot be empty".into()));
    }

    let dir = project_dir()?;
    let settings = load_settings(cli, &dir)?;
    let store = store_name(cli, &settings);

    let token = tokenizer(&settings, &dir)?.encoded_token(&store, key)?;
    println!("{token}");
    Ok(())
}

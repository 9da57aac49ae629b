//! `edvault put`: store an encrypted document under a key.

use std::io::{self, IsTerminal, Read};
use std::path::Path;

use crate::cli::output;
use crate::cli::{open_store, Cli};
use crate::errors::{EdvError, Result};
use crate::store::KeyValueStore;

/// Execute the `put` command.
pub fn execute(cli: &Cli, key: &str, file: Option<&str>) -> Result<()> {
    // The document comes from a file or from piped stdin, never a prompt.
    let document = match file {
        Some(path) => {
            let path = Path::new(path);
            if !path.exists() {
                return Err(EdvError::DocumentFileNotFound(path.to_path_buf()));
            }
            std::fs::read(path)?
        }
        None if !io::stdin().is_terminal() => {
            let mut buf = Vec::new();
            io::stdin().read_to_end(&mut buf)?;
            buf
        }
        None => {
            return Err(EdvError::CommandFailed(
                "no document given: use --file <PATH> or pipe the JSON on stdin".into(),
            ));
        }
    };

    let (provider, store) = open_store(cli)?;
    store.put(key, &document)?;
    provider.close()?;

    output::success(&format!("Stored '{key}' in store '{}'", store.name()));
    Ok(())
}

//! `edvault delete`: remove the document stored under a key.

use dialoguer::Confirm;

use crate::cli::output;
use crate::cli::{open_store, Cli};
use crate::errors::{EdvError, Result};
use crate::store::KeyValueStore;

/// Execute the `delete` command.
pub fn execute(cli: &Cli, key: &str, force: bool) -> Result<()> {
    // Unless --force is set, ask for confirmation before deleting.
    if !force {
        let confirmed = Confirm::new()
            .with_prompt(format!("Delete '{key}' from the vault?"))
            .default(false)
            .interact()
            .map_err(|e| EdvError::CommandFailed(format!("confirm prompt: {e}")))?;

        if !confirmed {
            output::info("Cancelled.");
            return Ok(());
        }
    }

    let (provider, store) = open_store(cli)?;
    store.delete(key)?;
    provider.close()?;

    output::success(&format!("Deleted '{key}' from store '{}'", store.name()));
    Ok(())
}

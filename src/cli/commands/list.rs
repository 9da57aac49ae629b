//! `edvault list`: display every document of the store in a table.

use crate::cli::output;
use crate::cli::{open_store, Cli};
use crate::errors::{EdvError, Result};
use crate::store::KeyValueStore;

/// Execute the `list` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let (provider, store) = open_store(cli)?;

    let mut itr = store.iterator("", "");
    let mut entries = Vec::with_capacity(itr.len());
    while itr.advance() {
        entries.push((itr.key().to_string(), itr.value().len()));
    }

    // A construction failure only shows up here.
    if let Some(err) = itr.error() {
        return Err(EdvError::CommandFailed(err.to_string()));
    }
    itr.release();
    provider.close()?;

    output::info(&format!(
        "store '{}': {} document(s)",
        store.name(),
        entries.len()
    ));
    output::print_entries_table(&entries);
    Ok(())
}

//! `edvault get`: print the encrypted document stored under a key.

use std::io::{self, Write};

use crate::cli::{open_store, Cli};
use crate::errors::Result;
use crate::store::KeyValueStore;

/// Execute the `get` command.
pub fn execute(cli: &Cli, key: &str) -> Result<()> {
    let (provider, store) = open_store(cli)?;
    let document = store.get(key)?;
    provider.close()?;

    // Raw bytes to stdout so the output can be piped.
    let mut stdout = io::stdout().lock();
    stdout.write_all(&document)?;
    writeln!(stdout)?;
    Ok(())
}

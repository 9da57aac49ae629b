//! `edvault keygen`: create the index keyfile.

use std::path::PathBuf;

use crate::cli::output;
use crate::cli::{load_settings, project_dir, Cli};
use crate::crypto::keyfile;
use crate::errors::Result;

/// Execute the `keygen` command.
pub fn execute(cli: &Cli, path: Option<&str>) -> Result<()> {
    let dir = project_dir()?;
    let settings = load_settings(cli, &dir)?;

    let target = match path {
        Some(p) => PathBuf::from(p),
        None => settings.key_file_path(&dir),
    };

    keyfile::generate_keyfile(&target)?;

    output::success(&format!("Index keyfile written to {}", target.display()));
    output::warning("Back this file up: documents stored under it cannot be located without it.");
    Ok(())
}

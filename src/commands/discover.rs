//! Driver-dirs command - prints driver directories for an architecture.

use anyhow::Result;
use std::path::Path;

use crate::discover;

/// Execute the driver-dirs command.
///
/// Output is a single space-separated line for the drivers Makefile.
pub fn cmd_driver_dirs(root: &Path, arch: &str) -> Result<()> {
    let dirs = discover::find_driver_dirs(root, arch)?;
    println!("{}", dirs.join(" "));
    Ok(())
}

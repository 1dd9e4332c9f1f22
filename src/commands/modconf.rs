//! Modconf command - writes kernel module boot/user lists.

use anyhow::{bail, Result};
use std::path::Path;

use crate::modconf;

/// Execute the modconf command.
pub fn cmd_modconf(dir: &Path) -> Result<()> {
    if !dir.is_dir() {
        bail!("Kernel modules directory not found: {}", dir.display());
    }

    let lists = modconf::collect(dir)?;
    for (path, reason) in &lists.skipped {
        eprintln!("WARNING: {}: {} (skipped)", path.display(), reason);
    }

    modconf::write(dir, &lists)?;
    println!("Completed successfully.");
    Ok(())
}

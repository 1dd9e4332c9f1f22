//! Initrd command - packages the boot root tree.

use anyhow::Result;
use std::path::Path;

use crate::initrd::{self, PackOutcome};

/// Execute the initrd command.
pub fn cmd_initrd(root: &Path, output: &Path, force: bool) -> Result<()> {
    println!("Packaging {} into {}...", root.display(), output.display());

    match initrd::package(root, output, force)? {
        PackOutcome::UpToDate => {
            println!("  Initrd is up to date (use --force to repack).");
        }
        PackOutcome::Packed {
            files,
            bytes,
            archive_bytes,
        } => {
            println!("  {} files, {:.1} KiB of content", files, bytes as f64 / 1024.0);
            println!("  Archive size: {:.1} KiB", archive_bytes as f64 / 1024.0);
        }
    }
    Ok(())
}

//! Initial ramdisk packaging.
//!
//! The kernel mounts the initrd through its ustar driver, so the archive must
//! be plain ustar. Entries are name-sorted with fixed mtime and ownership so
//! the same tree always produces the same bytes.

use anyhow::{bail, Context, Result};
use std::fs;
use std::path::Path;

use crate::cache;
use crate::process::{self, Cmd};

/// Default archive name.
pub const DEFAULT_INITRD_NAME: &str = "initrd.tar";

/// What [`package`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackOutcome {
    /// Archive written.
    Packed {
        files: usize,
        bytes: u64,
        archive_bytes: u64,
    },
    /// Archive exists and the tree hash matches; nothing written.
    UpToDate,
}

/// Package `root` into a ustar archive at `output`.
pub fn package(root: &Path, output: &Path, force: bool) -> Result<PackOutcome> {
    if !root.is_dir() {
        bail!("Initrd root not found: {}", root.display());
    }
    if is_inside(root, output) {
        bail!(
            "Output {} is inside the initrd root {}; it would pack itself",
            output.display(),
            root.display()
        );
    }

    let tree = cache::hash_tree(root)?;
    if tree.files == 0 {
        bail!("No files present in {}", root.display());
    }

    let hash_file = cache::hash_file_for(output);
    if !force && !cache::needs_rebuild(&tree.hash, &hash_file, output) {
        return Ok(PackOutcome::UpToDate);
    }

    process::require_tool("tar", "tar")?;

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    Cmd::new("tar")
        .args([
            "--format=ustar",
            "--sort=name",
            "--mtime=@0",
            "--owner=0",
            "--group=0",
            "--numeric-owner",
            "-cf",
        ])
        .arg_path(output)
        .arg("-C")
        .arg_path(root)
        .arg(".")
        .env("LC_ALL", "C")
        .error_msg("tar failed to create the initrd")
        .run()?;

    cache::write_cached_hash(&hash_file, &tree.hash)?;

    let archive_bytes = fs::metadata(output)
        .with_context(|| format!("Failed to stat {}", output.display()))?
        .len();

    Ok(PackOutcome::Packed {
        files: tree.files,
        bytes: tree.bytes,
        archive_bytes,
    })
}

/// Whether `output` would land somewhere under `root`.
///
/// The output's parent may not exist yet, so the nearest existing ancestor is
/// compared instead.
fn is_inside(root: &Path, output: &Path) -> bool {
    let Ok(root) = root.canonicalize() else {
        return false;
    };
    let mut dir = output.parent().unwrap_or(Path::new(""));
    loop {
        let probe = if dir.as_os_str().is_empty() { Path::new(".") } else { dir };
        if let Ok(existing) = probe.canonicalize() {
            return existing.starts_with(&root);
        }
        match dir.parent() {
            Some(parent) => dir = parent,
            None => return false,
        }
    }
}

/// List the entries of an existing archive.
pub fn list(archive: &Path) -> Result<Vec<String>> {
    if !archive.exists() {
        bail!(
            "Initrd not found: {}\nRun 'hexbuild initrd' first to build it.",
            archive.display()
        );
    }
    let result = Cmd::new("tar")
        .arg("-tf")
        .arg_path(archive)
        .error_msg("tar failed to list the initrd")
        .run()?;
    Ok(result.stdout.lines().map(str::to_string).collect())
}

//! Content-hash rebuild detection.
//!
//! Uses SHA256 over file contents, not mtimes, so a tree that was touched
//! but not changed does not trigger a repack.

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Summary of a hashed tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeHash {
    pub hash: String,
    pub files: usize,
    pub bytes: u64,
}

/// Hash every path and file body under `root`, in name order.
///
/// Directories and symlinks contribute their relative path (and link
/// target), so renames and empty directories change the hash too.
pub fn hash_tree(root: &Path) -> Result<TreeHash> {
    let mut hasher = Sha256::new();
    let mut files = 0;
    let mut bytes = 0;

    for entry in WalkDir::new(root).min_depth(1).sort_by_file_name() {
        let entry = entry.with_context(|| format!("Failed to walk {}", root.display()))?;
        let path = entry.path();
        let relative = path.strip_prefix(root).unwrap_or(path);

        hasher.update(relative.to_string_lossy().as_bytes());
        hasher.update([0u8]);

        let file_type = entry.file_type();
        if file_type.is_symlink() {
            let target = fs::read_link(path)
                .with_context(|| format!("Failed to read link {}", path.display()))?;
            hasher.update(b"L");
            hasher.update(target.to_string_lossy().as_bytes());
        } else if file_type.is_file() {
            let content =
                fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
            hasher.update(b"F");
            hasher.update((content.len() as u64).to_le_bytes());
            hasher.update(&content);
            files += 1;
            bytes += content.len() as u64;
        } else {
            hasher.update(b"D");
        }
    }

    Ok(TreeHash {
        hash: format!("{:x}", hasher.finalize()),
        files,
        bytes,
    })
}

/// Path of the hash file kept next to an artifact (`initrd.tar.hash`).
pub fn hash_file_for(artifact: &Path) -> PathBuf {
    let mut name = artifact.as_os_str().to_owned();
    name.push(".hash");
    PathBuf::from(name)
}

/// Read cached hash from a .hash file.
/// Returns None if file doesn't exist.
/// Logs a warning if file exists but can't be read.
pub fn read_cached_hash(hash_file: &Path) -> Option<String> {
    if !hash_file.exists() {
        return None;
    }
    match fs::read_to_string(hash_file) {
        Ok(s) => Some(s.trim().to_string()),
        Err(e) => {
            eprintln!(
                "WARNING: Failed to read cache hash file {}: {} (will rebuild)",
                hash_file.display(),
                e
            );
            None
        }
    }
}

/// Write hash to a .hash file.
pub fn write_cached_hash(hash_file: &Path, hash: &str) -> Result<()> {
    if let Some(parent) = hash_file.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(hash_file, hash)
        .with_context(|| format!("Failed to write {}", hash_file.display()))?;
    Ok(())
}

/// Check if target needs rebuild based on source hash.
///
/// Returns true if the target or its hash file is missing, or the hashes
/// differ.
pub fn needs_rebuild(source_hash: &str, hash_file: &Path, target: &Path) -> bool {
    if !target.exists() {
        return true;
    }
    match read_cached_hash(hash_file) {
        Some(cached) => cached != source_hash,
        None => true,
    }
}

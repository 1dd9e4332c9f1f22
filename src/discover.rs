//! Driver directory discovery for a build architecture.
//!
//! The drivers tree mixes driver directories (with a `driver.conf`) and
//! category directories grouping them (`storage/ahci`, `net/e1000`). A
//! category is only descended into when the directory holding it carries a
//! `make.config`, which is how the drivers Makefile marks a level it builds.
//!
//! Selected directories are reported relative to the root with `/` turned
//! into `-`; the Makefile reverses that when it builds each one.

use anyhow::{bail, Context, Result};
use std::path::Path;
use walkdir::WalkDir;

use crate::conf::{ConfFile, Syntax};
use crate::driver::DRIVER_CONF;

/// Marker file that makes a directory's subdirectories eligible for descent.
pub const MAKE_CONFIG: &str = "make.config";

/// Does an `ARCH` value include `arch`?
///
/// `ANY` matches everything, otherwise the value is a list joined by ` OR `.
/// Comparison is case-insensitive.
pub fn arch_matches(arch_value: &str, arch: &str) -> bool {
    let arch_value = arch_value.trim();
    if arch_value == "ANY" {
        return true;
    }
    let arch = arch.to_lowercase();
    arch_value
        .split(" OR ")
        .any(|candidate| candidate.trim().to_lowercase() == arch)
}

/// Find every driver directory under `root` that builds for `arch`.
pub fn find_driver_dirs(root: &Path, arch: &str) -> Result<Vec<String>> {
    if !root.is_dir() {
        bail!("Drivers directory not found: {}", root.display());
    }
    let mut found = Vec::new();
    walk(root, root, arch, &mut found)?;
    Ok(found)
}

fn walk(root: &Path, dir: &Path, arch: &str, found: &mut Vec<String>) -> Result<()> {
    let descend = dir.join(MAKE_CONFIG).exists();

    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.with_context(|| format!("Failed to read {}", dir.display()))?;
        if !entry.file_type().is_dir() {
            continue;
        }
        let path = entry.path();
        let conf_path = path.join(DRIVER_CONF);

        if !conf_path.exists() {
            if descend {
                walk(root, path, arch, found)?;
            }
            continue;
        }

        let conf = ConfFile::read(&conf_path, Syntax::Assign)?;
        let Some(arch_value) = conf.get("ARCH") else {
            bail!("{}: missing ARCH", conf_path.display());
        };

        if arch_matches(arch_value, arch) {
            found.push(make_target_name(root, path));
        }
    }

    Ok(())
}

/// `storage/ahci` -> `storage-ahci`.
fn make_target_name(root: &Path, dir: &Path) -> String {
    let relative = dir.strip_prefix(root).unwrap_or(dir);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("-")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arch_any() {
        assert!(arch_matches("ANY", "i386"));
        assert!(arch_matches("ANY", "aarch64"));
    }

    #[test]
    fn test_arch_list() {
        assert!(arch_matches("I386 OR X86_64", "x86_64"));
        assert!(arch_matches("I386 OR X86_64", "I386"));
        assert!(!arch_matches("I386 OR X86_64", "aarch64"));
        assert!(!arch_matches("I386 OR X86_64", "i38"));
    }

    #[test]
    fn test_make_target_name() {
        assert_eq!(
            make_target_name(Path::new("/src/drivers"), Path::new("/src/drivers/storage/ahci")),
            "storage-ahci"
        );
    }
}

//! Kernel module configuration lists.
//!
//! Each kernel module directory holds a `<name>.conf`:
//!
//! ```text
//! FILENAME ext2.ko
//! PRIORITY REQUIRED
//! MODLOAD BOOTTIME
//! ```
//!
//! These are gathered into `mod_boot.conf` (loaded by the kernel) and
//! `mod_user.conf` (loaded from userspace), both installed into the initrd
//! and sysroot.

use anyhow::{Context, Result};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::conf::{ConfFile, Syntax};

pub const BOOT_CONF: &str = "mod_boot.conf";
pub const USER_CONF: &str = "mod_user.conf";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModPriority {
    Required,
    High,
    Low,
}

impl ModPriority {
    pub fn from_keyword(s: &str) -> Option<Self> {
        match s {
            "REQUIRED" => Some(Self::Required),
            "HIGH" => Some(Self::High),
            "LOW" => Some(Self::Low),
            _ => None,
        }
    }
}

impl fmt::Display for ModPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModPriority::Required => write!(f, "REQUIRED"),
            ModPriority::High => write!(f, "HIGH"),
            ModPriority::Low => write!(f, "LOW"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModLoad {
    Boottime,
    Userspace,
}

impl ModLoad {
    pub fn from_keyword(s: &str) -> Option<Self> {
        match s {
            "BOOTTIME" => Some(Self::Boottime),
            "USERSPACE" => Some(Self::Userspace),
            _ => None,
        }
    }
}

/// Why a module config was left out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    UnknownPriority(String),
    UnknownLoadTime(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::UnknownPriority(p) => write!(f, "Unknown priority: {}", p),
            SkipReason::UnknownLoadTime(m) => write!(f, "Unknown module load time: {}", m),
        }
    }
}

/// Collected module lists, in first-seen order.
#[derive(Debug, Clone, Default)]
pub struct ModuleLists {
    pub boot: Vec<(String, ModPriority)>,
    pub user: Vec<(String, ModPriority)>,
    pub skipped: Vec<(PathBuf, SkipReason)>,
}

impl ModuleLists {
    /// Add one parsed module config.
    pub fn add(&mut self, source: &Path, conf: &ConfFile) {
        let name = conf.get("FILENAME").unwrap_or_default().to_string();
        let priority = conf.get("PRIORITY").unwrap_or_default();
        let modload = conf.get("MODLOAD").unwrap_or_default();

        let Some(priority) = ModPriority::from_keyword(priority) else {
            self.skipped.push((
                source.to_path_buf(),
                SkipReason::UnknownPriority(priority.to_string()),
            ));
            return;
        };

        let list = match ModLoad::from_keyword(modload) {
            Some(ModLoad::Boottime) => &mut self.boot,
            Some(ModLoad::Userspace) => &mut self.user,
            None => {
                self.skipped.push((
                    source.to_path_buf(),
                    SkipReason::UnknownLoadTime(modload.to_string()),
                ));
                return;
            }
        };

        // Same filename again: newer priority, original position.
        match list.iter_mut().find(|(n, _)| *n == name) {
            Some(existing) => existing.1 = priority,
            None => list.push((name, priority)),
        }
    }
}

/// Read every `*/*.conf` directly below `dir`, sorted by path.
pub fn collect(dir: &Path) -> Result<ModuleLists> {
    let mut lists = ModuleLists::default();

    for entry in WalkDir::new(dir)
        .min_depth(2)
        .max_depth(2)
        .sort_by_file_name()
    {
        let entry = entry.with_context(|| format!("Failed to read {}", dir.display()))?;
        let path = entry.path();
        if !entry.file_type().is_file() || path.extension().map_or(true, |e| e != "conf") {
            continue;
        }

        println!("Assembling {} configuration...", path.display());
        let conf = ConfFile::read(path, Syntax::Spaced)?;
        lists.add(path, &conf);
    }

    Ok(lists)
}

/// Render one list in the loader's block format.
pub fn render(modules: &[(String, ModPriority)]) -> String {
    let mut out = String::from("CONF_START\n");
    for (name, priority) in modules {
        out.push_str("MOD_START\n");
        out.push_str(&format!("FILENAME {}\n", name));
        out.push_str(&format!("PRIORITY {}\n", priority));
        out.push_str("MOD_END\n");
    }
    out.push_str("CONF_END\n");
    out
}

/// Write `mod_boot.conf` and `mod_user.conf` into `dir`.
pub fn write(dir: &Path, lists: &ModuleLists) -> Result<()> {
    for (file, modules, label) in [
        (BOOT_CONF, &lists.boot, "boottime"),
        (USER_CONF, &lists.user, "userspace"),
    ] {
        println!("Creating {} {} modules...", modules.len(), label);
        let path = dir.join(file);
        fs::write(&path, render(modules))
            .with_context(|| format!("Failed to write {}", path.display()))?;
    }
    Ok(())
}

//! Driver manifest (`driver_conf.json`) consumed by the kernel's driver loader.
//!
//! ```json
//! {"version":1,"drivers":[{"filename":"ahci.sys","priority":0,"environment":0,"load_before":["ext2.sys"]}]}
//! ```
//!
//! The `drivers` array is the load order. Priority and environment are the
//! numeric codes from `loader/driver.h`.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::driver::{DriverRecord, Environment, Priority};

/// Manifest layout version understood by the loader.
pub const MANIFEST_VERSION: u32 = 1;

/// Default manifest filename, as the initrd expects it.
pub const DEFAULT_MANIFEST_NAME: &str = "driver_conf.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub filename: String,
    pub priority: u8,
    pub environment: u8,
    #[serde(default)]
    pub load_before: Vec<String>,
}

impl From<&DriverRecord> for ManifestEntry {
    fn from(record: &DriverRecord) -> Self {
        Self {
            filename: record.name.clone(),
            priority: record.priority.code(),
            environment: record.environment.code(),
            load_before: record.load_before.clone(),
        }
    }
}

impl ManifestEntry {
    pub fn priority(&self) -> Option<Priority> {
        Priority::from_code(self.priority)
    }

    pub fn environment(&self) -> Option<Environment> {
        Environment::from_code(self.environment)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriverManifest {
    pub version: u32,
    pub drivers: Vec<ManifestEntry>,
}

impl DriverManifest {
    /// Build a manifest from solver output. Entry order is load order.
    pub fn from_order<'a>(order: impl IntoIterator<Item = &'a DriverRecord>) -> Self {
        Self {
            version: MANIFEST_VERSION,
            drivers: order.into_iter().map(ManifestEntry::from).collect(),
        }
    }

    pub fn to_json(&self, pretty: bool) -> Result<String> {
        let json = if pretty {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        };
        Ok(json)
    }

    /// Save manifest to a JSON file.
    pub fn save(&self, path: &Path, pretty: bool) -> Result<()> {
        let json = self.to_json(pretty)?;
        fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }

    /// Load manifest from a JSON file, rejecting layouts we don't know.
    pub fn load(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let manifest: Self = serde_json::from_str(&json)
            .with_context(|| format!("{} is not a driver manifest", path.display()))?;
        if manifest.version != MANIFEST_VERSION {
            bail!(
                "{}: unsupported manifest version {} (expected {})",
                path.display(),
                manifest.version,
                MANIFEST_VERSION
            );
        }
        Ok(manifest)
    }

    /// Print the load order as a table.
    pub fn print(&self) {
        println!("Driver manifest v{} ({} drivers):", self.version, self.drivers.len());
        for (i, entry) in self.drivers.iter().enumerate() {
            let priority = entry
                .priority()
                .map(|p| p.to_string())
                .unwrap_or_else(|| format!("?{}", entry.priority));
            let environment = entry
                .environment()
                .map(|e| e.to_string())
                .unwrap_or_else(|| format!("?{}", entry.environment));
            print!(
                "  {:>3}. {:<24} {:<8} {:<7}",
                i + 1,
                entry.filename,
                priority,
                environment
            );
            if entry.load_before.is_empty() {
                println!();
            } else {
                println!(" before {}", entry.load_before.join(", "));
            }
        }
    }
}

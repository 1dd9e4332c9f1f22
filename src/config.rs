//! Configuration management for hexbuild.
//!
//! Reads configuration from a `.env` file in the base directory and from the
//! process environment. Environment variables take precedence over `.env`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::initrd::DEFAULT_INITRD_NAME;
use crate::manifest::DEFAULT_MANIFEST_NAME;

/// Hexbuild configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory the build was invoked from; relative paths resolve here.
    pub base_dir: PathBuf,
    /// Root of the driver tree (default: drivers)
    pub drivers_dir: PathBuf,
    /// Kernel modules directory (default: source/kmods)
    pub kmods_dir: PathBuf,
    /// Explicit CONFIG.h location; otherwise it is searched for.
    pub config_header: Option<PathBuf>,
    /// Driver manifest output (default: driver_conf.json)
    pub driver_manifest: PathBuf,
    /// Initrd archive output (default: initrd.tar)
    pub initrd_output: PathBuf,
}

impl Config {
    /// Load configuration from `<base_dir>/.env` and the environment.
    pub fn load(base_dir: &Path) -> Self {
        let mut env_vars = HashMap::new();

        let env_path = base_dir.join(".env");
        if let Ok(iter) = dotenvy::from_path_iter(&env_path) {
            for item in iter {
                match item {
                    Ok((key, value)) => {
                        env_vars.insert(key, value);
                    }
                    Err(e) => {
                        eprintln!("WARNING: ignoring bad line in {}: {}", env_path.display(), e);
                    }
                }
            }
        }

        // Environment variables override .env file
        for (key, value) in std::env::vars() {
            env_vars.insert(key, value);
        }

        Self::from_vars(base_dir, &env_vars)
    }

    /// Build a config from an explicit variable map.
    pub fn from_vars(base_dir: &Path, vars: &HashMap<String, String>) -> Self {
        let path = |key: &str, default: &str| {
            let value = vars
                .get(key)
                .map(String::as_str)
                .filter(|v| !v.is_empty())
                .unwrap_or(default);
            resolve(base_dir, value)
        };

        Self {
            base_dir: base_dir.to_path_buf(),
            drivers_dir: path("DRIVERS_DIR", "drivers"),
            kmods_dir: path("KMODS_DIR", "source/kmods"),
            config_header: vars
                .get("CONFIG_HEADER")
                .filter(|v| !v.is_empty())
                .map(|v| resolve(base_dir, v)),
            driver_manifest: path("DRIVER_MANIFEST", DEFAULT_MANIFEST_NAME),
            initrd_output: path("INITRD_OUTPUT", DEFAULT_INITRD_NAME),
        }
    }

    /// Print configuration for debugging.
    pub fn print(&self) {
        println!("Configuration:");
        println!("  base directory: {}", self.base_dir.display());
        println!("  DRIVERS_DIR: {}", self.drivers_dir.display());
        println!("  KMODS_DIR: {}", self.kmods_dir.display());
        match &self.config_header {
            Some(header) => println!("  CONFIG_HEADER: {}", header.display()),
            None => println!("  CONFIG_HEADER: (auto)"),
        }
        println!("  DRIVER_MANIFEST: {}", self.driver_manifest.display());
        println!("  INITRD_OUTPUT: {}", self.initrd_output.display());
        if self.drivers_dir.is_dir() {
            println!("  Drivers tree: FOUND");
        } else {
            println!("  Drivers tree: NOT FOUND");
        }
    }
}

/// Relative paths are taken from `base_dir`.
fn resolve(base_dir: &Path, value: &str) -> PathBuf {
    let path = PathBuf::from(value);
    if path.is_absolute() {
        path
    } else {
        base_dir.join(path)
    }
}

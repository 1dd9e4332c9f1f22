//! Show command - displays information.

use anyhow::Result;
use std::path::PathBuf;

use crate::config::Config;
use crate::initrd;
use crate::manifest::DriverManifest;

/// Show target for the show command.
pub enum ShowTarget {
    /// Show configuration
    Config,
    /// Show a driver manifest's load order
    Manifest { path: Option<PathBuf> },
    /// List initrd contents
    Initrd { path: Option<PathBuf> },
}

/// Execute the show command.
pub fn cmd_show(target: ShowTarget, config: &Config) -> Result<()> {
    match target {
        ShowTarget::Config => {
            config.print();
        }
        ShowTarget::Manifest { path } => {
            let path = path.unwrap_or_else(|| config.driver_manifest.clone());
            DriverManifest::load(&path)?.print();
        }
        ShowTarget::Initrd { path } => {
            let path = path.unwrap_or_else(|| config.initrd_output.clone());
            let entries = initrd::list(&path)?;
            println!("Contents of {} ({} entries):", path.display(), entries.len());
            for entry in entries {
                println!("  {}", entry);
            }
        }
    }
    Ok(())
}

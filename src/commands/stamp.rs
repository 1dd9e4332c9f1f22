//! Stamp command - bumps the build number and date in CONFIG.h.

use anyhow::{bail, Result};
use std::path::Path;

use crate::config::Config;
use crate::stamp::{self, BuildConfiguration};

/// Execute the stamp command.
pub fn cmd_stamp(
    config: &Config,
    configuration: BuildConfiguration,
    header: Option<&Path>,
) -> Result<()> {
    println!(
        "You are currently building reduceOS as a {} build.",
        configuration.to_string().to_lowercase()
    );

    let header = match header.or(config.config_header.as_deref()) {
        Some(path) => path.to_path_buf(),
        None => stamp::locate_header(&config.base_dir),
    };
    if !header.exists() {
        bail!("Config header not found: {}", header.display());
    }

    let now = chrono::Local::now().naive_local();
    let stamp = stamp::bump_file(&header, configuration, now)?;

    println!("Build number: {}", stamp.number);
    println!("Build date: {}", stamp.date);
    Ok(())
}

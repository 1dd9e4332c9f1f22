//! Drivers command - builds the driver manifest.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::driver::{self, DriverSet};
use crate::manifest::DriverManifest;
use crate::order;

/// Execute the drivers command.
///
/// Reads each directory's `driver.conf`, orders the drivers and writes the
/// manifest. Any config error or cycle aborts before anything is written.
pub fn cmd_drivers(dirs: &[PathBuf], output: &Path, pretty: bool) -> Result<()> {
    let parsed = driver::read_driver_dirs(dirs)?;

    for warning in parsed.iter().flat_map(|p| &p.warnings) {
        eprintln!("WARNING: {}", warning);
    }

    let records = parsed.into_iter().map(|p| p.record).collect();
    let set = DriverSet::new(records).context("Invalid driver configuration")?;
    let order = order::solve(&set).context("Cannot order drivers")?;

    for record in &order {
        println!(
            "-- {} will be loaded with priority {} and environment {}",
            record.name, record.priority, record.environment
        );
    }

    let manifest = DriverManifest::from_order(order);
    manifest.save(output, pretty)?;
    println!(
        "Wrote {} drivers to {}",
        manifest.drivers.len(),
        output.display()
    );

    Ok(())
}

//! Check command - lints driver configs.

use anyhow::{bail, Result};
use std::path::PathBuf;

use crate::check;

/// Execute the check command.
pub fn cmd_check(dirs: &[PathBuf], strict: bool) -> Result<()> {
    let report = check::check_drivers(dirs);
    report.print();

    if !report.all_passed() {
        if strict {
            bail!(
                "Driver check failed: {} check(s) failed. Fix the configs above.",
                report.fail_count()
            );
        }
        println!("Some checks failed. Use --strict to fail the build.");
    }
    Ok(())
}

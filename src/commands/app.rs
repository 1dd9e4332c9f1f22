//! App-info command - answers one question about a userspace app.

use anyhow::Result;
use std::path::Path;

use crate::appinfo::{self, AppRequest};

/// Execute the app-info command.
pub fn cmd_app_info(dir: &Path, request: AppRequest) -> Result<()> {
    if let Some(answer) = appinfo::query_dir(dir, request)? {
        println!("{}", answer);
    }
    Ok(())
}

//! Userspace application metadata (`app.conf`).
//!
//! The userspace Makefile queries one field at a time and splices the answer
//! into its own variables, so every answer is a single line (or nothing).

use anyhow::{bail, Result};
use clap::ValueEnum;
use std::path::Path;

use crate::conf::{ConfFile, Syntax};

pub const APP_CONF: &str = "app.conf";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "kebab-case")]
pub enum AppRequest {
    /// Name of the app (required)
    Name,
    /// Where the app is installed (required)
    InstallDir,
    /// CFLAGS to compile the app with
    Cflags,
    /// Extra linker flags / library directories
    Libs,
    /// Additional Makefile targets to run
    Additional,
    /// Prints YES if the app goes into the initrd's /bin
    Initrd,
}

impl AppRequest {
    fn key(self) -> &'static str {
        match self {
            AppRequest::Name => "APP_NAME",
            AppRequest::InstallDir => "INSTALL_DIR",
            AppRequest::Cflags => "CFLAGS",
            AppRequest::Libs => "LIBS",
            AppRequest::Additional => "ADDITIONAL",
            AppRequest::Initrd => "INITRD",
        }
    }
}

/// Answer a request against parsed `app.conf` contents.
///
/// `Ok(None)` means "print nothing".
pub fn query(conf: &ConfFile, request: AppRequest) -> Result<Option<String>> {
    let key = request.key();
    match request {
        AppRequest::Name | AppRequest::InstallDir => match conf.get_unquoted(key) {
            Some(value) => Ok(Some(value)),
            None => bail!("{} not found in {}", key, APP_CONF),
        },
        AppRequest::Cflags | AppRequest::Libs | AppRequest::Additional => {
            Ok(conf.get(key).map(str::to_string))
        }
        AppRequest::Initrd => Ok(conf.has(key).then(|| "YES".to_string())),
    }
}

/// Read `<dir>/app.conf` and answer `request`.
pub fn query_dir(dir: &Path, request: AppRequest) -> Result<Option<String>> {
    let path = dir.join(APP_CONF);
    if !path.exists() {
        bail!("{} not found in {}", APP_CONF, dir.display());
    }
    let conf = ConfFile::read(&path, Syntax::Assign)?;
    query(&conf, request)
}

//! Shared test utilities for hexbuild tests.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// Test environment: a scratch source tree with a drivers directory.
pub struct TestEnv {
    /// Temporary directory (kept alive for lifetime of TestEnv)
    pub _temp_dir: TempDir,
    /// Root of the simulated source tree
    pub base_dir: PathBuf,
    /// `drivers/` under the base directory
    pub drivers: PathBuf,
}

impl TestEnv {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let base_dir = temp_dir.path().to_path_buf();
        let drivers = base_dir.join("drivers");
        fs::create_dir_all(&drivers).expect("Failed to create drivers dir");

        Self {
            _temp_dir: temp_dir,
            base_dir,
            drivers,
        }
    }

    /// Create `drivers/<rel>/driver.conf` with the given body.
    pub fn driver(&self, rel: &str, conf: &str) -> PathBuf {
        let dir = self.drivers.join(rel);
        fs::create_dir_all(&dir).expect("Failed to create driver dir");
        fs::write(dir.join("driver.conf"), conf).expect("Failed to write driver.conf");
        dir
    }

    /// Create a well-formed driver with optional LOAD_BEFORE targets.
    pub fn simple_driver(&self, rel: &str, filename: &str, before: &[&str]) -> PathBuf {
        let mut conf = format!(
            "FILENAME = \"{}\"\nPRIORITY = CRITICAL\nENVIRONMENT = NORMAL\nARCH = ANY\n",
            filename
        );
        if !before.is_empty() {
            conf.push_str(&format!("LOAD_BEFORE = {}\n", before.join(", ")));
        }
        self.driver(rel, &conf)
    }

    /// Write an arbitrary file below the base directory.
    pub fn write(&self, rel: &str, content: &str) -> PathBuf {
        let path = self.base_dir.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent dir");
        }
        fs::write(&path, content).expect("Failed to write file");
        path
    }

    /// Run the hexbuild binary with the base directory as working directory.
    pub fn hexbuild(&self, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_hexbuild"))
            .args(args)
            .current_dir(&self.base_dir)
            .env_remove("DRIVERS_DIR")
            .env_remove("KMODS_DIR")
            .env_remove("CONFIG_HEADER")
            .env_remove("DRIVER_MANIFEST")
            .env_remove("INITRD_OUTPUT")
            .output()
            .expect("Failed to run hexbuild")
    }
}

pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

/// Assert that a file exists.
pub fn assert_file_exists(path: &Path) {
    assert!(path.exists(), "Expected file to exist: {}", path.display());
}

/// Assert that a file contains specific content.
pub fn assert_file_contains(path: &Path, content: &str) {
    let file_content = fs::read_to_string(path)
        .unwrap_or_else(|_| panic!("Failed to read file: {}", path.display()));
    assert!(
        file_content.contains(content),
        "File {} does not contain '{}'\nActual content:\n{}",
        path.display(),
        content,
        file_content
    );
}

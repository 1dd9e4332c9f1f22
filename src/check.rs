//! Driver configuration checks.
//!
//! Runs the same reading, validation and ordering as `hexbuild drivers`, but
//! reports every problem it can find instead of stopping at the first one,
//! and writes nothing.

use std::path::Path;

use crate::driver::{self, DriverSet};
use crate::order;

/// Result of a single check.
#[derive(Debug, Clone)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub details: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckStatus {
    /// Check passed.
    Pass,
    /// Check failed - the manifest step will fail.
    Fail,
    /// Check passed but with a warning.
    Warn,
    /// Check skipped (earlier failures make it meaningless).
    Skip,
}

impl CheckResult {
    pub fn pass(name: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Pass,
            details: None,
        }
    }

    pub fn pass_with(name: &str, details: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Pass,
            details: Some(details.to_string()),
        }
    }

    pub fn fail(name: &str, details: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Fail,
            details: Some(details.to_string()),
        }
    }

    pub fn warn(name: &str, details: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Warn,
            details: Some(details.to_string()),
        }
    }

    pub fn skip(name: &str, details: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Skip,
            details: Some(details.to_string()),
        }
    }
}

/// Results of all checks.
pub struct CheckReport {
    pub checks: Vec<CheckResult>,
}

impl CheckReport {
    /// Returns true if no check failed.
    pub fn all_passed(&self) -> bool {
        self.fail_count() == 0
    }

    fn count(&self, status: CheckStatus) -> usize {
        self.checks.iter().filter(|c| c.status == status).count()
    }

    pub fn fail_count(&self) -> usize {
        self.count(CheckStatus::Fail)
    }

    pub fn warn_count(&self) -> usize {
        self.count(CheckStatus::Warn)
    }

    /// Print the report to stdout.
    pub fn print(&self) {
        println!("=== Driver Check Results ===\n");

        for check in &self.checks {
            let status_str = match check.status {
                CheckStatus::Pass => "PASS",
                CheckStatus::Fail => "FAIL",
                CheckStatus::Warn => "WARN",
                CheckStatus::Skip => "SKIP",
            };

            print!("  [{}] {}", status_str, check.name);
            if let Some(details) = &check.details {
                println!(": {}", details);
            } else {
                println!();
            }
        }

        println!();
        let total = self.checks.len();
        let passed = self.count(CheckStatus::Pass);
        let failed = self.fail_count();
        let warned = self.warn_count();

        println!("Summary: {}/{} passed", passed, total);
        if failed > 0 {
            println!("         {} FAILED - manifest generation will not succeed", failed);
        }
        if warned > 0 {
            println!("         {} warnings", warned);
        }
    }
}

const ORDER_CHECK: &str = "load order";

/// Check every driver directory.
pub fn check_drivers<P: AsRef<Path>>(dirs: &[P]) -> CheckReport {
    let mut checks = Vec::new();
    let mut records = Vec::new();
    let mut unreadable = false;

    for dir in dirs {
        let dir = dir.as_ref();
        let label = dir.display().to_string();
        match driver::read_driver_dir(dir) {
            Ok(parsed) => {
                let name = format!("{} ({})", parsed.record.name, label);
                if parsed.warnings.is_empty() {
                    checks.push(CheckResult::pass(&name));
                } else {
                    let details: Vec<String> =
                        parsed.warnings.iter().map(ToString::to_string).collect();
                    checks.push(CheckResult::warn(&name, &details.join("; ")));
                }
                records.push(parsed.record);
            }
            Err(e) => {
                unreadable = true;
                checks.push(CheckResult::fail(&label, &format!("{:#}", e)));
            }
        }
    }

    let problems = driver::find_problems(&records);
    for problem in &problems {
        checks.push(CheckResult::fail("constraints", &problem.to_string()));
    }

    if !problems.is_empty() {
        checks.push(CheckResult::skip(ORDER_CHECK, "constraints are invalid"));
    } else {
        match DriverSet::new(records) {
            Ok(set) => match order::solve(&set) {
                Ok(order) => {
                    let names: Vec<&str> = order.iter().map(|r| r.name.as_str()).collect();
                    let details = if unreadable {
                        format!("{} (unreadable configs excluded)", names.join(" -> "))
                    } else {
                        names.join(" -> ")
                    };
                    if names.is_empty() {
                        checks.push(CheckResult::pass(ORDER_CHECK));
                    } else {
                        checks.push(CheckResult::pass_with(ORDER_CHECK, &details));
                    }
                }
                Err(e) => checks.push(CheckResult::fail(ORDER_CHECK, &e.to_string())),
            },
            Err(e) => checks.push(CheckResult::fail(ORDER_CHECK, &e.to_string())),
        }
    }

    CheckReport { checks }
}

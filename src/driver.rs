//! Driver records, `driver.conf` reading and validation.
//!
//! Every driver directory carries a `driver.conf`:
//!
//! ```text
//! FILENAME = "ahci.sys"
//! PRIORITY = CRITICAL
//! ENVIRONMENT = NORMAL
//! ARCH = I386 OR X86_64
//! LOAD_BEFORE = ext2.sys, fat.sys
//! ```
//!
//! Reading is lenient where a bad value is survivable (unknown `PRIORITY` or
//! `ENVIRONMENT` fall back to a safe default and produce a [`ConfWarning`])
//! and strict where it is not (missing file, missing `FILENAME`). Set-level
//! problems (duplicates, self or unknown references) are caught by
//! [`validate`] before anything is ordered.

use anyhow::{bail, Result};
use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::conf::{ConfFile, Syntax};

/// Name of the per-directory driver config.
pub const DRIVER_CONF: &str = "driver.conf";

/// What the loader does when the driver fails to load.
///
/// Codes must stay in sync with `DRIVER_CRITICAL`/`DRIVER_WARN`/`DRIVER_IGNORE`
/// in the kernel's `loader/driver.h`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Priority {
    /// Panic if load fails.
    Critical = 0,
    /// Warn the user if load fails.
    Warn = 1,
    /// Ignore if load fails.
    Ignore = 2,
}

impl Priority {
    /// Fallback for missing or unrecognized values.
    pub const DEFAULT: Priority = Priority::Ignore;

    pub fn from_keyword(s: &str) -> Option<Self> {
        match s {
            "CRITICAL" => Some(Self::Critical),
            "WARN" => Some(Self::Warn),
            "IGNORE" => Some(Self::Ignore),
            _ => None,
        }
    }

    pub const fn code(self) -> u8 {
        self as u8
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Critical),
            1 => Some(Self::Warn),
            2 => Some(Self::Ignore),
            _ => None,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Priority::Critical => write!(f, "CRITICAL"),
            Priority::Warn => write!(f, "WARN"),
            Priority::Ignore => write!(f, "IGNORE"),
        }
    }
}

/// When in the boot sequence a driver may be loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Environment {
    /// Regular driver load phase.
    Normal = 0,
    /// Before the normal phase.
    Preload = 1,
    /// Either phase.
    Any = 2,
}

impl Environment {
    /// Fallback for missing or unrecognized values.
    pub const DEFAULT: Environment = Environment::Normal;

    pub fn from_keyword(s: &str) -> Option<Self> {
        match s {
            "NORMAL" => Some(Self::Normal),
            "PRELOAD" => Some(Self::Preload),
            "ANY" => Some(Self::Any),
            _ => None,
        }
    }

    pub const fn code(self) -> u8 {
        self as u8
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Normal),
            1 => Some(Self::Preload),
            2 => Some(Self::Any),
            _ => None,
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Environment::Normal => write!(f, "NORMAL"),
            Environment::Preload => write!(f, "PRELOAD"),
            Environment::Any => write!(f, "ANY"),
        }
    }
}

/// One discoverable driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverRecord {
    /// Output filename; unique across the set.
    pub name: String,
    pub priority: Priority,
    pub environment: Environment,
    /// Drivers that must be loaded strictly after this one. No duplicates.
    pub load_before: Vec<String>,
}

impl DriverRecord {
    /// Record with default priority/environment and no constraints.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            priority: Priority::DEFAULT,
            environment: Environment::DEFAULT,
            load_before: Vec::new(),
        }
    }

    /// Builder-style helper to add a "load before" constraint.
    pub fn before(mut self, other: impl Into<String>) -> Self {
        let other = other.into();
        if !self.load_before.contains(&other) {
            self.load_before.push(other);
        }
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    /// Build a record from a parsed `driver.conf`.
    ///
    /// `source` is only used in error messages.
    pub fn from_conf(conf: &ConfFile, source: &Path) -> Result<(Self, Vec<ConfWarning>)> {
        let Some(name) = conf.get_unquoted("FILENAME").filter(|n| !n.is_empty()) else {
            bail!("{}: missing FILENAME", source.display());
        };

        let mut warnings = Vec::new();

        let priority = match conf.get("PRIORITY") {
            Some(value) => Priority::from_keyword(value).unwrap_or_else(|| {
                warnings.push(ConfWarning::UnknownPriority {
                    driver: name.clone(),
                    value: value.to_string(),
                });
                Priority::DEFAULT
            }),
            None => {
                warnings.push(ConfWarning::MissingPriority {
                    driver: name.clone(),
                });
                Priority::DEFAULT
            }
        };

        let environment = match conf.get("ENVIRONMENT") {
            Some(value) => Environment::from_keyword(value).unwrap_or_else(|| {
                warnings.push(ConfWarning::UnknownEnvironment {
                    driver: name.clone(),
                    value: value.to_string(),
                });
                Environment::DEFAULT
            }),
            None => {
                warnings.push(ConfWarning::MissingEnvironment {
                    driver: name.clone(),
                });
                Environment::DEFAULT
            }
        };

        let mut load_before: Vec<String> = Vec::new();
        for target in conf.get_list("LOAD_BEFORE") {
            if !load_before.contains(&target) {
                load_before.push(target);
            }
        }

        let record = Self {
            name,
            priority,
            environment,
            load_before,
        };
        Ok((record, warnings))
    }
}

/// A record read from disk along with where it came from.
#[derive(Debug, Clone)]
pub struct ParsedDriver {
    pub dir: PathBuf,
    pub record: DriverRecord,
    pub warnings: Vec<ConfWarning>,
}

/// Read `<dir>/driver.conf`. A missing file is an error, never a skip.
pub fn read_driver_dir(dir: &Path) -> Result<ParsedDriver> {
    let conf_path = dir.join(DRIVER_CONF);
    let conf = ConfFile::read(&conf_path, Syntax::Assign)?;
    let (record, warnings) = DriverRecord::from_conf(&conf, &conf_path)?;
    Ok(ParsedDriver {
        dir: dir.to_path_buf(),
        record,
        warnings,
    })
}

/// Read every directory, stopping at the first unreadable config.
pub fn read_driver_dirs<P: AsRef<Path>>(dirs: &[P]) -> Result<Vec<ParsedDriver>> {
    dirs.iter().map(|d| read_driver_dir(d.as_ref())).collect()
}

/// Non-fatal problem found while reading a `driver.conf`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfWarning {
    UnknownPriority { driver: String, value: String },
    MissingPriority { driver: String },
    UnknownEnvironment { driver: String, value: String },
    MissingEnvironment { driver: String },
}

impl fmt::Display for ConfWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfWarning::UnknownPriority { driver, value } => write!(
                f,
                "Driver \"{}\" has unrecognized priority \"{}\". Assuming {}",
                driver,
                value,
                Priority::DEFAULT
            ),
            ConfWarning::MissingPriority { driver } => write!(
                f,
                "Driver \"{}\" has no PRIORITY. Assuming {}",
                driver,
                Priority::DEFAULT
            ),
            ConfWarning::UnknownEnvironment { driver, value } => write!(
                f,
                "Driver \"{}\" has unrecognized environment \"{}\". Assuming {}",
                driver,
                value,
                Environment::DEFAULT
            ),
            ConfWarning::MissingEnvironment { driver } => write!(
                f,
                "Driver \"{}\" has no ENVIRONMENT. Assuming {}",
                driver,
                Environment::DEFAULT
            ),
        }
    }
}

// =============================================================================
// Validation
// =============================================================================

/// A driver set that cannot be ordered as written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Two records share a filename.
    DuplicateName { name: String },
    /// A driver lists itself in LOAD_BEFORE.
    SelfReference { name: String },
    /// LOAD_BEFORE names a driver that is not part of the build.
    UnknownReference { driver: String, target: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::DuplicateName { name } => {
                write!(f, "duplicate driver name \"{}\"", name)
            }
            ConfigError::SelfReference { name } => {
                write!(f, "driver \"{}\" lists itself in LOAD_BEFORE", name)
            }
            ConfigError::UnknownReference { driver, target } => write!(
                f,
                "driver \"{}\" must load before \"{}\", but no such driver is being built",
                driver, target
            ),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Every set-level problem, in input order.
pub fn find_problems(records: &[DriverRecord]) -> Vec<ConfigError> {
    let mut problems = Vec::new();

    let mut seen = HashSet::new();
    for record in records {
        if !seen.insert(record.name.as_str()) {
            problems.push(ConfigError::DuplicateName {
                name: record.name.clone(),
            });
        }
    }

    for record in records {
        for target in &record.load_before {
            if *target == record.name {
                problems.push(ConfigError::SelfReference {
                    name: record.name.clone(),
                });
            } else if !seen.contains(target.as_str()) {
                problems.push(ConfigError::UnknownReference {
                    driver: record.name.clone(),
                    target: target.clone(),
                });
            }
        }
    }

    problems
}

/// Fail on the first set-level problem.
pub fn validate(records: &[DriverRecord]) -> Result<(), ConfigError> {
    match find_problems(records).into_iter().next() {
        Some(problem) => Err(problem),
        None => Ok(()),
    }
}

/// A validated set of drivers: unique names, every reference resolvable,
/// no self-constraints. Input order is preserved.
#[derive(Debug, Clone, Default)]
pub struct DriverSet {
    records: Vec<DriverRecord>,
}

impl DriverSet {
    pub fn new(records: Vec<DriverRecord>) -> Result<Self, ConfigError> {
        validate(&records)?;
        Ok(Self { records })
    }

    pub fn records(&self) -> &[DriverRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conf(text: &str) -> ConfFile {
        ConfFile::parse(text, Syntax::Assign)
    }

    #[test]
    fn test_full_record() {
        let (record, warnings) = DriverRecord::from_conf(
            &conf("FILENAME = \"ahci.sys\"\nPRIORITY = WARN\nENVIRONMENT = PRELOAD\nLOAD_BEFORE = ext2.sys, fat.sys, ext2.sys\n"),
            Path::new("ahci/driver.conf"),
        )
        .unwrap();

        assert!(warnings.is_empty());
        assert_eq!(record.name, "ahci.sys");
        assert_eq!(record.priority, Priority::Warn);
        assert_eq!(record.environment, Environment::Preload);
        assert_eq!(record.load_before, vec!["ext2.sys", "fat.sys"]);
    }

    #[test]
    fn test_unknown_priority_defaults_to_ignore() {
        let (record, warnings) = DriverRecord::from_conf(
            &conf("FILENAME = x.sys\nPRIORITY = URGENT\nENVIRONMENT = ANY\n"),
            Path::new("x/driver.conf"),
        )
        .unwrap();

        assert_eq!(record.priority, Priority::Ignore);
        assert_eq!(
            warnings,
            vec![ConfWarning::UnknownPriority {
                driver: "x.sys".into(),
                value: "URGENT".into()
            }]
        );
        assert_eq!(
            warnings[0].to_string(),
            "Driver \"x.sys\" has unrecognized priority \"URGENT\". Assuming IGNORE"
        );
    }

    #[test]
    fn test_missing_fields_default_with_warnings() {
        let (record, warnings) =
            DriverRecord::from_conf(&conf("FILENAME = x.sys\n"), Path::new("x/driver.conf"))
                .unwrap();

        assert_eq!(record.priority, Priority::Ignore);
        assert_eq!(record.environment, Environment::Normal);
        assert!(record.load_before.is_empty());
        assert_eq!(warnings.len(), 2);
    }

    #[test]
    fn test_keywords_are_case_sensitive() {
        let (record, warnings) = DriverRecord::from_conf(
            &conf("FILENAME = x.sys\nPRIORITY = CRITICAL\nENVIRONMENT = preload\n"),
            Path::new("x/driver.conf"),
        )
        .unwrap();

        assert_eq!(record.environment, Environment::Normal);
        assert!(matches!(
            warnings.as_slice(),
            [ConfWarning::UnknownEnvironment { .. }]
        ));
    }

    #[test]
    fn test_missing_filename_is_fatal() {
        let err = DriverRecord::from_conf(&conf("PRIORITY = WARN\n"), Path::new("x/driver.conf"))
            .unwrap_err();
        assert!(err.to_string().contains("missing FILENAME"));
    }

    #[test]
    fn test_codes_match_loader_header() {
        assert_eq!(Priority::Critical.code(), 0);
        assert_eq!(Priority::Warn.code(), 1);
        assert_eq!(Priority::Ignore.code(), 2);
        assert_eq!(Environment::Normal.code(), 0);
        assert_eq!(Environment::Preload.code(), 1);
        assert_eq!(Environment::Any.code(), 2);
        assert_eq!(Priority::from_code(3), None);
        assert_eq!(Environment::from_code(1), Some(Environment::Preload));
    }

    #[test]
    fn test_validate_rejects_unknown_reference() {
        let records = vec![DriverRecord::new("x").before("y")];
        assert_eq!(
            validate(&records),
            Err(ConfigError::UnknownReference {
                driver: "x".into(),
                target: "y".into()
            })
        );
    }

    #[test]
    fn test_validate_rejects_self_reference() {
        let records = vec![DriverRecord::new("a").before("a")];
        assert_eq!(
            validate(&records),
            Err(ConfigError::SelfReference { name: "a".into() })
        );
    }

    #[test]
    fn test_find_problems_reports_everything() {
        let records = vec![
            DriverRecord::new("a").before("ghost"),
            DriverRecord::new("b").before("b"),
            DriverRecord::new("a"),
        ];
        let problems = find_problems(&records);
        assert_eq!(
            problems,
            vec![
                ConfigError::DuplicateName { name: "a".into() },
                ConfigError::UnknownReference {
                    driver: "a".into(),
                    target: "ghost".into()
                },
                ConfigError::SelfReference { name: "b".into() },
            ]
        );
    }

    #[test]
    fn test_driver_set_accepts_valid_input() {
        let set = DriverSet::new(vec![
            DriverRecord::new("disk").before("fs"),
            DriverRecord::new("fs"),
        ])
        .unwrap();
        assert_eq!(set.len(), 2);
        assert!(DriverSet::new(Vec::new()).unwrap().is_empty());
    }
}

//! Build number / date stamp in the kernel's `CONFIG.h`.
//!
//! The header carries three string macros that the kernel prints at boot:
//!
//! ```c
//! #define BUILD_NUMBER "41"
//! #define BUILD_DATE "10/18/26, 13:05:00"
//! #define BUILD_CONFIGURATION "DEBUG"
//! ```
//!
//! Every build increments the number and rewrites the other two.

use anyhow::{bail, Context, Result};
use chrono::NaiveDateTime;
use clap::ValueEnum;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

pub const BUILD_NUMBER: &str = "BUILD_NUMBER";
pub const BUILD_DATE: &str = "BUILD_DATE";
pub const BUILD_CONFIGURATION: &str = "BUILD_CONFIGURATION";

/// `strftime` layout of `BUILD_DATE`.
pub const DATE_FORMAT: &str = "%m/%d/%y, %H:%M:%S";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BuildConfiguration {
    Release,
    Debug,
}

impl fmt::Display for BuildConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildConfiguration::Release => write!(f, "RELEASE"),
            BuildConfiguration::Debug => write!(f, "DEBUG"),
        }
    }
}

/// The values written by one bump.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildStamp {
    pub number: u64,
    pub date: String,
    pub configuration: BuildConfiguration,
}

/// Find CONFIG.h from the top of the tree, or from the kernel directory
/// when invoked by the kernel Makefile.
pub fn locate_header(base_dir: &Path) -> PathBuf {
    if base_dir.join("source").exists() {
        base_dir.join("source/kernel/include/CONFIG.h")
    } else {
        base_dir.join("include/CONFIG.h")
    }
}

fn define_name(line: &str) -> Option<&str> {
    let rest = line.trim_start().strip_prefix("#define")?;
    rest.split_whitespace().next()
}

fn define_line(name: &str, value: &str) -> String {
    format!("#define {} \"{}\"", name, value)
}

/// Apply a bump to header text. Pure; the caller handles I/O.
pub fn bump(
    text: &str,
    configuration: BuildConfiguration,
    now: NaiveDateTime,
) -> Result<(String, BuildStamp)> {
    let mut lines: Vec<String> = text.lines().map(str::to_string).collect();
    let find = |lines: &[String], name: &str| {
        lines.iter().position(|l| define_name(l) == Some(name))
    };

    let Some(number_idx) = find(&lines, BUILD_NUMBER) else {
        bail!("no #define {} line", BUILD_NUMBER);
    };

    let current = lines[number_idx]
        .trim()
        .splitn(3, char::is_whitespace)
        .nth(2)
        .unwrap_or_default()
        .trim()
        .replace('"', "");
    let number: u64 = current
        .parse()
        .with_context(|| format!("{} is not a number: \"{}\"", BUILD_NUMBER, current))?;
    let number = number + 1;

    let date = now.format(DATE_FORMAT).to_string();

    lines[number_idx] = define_line(BUILD_NUMBER, &number.to_string());

    let date_idx = match find(&lines, BUILD_DATE) {
        Some(idx) => {
            lines[idx] = define_line(BUILD_DATE, &date);
            idx
        }
        None => {
            lines.insert(number_idx + 1, define_line(BUILD_DATE, &date));
            number_idx + 1
        }
    };

    let configuration_line = define_line(BUILD_CONFIGURATION, &configuration.to_string());
    match find(&lines, BUILD_CONFIGURATION) {
        Some(idx) => lines[idx] = configuration_line,
        None => lines.insert(date_idx + 1, configuration_line),
    }

    let mut out = lines.join("\n");
    if text.ends_with('\n') {
        out.push('\n');
    }

    Ok((
        out,
        BuildStamp {
            number,
            date,
            configuration,
        },
    ))
}

/// Bump the stamp in `header` in place.
pub fn bump_file(
    header: &Path,
    configuration: BuildConfiguration,
    now: NaiveDateTime,
) -> Result<BuildStamp> {
    let text = fs::read_to_string(header)
        .with_context(|| format!("Failed to read {}", header.display()))?;
    let (updated, stamp) =
        bump(&text, configuration, now).with_context(|| format!("{}", header.display()))?;
    fs::write(header, updated).with_context(|| format!("Failed to write {}", header.display()))?;
    Ok(stamp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 18)
            .unwrap()
            .and_hms_opt(9, 5, 7)
            .unwrap()
    }

    const HEADER: &str = "#ifndef CONFIG_H\n#define CONFIG_H\n\n#define BUILD_NUMBER \"41\"\n#define BUILD_DATE \"01/01/24, 00:00:00\"\n#define BUILD_CONFIGURATION \"DEBUG\"\n\n#endif\n";

    #[test]
    fn test_bump_rewrites_all_three() {
        let (out, stamp) = bump(HEADER, BuildConfiguration::Release, at()).unwrap();

        assert_eq!(stamp.number, 42);
        assert_eq!(stamp.date, "10/18/26, 09:05:07");
        assert!(out.contains("#define BUILD_NUMBER \"42\"\n"));
        assert!(out.contains("#define BUILD_DATE \"10/18/26, 09:05:07\"\n"));
        assert!(out.contains("#define BUILD_CONFIGURATION \"RELEASE\"\n"));
        assert!(out.starts_with("#ifndef CONFIG_H\n"));
        assert!(out.ends_with("#endif\n"));
        assert_eq!(out.lines().count(), HEADER.lines().count());
    }

    #[test]
    fn test_missing_lines_are_inserted() {
        let (out, _) = bump("#define BUILD_NUMBER \"0\"\n", BuildConfiguration::Debug, at()).unwrap();
        assert_eq!(
            out,
            "#define BUILD_NUMBER \"1\"\n#define BUILD_DATE \"10/18/26, 09:05:07\"\n#define BUILD_CONFIGURATION \"DEBUG\"\n"
        );
    }

    #[test]
    fn test_missing_number_is_fatal() {
        assert!(bump("#define CONFIG_H\n", BuildConfiguration::Debug, at()).is_err());
        let err = bump("#define BUILD_NUMBER \"abc\"\n", BuildConfiguration::Debug, at()).unwrap_err();
        assert!(err.to_string().contains("not a number"));
    }

    #[test]
    fn test_similar_macro_names_untouched() {
        let text = "#define BUILD_NUMBER_MAX \"9\"\n#define BUILD_NUMBER \"5\"\n";
        let (out, stamp) = bump(text, BuildConfiguration::Debug, at()).unwrap();
        assert_eq!(stamp.number, 6);
        assert!(out.starts_with("#define BUILD_NUMBER_MAX \"9\"\n"));
    }

    #[test]
    fn test_locate_header() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(locate_header(dir.path()), dir.path().join("include/CONFIG.h"));
        fs::create_dir(dir.path().join("source")).unwrap();
        assert_eq!(
            locate_header(dir.path()),
            dir.path().join("source/kernel/include/CONFIG.h")
        );
    }
}

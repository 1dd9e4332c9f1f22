//! Line-oriented config scraping.
//!
//! The build tree carries several tiny declarative files (`driver.conf`,
//! `app.conf`, kernel module `.conf`s). None of them is a real format: each
//! line holds one key and its value, separated either by ` = ` or by a single
//! space depending on the file. This module turns such text into an ordered
//! list of entries; the callers decide which keys they care about.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Separator between key and value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Syntax {
    /// `KEY = value` (driver.conf, app.conf).
    Assign,
    /// `KEY value` (kernel module confs).
    Spaced,
}

/// A parsed config file. Keys keep their file order.
#[derive(Debug, Clone, Default)]
pub struct ConfFile {
    entries: Vec<(String, String)>,
}

impl ConfFile {
    /// Parse config text.
    ///
    /// Lines are trimmed. Blank lines and `#` comments are skipped. A line
    /// with no separator becomes a key with an empty value, so bare flags
    /// such as `INITRD` are still visible to [`ConfFile::has`].
    pub fn parse(text: &str, syntax: Syntax) -> Self {
        let mut entries = Vec::new();

        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let split = match syntax {
                Syntax::Assign => line.split_once('='),
                Syntax::Spaced => line.split_once(char::is_whitespace),
            };

            let (key, value) = match split {
                Some((key, value)) => (key.trim(), value.trim()),
                None => (line, ""),
            };
            entries.push((key.to_string(), value.to_string()));
        }

        Self { entries }
    }

    /// Read and parse a config file.
    pub fn read(path: &Path, syntax: Syntax) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("{} not found", path.display()))?;
        Ok(Self::parse(&text, syntax))
    }

    /// Raw value of the first occurrence of `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Value of `key` with every double quote removed.
    pub fn get_unquoted(&self, key: &str) -> Option<String> {
        self.get(key).map(unquote)
    }

    /// Whether `key` appears at all, with or without a value.
    pub fn has(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    /// Comma-separated list value. Entries are trimmed and unquoted; empty
    /// entries are dropped. Missing key yields an empty list.
    pub fn get_list(&self, key: &str) -> Vec<String> {
        let Some(value) = self.get(key) else {
            return Vec::new();
        };
        value
            .split(',')
            .map(|item| unquote(item).trim().to_string())
            .filter(|item| !item.is_empty())
            .collect()
    }

    /// All entries in file order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Strip every double quote, matching how the build scripts always treated
/// quoted values.
pub fn unquote(value: &str) -> String {
    value.replace('"', "")
}

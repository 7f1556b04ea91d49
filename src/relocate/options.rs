//! Per-run behavior flags shared by every relocation step.

use std::fmt;
use std::str::FromStr;

/// What to do when the destination folder already contains data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverwritePolicy {
    /// Ask the decision provider each time.
    #[default]
    Ask,
    /// Delete the pre-existing destination tree without asking.
    All,
    /// Never touch existing data; the folder is skipped.
    Never,
}

impl OverwritePolicy {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ask" | "prompt" => Some(Self::Ask),
            "all" | "yes" | "always" => Some(Self::All),
            "never" | "no" | "skip" => Some(Self::Never),
            _ => None,
        }
    }
}

impl fmt::Display for OverwritePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Ask => "ask",
            Self::All => "all",
            Self::Never => "never",
        })
    }
}

impl FromStr for OverwritePolicy {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("invalid overwrite policy: '{s}' (expected ask, all or never)"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RelocateOptions {
    /// Log every action but touch neither the filesystem nor the registry.
    pub dry_run: bool,
    /// Do not export the registry key before changing it.
    pub skip_backup: bool,
    /// Copy + checksum every file instead of renaming.
    pub verify_integrity: bool,
    /// Remove the retired old folder after a successful move.
    pub delete_source: bool,
    pub overwrite: OverwritePolicy,
}

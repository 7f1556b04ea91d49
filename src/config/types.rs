//! Core configuration types.
//! - Config holds runtime settings with sensible defaults.
//! - LogLevel represents verbosity with simple parsing helpers.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::known_folders;
use crate::relocate::{default_protected_roots, OverwritePolicy, RelocateOptions, MIN_FREE_BYTES};

use super::paths;

/// Program-defined verbosity levels exposed to users/config.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LogLevel {
    /// Only errors
    Quiet,
    /// Informational output (default)
    #[default]
    Normal,
    /// More info (like verbose)
    Info,
    /// Debug/trace
    Debug,
}

impl LogLevel {
    /// Parse common string names into our LogLevel (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "quiet" | "error" | "none" => Some(LogLevel::Quiet),
            "normal" => Some(LogLevel::Normal),
            "info" | "verbose" | "detailed" => Some(LogLevel::Info),
            "debug" | "trace" => Some(LogLevel::Debug),
            _ => None,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LogLevel::Quiet => "quiet",
            LogLevel::Normal => "normal",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
        };
        f.write_str(s)
    }
}

impl FromStr for LogLevel {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("invalid log level: '{s}'"))
    }
}

/// Runtime configuration for one relocation run.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base directory the folders are moved under (`<target_base>/<Folder>`)
    pub target_base: Option<PathBuf>,
    /// Folder names to relocate, in order
    pub folders: Vec<String>,
    /// Where registry backups are written
    pub backup_dir: PathBuf,
    /// Console verbosity
    pub log_level: LogLevel,
    /// Log file; `None` means the timestamped default in the data dir
    pub log_file: Option<PathBuf>,
    /// If true, log actions but modify neither the filesystem nor the registry
    pub dry_run: bool,
    pub skip_backup: bool,
    /// Copy and checksum every file instead of renaming
    pub verify_integrity: bool,
    /// Remove `<old>_backup` after a successful move
    pub delete_source: bool,
    pub overwrite: OverwritePolicy,
    /// Answer yes to every prompt
    pub assume_yes: bool,
    /// Minimum free space required on the destination volume
    pub min_free_bytes: u64,
    /// Destinations under these directories are refused
    pub protected_roots: Vec<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            target_base: None,
            folders: known_folders::all_names(),
            backup_dir: paths::default_backup_dir(),
            log_level: LogLevel::Normal,
            log_file: None,
            dry_run: false,
            skip_backup: false,
            verify_integrity: false,
            delete_source: false,
            overwrite: OverwritePolicy::Ask,
            assume_yes: false,
            min_free_bytes: MIN_FREE_BYTES,
            protected_roots: default_protected_roots(),
        }
    }
}

impl Config {
    /// Construct a Config for `target_base`; other fields use defaults.
    pub fn new(target_base: impl Into<PathBuf>) -> Self {
        Self {
            target_base: Some(target_base.into()),
            ..Default::default()
        }
    }

    /// Per-run flags handed to the relocation components.
    pub fn relocate_options(&self) -> RelocateOptions {
        RelocateOptions {
            dry_run: self.dry_run,
            skip_backup: self.skip_backup,
            verify_integrity: self.verify_integrity,
            delete_source: self.delete_source,
            overwrite: self.overwrite,
        }
    }
}

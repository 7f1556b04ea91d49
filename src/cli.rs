//! CLI definition and parsing.
//! Defines Args, applies flag overrides onto a loaded Config, and provides the
//! console-backed `DecisionProvider`.
//!
//! Notes:
//! - --debug is a shorthand for --log-level debug.
//! - --overwrite-all is a shorthand for --overwrite all.

use clap::{Parser, ValueHint};
use std::cell::RefCell;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use crate::config::types::{Config, LogLevel};
use crate::relocate::{DecisionProvider, OverwritePolicy, Prompt};

/// Relocate Windows known user folders to a new base path.
/// CLI flags override config values (which are loaded from XML if present).
#[derive(Parser, Debug, Clone, Default)]
#[command(
    author,
    version,
    about = "Relocate Windows user folders (Documents, Downloads, ...) safely"
)]
pub struct Args {
    /// Base directory; each folder moves to <TARGET>\<Folder>.
    #[arg(long, short = 't', value_name = "DIR", value_hint = ValueHint::DirPath)]
    pub target: Option<PathBuf>,

    /// Comma-separated folder names (default: all known folders).
    #[arg(long, short = 'f', value_delimiter = ',', value_name = "NAMES")]
    pub folders: Vec<String>,

    /// Log every action but touch neither files nor the registry.
    #[arg(long)]
    pub dry_run: bool,

    /// Do not export a registry backup before changing values.
    #[arg(long)]
    pub no_backup: bool,

    /// Copy and checksum every file instead of renaming it.
    #[arg(long)]
    pub verify: bool,

    /// Delete the retired old folder after a successful move.
    #[arg(long)]
    pub delete_source: bool,

    /// What to do when the destination already contains data.
    #[arg(long, value_name = "ask|all|never", value_parser = clap::value_parser!(OverwritePolicy))]
    pub overwrite: Option<OverwritePolicy>,

    /// Shorthand for `--overwrite all`.
    #[arg(long, conflicts_with = "overwrite")]
    pub overwrite_all: bool,

    /// Answer yes to every confirmation prompt.
    #[arg(long, short = 'y')]
    pub yes: bool,

    /// Directory for registry backup files.
    #[arg(long, value_name = "DIR", value_hint = ValueHint::DirPath)]
    pub backup_dir: Option<PathBuf>,

    /// Re-import a registry backup file and exit.
    #[arg(long, value_name = "FILE", value_hint = ValueHint::FilePath, conflicts_with = "target")]
    pub restore: Option<PathBuf>,

    /// List the relocatable folders and their current locations, then exit.
    #[arg(long)]
    pub list_folders: bool,

    /// Enable debug logging (equivalent to `--log-level debug`).
    #[arg(short = 'd', long)]
    pub debug: bool,

    /// Set log level. One of: quiet, normal, info, debug.
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log file (default: timestamped file in the data directory).
    #[arg(long, value_name = "FILE", value_hint = ValueHint::FilePath)]
    pub log_file: Option<PathBuf>,

    /// Emit logs and the final report as JSON.
    #[arg(long)]
    pub json: bool,

    /// Print the config file location and exit.
    #[arg(long)]
    pub print_config: bool,

    /// Write a template config file at the config location and exit.
    #[arg(long)]
    pub init_config: bool,
}

impl Args {
    /// Effective log level derived from flags.
    /// Precedence: --debug > --log-level value > None (use config default).
    pub fn effective_log_level(&self) -> Option<LogLevel> {
        if self.debug {
            return Some(LogLevel::Debug);
        }
        self.log_level.as_deref().and_then(LogLevel::parse)
    }

    /// Apply CLI overrides to a loaded Config (in-place). No-ops for unset flags.
    pub fn apply_overrides(&self, cfg: &mut Config) {
        if let Some(t) = &self.target {
            cfg.target_base = Some(t.clone());
        }
        let folders: Vec<String> = self
            .folders
            .iter()
            .map(|f| f.trim().to_string())
            .filter(|f| !f.is_empty())
            .collect();
        if !folders.is_empty() {
            cfg.folders = folders;
        }
        if let Some(level) = self.effective_log_level() {
            cfg.log_level = level;
        }
        if let Some(lf) = &self.log_file {
            cfg.log_file = Some(lf.clone());
        }
        if let Some(bd) = &self.backup_dir {
            cfg.backup_dir = bd.clone();
        }
        if self.dry_run {
            cfg.dry_run = true;
        }
        if self.no_backup {
            cfg.skip_backup = true;
        }
        if self.verify {
            cfg.verify_integrity = true;
        }
        if self.delete_source {
            cfg.delete_source = true;
        }
        if self.overwrite_all {
            cfg.overwrite = OverwritePolicy::All;
        } else if let Some(p) = self.overwrite {
            cfg.overwrite = p;
        }
        if self.yes {
            cfg.assume_yes = true;
        }
    }
}

pub fn parse() -> Args {
    Args::parse()
}

/// Asks on `output` and reads a line from `input`; anything but y/yes is a no.
pub struct ConsolePrompt<R, W> {
    io: RefCell<(R, W)>,
}

impl<R: BufRead, W: Write> ConsolePrompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { io: RefCell::new((input, output)) }
    }
}

impl ConsolePrompt<io::StdinLock<'static>, io::Stderr> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stderr())
    }
}

impl<R: BufRead, W: Write> DecisionProvider for ConsolePrompt<R, W> {
    fn confirm(&self, prompt: &Prompt) -> bool {
        let mut guard = self.io.borrow_mut();
        let (input, output) = &mut *guard;
        if write!(output, "{prompt} [y/N] ").and_then(|_| output.flush()).is_err() {
            return false;
        }
        let mut line = String::new();
        match input.read_line(&mut line) {
            Ok(0) | Err(_) => false,
            Ok(_) => matches!(line.trim().to_ascii_lowercase().as_str(), "y" | "yes"),
        }
    }
}

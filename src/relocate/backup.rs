//! Registry backup before mutation.
//!
//! Exports the shell-folder key into `<backup_dir>/registry_backup_<timestamp>_<Folder>.reg`.
//! Skipping the backup is an explicit "you are not protected" outcome that
//! callers must show to the user.

use std::fs;
use std::path::PathBuf;

use chrono::{DateTime, Local};
use tracing::{error, info, warn};

use crate::errors::RelocateError;
use crate::registry::RegistryExporter;

use super::decision::{DecisionProvider, Prompt};
use super::options::RelocateOptions;

/// A written backup file. Never modified after creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupRecord {
    pub path: PathBuf,
    pub created: DateTime<Local>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackupOutcome {
    Written(BackupRecord),
    /// skip-backup was requested; nothing protects this change.
    Skipped,
    DryRun(PathBuf),
}

pub fn backup_file_name(now: &DateTime<Local>, folder: &str) -> String {
    format!("registry_backup_{}_{}.reg", now.format("%Y%m%d_%H%M%S"), folder)
}

pub struct RegistryBackup<'a> {
    exporter: &'a dyn RegistryExporter,
    decisions: &'a dyn DecisionProvider,
    backup_dir: PathBuf,
    options: RelocateOptions,
}

impl<'a> RegistryBackup<'a> {
    pub fn new(
        exporter: &'a dyn RegistryExporter,
        decisions: &'a dyn DecisionProvider,
        backup_dir: impl Into<PathBuf>,
        options: RelocateOptions,
    ) -> Self {
        Self { exporter, decisions, backup_dir: backup_dir.into(), options }
    }

    pub fn backup(&self, folder: &str) -> Result<BackupOutcome, RelocateError> {
        self.backup_at(folder, Local::now())
    }

    /// Same as `backup`, with an explicit timestamp for the file name.
    pub fn backup_at(&self, folder: &str, now: DateTime<Local>) -> Result<BackupOutcome, RelocateError> {
        if self.options.skip_backup {
            warn!(folder, "Skipping registry backup as requested; this change cannot be rolled back from a backup");
            return Ok(BackupOutcome::Skipped);
        }

        let path = self.backup_dir.join(backup_file_name(&now, folder));
        if self.options.dry_run {
            info!(path = %path.display(), "dry-run: would export registry backup");
            return Ok(BackupOutcome::DryRun(path));
        }

        let fail = |reason: String| {
            error!(folder, path = %path.display(), %reason, "Registry backup failed");
            RelocateError::BackupFailed(reason)
        };

        fs::create_dir_all(&self.backup_dir).map_err(|e| {
            fail(format!("cannot create backup directory '{}': {e}", self.backup_dir.display()))
        })?;

        if path.exists() {
            let prompt = Prompt::OverwriteBackup { path: path.clone() };
            if !self.decisions.confirm(&prompt) {
                return Err(fail(format!("backup file '{}' already exists and overwrite was declined", path.display())));
            }
        }

        self.exporter
            .export(&path)
            .map_err(|e| fail(format!("export to '{}': {e}", path.display())))?;

        info!(path = %path.display(), "Registry backup created");
        Ok(BackupOutcome::Written(BackupRecord { path, created: now }))
    }
}

//! Rollback by re-importing a registry backup.
//!
//! Restored values are not checked against the folders on disk: a restore can
//! point the shell back at locations that no longer hold the data.

use std::path::Path;

use tracing::{error, info, warn};

use crate::errors::RelocateError;
use crate::registry::RegistryExporter;

pub struct RestoreAgent<'a> {
    exporter: &'a dyn RegistryExporter,
    dry_run: bool,
}

impl<'a> RestoreAgent<'a> {
    pub fn new(exporter: &'a dyn RegistryExporter, dry_run: bool) -> Self {
        Self { exporter, dry_run }
    }

    pub fn restore(&self, backup_file: &Path) -> Result<(), RelocateError> {
        let fail = |reason: String| {
            error!(path = %backup_file.display(), %reason, "Registry restore failed");
            RelocateError::RestoreFailed { path: backup_file.to_path_buf(), reason }
        };

        if !backup_file.is_file() {
            return Err(fail("backup file does not exist".into()));
        }
        if self.dry_run {
            info!(path = %backup_file.display(), "dry-run: would import registry backup");
            return Ok(());
        }

        self.exporter.import(backup_file).map_err(|e| fail(e.to_string()))?;
        info!(path = %backup_file.display(), "Registry restored from backup");
        warn!("Restored folder locations were not validated; they may point at folders that have since moved");
        Ok(())
    }
}

//! Writes a folder's new location into the shell-folder key.
//! Must only run after contents are relocated and the compatibility link exists.

use std::path::Path;

use tracing::{error, info};

use crate::errors::RelocateError;
use crate::known_folders::KnownFolder;
use crate::registry::{RegistryValue, ShellFolderStore};

pub struct RegistryUpdater<'a> {
    store: &'a dyn ShellFolderStore,
    dry_run: bool,
}

impl<'a> RegistryUpdater<'a> {
    pub fn new(store: &'a dyn ShellFolderStore, dry_run: bool) -> Self {
        Self { store, dry_run }
    }

    pub fn set_location(&self, folder: &KnownFolder, new_path: &Path) -> Result<(), RelocateError> {
        if self.dry_run {
            info!(folder = folder.name, path = %new_path.display(), "dry-run: would update registry");
            return Ok(());
        }
        let value = RegistryValue::expand_path(folder.value_name, new_path);
        self.store.write_value(&value).map_err(|e| {
            error!(folder = folder.name, error = %e, "Registry update failed");
            RelocateError::RegistryWriteFailed { folder: folder.name.to_string(), reason: e.to_string() }
        })?;
        info!(folder = folder.name, path = %new_path.display(), "Registry updated");
        Ok(())
    }
}

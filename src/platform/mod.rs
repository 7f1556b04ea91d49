//! Platform-specific helpers.
//! This module hides OS differences behind a uniform API so the relocation
//! core can remain platform-agnostic. The registry store, junction linker and
//! elevation check only exist on Windows; other targets get the
//! "unsupported operating system" refusal.

#[cfg(windows)]
mod windows;

#[cfg(windows)]
pub use windows::{is_elevated, JunctionLinker, RegistryShellFolders};

use anyhow::{bail, Context, Result};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

#[cfg(unix)]
use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

use crate::errors::RelocateError;

/// Fails with `UnsupportedPlatform` on anything but Windows.
pub fn ensure_supported() -> std::result::Result<(), RelocateError> {
    if cfg!(windows) {
        Ok(())
    } else {
        Err(RelocateError::UnsupportedPlatform)
    }
}

/// Open log file for appending; on Unix a newly created file gets 0600.
/// An existing file keeps its permissions.
pub fn open_log_file_secure_append(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent);
    }
    let mut opts = OpenOptions::new();
    opts.create(true).append(true);
    #[cfg(unix)]
    opts.mode(0o600);
    opts.open(path)
}

/// Write a new config file through a temp sibling + fsync + rename.
/// Fails if the target already exists.
pub fn write_config_secure_new(path: &Path, contents: &[u8]) -> Result<()> {
    if path.exists() {
        bail!("Config file already exists: {}", path.display());
    }
    let parent = path
        .parent()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "config path has no parent"))?;
    fs::create_dir_all(parent).with_context(|| format!("create parent '{}'", parent.display()))?;
    #[cfg(unix)]
    let _ = fs::set_permissions(parent, fs::Permissions::from_mode(0o700));

    let tmp = parent.join(format!(".folder_relocator.config.tmp.{}", std::process::id()));
    let mut opts = OpenOptions::new();
    opts.write(true).create_new(true);
    #[cfg(unix)]
    opts.mode(0o600);
    let mut f = opts
        .open(&tmp)
        .with_context(|| format!("create temp '{}'", tmp.display()))?;
    f.write_all(contents).context("write temp")?;
    f.sync_all().context("fsync temp")?;
    drop(f);

    if let Err(e) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(e).with_context(|| format!("rename '{}' -> '{}'", tmp.display(), path.display()));
    }
    Ok(())
}

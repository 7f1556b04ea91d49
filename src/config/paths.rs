//! Default path helpers and symlink checks.
//! Determines OS-appropriate config/log/backup paths and detects symlinked ancestors for safety.

use anyhow::{Context, Result};
use chrono::Local;
use dirs::{config_dir, data_dir};
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Environment variable naming an explicit config file (or a directory holding `config.xml`).
pub const CONFIG_ENV: &str = "FOLDER_RELOCATOR_CONFIG";

const APP_DIR: &str = "folder_relocator";
const CONFIG_FILE: &str = "config.xml";

fn app_data_dir() -> PathBuf {
    data_dir()
        .or_else(|| env::var_os("HOME").map(|h| PathBuf::from(h).join(".local").join("share")))
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

/// Config file location: `$FOLDER_RELOCATOR_CONFIG` if set, else the OS config dir.
///
/// A relative env value is resolved against the current directory; a directory
/// value means `<dir>/config.xml`.
pub fn default_config_path() -> Result<PathBuf> {
    if let Some(raw) = env::var_os(CONFIG_ENV).filter(|v| !v.is_empty()) {
        let mut p = PathBuf::from(raw);
        if p.is_relative() {
            p = env::current_dir()
                .context("resolve current directory for relative config path")?
                .join(p);
        }
        if p.is_dir() {
            p.push(CONFIG_FILE);
        }
        return Ok(p);
    }
    let base = config_dir()
        .or_else(|| env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))
        .context("no config directory available for this user")?;
    Ok(base.join(APP_DIR).join(CONFIG_FILE))
}

/// Default log file: `folder_relocation_<YYYYmmdd_HHMMSS>.log` in the data dir.
pub fn default_log_path() -> Result<PathBuf> {
    let dir = app_data_dir();
    fs::create_dir_all(&dir).with_context(|| format!("create log directory '{}'", dir.display()))?;
    Ok(dir.join(format!("folder_relocation_{}.log", Local::now().format("%Y%m%d_%H%M%S"))))
}

/// Default directory for registry backups (created on first backup).
pub fn default_backup_dir() -> PathBuf {
    app_data_dir().join("backups")
}

/// Return true if any existing ancestor of `path` is a symlink.
pub fn path_has_symlink_ancestor(path: &Path) -> io::Result<bool> {
    let mut p = path.parent();
    while let Some(anc) = p {
        if anc.exists() {
            let meta = fs::symlink_metadata(anc)?;
            if meta.file_type().is_symlink() {
                return Ok(true);
            }
        }
        p = anc.parent();
    }
    Ok(false)
}

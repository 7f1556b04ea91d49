//! Registry seams.
//! The core never talks to the Windows registry directly: it goes through
//! `ShellFolderStore` (values of the shell-folder key) and `RegistryExporter`
//! (export/import of that key to a backup file).

pub mod regfile;

use std::io;
use std::path::{Path, PathBuf};

use crate::known_folders::KnownFolder;

pub use regfile::RegFileExporter;

/// Root hive holding the per-user shell-folder key.
pub const SHELL_FOLDERS_ROOT: &str = "HKEY_CURRENT_USER";
/// Subkey (under HKCU) with one value per known folder.
pub const SHELL_FOLDERS_KEY: &str =
    r"Software\Microsoft\Windows\CurrentVersion\Explorer\User Shell Folders";

/// Full key path as written in `.reg` files.
pub fn shell_folders_key_path() -> String {
    format!("{SHELL_FOLDERS_ROOT}\\{SHELL_FOLDERS_KEY}")
}

/// Registry value type for shell-folder entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// REG_SZ
    String,
    /// REG_EXPAND_SZ (may contain %VARIABLES%)
    ExpandString,
}

/// One named value of the shell-folder key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryValue {
    pub name: String,
    pub kind: ValueKind,
    pub data: String,
}

impl RegistryValue {
    /// Expandable path value, the form written for relocated folders.
    pub fn expand_path(name: impl Into<String>, path: &Path) -> Self {
        Self {
            name: name.into(),
            kind: ValueKind::ExpandString,
            data: path.display().to_string(),
        }
    }
}

/// Access to the shell-folder registry key.
pub trait ShellFolderStore {
    /// Snapshot of every value under the key, in enumeration order.
    fn values(&self) -> io::Result<Vec<RegistryValue>>;

    /// Current on-disk location of a folder (environment variables expanded).
    fn current_location(&self, folder: &KnownFolder) -> io::Result<PathBuf>;

    /// Create or replace one value.
    fn write_value(&self, value: &RegistryValue) -> io::Result<()>;
}

/// Export/import of the shell-folder key to a text archive.
pub trait RegistryExporter {
    fn export(&self, dest: &Path) -> io::Result<()>;
    fn import(&self, src: &Path) -> io::Result<()>;
}

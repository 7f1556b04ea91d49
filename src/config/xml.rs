//! XML configuration support.
//! - Loads settings from config.xml (quick_xml + serde).
//! - Creates a template on request (`--init-config`).
//!
//! Notes:
//! - Every field is optional; missing fields keep the `Config` defaults.
//! - Unknown XML fields are a hard error to surface misconfigurations early.
//! - Values are trimmed; empty elements count as unset.

use anyhow::{anyhow, bail, Context, Result};
use quick_xml::de::from_str as from_xml_str;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use super::paths::{default_backup_dir, default_config_path, path_has_symlink_ancestor};
use super::types::{Config, LogLevel};
use crate::fs_ops::GIB;
use crate::known_folders;
use crate::platform::write_config_secure_new;
use crate::relocate::OverwritePolicy;

/// Struct mirroring the XML config for deserialization.
#[derive(Debug, Default, Deserialize)]
#[serde(rename = "config")]
#[serde(deny_unknown_fields)]
struct XmlConfig {
    target_base: Option<String>,
    /// Comma-separated folder names.
    folders: Option<String>,
    backup_dir: Option<String>,
    log_level: Option<String>,
    log_file: Option<String>,
    verify_integrity: Option<String>,
    delete_source: Option<String>,
    overwrite: Option<String>,
    min_free_gib: Option<String>,
}

/// Outcome of looking for the config file.
#[derive(Debug)]
pub enum LoadResult {
    Loaded { path: PathBuf, config: Config },
    /// No file at `path`; defaults apply.
    Missing(PathBuf),
}

fn non_empty(v: &Option<String>) -> Option<&str> {
    v.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn parse_bool(field: &str, s: &str) -> Result<bool> {
    match s.to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" | "on" => Ok(true),
        "false" | "no" | "0" | "off" => Ok(false),
        _ => bail!("invalid boolean for <{field}>: '{s}'"),
    }
}

/// Map XmlConfig -> Config, starting from defaults.
fn xml_to_config(parsed: XmlConfig) -> Result<Config> {
    let mut cfg = Config::default();

    if let Some(s) = non_empty(&parsed.target_base) {
        cfg.target_base = Some(PathBuf::from(s));
    }
    if let Some(s) = non_empty(&parsed.folders) {
        cfg.folders = s
            .split(',')
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .map(str::to_string)
            .collect();
    }
    if let Some(s) = non_empty(&parsed.backup_dir) {
        cfg.backup_dir = PathBuf::from(s);
    }
    if let Some(s) = non_empty(&parsed.log_level) {
        cfg.log_level = s.parse::<LogLevel>().map_err(|e| anyhow!(e))?;
    }
    if let Some(s) = non_empty(&parsed.log_file) {
        cfg.log_file = Some(PathBuf::from(s));
    }
    if let Some(s) = non_empty(&parsed.verify_integrity) {
        cfg.verify_integrity = parse_bool("verify_integrity", s)?;
    }
    if let Some(s) = non_empty(&parsed.delete_source) {
        cfg.delete_source = parse_bool("delete_source", s)?;
    }
    if let Some(s) = non_empty(&parsed.overwrite) {
        cfg.overwrite = s.parse::<OverwritePolicy>().map_err(|e| anyhow!(e))?;
    }
    if let Some(s) = non_empty(&parsed.min_free_gib) {
        let gib: u64 = s
            .parse()
            .with_context(|| format!("invalid number for <min_free_gib>: '{s}'"))?;
        cfg.min_free_bytes = gib.saturating_mul(GIB);
    }
    Ok(cfg)
}

/// Load a Config from a specific XML file path.
pub fn load_config_from_xml_path(path: &Path) -> Result<Config> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("read config xml '{}'", path.display()))?;
    let parsed: XmlConfig = if contents.trim().is_empty() {
        XmlConfig::default()
    } else {
        from_xml_str(&contents).with_context(|| format!("parse config xml '{}'", path.display()))?
    };
    xml_to_config(parsed).with_context(|| format!("invalid value in config xml '{}'", path.display()))
}

/// Load the config from `$FOLDER_RELOCATOR_CONFIG` or the default location.
pub fn load_config() -> Result<LoadResult> {
    let path = default_config_path()?;
    if !path.exists() {
        return Ok(LoadResult::Missing(path));
    }
    let config = load_config_from_xml_path(&path)?;
    Ok(LoadResult::Loaded { path, config })
}

/// Create a template config file (refuses symlinked ancestors and existing files).
pub fn create_template_config(path: &Path) -> Result<()> {
    if path_has_symlink_ancestor(path)? {
        bail!("Refusing to create config: ancestor of {} is a symlink", path.display());
    }

    let content = format!(
        "<!--\n  folder_relocator configuration (XML)\n\n  Fields (all optional; CLI flags override them):\n    target_base       -> base directory; each folder moves to <target_base>\\<Folder>\n    folders           -> comma-separated list of: {}\n    backup_dir        -> where registry backups (.reg) are written\n    log_level         -> quiet | normal | info | debug\n    log_file          -> path to log file (empty = timestamped file in the data dir)\n    verify_integrity  -> true/false: copy + checksum every file instead of renaming\n    delete_source     -> true/false: remove <old>_backup after a successful move\n    overwrite         -> ask | all | never (destination already holds data)\n    min_free_gib      -> minimum free space on the destination volume\n-->\n<config>\n  <target_base></target_base>\n  <folders>{}</folders>\n  <backup_dir>{}</backup_dir>\n  <log_level>normal</log_level>\n  <log_file></log_file>\n  <verify_integrity>false</verify_integrity>\n  <delete_source>false</delete_source>\n  <overwrite>ask</overwrite>\n  <min_free_gib>5</min_free_gib>\n</config>\n",
        known_folders::all_names().join(", "),
        known_folders::all_names().join(","),
        default_backup_dir().display(),
    );

    write_config_secure_new(path, content.as_bytes())?;
    info!("Created template config at {}", path.display());
    Ok(())
}

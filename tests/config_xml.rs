use serial_test::serial;
use std::fs;
use std::path::PathBuf;
use tempfile::tempdir;

use folder_relocator::config::{
    create_template_config, default_config_path, load_config, load_config_from_xml_path, LoadResult,
    CONFIG_ENV,
};
use folder_relocator::fs_ops::GIB;
use folder_relocator::known_folders::KNOWN_FOLDERS;
use folder_relocator::relocate::OverwritePolicy;
use folder_relocator::LogLevel;

struct EnvGuard;

impl EnvGuard {
    fn set(value: &std::path::Path) -> Self {
        unsafe {
            std::env::set_var(CONFIG_ENV, value);
        }
        EnvGuard
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        unsafe {
            std::env::remove_var(CONFIG_ENV);
        }
    }
}

#[test]
#[serial]
fn env_var_selects_config_file() {
    let td = tempdir().unwrap();
    let cfg_path = td.path().join("relocator.xml");
    fs::write(
        &cfg_path,
        "<config>\n  <target_base>D:\\Profiles\\me</target_base>\n  <folders>Documents,Pictures</folders>\n  <log_level>debug</log_level>\n  <delete_source>true</delete_source>\n  <overwrite>all</overwrite>\n  <min_free_gib>20</min_free_gib>\n</config>\n",
    )
    .unwrap();
    let _env = EnvGuard::set(&cfg_path);

    assert_eq!(default_config_path().unwrap(), cfg_path);
    let LoadResult::Loaded { path, config } = load_config().unwrap() else {
        panic!("config should load");
    };
    assert_eq!(path, cfg_path);
    assert_eq!(config.target_base, Some(PathBuf::from("D:\\Profiles\\me")));
    assert_eq!(config.folders, vec!["Documents".to_string(), "Pictures".to_string()]);
    assert_eq!(config.log_level, LogLevel::Debug);
    assert!(config.delete_source);
    assert!(!config.verify_integrity);
    assert_eq!(config.overwrite, OverwritePolicy::All);
    assert_eq!(config.min_free_bytes, 20 * GIB);
}

#[test]
#[serial]
fn env_var_directory_means_config_xml_inside() {
    let td = tempdir().unwrap();
    let _env = EnvGuard::set(td.path());
    assert_eq!(default_config_path().unwrap(), td.path().join("config.xml"));
    assert!(matches!(load_config().unwrap(), LoadResult::Missing(_)));
}

#[test]
fn unknown_fields_are_rejected() {
    let td = tempdir().unwrap();
    let path = td.path().join("config.xml");
    fs::write(&path, "<config><target_base>D:\\</target_base><colour>blue</colour></config>").unwrap();
    let err = load_config_from_xml_path(&path).unwrap_err();
    assert!(format!("{err:#}").contains("colour"), "{err:#}");
}

#[test]
fn malformed_xml_is_an_error() {
    let td = tempdir().unwrap();
    let path = td.path().join("config.xml");
    fs::write(&path, "<config><target_base>D:\\</config>").unwrap();
    assert!(load_config_from_xml_path(&path).is_err());
}

#[test]
fn empty_file_yields_defaults() {
    let td = tempdir().unwrap();
    let path = td.path().join("config.xml");
    fs::write(&path, "  \n").unwrap();
    let cfg = load_config_from_xml_path(&path).unwrap();
    assert!(cfg.target_base.is_none());
    assert_eq!(cfg.folders.len(), KNOWN_FOLDERS.len());
    assert_eq!(cfg.overwrite, OverwritePolicy::Ask);
}

#[test]
fn template_parses_back_and_is_not_overwritten() {
    let td = tempdir().unwrap();
    // Canonical root: on some systems the temp dir itself sits behind a symlink.
    let root = fs::canonicalize(td.path()).unwrap();
    let path = root.join("cfg").join("config.xml");
    create_template_config(&path).unwrap();

    let cfg = load_config_from_xml_path(&path).unwrap();
    assert!(cfg.target_base.is_none());
    assert_eq!(cfg.folders.len(), KNOWN_FOLDERS.len());
    assert_eq!(cfg.min_free_bytes, 5 * GIB);

    fs::write(&path, "<config/>").unwrap();
    assert!(create_template_config(&path).is_err());
    assert_eq!(fs::read_to_string(&path).unwrap(), "<config/>");
}

#[cfg(unix)]
#[test]
fn template_refuses_symlinked_ancestor() {
    let td = tempdir().unwrap();
    let root = fs::canonicalize(td.path()).unwrap();
    let real = root.join("real");
    fs::create_dir(&real).unwrap();
    let link = root.join("link");
    std::os::unix::fs::symlink(&real, &link).unwrap();
    assert!(create_template_config(&link.join("sub").join("config.xml")).is_err());
}

use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

pub(super) fn unique_temp_path(dst_dir: &Path) -> PathBuf {
    let pid = std::process::id();
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    dst_dir.join(format!(".folder_relocator.{pid}.{nanos}.tmp"))
}

/// `<path><suffix>`, or `<path><suffix>-<millis>[-n]` when that already exists.
pub fn unique_sibling(path: &Path, suffix: &str) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_owned())
        .unwrap_or_else(|| OsString::from("folder"));

    let mut base = name.clone();
    base.push(suffix);
    let candidate = path.with_file_name(&base);
    if !candidate.exists() {
        return candidate;
    }

    let epoch_ms = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    let mut n = 1u32;
    loop {
        let mut alt = base.clone();
        if n == 1 {
            alt.push(format!("-{epoch_ms}"));
        } else {
            alt.push(format!("-{epoch_ms}-{n}"));
        }
        let candidate = path.with_file_name(alt);
        if !candidate.exists() {
            return candidate;
        }
        n += 1;
    }
}

/// EXDEV / ERROR_NOT_SAME_DEVICE: rename across volumes.
pub fn is_cross_device(e: &io::Error) -> bool {
    if let Some(code) = e.raw_os_error() {
        #[cfg(unix)]
        {
            if code == libc::EXDEV {
                return true;
            }
        }
        #[cfg(windows)]
        {
            if code == 17 {
                return true;
            }
        }
    }
    false
}

#[cfg(unix)]
pub(super) fn fsync_dir(dir: &Path) -> io::Result<()> {
    std::fs::File::open(dir)?.sync_all()
}

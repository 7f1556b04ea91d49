//! I/O error enrichment.
//!
//! Wraps `io::Error` with the operation, the path and a short actionable hint so
//! per-item failures read well in the relocation report.
//!
//!   fs::create_dir_all(dir).map_err(io_error_with_help("create directory", dir))?;

use anyhow::anyhow;
use std::io;
use std::path::Path;

/// Hint for common Win32 error codes seen while moving user folders.
#[cfg(windows)]
fn os_hint(code: i32) -> Option<&'static str> {
    match code {
        2 | 3 => Some("path not found; verify it exists"),
        5 => Some("access denied; run elevated and check folder permissions"),
        17 => Some("different volume; the file will be copied instead of renamed"),
        32 | 33 => Some("file is in use; close applications using this folder"),
        80 | 183 => Some("already exists at the destination"),
        112 => Some("destination disk is full"),
        206 => Some("path too long for this volume"),
        _ => None,
    }
}

#[cfg(unix)]
fn os_hint(code: i32) -> Option<&'static str> {
    match code {
        libc::ENOENT => Some("path not found; verify it exists"),
        libc::EACCES | libc::EPERM => Some("permission denied; check folder permissions"),
        libc::EXDEV => Some("different volume; the file will be copied instead of renamed"),
        libc::EBUSY => Some("resource busy; close applications using this folder"),
        libc::EEXIST => Some("already exists at the destination"),
        libc::ENOSPC => Some("destination disk is full"),
        libc::ENAMETOOLONG => Some("path too long for this volume"),
        _ => None,
    }
}

fn kind_hint(kind: io::ErrorKind) -> Option<&'static str> {
    match kind {
        io::ErrorKind::NotFound => Some("path not found; verify it exists"),
        io::ErrorKind::PermissionDenied => Some("permission denied; check folder permissions"),
        io::ErrorKind::AlreadyExists => Some("already exists at the destination"),
        _ => None,
    }
}

fn build_message(op: &str, path: &Path, e: &io::Error) -> String {
    let mut msg = format!("{} '{}': {}", op, path.display(), e);
    let hint = match e.raw_os_error() {
        Some(code) => os_hint(code),
        None => kind_hint(e.kind()),
    };
    if let Some(h) = hint {
        msg.push_str(" (");
        msg.push_str(h);
        msg.push(')');
    }
    if let Some(code) = e.raw_os_error() {
        msg.push_str(&format!(" [os code: {code}]"));
    }
    msg
}

/// `.map_err` adapter producing an `anyhow::Error`.
pub fn io_error_with_help<'a>(
    op: &'a str,
    path: &'a Path,
) -> impl FnOnce(io::Error) -> anyhow::Error + 'a {
    move |e: io::Error| anyhow!(build_message(op, path, &e))
}

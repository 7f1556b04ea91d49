//! Timestamp and readonly-bit preservation for copied files.
//! Best-effort: failures are logged and ignored.

use filetime::{set_file_times, FileTime};
use std::fs;
use std::path::Path;
use tracing::{trace, warn};

pub fn preserve_times(dest: &Path, src_meta: &fs::Metadata) {
    let at = src_meta.accessed().ok().map(FileTime::from_system_time);
    let mt = src_meta.modified().ok().map(FileTime::from_system_time);
    if let (Some(a), Some(m)) = (at, mt) {
        match set_file_times(dest, a, m) {
            Ok(()) => trace!(path = %dest.display(), "set atime/mtime on destination"),
            Err(e) => warn!(path = %dest.display(), error = %e, "failed to set atime/mtime on destination"),
        }
    }

    if src_meta.permissions().readonly() {
        match fs::metadata(dest) {
            Ok(meta) => {
                let mut perms = meta.permissions();
                perms.set_readonly(true);
                if let Err(e) = fs::set_permissions(dest, perms) {
                    warn!(path = %dest.display(), error = %e, "failed to set readonly attribute on destination");
                }
            }
            Err(e) => warn!(path = %dest.display(), error = %e, "failed to stat destination for readonly preservation"),
        }
    }
}

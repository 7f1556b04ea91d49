//! Filesystem operations used by the relocation core.

mod atomic;
pub mod checksum;
mod copy;
mod helpers;
mod io_copy;
pub mod link;
mod metadata;
pub mod space;
pub mod util;

pub use copy::{safe_copy_and_rename, FileCopier, StreamingCopier};
pub use helpers::io_error_with_help;
pub use link::{points_to, LinkEstablisher};
pub use space::{free_space_bytes, SpaceProbe, SystemSpace, GIB};

/// Total size in bytes of regular files under `root` (unreadable entries are skipped).
pub fn tree_size(root: &std::path::Path) -> u64 {
    walkdir::WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| e.metadata().ok())
        .map(|m| m.len())
        .sum()
}

/// True if `dir` exists and has at least one entry.
pub fn dir_has_entries(dir: &std::path::Path) -> std::io::Result<bool> {
    match std::fs::read_dir(dir) {
        Ok(mut it) => Ok(it.next().is_some()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}

//! Safe single-file copy:
//! - copy into a temp file inside the destination directory (fsynced)
//! - rename temp -> dest
//! - carry over timestamps and the readonly bit

use anyhow::{anyhow, Context, Result};
use std::fs;
use std::path::Path;

use super::atomic::try_atomic_move;
use super::helpers::io_error_with_help;
use super::{io_copy, metadata, util};

/// Transfers single files between folders.
pub trait FileCopier {
    /// Copy `src` to `dest`, returning the number of bytes written.
    fn copy_file(&self, src: &Path, dest: &Path) -> Result<u64>;

    /// Same-volume move of one file.
    fn move_file(&self, src: &Path, dest: &Path) -> std::io::Result<()> {
        fs::rename(src, dest)
    }
}

/// Default copier built on a streaming, fsynced copy.
#[derive(Debug, Default, Clone, Copy)]
pub struct StreamingCopier;

impl FileCopier for StreamingCopier {
    fn copy_file(&self, src: &Path, dest: &Path) -> Result<u64> {
        safe_copy_and_rename(src, dest)
    }
}

pub fn safe_copy_and_rename(src: &Path, dest: &Path) -> Result<u64> {
    let dest_dir = dest
        .parent()
        .ok_or_else(|| anyhow!("destination has no parent: {}", dest.display()))?;
    fs::create_dir_all(dest_dir)
        .map_err(io_error_with_help("create destination directory", dest_dir))?;

    let src_meta = fs::metadata(src).map_err(io_error_with_help("stat source file", src))?;
    let tmp_path = util::unique_temp_path(dest_dir);

    let bytes = match io_copy::copy_streaming(src, &tmp_path) {
        Ok(n) => n,
        Err(e) => {
            let _ = fs::remove_file(&tmp_path);
            return Err(io_error_with_help("copy to temporary file", &tmp_path)(e));
        }
    };

    if let Err(e) = try_atomic_move(&tmp_path, dest) {
        let _ = fs::remove_file(&tmp_path);
        return Err(e).with_context(|| {
            format!("rename temporary file '{}' -> '{}'", tmp_path.display(), dest.display())
        });
    }

    metadata::preserve_times(dest, &src_meta);
    Ok(bytes)
}

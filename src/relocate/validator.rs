//! Destination path validation.
//!
//! Checks, in order, stopping at the first failure:
//! 1. the path is absolute and carries a volume component
//! 2. it is not inside a protected system directory
//! 3. it exists, or can be created (parents included)
//! 4. its volume has at least `min_free_bytes` free
//!
//! Step 3 is a side effect: a missing destination directory is created so the
//! space probe and the later move have something to work with. In dry-run mode
//! nothing is created and the nearest existing ancestor is probed instead.

use std::fs;
use std::path::{Component, Path, PathBuf};

use tracing::{debug, info};

use crate::errors::ValidationError;
use crate::fs_ops::space::format_bytes;
use crate::fs_ops::{SpaceProbe, GIB};

/// Default minimum free space on the destination volume.
pub const MIN_FREE_BYTES: u64 = 5 * GIB;

/// Directories relocation must never target: `%SystemRoot%`, else `%SystemDrive%\Windows`.
pub fn default_protected_roots() -> Vec<PathBuf> {
    if let Some(root) = std::env::var_os("SystemRoot").filter(|s| !s.is_empty()) {
        return vec![PathBuf::from(root)];
    }
    let drive = std::env::var("SystemDrive").unwrap_or_else(|_| "C:".to_string());
    vec![PathBuf::from(format!("{drive}\\Windows"))]
}

pub struct PathValidator<'a> {
    space: &'a dyn SpaceProbe,
    protected_roots: Vec<PathBuf>,
    min_free_bytes: u64,
    dry_run: bool,
}

impl<'a> PathValidator<'a> {
    pub fn new(space: &'a dyn SpaceProbe, protected_roots: Vec<PathBuf>, min_free_bytes: u64) -> Self {
        Self { space, protected_roots, min_free_bytes, dry_run: false }
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Validate `candidate`; returns the absolute path that was checked.
    pub fn validate(&self, candidate: &Path) -> Result<PathBuf, ValidationError> {
        let path = absolute_with_volume(candidate)?;

        if let Some(root) = self.protected_roots.iter().find(|r| is_within(&path, r)) {
            return Err(ValidationError::ProtectedPath { path, root: root.clone() });
        }

        let probe_at = if path.exists() {
            path.clone()
        } else if self.dry_run {
            info!(path = %path.display(), "dry-run: would create destination directory");
            nearest_existing_ancestor(&path).ok_or_else(|| ValidationError::InvalidDrive {
                path: path.clone(),
                reason: "no existing ancestor directory".into(),
            })?
        } else {
            fs::create_dir_all(&path).map_err(|e| ValidationError::CannotCreate {
                path: path.clone(),
                reason: e.to_string(),
            })?;
            info!(path = %path.display(), "created destination directory");
            path.clone()
        };

        let available = self
            .space
            .free_bytes(&probe_at)
            .map_err(|e| ValidationError::InvalidDrive {
                path: path.clone(),
                reason: format!("cannot query free space: {e}"),
            })?;
        if available < self.min_free_bytes {
            return Err(ValidationError::InsufficientSpace {
                path,
                required: self.min_free_bytes,
                available,
            });
        }

        debug!(path = %path.display(), free = %format_bytes(available), "destination validated");
        Ok(path)
    }
}

fn absolute_with_volume(candidate: &Path) -> Result<PathBuf, ValidationError> {
    let invalid = |reason: String| ValidationError::InvalidDrive {
        path: candidate.to_path_buf(),
        reason,
    };
    if candidate.as_os_str().is_empty() {
        return Err(invalid("empty path".into()));
    }
    let path = std::path::absolute(candidate).map_err(|e| invalid(e.to_string()))?;
    if !has_volume(&path) {
        return Err(invalid("path has no drive or volume component".into()));
    }
    Ok(path)
}

#[cfg(windows)]
fn has_volume(path: &Path) -> bool {
    let mut comps = path.components();
    matches!(comps.next(), Some(Component::Prefix(_))) && matches!(comps.next(), Some(Component::RootDir))
}

#[cfg(not(windows))]
fn has_volume(path: &Path) -> bool {
    matches!(path.components().next(), Some(Component::RootDir))
}

fn normal_parts(p: &Path) -> Vec<String> {
    p.components()
        .filter(|c| !matches!(c, Component::CurDir))
        .map(|c| {
            let s = c.as_os_str().to_string_lossy();
            if cfg!(windows) { s.to_ascii_lowercase() } else { s.into_owned() }
        })
        .collect()
}

fn starts_with_parts(path: &Path, root: &Path) -> bool {
    let (p, r) = (normal_parts(path), normal_parts(root));
    !r.is_empty() && p.len() >= r.len() && p[..r.len()] == r[..]
}

/// Canonicalize the longest existing prefix of `path` and re-append the rest.
fn resolve_existing_prefix(path: &Path) -> PathBuf {
    for anc in path.ancestors() {
        if let Ok(real) = dunce::canonicalize(anc) {
            let rest = path.strip_prefix(anc).unwrap_or_else(|_| Path::new(""));
            return real.join(rest);
        }
    }
    path.to_path_buf()
}

/// Component-wise prefix test (case-insensitive on Windows), on both the
/// literal and the symlink-resolved forms.
fn is_within(path: &Path, root: &Path) -> bool {
    starts_with_parts(dunce::simplified(path), dunce::simplified(root))
        || starts_with_parts(&resolve_existing_prefix(path), &resolve_existing_prefix(root))
}

fn nearest_existing_ancestor(path: &Path) -> Option<PathBuf> {
    path.ancestors().skip(1).find(|a| a.is_dir()).map(Path::to_path_buf)
}

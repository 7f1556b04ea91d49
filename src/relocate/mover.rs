//! Folder content transfer.
//!
//! Sequence for one folder:
//! 1. dry-run / already-relocated / nothing-to-move short cuts
//! 2. destination conflict handling (overwrite policy + decision provider)
//! 3. per-file transfer (rename, or copy + BLAKE3 check when verifying);
//!    item failures accumulate instead of aborting the walk
//! 4. retire the old folder to `<old>_backup` and link old -> new
//! 5. optionally delete the retired folder
//!
//! Every rename is journaled. If any item fails, or the link cannot be made,
//! the journal is replayed backwards so the files sit under the old folder
//! again before the folder is reported failed. Copied files (verification
//! mode, cross-volume fallback) never leave the source, so the old folder
//! is complete whenever it is retired.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, error, info, warn};
use walkdir::WalkDir;

use crate::errors::MoveFailure;
use crate::fs_ops::util::{is_cross_device, unique_sibling};
use crate::fs_ops::{checksum, dir_has_entries, io_error_with_help, points_to, tree_size};
use crate::fs_ops::{FileCopier, LinkEstablisher};

use super::decision::{DecisionProvider, Prompt};
use super::options::{OverwritePolicy, RelocateOptions};

/// Suffix given to the old folder once its contents have moved.
pub const RETIRED_SUFFIX: &str = "_backup";

/// One failed item of a folder transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemError {
    pub kind: MoveFailure,
    pub message: String,
}

impl fmt::Display for ItemError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveStatus {
    Moved,
    /// The old path already resolves to the destination.
    AlreadyInPlace,
    DryRun,
    /// Destination held data and overwriting was refused.
    Skipped(String),
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveOutcome {
    pub status: MoveStatus,
    pub bytes_moved: u64,
    pub errors: Vec<ItemError>,
    /// Where the old folder was retired to, if it still exists.
    pub retired: Option<PathBuf>,
}

impl MoveOutcome {
    fn with_status(status: MoveStatus) -> Self {
        Self { status, bytes_moved: 0, errors: Vec::new(), retired: None }
    }

    pub fn ok(&self) -> bool {
        matches!(self.status, MoveStatus::Moved | MoveStatus::AlreadyInPlace | MoveStatus::DryRun)
    }

    /// Most significant failure kind, for the folder-level error.
    pub fn primary_failure(&self) -> Option<MoveFailure> {
        [MoveFailure::ChecksumMismatch, MoveFailure::LinkFailed, MoveFailure::Copy, MoveFailure::Cleanup]
            .into_iter()
            .find(|k| self.errors.iter().any(|e| e.kind == *k))
    }

    fn push(&mut self, kind: MoveFailure, message: impl Into<String>) {
        let message = message.into();
        warn!(%kind, %message, "item failed");
        self.errors.push(ItemError { kind, message });
    }
}

pub struct ContentMover<'a> {
    copier: &'a dyn FileCopier,
    linker: &'a dyn LinkEstablisher,
    decisions: &'a dyn DecisionProvider,
    options: RelocateOptions,
}

impl<'a> ContentMover<'a> {
    pub fn new(
        copier: &'a dyn FileCopier,
        linker: &'a dyn LinkEstablisher,
        decisions: &'a dyn DecisionProvider,
        options: RelocateOptions,
    ) -> Self {
        Self { copier, linker, decisions, options }
    }

    /// Move the contents of `old` (the folder named `folder`) into `new`.
    pub fn relocate_contents(&self, folder: &str, old: &Path, new: &Path) -> MoveOutcome {
        if self.options.dry_run {
            info!(
                folder,
                src = %old.display(),
                dest = %new.display(),
                bytes = tree_size(old),
                "dry-run: would move folder contents"
            );
            return MoveOutcome::with_status(MoveStatus::DryRun);
        }

        if old.exists() && points_to(old, new) {
            info!(folder, path = %old.display(), "already relocated; nothing to move");
            return MoveOutcome::with_status(MoveStatus::AlreadyInPlace);
        }

        let mut out = MoveOutcome::with_status(MoveStatus::Moved);

        if let Err(msg) = check_disjoint(old, new) {
            out.push(MoveFailure::Copy, msg);
            out.status = MoveStatus::Failed;
            return out;
        }

        match self.prepare_destination(folder, new) {
            Ok(true) => {}
            Ok(false) => {
                let reason = format!("destination '{}' already contains data; overwrite declined", new.display());
                info!(folder, %reason, "skipping folder");
                return MoveOutcome::with_status(MoveStatus::Skipped(reason));
            }
            Err(msg) => {
                out.push(MoveFailure::Copy, msg);
                out.status = MoveStatus::Failed;
                return out;
            }
        }

        let mut journal = Journal::default();
        if old.exists() {
            self.transfer_tree(old, new, &mut journal, &mut out);
        } else {
            debug!(folder, path = %old.display(), "old location missing; only the link will be created");
        }

        if !out.errors.is_empty() {
            error!(folder, errors = out.errors.len(), "transfer incomplete; returning moved files");
            journal.roll_back(old, new, &mut out);
            out.status = MoveStatus::Failed;
            return out;
        }

        self.retire_and_link(old, new, &journal, &mut out);
        if out.errors.is_empty() && self.options.delete_source {
            if let Some(retired) = out.retired.take() {
                if let Err(e) = fs::remove_dir_all(&retired) {
                    out.push(MoveFailure::Cleanup, io_error_with_help("remove old folder", &retired)(e).to_string());
                    out.retired = Some(retired);
                } else {
                    info!(folder, path = %retired.display(), "removed old folder leftovers");
                }
            }
        }

        if !out.errors.is_empty() {
            out.status = MoveStatus::Failed;
        } else {
            info!(folder, src = %old.display(), dest = %new.display(), bytes = out.bytes_moved, "Folder contents moved");
        }
        out
    }

    /// Returns Ok(false) when the destination holds data and overwriting is refused.
    fn prepare_destination(&self, folder: &str, new: &Path) -> Result<bool, String> {
        let occupied = dir_has_entries(new).map_err(|e| io_error_with_help("inspect destination", new)(e).to_string())?;
        if occupied {
            let overwrite = match self.options.overwrite {
                OverwritePolicy::All => true,
                OverwritePolicy::Never => false,
                OverwritePolicy::Ask => self.decisions.confirm(&Prompt::OverwriteDestination {
                    folder: folder.to_string(),
                    path: new.to_path_buf(),
                }),
            };
            if !overwrite {
                return Ok(false);
            }
            warn!(folder, path = %new.display(), "deleting pre-existing destination contents");
            fs::remove_dir_all(new).map_err(|e| io_error_with_help("remove existing destination", new)(e).to_string())?;
        }
        fs::create_dir_all(new).map_err(|e| io_error_with_help("create destination", new)(e).to_string())?;
        Ok(true)
    }

    fn transfer_tree(&self, old: &Path, new: &Path, journal: &mut Journal, out: &mut MoveOutcome) {
        let walker = WalkDir::new(old).min_depth(1).follow_links(false).sort_by_file_name();
        for entry in walker {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    out.push(MoveFailure::Copy, format!("walk '{}': {e}", old.display()));
                    continue;
                }
            };
            let src = entry.path();
            let Ok(rel) = src.strip_prefix(old) else { continue };
            let dst = new.join(rel);
            let ft = entry.file_type();

            if ft.is_dir() {
                if let Err(e) = fs::create_dir_all(&dst) {
                    out.push(MoveFailure::Copy, io_error_with_help("create directory", &dst)(e).to_string());
                }
                continue;
            }
            if ft.is_symlink() && src.is_dir() {
                warn!(path = %src.display(), "skipping directory link inside folder");
                continue;
            }
            let len = match entry.metadata() {
                Ok(m) => m.len(),
                Err(e) => {
                    out.push(MoveFailure::Copy, format!("read metadata of '{}': {e}", src.display()));
                    continue;
                }
            };
            match self.transfer_file(src, &dst, len, journal) {
                Ok(bytes) => out.bytes_moved += bytes,
                Err(item) => out.push(item.kind, item.message),
            }
        }
    }

    fn transfer_file(&self, src: &Path, dst: &Path, len: u64, journal: &mut Journal) -> Result<u64, ItemError> {
        let copy_err = |message: String| ItemError { kind: MoveFailure::Copy, message };

        if self.options.verify_integrity {
            let bytes = self.copier.copy_file(src, dst).map_err(|e| copy_err(format!("{e:#}")))?;
            let same = checksum::same_content(src, dst)
                .map_err(|e| copy_err(format!("checksum '{}': {e}", src.display())))?;
            if !same {
                return Err(ItemError {
                    kind: MoveFailure::ChecksumMismatch,
                    message: format!("'{}' differs from '{}' after copy", dst.display(), src.display()),
                });
            }
            debug!(src = %src.display(), dest = %dst.display(), bytes, "copied and verified");
            return Ok(bytes);
        }

        if let Some(parent) = dst.parent() {
            fs::create_dir_all(parent).map_err(|e| copy_err(io_error_with_help("create directory", parent)(e).to_string()))?;
        }
        match self.copier.move_file(src, dst) {
            Ok(()) => {
                journal.record(src, dst);
                Ok(len)
            }
            // The source stays in the old folder and goes with it when it is retired.
            Err(e) if is_cross_device(&e) => self.copier.copy_file(src, dst).map_err(|e| copy_err(format!("{e:#}"))),
            Err(e) => Err(copy_err(io_error_with_help("move file", src)(e).to_string())),
        }
    }

    /// Rename the old folder aside and put a link to `new` in its place.
    fn retire_and_link(&self, old: &Path, new: &Path, journal: &Journal, out: &mut MoveOutcome) {
        let retired = if old.exists() {
            let aside = unique_sibling(old, RETIRED_SUFFIX);
            if let Err(e) = fs::rename(old, &aside) {
                out.push(MoveFailure::LinkFailed, io_error_with_help("retire old folder", old)(e).to_string());
                journal.roll_back(old, new, out);
                return;
            }
            debug!(from = %old.display(), to = %aside.display(), "retired old folder");
            Some(aside)
        } else {
            None
        };

        if let Err(e) = self.linker.establish(old, new) {
            out.push(
                MoveFailure::LinkFailed,
                format!("link '{}' -> '{}': {e}", old.display(), new.display()),
            );
            let mut home = old.to_path_buf();
            if let Some(aside) = &retired {
                if let Err(e) = fs::rename(aside, old) {
                    error!(path = %aside.display(), error = %e, "could not restore old folder name after link failure");
                    home = aside.clone();
                    out.retired = retired.clone();
                }
            }
            journal.roll_back_into(old, &home, new, out);
            return;
        }

        info!(link = %old.display(), target = %new.display(), "compatibility link established");
        out.retired = retired;
    }
}

/// Files renamed out of the old folder, in transfer order.
#[derive(Debug, Default)]
struct Journal {
    renamed: Vec<(PathBuf, PathBuf)>,
}

impl Journal {
    fn record(&mut self, src: &Path, dst: &Path) {
        self.renamed.push((src.to_path_buf(), dst.to_path_buf()));
    }

    fn roll_back(&self, old: &Path, new: &Path, out: &mut MoveOutcome) {
        self.roll_back_into(old, old, new, out);
    }

    /// Move every renamed file back under `home` (the old folder, possibly
    /// under its retired name), then drop directories left empty in `new`.
    fn roll_back_into(&self, old: &Path, home: &Path, new: &Path, out: &mut MoveOutcome) {
        let mut returned = 0usize;
        for (src, dst) in self.renamed.iter().rev() {
            let back = src.strip_prefix(old).map(|rel| home.join(rel)).unwrap_or_else(|_| src.clone());
            if let Some(parent) = back.parent() {
                if let Err(e) = fs::create_dir_all(parent) {
                    out.push(MoveFailure::Copy, io_error_with_help("recreate directory", parent)(e).to_string());
                    continue;
                }
            }
            match fs::rename(dst, &back) {
                Ok(()) => returned += 1,
                Err(e) => out.push(
                    MoveFailure::Copy,
                    format!("could not return '{}' to '{}': {e}", dst.display(), back.display()),
                ),
            }
        }
        prune_empty_dirs(new);
        out.bytes_moved = 0;
        if !self.renamed.is_empty() {
            info!(files = returned, path = %home.display(), "moved files returned to the old location");
        }
    }
}

fn prune_empty_dirs(root: &Path) {
    let dirs = WalkDir::new(root)
        .min_depth(1)
        .contents_first(true)
        .follow_links(false)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_dir());
    for dir in dirs {
        // Fails on non-empty directories, which is what keeps them.
        let _ = fs::remove_dir(dir.path());
    }
}

fn check_disjoint(old: &Path, new: &Path) -> Result<(), String> {
    let o = dunce::canonicalize(old).unwrap_or_else(|_| old.to_path_buf());
    let n = dunce::canonicalize(new).unwrap_or_else(|_| new.to_path_buf());
    if n.starts_with(&o) {
        return Err(format!("destination '{}' lies inside '{}'", new.display(), old.display()));
    }
    if o.starts_with(&n) {
        return Err(format!("source '{}' lies inside destination '{}'", old.display(), new.display()));
    }
    Ok(())
}

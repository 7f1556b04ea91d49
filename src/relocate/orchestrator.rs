//! Per-folder relocation state machine and run-wide report.
//!
//! `Start -> Validate -> Backup -> Move -> UpdateRegistry -> Done`; any step can
//! fall into `Failed`, which records the reason and moves on to the next folder.
//! Unknown folder names are logged and skipped without touching the report.

use std::fmt;
use std::path::{Path, PathBuf};

use tracing::{debug, error, info, info_span, warn, Span};

use crate::errors::{MoveFailure, RelocateError};
use crate::known_folders::{self, KnownFolder};
use crate::registry::ShellFolderStore;

use super::backup::{BackupOutcome, RegistryBackup};
use super::mover::{ContentMover, MoveStatus};
use super::report::RelocationReport;
use super::updater::RegistryUpdater;
use super::validator::PathValidator;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Start,
    Validate,
    Backup,
    Move,
    UpdateRegistry,
    Done,
    Failed,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Stage::Start => "start",
            Stage::Validate => "validate",
            Stage::Backup => "backup",
            Stage::Move => "move",
            Stage::UpdateRegistry => "update_registry",
            Stage::Done => "done",
            Stage::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Result of relocating one requested folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FolderOutcome {
    Relocated { old: PathBuf, new: PathBuf, bytes: u64 },
    /// Overwrite refused; not an error.
    Skipped { reason: String },
    Failed { stage: Stage, error: RelocateError },
    /// Name not in the known-folder table; logged only.
    Unknown,
}

pub struct RelocationOrchestrator<'a> {
    store: &'a dyn ShellFolderStore,
    validator: PathValidator<'a>,
    backup: RegistryBackup<'a>,
    mover: ContentMover<'a>,
    updater: RegistryUpdater<'a>,
    report: RelocationReport,
    span: Span,
}

impl<'a> RelocationOrchestrator<'a> {
    pub fn new(
        store: &'a dyn ShellFolderStore,
        validator: PathValidator<'a>,
        backup: RegistryBackup<'a>,
        mover: ContentMover<'a>,
        updater: RegistryUpdater<'a>,
    ) -> Self {
        let span = info_span!("relocation_run", started = %chrono::Local::now().format("%Y-%m-%dT%H:%M:%S"));
        Self {
            store,
            validator,
            backup,
            mover,
            updater,
            report: RelocationReport::new(),
            span,
        }
    }

    /// Relocate every requested folder in order and return the finished report.
    pub fn run<I, S>(mut self, folders: I, target_base: &Path) -> RelocationReport
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let span = self.span.clone();
        let _enter = span.enter();
        info!(target_base = %target_base.display(), "relocation run started");
        for name in folders {
            let _ = self.relocate_folder(name.as_ref(), target_base);
        }
        self.into_report()
    }

    /// Run the state machine for one folder, recording the result in the report.
    pub fn relocate_folder(&mut self, name: &str, target_base: &Path) -> FolderOutcome {
        let span = self.span.clone();
        let _enter = span.enter();

        let Some(folder) = known_folders::lookup(name) else {
            let e = RelocateError::UnknownFolder(name.to_string());
            warn!(folder = name, code = e.code(), kind = e.kind(), "{e}, skipping");
            return FolderOutcome::Unknown;
        };

        let outcome = self.drive(folder, target_base);
        match &outcome {
            FolderOutcome::Relocated { old, bytes, .. } => {
                self.report.record_moved(old, *bytes);
                info!(folder = folder.name, "Successfully relocated");
            }
            FolderOutcome::Skipped { reason } => {
                self.report.record_skip(format!("{}: {reason}", folder.name));
            }
            FolderOutcome::Failed { stage, error } => {
                error!(folder = folder.name, %stage, code = error.code(), kind = error.kind(), %error, "Failed to relocate");
                self.report.record_error(format!("{}: {error}", folder.name));
            }
            FolderOutcome::Unknown => {}
        }
        outcome
    }

    fn drive(&self, folder: &'static KnownFolder, target_base: &Path) -> FolderOutcome {
        let fail = |stage: Stage, error: RelocateError| {
            debug!(folder = folder.name, from = %stage, to = %Stage::Failed, "stage transition");
            FolderOutcome::Failed { stage, error }
        };
        let enter = |stage: Stage| debug!(folder = folder.name, %stage, "entering stage");

        enter(Stage::Start);
        let old = match self.store.current_location(folder) {
            Ok(p) => p,
            Err(e) => {
                return fail(
                    Stage::Start,
                    RelocateError::LocationUnavailable { folder: folder.name.to_string(), reason: e.to_string() },
                );
            }
        };
        let new = target_base.join(folder.name);

        enter(Stage::Validate);
        let new = match self.validator.validate(&new) {
            Ok(p) => p,
            Err(e) => return fail(Stage::Validate, e.into()),
        };

        enter(Stage::Backup);
        match self.backup.backup(folder.name) {
            Ok(BackupOutcome::Written(record)) => debug!(folder = folder.name, path = %record.path.display(), "backup written"),
            Ok(BackupOutcome::Skipped) => warn!(folder = folder.name, "no registry backup for this folder"),
            Ok(BackupOutcome::DryRun(_)) => {}
            Err(e) => return fail(Stage::Backup, e),
        }

        enter(Stage::Move);
        let moved = self.mover.relocate_contents(folder.name, &old, &new);
        match &moved.status {
            MoveStatus::Skipped(reason) => return FolderOutcome::Skipped { reason: reason.clone() },
            MoveStatus::Failed => {
                let detail = moved.errors.iter().map(ToString::to_string).collect::<Vec<_>>().join("; ");
                return fail(
                    Stage::Move,
                    RelocateError::MoveFailed {
                        folder: folder.name.to_string(),
                        kind: moved.primary_failure().unwrap_or(MoveFailure::Copy),
                        detail,
                    },
                );
            }
            MoveStatus::Moved | MoveStatus::AlreadyInPlace | MoveStatus::DryRun => {}
        }

        enter(Stage::UpdateRegistry);
        if let Err(e) = self.updater.set_location(folder, &new) {
            return fail(Stage::UpdateRegistry, e);
        }

        enter(Stage::Done);
        FolderOutcome::Relocated { old, new, bytes: moved.bytes_moved }
    }

    pub fn into_report(mut self) -> RelocationReport {
        self.report.finish();
        let _enter = self.span.enter();
        info!(
            success = self.report.success(),
            moved = self.report.moved_files().len(),
            bytes = self.report.total_size(),
            errors = self.report.errors().len(),
            "relocation run finished"
        );
        self.report
    }
}

//! Relocation core: validation, backup, content move, registry update and restore.
//!
//! Everything here is platform-agnostic and talks to the outside world only
//! through the seams in `registry`, `fs_ops` and `decision`.

pub mod backup;
pub mod decision;
pub mod mover;
pub mod options;
pub mod orchestrator;
pub mod report;
pub mod restore;
pub mod updater;
pub mod validator;

pub use backup::{BackupOutcome, BackupRecord, RegistryBackup, backup_file_name};
pub use decision::{DecisionProvider, FixedAnswer, Prompt};
pub use mover::{ContentMover, ItemError, MoveOutcome, MoveStatus, RETIRED_SUFFIX};
pub use options::{OverwritePolicy, RelocateOptions};
pub use orchestrator::{FolderOutcome, RelocationOrchestrator, Stage};
pub use report::RelocationReport;
pub use restore::RestoreAgent;
pub use updater::RegistryUpdater;
pub use validator::{MIN_FREE_BYTES, PathValidator, default_protected_roots};

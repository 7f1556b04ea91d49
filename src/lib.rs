//! Core library for `folder_relocator`.
//!
//! Relocates the well-known per-user folders (Documents, Downloads, Pictures,
//! Music, Videos, Desktop) to a new base path: validate the destination, back up
//! the shell-folder registry key, move the contents, leave a compatibility link
//! at the old location and point the registry at the new one.
//!
//! The relocation core in [`relocate`] only sees the traits in [`registry`] and
//! [`fs_ops`]; [`platform`] supplies the Windows implementations.

pub mod cli;
pub mod config;
pub mod errors;
pub mod fs_ops;
pub mod known_folders;
pub mod output;
pub mod platform;
pub mod registry;
pub mod relocate;

pub use config::{Config, LogLevel};
pub use errors::{MoveFailure, RelocateError, ValidationError};
pub use known_folders::{KnownFolder, KNOWN_FOLDERS};
pub use relocate::{RelocationOrchestrator, RelocationReport, RelocateOptions};

//! Typed error definitions for folder_relocator.
//! Provides a small set of well-known failure modes for better logs, reports and tests.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Why a destination path was rejected by the validator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Invalid drive specification for '{path}': {reason}")]
    InvalidDrive { path: PathBuf, reason: String },

    #[error("Cannot relocate into protected system directory '{path}' (under '{root}')")]
    ProtectedPath { path: PathBuf, root: PathBuf },

    #[error("Cannot create directory '{path}': {reason}")]
    CannotCreate { path: PathBuf, reason: String },

    #[error("Insufficient disk space for '{path}': need {required} bytes, have {available} bytes")]
    InsufficientSpace {
        path: PathBuf,
        required: u64,
        available: u64,
    },
}

/// Sub-kind of a content move failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveFailure {
    /// A file could not be transferred (copy, rename or directory creation).
    Copy,
    /// Source and destination checksums differed after the copy.
    ChecksumMismatch,
    /// The old location could not be turned into a link to the new one.
    LinkFailed,
    /// Leftovers at the old location could not be removed.
    Cleanup,
}

impl fmt::Display for MoveFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MoveFailure::Copy => "copy error",
            MoveFailure::ChecksumMismatch => "checksum mismatch",
            MoveFailure::LinkFailed => "compatibility link failure",
            MoveFailure::Cleanup => "cleanup failure",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RelocateError {
    #[error("Invalid destination: {0}")]
    InvalidPath(#[from] ValidationError),

    #[error("Cannot determine current location of {folder}: {reason}")]
    LocationUnavailable { folder: String, reason: String },

    #[error("Registry backup failed: {0}")]
    BackupFailed(String),

    #[error("Moving {folder} failed ({kind}): {detail}")]
    MoveFailed {
        folder: String,
        kind: MoveFailure,
        detail: String,
    },

    #[error("Registry update failed for {folder}: {reason}")]
    RegistryWriteFailed { folder: String, reason: String },

    #[error("Unknown folder: {0}")]
    UnknownFolder(String),

    #[error("Registry restore from '{path}' failed: {reason}")]
    RestoreFailed { path: PathBuf, reason: String },

    #[error("Unsupported operating system: this tool only runs on Windows")]
    UnsupportedPlatform,

    #[error("Administrator privileges are required; re-run from an elevated prompt")]
    NotElevated,
}

impl RelocateError {
    /// Stable numeric code, emitted as a structured log field.
    pub fn code(&self) -> u16 {
        match self {
            RelocateError::InvalidPath(v) => match v {
                ValidationError::InvalidDrive { .. } => 10,
                ValidationError::ProtectedPath { .. } => 11,
                ValidationError::CannotCreate { .. } => 12,
                ValidationError::InsufficientSpace { .. } => 13,
            },
            RelocateError::LocationUnavailable { .. } => 20,
            RelocateError::BackupFailed(_) => 30,
            RelocateError::MoveFailed { kind, .. } => match kind {
                MoveFailure::Copy => 40,
                MoveFailure::ChecksumMismatch => 41,
                MoveFailure::LinkFailed => 42,
                MoveFailure::Cleanup => 43,
            },
            RelocateError::RegistryWriteFailed { .. } => 50,
            RelocateError::UnknownFolder(_) => 60,
            RelocateError::RestoreFailed { .. } => 70,
            RelocateError::UnsupportedPlatform => 90,
            RelocateError::NotElevated => 91,
        }
    }

    /// Short machine-friendly kind name for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            RelocateError::InvalidPath(_) => "invalid_path",
            RelocateError::LocationUnavailable { .. } => "location_unavailable",
            RelocateError::BackupFailed(_) => "backup_failed",
            RelocateError::MoveFailed { .. } => "move_failed",
            RelocateError::RegistryWriteFailed { .. } => "registry_write_failed",
            RelocateError::UnknownFolder(_) => "unknown_folder",
            RelocateError::RestoreFailed { .. } => "restore_failed",
            RelocateError::UnsupportedPlatform => "unsupported_platform",
            RelocateError::NotElevated => "not_elevated",
        }
    }
}

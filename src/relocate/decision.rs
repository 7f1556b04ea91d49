//! Yes/no decisions requested mid-run.
//! The core never prompts a human itself; the driver injects a provider.

use std::fmt;
use std::path::PathBuf;

/// A question the core needs answered before it can continue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Prompt {
    /// The destination of `folder` already holds data; delete it and continue?
    OverwriteDestination { folder: String, path: PathBuf },
    /// A backup file with this exact name exists; overwrite it?
    OverwriteBackup { path: PathBuf },
}

impl fmt::Display for Prompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Prompt::OverwriteDestination { folder, path } => write!(
                f,
                "Destination for {folder} already contains data: {}. Delete it and continue?",
                path.display()
            ),
            Prompt::OverwriteBackup { path } => {
                write!(f, "Backup file {} already exists. Overwrite it?", path.display())
            }
        }
    }
}

pub trait DecisionProvider {
    fn confirm(&self, prompt: &Prompt) -> bool;
}

/// Answers every prompt with the same value (`--yes`, tests, non-interactive runs).
#[derive(Debug, Clone, Copy)]
pub struct FixedAnswer(pub bool);

impl DecisionProvider for FixedAnswer {
    fn confirm(&self, prompt: &Prompt) -> bool {
        tracing::debug!(%prompt, answer = self.0, "answered prompt without asking");
        self.0
    }
}

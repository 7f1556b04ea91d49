//! Run-wide relocation report.
//! Append-only while the orchestrator runs; frozen by `finish()`.

use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RelocationReport {
    success: bool,
    moved_files: Vec<PathBuf>,
    total_size: u64,
    errors: Vec<String>,
    skipped: Vec<String>,
    #[serde(skip)]
    finished: bool,
}

impl RelocationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_moved(&mut self, old_path: &Path, bytes: u64) {
        debug_assert!(!self.finished, "report already finished");
        self.moved_files.push(old_path.to_path_buf());
        self.total_size = self.total_size.saturating_add(bytes);
    }

    pub(crate) fn record_error(&mut self, msg: impl Into<String>) {
        debug_assert!(!self.finished, "report already finished");
        self.errors.push(msg.into());
    }

    pub(crate) fn record_skip(&mut self, msg: impl Into<String>) {
        debug_assert!(!self.finished, "report already finished");
        self.skipped.push(msg.into());
    }

    /// Success iff nothing failed and at least one folder was relocated.
    pub(crate) fn finish(&mut self) {
        self.success = self.errors.is_empty() && !self.moved_files.is_empty();
        self.finished = true;
    }

    pub fn success(&self) -> bool {
        self.success
    }

    pub fn moved_files(&self) -> &[PathBuf] {
        &self.moved_files
    }

    pub fn total_size(&self) -> u64 {
        self.total_size
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn skipped(&self) -> &[String] {
        &self.skipped
    }

    /// Plain-language multi-line summary for the console.
    pub fn summary(&self) -> String {
        let mut s = format!(
            "Relocation {}.\nFolders moved: {}\nTotal size moved: {} bytes\n",
            if self.success { "succeeded" } else { "failed" },
            self.moved_files.len(),
            self.total_size
        );
        for p in &self.moved_files {
            s.push_str(&format!("  moved: {}\n", p.display()));
        }
        for k in &self.skipped {
            s.push_str(&format!("  skipped: {k}\n"));
        }
        if !self.errors.is_empty() {
            s.push_str("Errors:\n");
            for e in &self.errors {
                s.push_str(&format!("  {e}\n"));
            }
        }
        s
    }
}

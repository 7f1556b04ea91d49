//! Tracing setup for a relocation run.
//!
//! - The console layer writes to stderr; stdout carries only the report.
//!   With `--json` the console emits one JSON object per event, so a caller
//!   parsing the report from stdout can parse stderr the same way.
//! - The file layer is always JSON and carries the full span list, so every
//!   line of a run can be tied back to its `relocation_run` span.
//! - Our own targets follow LogLevel; dependencies stay at WARN or quieter.
//! - File logging is refused if any ancestor of the log path is a symlink.

use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use chrono::Local;
use folder_relocator::config::{default_log_path, path_has_symlink_ancestor, LogLevel};
use folder_relocator::output as out;
use folder_relocator::platform::open_log_file_secure_append;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::filter::{EnvFilter, LevelFilter};
use tracing_subscriber::fmt::{self as tsfmt, format::Writer, time::FormatTime};
use tracing_subscriber::prelude::*;

/// Local timestamps in the same shape as the run span's `started` field.
struct RunClock;

impl FormatTime for RunClock {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        write!(w, "{}", Local::now().format("%Y-%m-%dT%H:%M:%S%.3f"))
    }
}

fn level_filter(lvl: &LogLevel) -> LevelFilter {
    match lvl {
        LogLevel::Quiet => LevelFilter::ERROR,
        LogLevel::Normal => LevelFilter::INFO,
        LogLevel::Info => LevelFilter::DEBUG,
        LogLevel::Debug => LevelFilter::TRACE,
    }
}

fn run_filter(level: LevelFilter) -> EnvFilter {
    let deps = std::cmp::min(level, LevelFilter::WARN);
    EnvFilter::builder()
        .with_default_directive(deps.into())
        .parse_lossy(format!("folder_relocator={}", level.to_string().to_ascii_lowercase()))
}

fn open_file_writer(path: &Path) -> Result<(NonBlocking, WorkerGuard)> {
    if path_has_symlink_ancestor(path)? {
        bail!("an ancestor of {} is a symlink", path.display());
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = open_log_file_secure_append(path)?;
    Ok(tracing_appender::non_blocking(file))
}

/// Install the global subscriber. The returned guard must live until exit so
/// the file appender is flushed.
pub fn init_tracing(lvl: &LogLevel, log_file: Option<&Path>, json: bool) -> Result<Option<WorkerGuard>> {
    let path: Option<PathBuf> = match log_file {
        Some(p) => Some(p.to_path_buf()),
        None => default_log_path()
            .map_err(|e| out::print_warn(&format!("No default log file available ({e:#}); logging to the console only.")))
            .ok(),
    };

    let file = path.and_then(|p| match open_file_writer(&p) {
        Ok(w) => Some(w),
        Err(e) => {
            out::print_warn(&format!(
                "File logging to '{}' was not enabled ({e:#}); logs continue on the console.",
                p.display()
            ));
            None
        }
    });
    let (file_writer, guard) = match file {
        Some((w, g)) => (Some(w), Some(g)),
        None => (None, None),
    };

    let json_console = json.then(|| {
        tsfmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(false)
            .with_timer(RunClock)
            .with_writer(std::io::stderr)
    });
    let compact_console = (!json).then(|| {
        tsfmt::layer()
            .compact()
            .with_timer(RunClock)
            .with_target(false)
            .with_writer(std::io::stderr)
    });
    let file_layer = file_writer.map(|w| {
        tsfmt::layer()
            .json()
            .with_span_list(true)
            .with_timer(RunClock)
            .with_ansi(false)
            .with_writer(w)
    });

    tracing_subscriber::registry()
        .with(json_console)
        .with(compact_console)
        .with(file_layer)
        .with(run_filter(level_filter(lvl)))
        .try_init()?;
    Ok(guard)
}

//! User-facing console lines.
//! Colors are enabled only when the target stream is a TTY; everything here is
//! for people, structured diagnostics go through `tracing`.

use owo_colors::OwoColorize;

use crate::fs_ops::space::format_bytes;
use crate::known_folders::KNOWN_FOLDERS;
use crate::relocate::RelocationReport;

fn stdout_tty() -> bool {
    atty::is(atty::Stream::Stdout)
}

fn stderr_tty() -> bool {
    atty::is(atty::Stream::Stderr)
}

pub fn print_info(msg: &str) {
    if stdout_tty() {
        println!("{} {}", "info:".cyan().bold(), msg);
    } else {
        println!("info: {}", msg);
    }
}

pub fn print_warn(msg: &str) {
    if stderr_tty() {
        eprintln!("{} {}", "warn:".yellow().bold(), msg);
    } else {
        eprintln!("warn: {}", msg);
    }
}

pub fn print_error(msg: &str) {
    if stderr_tty() {
        eprintln!("{} {}", "error:".red().bold(), msg);
    } else {
        eprintln!("error: {}", msg);
    }
}

pub fn print_success(msg: &str) {
    if stdout_tty() {
        println!("{} {}", "ok:".green().bold(), msg);
    } else {
        println!("ok: {}", msg);
    }
}

/// Plain line without prefix, for output users may script against.
pub fn print_user(msg: &str) {
    println!("{}", msg);
}

/// One row per known folder; `location` fills the last column when available.
pub fn render_folder_table(location: impl Fn(&str) -> Option<String>) -> String {
    let mut s = format!("{:<10} {:<40} {}\n", "FOLDER", "REGISTRY VALUE", "LOCATION");
    for f in KNOWN_FOLDERS {
        let loc = location(f.name).unwrap_or_else(|| "-".to_string());
        s.push_str(&format!("{:<10} {:<40} {}\n", f.name, f.value_name, loc));
    }
    s
}

/// Final report: JSON on stdout, or the summary with a colored verdict.
pub fn print_report(report: &RelocationReport, json: bool) -> serde_json::Result<()> {
    if json {
        print_user(&serde_json::to_string_pretty(report)?);
        return Ok(());
    }
    print_user(report.summary().trim_end());
    let sized = format!("{} moved", format_bytes(report.total_size()));
    if report.success() {
        print_success(&sized);
    } else if report.moved_files().is_empty() && report.errors().is_empty() {
        print_warn("no folder was relocated");
    } else {
        print_error(&format!("{} error(s); {sized}", report.errors().len()));
    }
    Ok(())
}

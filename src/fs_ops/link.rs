//! Compatibility links: after relocation the old folder path must keep resolving
//! to the new location. Creation is platform specific (a directory junction on
//! Windows); detection is shared.

use std::io;
use std::path::Path;

pub trait LinkEstablisher {
    /// Create `link` (which must not exist) pointing at the existing directory `target`.
    fn establish(&self, link: &Path, target: &Path) -> io::Result<()>;
}

/// True if `link` currently resolves to the same directory as `target`.
pub fn points_to(link: &Path, target: &Path) -> bool {
    match (dunce::canonicalize(link), dunce::canonicalize(target)) {
        (Ok(a), Ok(b)) => same_path(&a, &b),
        _ => false,
    }
}

#[cfg(windows)]
fn same_path(a: &Path, b: &Path) -> bool {
    a.as_os_str().eq_ignore_ascii_case(b.as_os_str())
}

#[cfg(not(windows))]
fn same_path(a: &Path, b: &Path) -> bool {
    a == b
}

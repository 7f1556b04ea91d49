//! BLAKE3 content checksums for post-copy verification.

use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

const CHUNK: usize = 64 * 1024;

pub fn file_checksum(path: &Path) -> io::Result<blake3::Hash> {
    let mut reader = BufReader::with_capacity(CHUNK, File::open(path)?);
    let mut hasher = blake3::Hasher::new();
    let mut buf = vec![0u8; CHUNK];
    loop {
        let n = reader.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hasher.finalize())
}

/// True when both files have identical content.
pub fn same_content(a: &Path, b: &Path) -> io::Result<bool> {
    Ok(file_checksum(a)? == file_checksum(b)?)
}

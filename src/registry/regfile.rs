//! `.reg` file codec and a file-backed `RegistryExporter`.
//!
//! Writes the format produced by `reg export` / regedit:
//! - UTF-16LE with BOM, CRLF line endings
//! - `Windows Registry Editor Version 5.00` header, one `[key]` section
//! - REG_SZ as `"name"="data"`, REG_EXPAND_SZ as `"name"=hex(2):..` (UTF-16LE bytes,
//!   NUL-terminated, wrapped with `,\` continuations)
//!
//! The parser accepts UTF-16LE (BOM) or UTF-8 input and ignores sections for other keys.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use tracing::debug;

use super::{RegistryExporter, RegistryValue, ShellFolderStore, ValueKind, shell_folders_key_path};

pub const REG_HEADER: &str = "Windows Registry Editor Version 5.00";
const REG_HEADER_V4: &str = "REGEDIT4";
const WRAP_AT: usize = 77;

fn invalid(msg: impl Into<String>) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, msg.into())
}

fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        if c == '"' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    out
}

fn encode_value(value: &RegistryValue) -> String {
    match value.kind {
        ValueKind::String => format!("{}={}\r\n", quote(&value.name), quote(&value.data)),
        ValueKind::ExpandString => {
            let mut bytes: Vec<u8> = value
                .data
                .encode_utf16()
                .flat_map(|u| u.to_le_bytes())
                .collect();
            bytes.extend([0, 0]);

            let mut out = String::new();
            let mut line = format!("{}=hex(2):", quote(&value.name));
            for (i, b) in bytes.iter().enumerate() {
                line.push_str(&format!("{b:02x}"));
                if i + 1 < bytes.len() {
                    line.push(',');
                    if line.len() >= WRAP_AT {
                        out.push_str(&line);
                        out.push_str("\\\r\n");
                        line = String::from("  ");
                    }
                }
            }
            out.push_str(&line);
            out.push_str("\r\n");
            out
        }
    }
}

/// Render a full `.reg` document for `key`.
pub fn encode(key: &str, values: &[RegistryValue]) -> String {
    let mut out = format!("{REG_HEADER}\r\n\r\n[{key}]\r\n");
    for v in values {
        out.push_str(&encode_value(v));
    }
    out.push_str("\r\n");
    out
}

/// UTF-16LE with BOM, as written by `reg export`.
pub fn to_utf16_bytes(text: &str) -> Vec<u8> {
    let mut bytes = vec![0xFF, 0xFE];
    bytes.extend(text.encode_utf16().flat_map(|u| u.to_le_bytes()));
    bytes
}

/// Decode file bytes (UTF-16LE with BOM, or UTF-8 with optional BOM).
pub fn decode_text(bytes: &[u8]) -> io::Result<String> {
    if let Some(rest) = bytes.strip_prefix(&[0xFF, 0xFE]) {
        if rest.len() % 2 != 0 {
            return Err(invalid("truncated UTF-16 registry file"));
        }
        let units: Vec<u16> = rest
            .chunks_exact(2)
            .map(|c| u16::from_le_bytes([c[0], c[1]]))
            .collect();
        return String::from_utf16(&units).map_err(|e| invalid(e.to_string()));
    }
    let rest = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(bytes);
    String::from_utf8(rest.to_vec()).map_err(|e| invalid(e.to_string()))
}

/// Parse a `"..."` token with `\"` / `\\` escapes; returns (content, remainder).
fn parse_quoted(s: &str) -> io::Result<(String, &str)> {
    let body = s
        .strip_prefix('"')
        .ok_or_else(|| invalid(format!("expected quoted string: {s}")))?;
    let mut out = String::new();
    let mut escaped = false;
    for (i, c) in body.char_indices() {
        if escaped {
            out.push(c);
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == '"' {
            return Ok((out, &body[i + 1..]));
        } else {
            out.push(c);
        }
    }
    Err(invalid(format!("unterminated quoted string: {s}")))
}

fn parse_hex2(list: &str) -> io::Result<String> {
    let bytes = list
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(|t| u8::from_str_radix(t, 16).map_err(|_| invalid(format!("bad hex byte '{t}'"))))
        .collect::<io::Result<Vec<u8>>>()?;
    if bytes.len() % 2 != 0 {
        return Err(invalid("odd byte count in hex(2) value"));
    }
    let mut units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|c| u16::from_le_bytes([c[0], c[1]]))
        .collect();
    while units.last() == Some(&0) {
        units.pop();
    }
    String::from_utf16(&units).map_err(|e| invalid(e.to_string()))
}

/// Join `\`-continued lines into logical lines.
fn logical_lines(text: &str) -> Vec<String> {
    let mut lines = Vec::new();
    let mut pending = String::new();
    for raw in text.lines() {
        let piece = if pending.is_empty() { raw.trim_end() } else { raw.trim() };
        if let Some(head) = piece.strip_suffix('\\') {
            pending.push_str(head);
            continue;
        }
        pending.push_str(piece);
        lines.push(std::mem::take(&mut pending));
    }
    if !pending.is_empty() {
        lines.push(pending);
    }
    lines
}

/// Parse the values stored under `key` from a `.reg` document.
pub fn parse(text: &str, key: &str) -> io::Result<Vec<RegistryValue>> {
    let mut lines = logical_lines(text).into_iter().filter(|l| !l.trim().is_empty());

    match lines.next() {
        Some(h) if h.trim() == REG_HEADER || h.trim() == REG_HEADER_V4 => {}
        _ => return Err(invalid("missing registry file header")),
    }

    let mut values = Vec::new();
    let mut in_key = false;
    for line in lines {
        let line = line.trim();
        if line.starts_with(';') {
            continue;
        }
        if let Some(section) = line.strip_prefix('[') {
            let section = section.trim_end_matches(']');
            in_key = section.eq_ignore_ascii_case(key);
            continue;
        }
        if !in_key || line.starts_with('@') {
            continue;
        }

        let (name, rest) = parse_quoted(line)?;
        let rest = rest
            .trim_start()
            .strip_prefix('=')
            .ok_or_else(|| invalid(format!("expected '=' after value name in: {line}")))?
            .trim_start();

        let value = if rest.starts_with('"') {
            let (data, _) = parse_quoted(rest)?;
            RegistryValue { name, kind: ValueKind::String, data }
        } else if let Some(list) = rest.strip_prefix("hex(2):") {
            RegistryValue { name, kind: ValueKind::ExpandString, data: parse_hex2(list)? }
        } else if rest == "-" {
            debug!(value = %name, "ignoring deletion entry in registry file");
            continue;
        } else {
            return Err(invalid(format!("unsupported value type for '{name}'")));
        };
        values.push(value);
    }
    Ok(values)
}

/// Exports / imports the shell-folder key through any `ShellFolderStore`.
pub struct RegFileExporter<'a> {
    store: &'a dyn ShellFolderStore,
    key: String,
}

impl<'a> RegFileExporter<'a> {
    pub fn new(store: &'a dyn ShellFolderStore) -> Self {
        Self { store, key: shell_folders_key_path() }
    }
}

impl RegistryExporter for RegFileExporter<'_> {
    fn export(&self, dest: &Path) -> io::Result<()> {
        let values = self.store.values()?;
        let text = encode(&self.key, &values);
        let mut f = File::create(dest)?;
        f.write_all(&to_utf16_bytes(&text))?;
        f.sync_all()?;
        debug!(path = %dest.display(), values = values.len(), "exported registry key");
        Ok(())
    }

    fn import(&self, src: &Path) -> io::Result<()> {
        let bytes = std::fs::read(src)?;
        let text = decode_text(&bytes)?;
        let values = parse(&text, &self.key)?;
        if values.is_empty() {
            return Err(invalid(format!("no values for [{}] in file", self.key)));
        }
        for v in &values {
            self.store.write_value(v)?;
        }
        debug!(path = %src.display(), values = values.len(), "imported registry key");
        Ok(())
    }
}

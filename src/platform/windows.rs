//! Windows implementations of the OS seams.
//!
//! - `RegistryShellFolders`: the HKCU `User Shell Folders` key via the Win32 registry API
//! - `JunctionLinker`: directory junctions through `cmd /C mklink /J`
//! - `is_elevated`: `IsUserAnAdmin`
//!
//! Registry handles live in `RegKey`, which closes them on drop.

use std::ffi::OsStr;
use std::io;
use std::iter::once;
use std::os::windows::ffi::OsStrExt;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::ptr;

use tracing::debug;
use windows_sys::Win32::Foundation::{ERROR_MORE_DATA, ERROR_NO_MORE_ITEMS, ERROR_SUCCESS};
use windows_sys::Win32::System::Environment::ExpandEnvironmentStringsW;
use windows_sys::Win32::System::Registry::{
    HKEY, HKEY_CURRENT_USER, KEY_READ, KEY_SET_VALUE, REG_EXPAND_SZ, REG_SZ, RegCloseKey,
    RegEnumValueW, RegOpenKeyExW, RegQueryValueExW, RegSetValueExW,
};
use windows_sys::Win32::UI::Shell::IsUserAnAdmin;

use crate::fs_ops::LinkEstablisher;
use crate::known_folders::KnownFolder;
use crate::registry::{RegistryValue, SHELL_FOLDERS_KEY, ShellFolderStore, ValueKind};

fn wide(s: impl AsRef<OsStr>) -> Vec<u16> {
    s.as_ref().encode_wide().chain(once(0)).collect()
}

fn from_wide(buf: &[u16]) -> String {
    let end = buf.iter().position(|&c| c == 0).unwrap_or(buf.len());
    String::from_utf16_lossy(&buf[..end])
}

fn win_err(code: u32) -> io::Error {
    io::Error::from_raw_os_error(code as i32)
}

/// True when the process token belongs to the Administrators group.
pub fn is_elevated() -> bool {
    unsafe { IsUserAnAdmin() != 0 }
}

/// Expand `%VARIABLE%` references using the process environment.
fn expand_env(s: &str) -> io::Result<String> {
    let src = wide(s);
    let mut buf = vec![0u16; 512];
    loop {
        let needed = unsafe { ExpandEnvironmentStringsW(src.as_ptr(), buf.as_mut_ptr(), buf.len() as u32) };
        if needed == 0 {
            return Err(io::Error::last_os_error());
        }
        if needed as usize <= buf.len() {
            return Ok(from_wide(&buf));
        }
        buf.resize(needed as usize, 0);
    }
}

struct RegKey(HKEY);

impl RegKey {
    fn open(access: u32) -> io::Result<Self> {
        let subkey = wide(SHELL_FOLDERS_KEY);
        let mut hkey: HKEY = ptr::null_mut();
        let rc = unsafe { RegOpenKeyExW(HKEY_CURRENT_USER, subkey.as_ptr(), 0, access, &mut hkey) };
        if rc != ERROR_SUCCESS {
            return Err(win_err(rc));
        }
        Ok(Self(hkey))
    }

    /// Data bytes and type of `name`, growing the buffer as the API asks.
    fn query(&self, name: &str) -> io::Result<(u32, Vec<u8>)> {
        let name_w = wide(name);
        let mut data = vec![0u8; 1024];
        loop {
            let mut kind = 0u32;
            let mut len = data.len() as u32;
            let rc = unsafe {
                RegQueryValueExW(self.0, name_w.as_ptr(), ptr::null(), &mut kind, data.as_mut_ptr(), &mut len)
            };
            match rc {
                ERROR_SUCCESS => {
                    data.truncate(len as usize);
                    return Ok((kind, data));
                }
                ERROR_MORE_DATA => data.resize(len as usize, 0),
                other => return Err(win_err(other)),
            }
        }
    }

    fn enum_values(&self) -> io::Result<Vec<RegistryValue>> {
        let mut out = Vec::new();
        let mut name = vec![0u16; 16_384];
        let mut data = vec![0u8; 2048];
        let mut index = 0u32;
        loop {
            let mut name_len = name.len() as u32;
            let mut data_len = data.len() as u32;
            let mut kind = 0u32;
            let rc = unsafe {
                RegEnumValueW(
                    self.0,
                    index,
                    name.as_mut_ptr(),
                    &mut name_len,
                    ptr::null(),
                    &mut kind,
                    data.as_mut_ptr(),
                    &mut data_len,
                )
            };
            match rc {
                ERROR_SUCCESS => {}
                ERROR_NO_MORE_ITEMS => return Ok(out),
                ERROR_MORE_DATA => {
                    data.resize(data_len as usize, 0);
                    continue;
                }
                other => return Err(win_err(other)),
            }
            let value_name = String::from_utf16_lossy(&name[..name_len as usize]);
            let kind = match kind {
                REG_SZ => Some(ValueKind::String),
                REG_EXPAND_SZ => Some(ValueKind::ExpandString),
                _ => None,
            };
            match kind {
                Some(kind) => out.push(RegistryValue {
                    name: value_name,
                    kind,
                    data: utf16_bytes_to_string(&data[..data_len as usize]),
                }),
                None => debug!(value = %value_name, "skipping non-string shell folder value"),
            }
            index += 1;
        }
    }

    fn set(&self, value: &RegistryValue) -> io::Result<()> {
        let name_w = wide(&value.name);
        let data: Vec<u8> = wide(&value.data).into_iter().flat_map(u16::to_le_bytes).collect();
        let kind = match value.kind {
            ValueKind::String => REG_SZ,
            ValueKind::ExpandString => REG_EXPAND_SZ,
        };
        let rc = unsafe { RegSetValueExW(self.0, name_w.as_ptr(), 0, kind, data.as_ptr(), data.len() as u32) };
        if rc != ERROR_SUCCESS {
            return Err(win_err(rc));
        }
        Ok(())
    }
}

impl Drop for RegKey {
    fn drop(&mut self) {
        unsafe {
            RegCloseKey(self.0);
        }
    }
}

fn utf16_bytes_to_string(bytes: &[u8]) -> String {
    let units: Vec<u16> = bytes.chunks_exact(2).map(|c| u16::from_le_bytes([c[0], c[1]])).collect();
    from_wide(&units)
}

/// The current user's `User Shell Folders` key.
#[derive(Debug, Default, Clone, Copy)]
pub struct RegistryShellFolders;

impl ShellFolderStore for RegistryShellFolders {
    fn values(&self) -> io::Result<Vec<RegistryValue>> {
        RegKey::open(KEY_READ)?.enum_values()
    }

    fn current_location(&self, folder: &KnownFolder) -> io::Result<PathBuf> {
        let (kind, data) = RegKey::open(KEY_READ)?.query(folder.value_name)?;
        let raw = utf16_bytes_to_string(&data);
        let path = match kind {
            REG_EXPAND_SZ => expand_env(&raw)?,
            REG_SZ => raw,
            other => {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("value '{}' has unexpected registry type {other}", folder.value_name),
                ));
            }
        };
        Ok(PathBuf::from(path))
    }

    fn write_value(&self, value: &RegistryValue) -> io::Result<()> {
        RegKey::open(KEY_SET_VALUE)?.set(value)
    }
}

/// Directory junctions (no privilege needed, same-machine targets only).
#[derive(Debug, Default, Clone, Copy)]
pub struct JunctionLinker;

impl LinkEstablisher for JunctionLinker {
    fn establish(&self, link: &Path, target: &Path) -> io::Result<()> {
        let output = Command::new("cmd").args(["/C", "mklink", "/J"]).arg(link).arg(target).output()?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stdout = String::from_utf8_lossy(&output.stdout);
            let detail = if stderr.trim().is_empty() { stdout } else { stderr };
            return Err(io::Error::other(format!("mklink /J failed ({}): {}", output.status, detail.trim())));
        }
        debug!(link = %link.display(), target = %target.display(), "junction created");
        Ok(())
    }
}

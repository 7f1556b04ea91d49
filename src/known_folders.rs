//! Fixed table of relocatable known folders.
//! Each entry maps a user-facing name to the value under the `User Shell Folders`
//! registry key and the folder's stable KNOWNFOLDERID.

/// Static descriptor of one known folder.
#[derive(Debug, PartialEq, Eq)]
pub struct KnownFolder {
    /// Symbolic name, also used as the directory name under the target base.
    pub name: &'static str,
    /// Registry value name under the shell-folder key.
    pub value_name: &'static str,
    /// KNOWNFOLDERID of the folder.
    pub guid: &'static str,
}

pub const KNOWN_FOLDERS: &[KnownFolder] = &[
    KnownFolder {
        name: "Documents",
        value_name: "Personal",
        guid: "{F42EE2D3-909F-4907-8871-4C22FC0BF756}",
    },
    KnownFolder {
        name: "Downloads",
        value_name: "{374DE290-123F-4565-9164-39C4925E467B}",
        guid: "{374DE290-123F-4565-9164-39C4925E467B}",
    },
    KnownFolder {
        name: "Pictures",
        value_name: "My Pictures",
        guid: "{33E28130-4E1E-4676-835A-98395C3BC3BB}",
    },
    KnownFolder {
        name: "Music",
        value_name: "My Music",
        guid: "{4BD8D571-6D19-48D3-BE97-422220080E43}",
    },
    KnownFolder {
        name: "Videos",
        value_name: "My Video",
        guid: "{18989B1D-99B5-455B-841C-AB7C74E4DDFC}",
    },
    KnownFolder {
        name: "Desktop",
        value_name: "Desktop",
        guid: "{B4BFCC3A-DB2C-424C-B029-7FE99A87C641}",
    },
];

/// Look up a folder by name (ASCII case-insensitive).
pub fn lookup(name: &str) -> Option<&'static KnownFolder> {
    let name = name.trim();
    KNOWN_FOLDERS
        .iter()
        .find(|f| f.name.eq_ignore_ascii_case(name))
}

/// Names of every known folder, in table order.
pub fn all_names() -> Vec<String> {
    KNOWN_FOLDERS.iter().map(|f| f.name.to_string()).collect()
}

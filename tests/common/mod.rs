//! Shared test doubles for the relocation seams.
#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::{Arc, Mutex};

use folder_relocator::fs_ops::{FileCopier, GIB, LinkEstablisher, SpaceProbe, StreamingCopier};
use folder_relocator::known_folders::{self, KnownFolder};
use folder_relocator::registry::{RegFileExporter, RegistryValue, ShellFolderStore, ValueKind};
use folder_relocator::relocate::{
    ContentMover, DecisionProvider, PathValidator, Prompt, RegistryBackup, RegistryUpdater,
    RelocateOptions, RelocationOrchestrator, RelocationReport, MIN_FREE_BYTES,
};

/// In-memory shell-folder key.
#[derive(Default)]
pub struct MemoryStore {
    values: RefCell<Vec<RegistryValue>>,
    pub writes: Cell<usize>,
    pub fail_writes: Cell<bool>,
}

impl MemoryStore {
    pub fn new(values: Vec<RegistryValue>) -> Self {
        Self { values: RefCell::new(values), ..Default::default() }
    }

    /// One expandable value per (folder name, location) pair.
    pub fn with_locations(pairs: &[(&str, &Path)]) -> Self {
        let values = pairs
            .iter()
            .map(|(name, path)| {
                let f = known_folders::lookup(name).expect("known folder");
                RegistryValue::expand_path(f.value_name, path)
            })
            .collect();
        Self::new(values)
    }

    pub fn location_of(&self, name: &str) -> Option<PathBuf> {
        let f = known_folders::lookup(name)?;
        self.values
            .borrow()
            .iter()
            .find(|v| v.name == f.value_name)
            .map(|v| PathBuf::from(&v.data))
    }
}

impl ShellFolderStore for MemoryStore {
    fn values(&self) -> io::Result<Vec<RegistryValue>> {
        Ok(self.values.borrow().clone())
    }

    fn current_location(&self, folder: &KnownFolder) -> io::Result<PathBuf> {
        self.values
            .borrow()
            .iter()
            .find(|v| v.name == folder.value_name)
            .map(|v| PathBuf::from(&v.data))
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, format!("no value {}", folder.value_name)))
    }

    fn write_value(&self, value: &RegistryValue) -> io::Result<()> {
        if self.fail_writes.get() {
            return Err(io::Error::new(io::ErrorKind::PermissionDenied, "registry is read-only in this test"));
        }
        self.writes.set(self.writes.get() + 1);
        let mut values = self.values.borrow_mut();
        match values.iter_mut().find(|v| v.name == value.name) {
            Some(v) => *v = value.clone(),
            None => values.push(value.clone()),
        }
        Ok(())
    }
}

pub fn string_value(name: &str, data: &str) -> RegistryValue {
    RegistryValue { name: name.into(), kind: ValueKind::String, data: data.into() }
}

/// Fixed free-space answer.
pub struct FakeSpace(pub u64);

impl SpaceProbe for FakeSpace {
    fn free_bytes(&self, _path: &Path) -> io::Result<u64> {
        Ok(self.0)
    }
}

/// Plain directory symlink standing in for a junction.
pub struct SymlinkLinker;

impl LinkEstablisher for SymlinkLinker {
    fn establish(&self, link: &Path, target: &Path) -> io::Result<()> {
        #[cfg(unix)]
        {
            std::os::unix::fs::symlink(target, link)
        }
        #[cfg(windows)]
        {
            std::os::windows::fs::symlink_dir(target, link)
        }
    }
}

pub struct FailingLinker;

impl LinkEstablisher for FailingLinker {
    fn establish(&self, _link: &Path, _target: &Path) -> io::Result<()> {
        Err(io::Error::other("junction creation refused"))
    }
}

/// Copies correctly, then appends a byte to the destination.
pub struct CorruptingCopier;

impl FileCopier for CorruptingCopier {
    fn copy_file(&self, src: &Path, dest: &Path) -> anyhow::Result<u64> {
        let n = StreamingCopier.copy_file(src, dest)?;
        let mut f = fs::OpenOptions::new().append(true).open(dest)?;
        f.write_all(b"!")?;
        Ok(n)
    }
}

/// Refuses to transfer the named files and records every attempt by file name.
pub struct FlakyCopier {
    pub fail_on: Vec<&'static str>,
    pub attempts: Rc<RefCell<Vec<String>>>,
}

impl FlakyCopier {
    pub fn failing_on(names: &[&'static str]) -> Self {
        Self { fail_on: names.to_vec(), attempts: Rc::default() }
    }

    fn attempt(&self, src: &Path) -> io::Result<()> {
        let name = src.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
        self.attempts.borrow_mut().push(name.clone());
        if self.fail_on.contains(&name.as_str()) {
            return Err(io::Error::new(io::ErrorKind::PermissionDenied, format!("{name} is locked")));
        }
        Ok(())
    }
}

impl FileCopier for FlakyCopier {
    fn copy_file(&self, src: &Path, dest: &Path) -> anyhow::Result<u64> {
        self.attempt(src)?;
        StreamingCopier.copy_file(src, dest)
    }

    fn move_file(&self, src: &Path, dest: &Path) -> io::Result<()> {
        self.attempt(src)?;
        fs::rename(src, dest)
    }
}

/// Answers every prompt with `answer` and remembers what was asked.
pub struct RecordingDecisions {
    pub answer: bool,
    pub asked: RefCell<Vec<Prompt>>,
}

impl RecordingDecisions {
    pub fn answering(answer: bool) -> Self {
        Self { answer, asked: RefCell::new(Vec::new()) }
    }
}

impl DecisionProvider for RecordingDecisions {
    fn confirm(&self, prompt: &Prompt) -> bool {
        self.asked.borrow_mut().push(prompt.clone());
        self.answer
    }
}

/// Every seam of one relocation run, wired to fakes.
pub struct Rig {
    pub store: MemoryStore,
    pub space: FakeSpace,
    pub copier: Box<dyn FileCopier>,
    pub linker: Box<dyn LinkEstablisher>,
    pub decisions: RecordingDecisions,
    pub backup_dir: PathBuf,
    pub protected_roots: Vec<PathBuf>,
}

impl Rig {
    pub fn new(store: MemoryStore, backup_dir: impl Into<PathBuf>) -> Self {
        Self {
            store,
            space: FakeSpace(100 * GIB),
            copier: Box::new(StreamingCopier),
            linker: Box::new(SymlinkLinker),
            decisions: RecordingDecisions::answering(true),
            backup_dir: backup_dir.into(),
            protected_roots: Vec::new(),
        }
    }

    pub fn run(&self, options: RelocateOptions, folders: &[&str], target_base: &Path) -> RelocationReport {
        let exporter = RegFileExporter::new(&self.store);
        let validator = PathValidator::new(&self.space, self.protected_roots.clone(), MIN_FREE_BYTES)
            .dry_run(options.dry_run);
        let backup = RegistryBackup::new(&exporter, &self.decisions, &self.backup_dir, options);
        let mover = ContentMover::new(self.copier.as_ref(), self.linker.as_ref(), &self.decisions, options);
        let updater = RegistryUpdater::new(&self.store, options.dry_run);
        RelocationOrchestrator::new(&self.store, validator, backup, mover, updater).run(folders.iter().copied(), target_base)
    }
}

/// A user profile with a populated Documents folder under `root`.
pub struct Profile {
    pub documents: PathBuf,
    pub target: PathBuf,
    pub backups: PathBuf,
}

impl Profile {
    pub fn create(root: &Path) -> Self {
        let documents = root.join("home").join("Documents");
        fs::create_dir_all(documents.join("taxes")).unwrap();
        fs::write(documents.join("notes.txt"), b"buy milk").unwrap();
        fs::write(documents.join("taxes").join("2025.pdf"), vec![7u8; 4096]).unwrap();
        Self {
            documents,
            target: root.join("D"),
            backups: root.join("backups"),
        }
    }

    pub fn content_bytes() -> u64 {
        8 + 4096
    }
}

/// In-memory writer for scoped tracing subscribers.
#[derive(Clone, Default)]
pub struct LogBuffer(pub Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Relative paths of the regular files under `root`.
pub fn files_under(root: &Path) -> Vec<PathBuf> {
    snapshot(root).into_iter().filter(|p| root.join(p).is_file()).collect()
}

/// Sorted relative paths of everything under `root`.
pub fn snapshot(root: &Path) -> Vec<PathBuf> {
    let mut out: Vec<PathBuf> = walkdir::WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_map(Result::ok)
        .map(|e| e.path().strip_prefix(root).unwrap().to_path_buf())
        .collect();
    out.sort();
    out
}

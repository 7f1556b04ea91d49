mod common;

use std::fs;
use std::path::Path;

use common::{
    CorruptingCopier, FailingLinker, FakeSpace, FlakyCopier, LogBuffer, MemoryStore, Profile, RecordingDecisions, Rig,
    SymlinkLinker, files_under, snapshot,
};
use folder_relocator::errors::MoveFailure;
use folder_relocator::fs_ops::GIB;
use folder_relocator::relocate::{ContentMover, MoveStatus, OverwritePolicy, Prompt, RelocateOptions};
use tempfile::tempdir;

fn documents_rig(profile: &Profile) -> Rig {
    Rig::new(MemoryStore::with_locations(&[("Documents", &profile.documents)]), &profile.backups)
}

fn is_symlink(p: &Path) -> bool {
    fs::symlink_metadata(p).map(|m| m.file_type().is_symlink()).unwrap_or(false)
}

#[test]
fn relocates_documents_and_leaves_a_link() -> Result<(), Box<dyn std::error::Error>> {
    let td = tempdir()?;
    let profile = Profile::create(td.path());
    let rig = documents_rig(&profile);

    let report = rig.run(RelocateOptions::default(), &["Documents"], &profile.target);

    assert!(report.success(), "errors: {:?}", report.errors());
    assert_eq!(report.moved_files(), &[profile.documents.clone()]);
    assert_eq!(report.total_size(), Profile::content_bytes());

    let new_docs = profile.target.join("Documents");
    assert_eq!(fs::read(new_docs.join("notes.txt"))?, b"buy milk");
    assert_eq!(fs::read(new_docs.join("taxes").join("2025.pdf"))?.len(), 4096);

    assert!(is_symlink(&profile.documents), "old location must become a link");
    assert_eq!(fs::read(profile.documents.join("notes.txt"))?, b"buy milk");
    assert!(profile.documents.with_file_name("Documents_backup").is_dir());

    assert_eq!(rig.store.location_of("Documents"), Some(new_docs));
    assert_eq!(fs::read_dir(&profile.backups)?.count(), 1);
    Ok(())
}

#[test]
fn protected_root_is_refused_regardless_of_space() {
    let td = tempdir().unwrap();
    let profile = Profile::create(td.path());
    let windows = td.path().join("Windows");
    let mut rig = documents_rig(&profile);
    rig.space = FakeSpace(10_000 * GIB);
    rig.protected_roots = vec![windows.clone()];

    let report = rig.run(RelocateOptions::default(), &["Documents"], &windows);

    assert!(!report.success());
    assert_eq!(report.errors().len(), 1);
    assert!(report.errors()[0].contains("protected"), "{:?}", report.errors());
    assert!(!windows.exists(), "nothing may be created under a protected root");
    assert_eq!(rig.store.writes.get(), 0);
    assert!(profile.documents.join("notes.txt").is_file());
}

#[test]
fn dry_run_changes_nothing_and_reports_success() {
    let td = tempdir().unwrap();
    let profile = Profile::create(td.path());
    let rig = documents_rig(&profile);
    let before = snapshot(td.path());

    let options = RelocateOptions { dry_run: true, verify_integrity: true, delete_source: true, ..Default::default() };
    let report = rig.run(options, &["Documents"], &profile.target);

    assert!(report.success(), "errors: {:?}", report.errors());
    assert_eq!(report.moved_files(), &[profile.documents.clone()]);
    assert_eq!(snapshot(td.path()), before);
    assert_eq!(rig.store.writes.get(), 0);
    assert!(!profile.backups.exists());
}

#[test]
fn second_run_to_same_destination_is_a_noop() {
    let td = tempdir().unwrap();
    let profile = Profile::create(td.path());
    let rig = documents_rig(&profile);

    let first = rig.run(RelocateOptions::default(), &["Documents"], &profile.target);
    assert!(first.success(), "errors: {:?}", first.errors());
    let location = rig.store.location_of("Documents");
    let after_first = snapshot(&profile.target);

    // The store now points at the new location, as the registry would.
    let second = rig.run(RelocateOptions::default(), &["Documents"], &profile.target);

    assert!(second.success(), "errors: {:?}", second.errors());
    assert_eq!(second.total_size(), 0);
    assert_eq!(rig.store.location_of("Documents"), location);
    assert_eq!(snapshot(&profile.target), after_first);
    assert!(!td.path().join("D").join("Documents_backup").exists());
}

#[test]
fn unknown_folder_is_logged_not_reported() {
    let td = tempdir().unwrap();
    let profile = Profile::create(td.path());
    let rig = documents_rig(&profile);

    let logs = LogBuffer::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::INFO)
        .finish();

    let report = tracing::subscriber::with_default(subscriber, || {
        rig.run(RelocateOptions::default(), &["Foo", "Documents"], &profile.target)
    });

    let out = logs.contents();
    let line = out.lines().find(|l| l.contains("Unknown folder: Foo")).expect("warning for Foo");
    assert!(line.contains("WARN"), "{line}");
    assert!(line.contains("relocation_run"), "logs carry the run span: {line}");
    assert!(report.errors().is_empty(), "{:?}", report.errors());
    assert_eq!(report.moved_files(), &[profile.documents.clone()]);
    assert!(report.success());
}

#[test]
fn only_unknown_folders_is_not_success() {
    let td = tempdir().unwrap();
    let profile = Profile::create(td.path());
    let rig = documents_rig(&profile);

    let report = rig.run(RelocateOptions::default(), &["Foo"], &profile.target);
    assert!(!report.success());
    assert!(report.errors().is_empty());
    assert!(report.moved_files().is_empty());
}

#[test]
fn low_free_space_fails_validation() {
    let td = tempdir().unwrap();
    let profile = Profile::create(td.path());
    let mut rig = documents_rig(&profile);
    rig.space = FakeSpace(3 * GIB);

    let report = rig.run(RelocateOptions::default(), &["Documents"], &profile.target);

    assert!(!report.success());
    assert_eq!(report.errors().len(), 1);
    assert!(report.errors()[0].contains("Insufficient disk space"), "{:?}", report.errors());
    assert!(profile.documents.join("notes.txt").is_file());
    assert!(!is_symlink(&profile.documents));
}

#[test]
fn checksum_mismatch_keeps_the_source() {
    let td = tempdir().unwrap();
    let profile = Profile::create(td.path());
    let mut rig = documents_rig(&profile);
    rig.copier = Box::new(CorruptingCopier);

    let options = RelocateOptions { verify_integrity: true, delete_source: true, ..Default::default() };
    let report = rig.run(options, &["Documents"], &profile.target);

    assert!(!report.success());
    assert_eq!(report.errors().len(), 1);
    assert!(report.errors()[0].contains("checksum mismatch"), "{:?}", report.errors());
    assert!(!is_symlink(&profile.documents));
    assert_eq!(fs::read(profile.documents.join("notes.txt")).unwrap(), b"buy milk");
    assert_eq!(fs::read(profile.documents.join("taxes").join("2025.pdf")).unwrap().len(), 4096);
    assert_eq!(rig.store.location_of("Documents"), Some(profile.documents.clone()));
}

#[test]
fn overwrite_all_replaces_stale_destination() {
    let td = tempdir().unwrap();
    let profile = Profile::create(td.path());
    let stale_dir = profile.target.join("Documents");
    fs::create_dir_all(&stale_dir).unwrap();
    fs::write(stale_dir.join("stale.txt"), b"old").unwrap();
    let rig = documents_rig(&profile);

    let options = RelocateOptions { overwrite: OverwritePolicy::All, ..Default::default() };
    let report = rig.run(options, &["Documents"], &profile.target);

    assert!(report.success(), "errors: {:?}", report.errors());
    assert!(!stale_dir.join("stale.txt").exists());
    assert!(stale_dir.join("notes.txt").is_file());
    assert_eq!(report.moved_files().iter().filter(|p| **p == profile.documents).count(), 1);
    assert_eq!(report.moved_files().len(), 1);
    assert!(rig.decisions.asked.borrow().is_empty(), "policy All never asks");
}

#[test]
fn declined_overwrite_skips_folder() {
    let td = tempdir().unwrap();
    let profile = Profile::create(td.path());
    let stale_dir = profile.target.join("Documents");
    fs::create_dir_all(&stale_dir).unwrap();
    fs::write(stale_dir.join("stale.txt"), b"old").unwrap();
    let mut rig = documents_rig(&profile);
    rig.decisions = common::RecordingDecisions::answering(false);

    // Backup prompt never fires (fresh backup dir), so the only question is the overwrite.
    let report = rig.run(RelocateOptions::default(), &["Documents"], &profile.target);

    assert!(!report.success());
    assert!(report.errors().is_empty(), "{:?}", report.errors());
    assert_eq!(report.skipped().len(), 1);
    assert!(matches!(rig.decisions.asked.borrow()[0], Prompt::OverwriteDestination { .. }));
    assert_eq!(fs::read(stale_dir.join("stale.txt")).unwrap(), b"old");
    assert!(profile.documents.join("notes.txt").is_file());
    assert_eq!(rig.store.location_of("Documents"), Some(profile.documents.clone()));
}

#[test]
fn never_policy_skips_without_asking() {
    let td = tempdir().unwrap();
    let profile = Profile::create(td.path());
    let stale_dir = profile.target.join("Documents");
    fs::create_dir_all(&stale_dir).unwrap();
    fs::write(stale_dir.join("stale.txt"), b"old").unwrap();
    let rig = documents_rig(&profile);

    let options = RelocateOptions { overwrite: OverwritePolicy::Never, ..Default::default() };
    let report = rig.run(options, &["Documents"], &profile.target);

    assert_eq!(report.skipped().len(), 1);
    assert!(rig.decisions.asked.borrow().is_empty());
    assert!(stale_dir.join("stale.txt").is_file());
}

#[test]
fn link_failure_rolls_back_and_keeps_registry() {
    let td = tempdir().unwrap();
    let profile = Profile::create(td.path());
    let mut rig = documents_rig(&profile);
    rig.linker = Box::new(FailingLinker);

    let report = rig.run(RelocateOptions::default(), &["Documents"], &profile.target);

    assert!(!report.success());
    assert!(report.errors()[0].contains("compatibility link failure"), "{:?}", report.errors());
    assert!(profile.documents.is_dir() && !is_symlink(&profile.documents));
    assert!(!profile.documents.with_file_name("Documents_backup").exists());
    // Every file is back where the registry still points.
    assert_eq!(fs::read(profile.documents.join("notes.txt")).unwrap(), b"buy milk");
    assert_eq!(fs::read(profile.documents.join("taxes").join("2025.pdf")).unwrap().len(), 4096);
    assert!(files_under(&profile.target).is_empty(), "{:?}", snapshot(&profile.target));
    assert_eq!(rig.store.writes.get(), 0);
}

#[test]
fn retry_with_overwrite_all_after_link_failure_keeps_every_file() {
    let td = tempdir().unwrap();
    let profile = Profile::create(td.path());
    let mut rig = documents_rig(&profile);
    rig.linker = Box::new(FailingLinker);
    let first = rig.run(RelocateOptions::default(), &["Documents"], &profile.target);
    assert!(!first.success());

    rig.linker = Box::new(SymlinkLinker);
    let options = RelocateOptions { overwrite: OverwritePolicy::All, ..Default::default() };
    let second = rig.run(options, &["Documents"], &profile.target);

    assert!(second.success(), "errors: {:?}", second.errors());
    assert_eq!(second.total_size(), Profile::content_bytes());
    let new_docs = profile.target.join("Documents");
    assert_eq!(fs::read(new_docs.join("notes.txt")).unwrap(), b"buy milk");
    assert_eq!(fs::read(new_docs.join("taxes").join("2025.pdf")).unwrap().len(), 4096);
    assert!(is_symlink(&profile.documents));
    assert_eq!(rig.store.location_of("Documents"), Some(new_docs));
}

#[test]
fn locked_file_does_not_stop_the_walk_and_nothing_is_stranded() {
    let td = tempdir().unwrap();
    let profile = Profile::create(td.path());
    let mut rig = documents_rig(&profile);
    let copier = FlakyCopier::failing_on(&["notes.txt"]);
    let attempts = copier.attempts.clone();
    rig.copier = Box::new(copier);

    let report = rig.run(RelocateOptions::default(), &["Documents"], &profile.target);

    assert!(!report.success());
    assert_eq!(report.errors().len(), 1);
    assert!(report.errors()[0].contains("notes.txt is locked"), "{:?}", report.errors());
    // The later file was still attempted, then returned with the rest.
    assert_eq!(*attempts.borrow(), ["notes.txt", "2025.pdf"]);
    assert_eq!(fs::read(profile.documents.join("notes.txt")).unwrap(), b"buy milk");
    assert_eq!(fs::read(profile.documents.join("taxes").join("2025.pdf")).unwrap().len(), 4096);
    assert!(!is_symlink(&profile.documents));
    assert!(files_under(&profile.target).is_empty(), "{:?}", snapshot(&profile.target));
    assert_eq!(rig.store.writes.get(), 0);
}

#[test]
fn verify_mode_collects_one_error_per_failed_file() {
    let td = tempdir().unwrap();
    let profile = Profile::create(td.path());
    let copier = FlakyCopier::failing_on(&["notes.txt", "2025.pdf"]);
    let decisions = RecordingDecisions::answering(true);
    let options = RelocateOptions { verify_integrity: true, ..Default::default() };
    let linker = SymlinkLinker;
    let mover = ContentMover::new(&copier, &linker, &decisions, options);

    let out = mover.relocate_contents("Documents", &profile.documents, &profile.target.join("Documents"));

    assert_eq!(out.status, MoveStatus::Failed);
    assert_eq!(out.errors.len(), 2, "{:?}", out.errors);
    assert!(out.errors.iter().all(|e| e.kind == MoveFailure::Copy));
    assert_eq!(out.primary_failure(), Some(MoveFailure::Copy));
    assert_eq!(*copier.attempts.borrow(), ["notes.txt", "2025.pdf"]);
    assert!(!is_symlink(&profile.documents));
    assert_eq!(fs::read(profile.documents.join("notes.txt")).unwrap(), b"buy milk");
    assert_eq!(fs::read(profile.documents.join("taxes").join("2025.pdf")).unwrap().len(), 4096);
}

#[test]
fn registry_write_failure_is_reported() {
    let td = tempdir().unwrap();
    let profile = Profile::create(td.path());
    let rig = documents_rig(&profile);
    rig.store.fail_writes.set(true);

    let report = rig.run(RelocateOptions::default(), &["Documents"], &profile.target);

    assert!(!report.success());
    assert!(report.errors()[0].contains("Registry update failed"), "{:?}", report.errors());
    assert!(report.moved_files().is_empty());
}

#[test]
fn delete_source_removes_retired_folder() {
    let td = tempdir().unwrap();
    let profile = Profile::create(td.path());
    let rig = documents_rig(&profile);

    let options = RelocateOptions { delete_source: true, verify_integrity: true, ..Default::default() };
    let report = rig.run(options, &["Documents"], &profile.target);

    assert!(report.success(), "errors: {:?}", report.errors());
    assert_eq!(report.total_size(), Profile::content_bytes());
    assert!(!profile.documents.with_file_name("Documents_backup").exists());
    assert!(is_symlink(&profile.documents));
}

#[test]
fn missing_old_location_only_links() {
    let td = tempdir().unwrap();
    let profile = Profile::create(td.path());
    let music = td.path().join("home").join("Music");
    let rig = Rig::new(MemoryStore::with_locations(&[("Music", &music)]), &profile.backups);

    let report = rig.run(RelocateOptions::default(), &["music"], &profile.target);

    assert!(report.success(), "errors: {:?}", report.errors());
    assert_eq!(report.total_size(), 0);
    assert!(is_symlink(&music));
    assert_eq!(rig.store.location_of("Music"), Some(profile.target.join("Music")));
}

#[test]
fn failures_do_not_stop_later_folders() {
    let td = tempdir().unwrap();
    let profile = Profile::create(td.path());
    // Pictures has no registry value, so its current location cannot be read.
    let rig = documents_rig(&profile);

    let report = rig.run(RelocateOptions::default(), &["Pictures", "Documents"], &profile.target);

    assert!(!report.success());
    assert_eq!(report.errors().len(), 1);
    assert!(report.errors()[0].starts_with("Pictures"), "{:?}", report.errors());
    assert_eq!(report.moved_files(), &[profile.documents.clone()]);
}

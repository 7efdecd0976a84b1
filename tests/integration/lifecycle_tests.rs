//! Store file lifecycle across successful and failed sessions.

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use super::common::{store_entries, write_file};
use dupescan::error::ScanError;
use dupescan::index::{DuplicateIndex, IndexError, NamespaceHandle, PathRecord, SqliteIndex};
use dupescan::scanner::{DirListing, Fingerprint};
use dupescan::session::{
    ScanIo, ScanOptions, ScanSession, ScanState, StdScanIo, UnreadablePolicy,
};
use dupescan::signal::ShutdownHandler;
use tempfile::tempdir;

/// SQLite index that starts failing appends after a fixed number of writes.
struct FlakyIndex {
    inner: SqliteIndex,
    appends_left: Option<usize>,
}

impl DuplicateIndex for FlakyIndex {
    fn ensure_namespace(
        &mut self,
        fingerprint: &Fingerprint,
    ) -> Result<NamespaceHandle, IndexError> {
        self.inner.ensure_namespace(fingerprint)
    }

    fn append(&mut self, namespace: NamespaceHandle, path: &str) -> Result<u64, IndexError> {
        match self.appends_left.as_mut() {
            Some(0) => return Err(IndexError::Backend("disk full".into())),
            Some(left) => *left -= 1,
            None => {}
        }
        self.inner.append(namespace, path)
    }

    fn list_records(&self, fingerprint: &Fingerprint) -> Result<Vec<PathRecord>, IndexError> {
        self.inner.list_records(fingerprint)
    }

    fn namespace_count(&self) -> Result<usize, IndexError> {
        self.inner.namespace_count()
    }
}

/// Real filesystem access that watches the store directory while scanning.
struct Harness {
    inner: StdScanIo,
    store_dir: PathBuf,
    appends_allowed: Option<usize>,
    unreadable: Option<PathBuf>,
    occupy_store: bool,
    interrupt_after: Option<(usize, ShutdownHandler)>,
    files_opened: AtomicUsize,
    store_sizes: Mutex<Vec<usize>>,
}

impl Harness {
    fn new(store_dir: &Path) -> Self {
        Self {
            inner: StdScanIo::default(),
            store_dir: store_dir.to_path_buf(),
            appends_allowed: None,
            unreadable: None,
            occupy_store: false,
            interrupt_after: None,
            files_opened: AtomicUsize::new(0),
            store_sizes: Mutex::new(Vec::new()),
        }
    }

    fn observe(&self) {
        let count = store_entries(&self.store_dir).len();
        self.store_sizes.lock().unwrap().push(count);
    }
}

impl ScanIo for &Harness {
    type Index = FlakyIndex;

    fn open_index(&self, path: &Path) -> Result<FlakyIndex, IndexError> {
        if self.occupy_store {
            fs::write(path, b"not ours").unwrap();
            fs::write(format!("{}-wal", path.display()), b"not ours").unwrap();
        }
        Ok(FlakyIndex {
            inner: self.inner.open_index(path)?,
            appends_left: self.appends_allowed,
        })
    }

    fn list_dir(&self, dir: &Path) -> io::Result<DirListing> {
        self.observe();
        self.inner.list_dir(dir)
    }

    fn open_file(&self, path: &Path) -> io::Result<Box<dyn Read>> {
        self.observe();
        let opened = self.files_opened.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some((limit, handler)) = &self.interrupt_after {
            if opened >= *limit {
                handler.request_shutdown();
            }
        }
        if self.unreadable.as_deref() == Some(path) {
            return Err(io::Error::from(io::ErrorKind::PermissionDenied));
        }
        self.inner.open_file(path)
    }
}

fn tree() -> tempfile::TempDir {
    let root = tempdir().unwrap();
    write_file(root.path(), "a", b"1");
    write_file(root.path(), "b", b"2");
    write_file(root.path(), "c", b"1");
    write_file(root.path(), "sub/d", b"2");
    root
}

#[test]
fn test_store_exists_during_scan_and_is_removed_after() {
    let root = tree();
    let store = tempdir().unwrap();
    let harness = Harness::new(store.path());

    let mut session = ScanSession::with_io(&harness, ScanOptions::new(root.path(), store.path()));
    let report = session.run().unwrap();

    assert_eq!(session.state(), ScanState::Done);
    assert_eq!(report.groups.len(), 2);

    let sizes = harness.store_sizes.lock().unwrap();
    assert!(!sizes.is_empty());
    assert!(sizes.iter().all(|&n| n >= 1), "store missing mid-scan: {sizes:?}");

    let store_path = session.store_path().unwrap();
    assert!(!store_path.exists());
    assert!(store_entries(store.path()).is_empty());
}

#[test]
fn test_store_removed_after_file_read_failure() {
    let root = tree();
    let store = tempdir().unwrap();
    let mut harness = Harness::new(store.path());
    harness.unreadable = Some(root.path().join("b"));

    let mut session = ScanSession::with_io(&harness, ScanOptions::new(root.path(), store.path()));
    let err = session.run().unwrap_err();

    match err {
        ScanError::FileReadFailed { path, .. } => assert_eq!(path, root.path().join("b")),
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(session.state(), ScanState::Aborted);
    assert!(store_entries(store.path()).is_empty());
}

#[test]
fn test_skip_policy_continues_past_unreadable_file() {
    let root = tree();
    let store = tempdir().unwrap();
    let mut harness = Harness::new(store.path());
    harness.unreadable = Some(root.path().join("b"));

    let options = ScanOptions::new(root.path(), store.path())
        .with_unreadable_policy(UnreadablePolicy::Skip);
    let report = ScanSession::with_io(&harness, options).run().unwrap();

    assert_eq!(report.stats.skipped_files, 1);
    assert_eq!(report.stats.files_scanned, 3);
    assert_eq!(report.groups.len(), 1);
    assert!(store_entries(store.path()).is_empty());
}

#[test]
fn test_store_removed_after_index_write_failure() {
    let root = tree();
    let store = tempdir().unwrap();
    let mut harness = Harness::new(store.path());
    harness.appends_allowed = Some(1);

    let mut session = ScanSession::with_io(&harness, ScanOptions::new(root.path(), store.path()));
    let err = session.run().unwrap_err();

    match err {
        ScanError::IndexWriteFailed { path, .. } => assert_eq!(path, root.path().join("b")),
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(session.state(), ScanState::Aborted);
    assert!(store_entries(store.path()).is_empty());
}

#[test]
fn test_store_removed_after_interrupt() {
    let root = tree();
    let store = tempdir().unwrap();
    let handler = ShutdownHandler::new();
    let mut harness = Harness::new(store.path());
    harness.interrupt_after = Some((2, handler.clone()));

    let mut session = ScanSession::with_io(&harness, ScanOptions::new(root.path(), store.path()))
        .with_shutdown_handler(handler.clone());
    let err = session.run().unwrap_err();

    assert!(err.is_interrupted());
    assert_eq!(session.state(), ScanState::Aborted);
    assert_eq!(harness.files_opened.load(Ordering::SeqCst), 2);
    assert!(handler.pending_cleanup().is_empty());
    assert!(store_entries(store.path()).is_empty());
}

#[test]
fn test_occupied_store_path_is_left_alone() {
    let root = tree();
    let store = tempdir().unwrap();
    let mut harness = Harness::new(store.path());
    harness.occupy_store = true;

    let mut session = ScanSession::with_io(&harness, ScanOptions::new(root.path(), store.path()));
    let err = session.run().unwrap_err();

    match &err {
        ScanError::StoreOpenFailed { source, .. } => {
            assert!(matches!(source, IndexError::AlreadyExists(_)));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(session.state(), ScanState::Aborted);

    let occupied = session.store_path().unwrap();
    assert_eq!(fs::read(occupied).unwrap(), b"not ours");
    assert!(Path::new(&format!("{}-wal", occupied.display())).exists());
    assert_eq!(store_entries(store.path()).len(), 2);
}

#[test]
fn test_missing_store_dir_fails_to_open() {
    let root = tree();
    let parent = tempdir().unwrap();
    let missing = parent.path().join("no-such-dir");

    let mut session = ScanSession::new(ScanOptions::new(root.path(), &missing));
    let err = session.run().unwrap_err();

    assert!(matches!(err, ScanError::StoreOpenFailed { .. }));
    assert_eq!(session.state(), ScanState::Aborted);
    assert!(!missing.exists());
}

#[test]
fn test_each_session_uses_a_fresh_store() {
    let root = tree();
    let store = tempdir().unwrap();

    let mut first = ScanSession::new(ScanOptions::new(root.path(), store.path()));
    let mut second = ScanSession::new(ScanOptions::new(root.path(), store.path()));
    let a = first.run().unwrap();
    let b = second.run().unwrap();

    assert_ne!(first.store_path(), second.store_path());
    assert_eq!(a.groups, b.groups);
    assert!(store_entries(store.path()).is_empty());
}

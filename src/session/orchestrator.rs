//! Scan session state machine.
//!
//! # States
//!
//! ```text
//! Idle -> IndexOpened -> Traversing -> Grouping -> Done
//!                 \            \            \
//!                  +------------+------------+--> Aborted
//! ```
//!
//! A session creates `<store_dir>/<session id>.db`, walks the tree
//! breadth-first, fingerprints every regular file, records each path under
//! its fingerprint, and finally reads back every fingerprint seen more than
//! once. The store file is removed before `run` returns, on success and on
//! every failure.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use super::id::session_id;
use super::io::{ScanIo, StdScanIo};
use super::store_file::StoreFile;
use crate::duplicates::{build_groups, DuplicateCounter, DuplicateGroup};
use crate::error::ScanError;
use crate::index::DuplicateIndex;
use crate::progress::{ProgressCallback, PHASE_GROUPING, PHASE_TRAVERSING};
use crate::scanner::{EntryKind, FingerprintAlgorithm, Fingerprinter, TraversalQueue};
use crate::signal::ShutdownHandler;

/// Lifecycle state of a [`ScanSession`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanState {
    /// Created, nothing on disk yet
    Idle,
    /// Store file created and index open
    IndexOpened,
    /// Walking directories and fingerprinting files
    Traversing,
    /// Reading duplicate namespaces back from the index
    Grouping,
    /// Finished successfully, store removed
    Done,
    /// Failed or interrupted, store removed
    Aborted,
}

impl ScanState {
    /// Whether the session can no longer change state.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Aborted)
    }
}

impl fmt::Display for ScanState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::IndexOpened => "index-opened",
            Self::Traversing => "traversing",
            Self::Grouping => "grouping",
            Self::Done => "done",
            Self::Aborted => "aborted",
        };
        f.write_str(name)
    }
}

/// What to do when a regular file cannot be opened or read.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum UnreadablePolicy {
    /// Abort the whole scan (default)
    #[default]
    Abort,
    /// Log a warning, skip the file and keep going
    Skip,
}

impl fmt::Display for UnreadablePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Abort => write!(f, "abort"),
            Self::Skip => write!(f, "skip"),
        }
    }
}

/// Inputs of a scan session.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Directory the traversal starts from
    pub root: PathBuf,
    /// Writable directory that receives the transient store file
    pub store_dir: PathBuf,
    /// Digest used for fingerprints
    pub algorithm: FingerprintAlgorithm,
    /// Handling of unreadable regular files
    pub on_unreadable: UnreadablePolicy,
    /// Traverse symbolic links to directories (file links are always read)
    pub follow_symlinks: bool,
}

impl ScanOptions {
    /// Options with default algorithm and policies.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, store_dir: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            store_dir: store_dir.into(),
            algorithm: FingerprintAlgorithm::default(),
            on_unreadable: UnreadablePolicy::default(),
            follow_symlinks: false,
        }
    }

    #[must_use]
    pub fn with_algorithm(mut self, algorithm: FingerprintAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    #[must_use]
    pub fn with_unreadable_policy(mut self, policy: UnreadablePolicy) -> Self {
        self.on_unreadable = policy;
        self
    }

    #[must_use]
    pub fn with_follow_symlinks(mut self, follow: bool) -> Self {
        self.follow_symlinks = follow;
        self
    }
}

/// Counters collected during a scan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScanStats {
    /// Directories successfully listed
    pub directories_scanned: usize,
    /// Regular files fingerprinted and recorded
    pub files_scanned: usize,
    /// Total bytes fed to the digest
    pub bytes_hashed: u64,
    /// Unreadable files skipped under [`UnreadablePolicy::Skip`]
    pub skipped_files: usize,
    /// Entries that were neither files nor directories
    pub skipped_entries: usize,
    /// Directories not listed again because they were already visited
    pub revisited_directories: usize,
    /// Distinct fingerprints seen
    pub distinct_fingerprints: usize,
    /// Number of duplicate groups
    pub duplicate_groups: usize,
    /// Redundant copies across all groups
    pub duplicate_files: usize,
    /// Wall-clock duration of the session
    #[serde(skip)]
    pub duration: Duration,
}

/// Successful outcome of a scan session.
#[derive(Debug, Clone)]
pub struct ScanReport {
    /// Root the scan started from
    pub root: PathBuf,
    /// Digest used for fingerprints
    pub algorithm: FingerprintAlgorithm,
    /// Groups of files with identical content
    pub groups: Vec<DuplicateGroup>,
    /// Scan counters
    pub stats: ScanStats,
}

impl ScanReport {
    /// Whether any duplicates were found.
    #[must_use]
    pub fn has_duplicates(&self) -> bool {
        !self.groups.is_empty()
    }
}

/// One duplicate scan over a directory tree.
pub struct ScanSession<I: ScanIo = StdScanIo> {
    io: I,
    options: ScanOptions,
    state: ScanState,
    shutdown: Option<ShutdownHandler>,
    progress: Option<Arc<dyn ProgressCallback>>,
    store_path: Option<PathBuf>,
}

impl ScanSession<StdScanIo> {
    /// Session over the real filesystem with a SQLite index.
    #[must_use]
    pub fn new(options: ScanOptions) -> Self {
        let io = StdScanIo::new(options.follow_symlinks);
        Self::with_io(io, options)
    }
}

impl<I: ScanIo> ScanSession<I> {
    /// Session using the given capabilities.
    #[must_use]
    pub fn with_io(io: I, options: ScanOptions) -> Self {
        Self {
            io,
            options,
            state: ScanState::Idle,
            shutdown: None,
            progress: None,
            store_path: None,
        }
    }

    /// Observe shutdown requests and register the store for forced cleanup.
    #[must_use]
    pub fn with_shutdown_handler(mut self, handler: ShutdownHandler) -> Self {
        self.shutdown = Some(handler);
        self
    }

    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress = Some(callback);
        self
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> ScanState {
        self.state
    }

    #[must_use]
    pub fn options(&self) -> &ScanOptions {
        &self.options
    }

    /// Path of the store file, once the session has started.
    #[must_use]
    pub fn store_path(&self) -> Option<&Path> {
        self.store_path.as_deref()
    }

    /// Run the session to completion.
    ///
    /// # Errors
    ///
    /// Returns the [`ScanError`] that moved the session to `Aborted`, or
    /// [`ScanError::SessionFinished`] if the session already ran. A store
    /// file created by this session no longer exists when this returns; a
    /// file already present at the store path is never touched.
    pub fn run(&mut self) -> Result<ScanReport, ScanError> {
        if self.state != ScanState::Idle {
            return Err(ScanError::SessionFinished);
        }

        let started = Instant::now();
        let store_path = self
            .options
            .store_dir
            .join(format!("{}.db", session_id()));
        self.store_path = Some(store_path.clone());

        log::info!(
            "Scanning {} (algorithm: {}, store: {})",
            self.options.root.display(),
            self.options.algorithm,
            store_path.display()
        );

        // Only a store this session created is ever removed.
        let result = match self.io.open_index(&store_path) {
            Ok(index) => {
                if let Some(handler) = &self.shutdown {
                    handler.register_cleanup(&store_path);
                }
                let store = StoreFile::new(store_path);
                self.transition(ScanState::IndexOpened);

                let result = self.run_phases(index);

                if let Err(e) = store.remove() {
                    log::warn!("Failed to remove index store {}: {}", store.path().display(), e);
                }
                if let Some(handler) = &self.shutdown {
                    handler.unregister_cleanup(store.path());
                }
                result
            }
            Err(source) => Err(ScanError::StoreOpenFailed {
                path: store_path,
                source,
            }),
        };

        match result {
            Ok((groups, mut stats)) => {
                stats.duration = started.elapsed();
                self.transition(ScanState::Done);
                log::info!(
                    "Scan finished: {} files, {} duplicate groups in {:?}",
                    stats.files_scanned,
                    stats.duplicate_groups,
                    stats.duration
                );
                Ok(ScanReport {
                    root: self.options.root.clone(),
                    algorithm: self.options.algorithm,
                    groups,
                    stats,
                })
            }
            Err(e) => {
                self.transition(ScanState::Aborted);
                log::debug!("Scan aborted: {}", e);
                Err(e)
            }
        }
    }

    fn run_phases(
        &mut self,
        mut index: I::Index,
    ) -> Result<(Vec<DuplicateGroup>, ScanStats), ScanError> {
        let mut counter = DuplicateCounter::new();
        let mut stats = ScanStats::default();

        self.transition(ScanState::Traversing);
        self.notify(|p| p.on_phase_start(PHASE_TRAVERSING, 0));
        let traversal = self.traverse(&mut index, &mut counter, &mut stats);
        self.notify(|p| p.on_phase_end(PHASE_TRAVERSING));
        traversal?;

        self.check_shutdown()?;
        self.transition(ScanState::Grouping);
        let duplicated = counter.duplicated().count();
        self.notify(|p| p.on_phase_start(PHASE_GROUPING, duplicated));
        let groups = build_groups(&counter, &index).map_err(ScanError::IndexReadFailed)?;
        self.notify(|p| p.on_phase_end(PHASE_GROUPING));

        stats.distinct_fingerprints = counter.distinct();
        stats.duplicate_groups = groups.len();
        stats.duplicate_files = groups.iter().map(DuplicateGroup::duplicate_count).sum();

        Ok((groups, stats))
    }

    fn traverse(
        &self,
        index: &mut I::Index,
        counter: &mut DuplicateCounter,
        stats: &mut ScanStats,
    ) -> Result<(), ScanError> {
        let fingerprinter = Fingerprinter::new(self.options.algorithm);
        let mut queue = TraversalQueue::new(self.options.root.clone());

        while let Ok(dir) = queue.next() {
            self.check_shutdown()?;

            let listing = self
                .io
                .list_dir(&dir)
                .map_err(|source| ScanError::DirectoryReadFailed {
                    path: dir.clone(),
                    source,
                })?;

            if !queue.mark_visited(listing.node) {
                log::warn!("Skipping already visited directory {}", dir.display());
                stats.revisited_directories += 1;
                continue;
            }
            stats.directories_scanned += 1;
            log::debug!("Listing {} ({} entries)", dir.display(), listing.entries.len());

            for entry in listing.entries {
                match entry.kind {
                    EntryKind::Directory => queue.enqueue(entry.path),
                    EntryKind::File => {
                        self.check_shutdown()?;
                        self.process_file(&fingerprinter, &entry.path, index, counter, stats)?;
                    }
                    EntryKind::Other => {
                        log::debug!("Skipping {}", entry.path.display());
                        stats.skipped_entries += 1;
                    }
                }
            }
        }

        Ok(())
    }

    fn process_file(
        &self,
        fingerprinter: &Fingerprinter,
        path: &Path,
        index: &mut I::Index,
        counter: &mut DuplicateCounter,
        stats: &mut ScanStats,
    ) -> Result<(), ScanError> {
        let digest = self
            .io
            .open_file(path)
            .and_then(|reader| fingerprinter.fingerprint_reader(reader));

        let (fingerprint, bytes) = match digest {
            Ok(done) => done,
            Err(source) => match self.options.on_unreadable {
                UnreadablePolicy::Abort => {
                    return Err(ScanError::FileReadFailed {
                        path: path.to_path_buf(),
                        source,
                    })
                }
                UnreadablePolicy::Skip => {
                    log::warn!("Skipping unreadable file {}: {}", path.display(), source);
                    stats.skipped_files += 1;
                    return Ok(());
                }
            },
        };

        let display = path.to_string_lossy();
        index
            .record(&fingerprint, &display)
            .map_err(|source| ScanError::IndexWriteFailed {
                path: path.to_path_buf(),
                source,
            })?;
        let seen = counter.increment(fingerprint);

        stats.files_scanned += 1;
        stats.bytes_hashed += bytes;
        log::trace!("{} {} (seen {}x)", fingerprint, display, seen);
        self.notify(|p| {
            p.on_item_completed(bytes);
            p.on_progress(stats.files_scanned, &display);
        });
        Ok(())
    }

    fn check_shutdown(&self) -> Result<(), ScanError> {
        match &self.shutdown {
            Some(handler) if handler.is_shutdown_requested() => {
                log::info!("Shutdown requested, aborting scan");
                Err(ScanError::Interrupted)
            }
            _ => Ok(()),
        }
    }

    fn transition(&mut self, next: ScanState) {
        log::debug!("Scan session {} -> {}", self.state, next);
        self.state = next;
    }

    fn notify(&self, f: impl FnOnce(&dyn ProgressCallback)) {
        if let Some(progress) = &self.progress {
            f(progress.as_ref());
        }
    }
}

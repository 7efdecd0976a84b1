//! Capabilities the scan orchestrator needs from its environment.
//!
//! Real scans use [`StdScanIo`]; tests substitute doubles to inject
//! failures at precise points or to run against an in-memory index.

use std::fs::{self, File, FileType};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use crate::index::{DuplicateIndex, IndexError, SqliteIndex};
use crate::scanner::{DirListing, EntryKind, FileEntry, NodeId};

/// Store, directory and file access used by a scan session.
pub trait ScanIo {
    /// Index backend produced by [`ScanIo::open_index`].
    type Index: DuplicateIndex;

    /// Create a fresh index store at `path`.
    fn open_index(&self, path: &Path) -> Result<Self::Index, IndexError>;

    /// List the immediate children of a directory.
    fn list_dir(&self, dir: &Path) -> io::Result<DirListing>;

    /// Open a file for sequential reading.
    fn open_file(&self, path: &Path) -> io::Result<Box<dyn Read>>;
}

/// Filesystem-backed capabilities with a SQLite index.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdScanIo {
    follow_symlinks: bool,
}

impl StdScanIo {
    #[must_use]
    pub fn new(follow_symlinks: bool) -> Self {
        Self { follow_symlinks }
    }

    #[must_use]
    pub fn follows_symlinks(&self) -> bool {
        self.follow_symlinks
    }

    // Links to files are always read through; links to directories are only
    // enqueued when following is enabled, so cycles need opting in.
    fn classify(&self, path: PathBuf, file_type: FileType) -> FileEntry {
        if file_type.is_symlink() {
            let kind = match fs::metadata(&path) {
                Ok(meta) if meta.is_dir() && self.follow_symlinks => EntryKind::Directory,
                Ok(meta) if meta.is_file() => EntryKind::File,
                Ok(_) => EntryKind::Other,
                // Dangling link: let the open fail and go through the
                // unreadable-file policy.
                Err(_) => EntryKind::File,
            };
            return FileEntry {
                path,
                kind,
                is_symlink: true,
            };
        }

        let kind = if file_type.is_dir() {
            EntryKind::Directory
        } else if file_type.is_file() {
            EntryKind::File
        } else {
            EntryKind::Other
        };
        FileEntry::new(path, kind)
    }
}

impl ScanIo for StdScanIo {
    type Index = SqliteIndex;

    fn open_index(&self, path: &Path) -> Result<SqliteIndex, IndexError> {
        SqliteIndex::create(path)
    }

    fn list_dir(&self, dir: &Path) -> io::Result<DirListing> {
        let node = fs::metadata(dir)
            .ok()
            .and_then(|meta| NodeId::from_metadata(&meta));

        let mut entries = Vec::new();
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let file_type = entry.file_type()?;
            entries.push(self.classify(entry.path(), file_type));
        }
        entries.sort_by(|a, b| a.path.file_name().cmp(&b.path.file_name()));

        Ok(DirListing { node, entries })
    }

    fn open_file(&self, path: &Path) -> io::Result<Box<dyn Read>> {
        Ok(Box::new(File::open(path)?))
    }
}

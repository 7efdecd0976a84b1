//! Scanner module for breadth-first discovery and content fingerprinting.
//!
//! This module provides:
//! - A FIFO [`TraversalQueue`] of directories still to be listed
//! - Streaming content [`Fingerprinter`] (BLAKE3 or SHA-256)
//! - The entry types produced by a directory listing
//!
//! # Architecture
//!
//! - [`queue`]: Breadth-first directory queue with directory identity tracking
//! - [`fingerprint`]: Digest algorithms and streaming file hashing
//!
//! Directory listing itself goes through the
//! [`ScanIo`](crate::session::ScanIo) capability so the scan orchestrator can
//! run against the real filesystem or a test double.
//!
//! # Example
//!
//! ```
//! use dupescan::scanner::TraversalQueue;
//! use std::path::PathBuf;
//!
//! let mut queue = TraversalQueue::new(PathBuf::from("/data"));
//! queue.enqueue(PathBuf::from("/data/a"));
//!
//! assert_eq!(queue.next().unwrap(), PathBuf::from("/data"));
//! assert_eq!(queue.next().unwrap(), PathBuf::from("/data/a"));
//! assert!(queue.next().is_err());
//! ```

pub mod fingerprint;
pub mod queue;

use std::fs::Metadata;
use std::path::PathBuf;

pub use fingerprint::{
    hash_to_hex, hex_to_hash, Fingerprint, FingerprintAlgorithm, Fingerprinter, FINGERPRINT_LEN,
    READ_CHUNK_SIZE,
};
pub use queue::{EmptyQueue, TraversalQueue};

/// What a directory entry is, as far as the scan is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// A directory to be enqueued for traversal
    Directory,
    /// A file whose content gets fingerprinted
    File,
    /// Anything else (unfollowed directory links, sockets, FIFOs, devices)
    Other,
}

/// Identity of a directory on disk, used to avoid listing it twice.
///
/// On Unix this is the `(device, inode)` pair. Other platforms report no
/// identity and rely on directory links not being followed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
    /// Device id
    pub dev: u64,
    /// Inode number
    pub ino: u64,
}

impl NodeId {
    /// Extract the node identity from metadata, if the platform has one.
    #[cfg(unix)]
    #[must_use]
    pub fn from_metadata(metadata: &Metadata) -> Option<Self> {
        use std::os::unix::fs::MetadataExt;
        Some(Self {
            dev: metadata.dev(),
            ino: metadata.ino(),
        })
    }

    /// Extract the node identity from metadata, if the platform has one.
    #[cfg(not(unix))]
    #[must_use]
    pub fn from_metadata(_metadata: &Metadata) -> Option<Self> {
        None
    }
}

/// A single child produced by listing a directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// Full path of the entry (parent path joined with the entry name)
    pub path: PathBuf,
    /// Classification of the entry
    pub kind: EntryKind,
    /// Whether the entry itself is a symbolic link
    pub is_symlink: bool,
}

impl FileEntry {
    /// Create a new entry that is not a symlink.
    #[must_use]
    pub fn new(path: PathBuf, kind: EntryKind) -> Self {
        Self {
            path,
            kind,
            is_symlink: false,
        }
    }

    /// Shorthand for a regular file entry.
    #[must_use]
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::new(path.into(), EntryKind::File)
    }

    /// Shorthand for a directory entry.
    #[must_use]
    pub fn directory(path: impl Into<PathBuf>) -> Self {
        Self::new(path.into(), EntryKind::Directory)
    }
}

/// Result of listing one directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirListing {
    /// Identity of the listed directory itself, when known
    pub node: Option<NodeId>,
    /// Children in name order
    pub entries: Vec<FileEntry>,
}

impl DirListing {
    /// A listing with no directory identity.
    #[must_use]
    pub fn new(entries: Vec<FileEntry>) -> Self {
        Self {
            node: None,
            entries,
        }
    }
}

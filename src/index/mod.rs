//! Duplicate index: fingerprint namespaces holding ordered path records.
//!
//! # Overview
//!
//! The index maps each [`Fingerprint`] to a namespace. A namespace owns a
//! monotonically increasing sequence counter and an append-only list of
//! [`PathRecord`]s, iterated in ascending sequence order. Every write runs
//! inside one transaction: it either fully persists or leaves no trace.
//!
//! Two backends implement [`DuplicateIndex`]:
//! - [`SqliteIndex`]: on-disk store used by real scans
//! - [`MemoryIndex`]: in-process store for tests and benchmarks
//!
//! # Example
//!
//! ```
//! use dupescan::index::{DuplicateIndex, MemoryIndex};
//! use dupescan::scanner::Fingerprinter;
//!
//! let mut index = MemoryIndex::new();
//! let fp = Fingerprinter::default().fingerprint_bytes(b"hello");
//!
//! index.record(&fp, "/data/a.txt").unwrap();
//! index.record(&fp, "/data/b.txt").unwrap();
//!
//! assert_eq!(index.list_paths(&fp).unwrap(), vec!["/data/a.txt", "/data/b.txt"]);
//! ```

pub mod memory;
pub mod sqlite;

use std::path::PathBuf;

use thiserror::Error;

use crate::scanner::Fingerprint;

pub use memory::MemoryIndex;
pub use sqlite::SqliteIndex;

/// Opaque handle to an existing fingerprint namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NamespaceHandle(pub(crate) i64);

/// One path stored under a namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathRecord {
    /// Sequence number assigned at append time, starting at 1
    pub seq: u64,
    /// Path of the file as discovered during traversal
    pub path: String,
}

/// Errors raised by index backends.
#[derive(Debug, Error)]
pub enum IndexError {
    /// Underlying SQLite failure
    #[error("SQLite error")]
    Sqlite(#[from] rusqlite::Error),

    /// Creating the store file failed
    #[error("Failed to create index store")]
    Io(#[from] std::io::Error),

    /// A fresh store was requested but the file is already there
    #[error("Index store already exists: {0}")]
    AlreadyExists(PathBuf),

    /// The handle does not name a namespace in this index
    #[error("Unknown namespace handle: {0:?}")]
    UnknownNamespace(NamespaceHandle),

    /// Failure reported by a non-SQLite backend
    #[error("Index backend error: {0}")]
    Backend(String),
}

/// Transactional key-value store of fingerprint namespaces.
///
/// Implementations must guarantee that sequence numbers within one
/// namespace are strictly increasing in append order, and that a failed
/// write leaves the namespace unchanged.
pub trait DuplicateIndex {
    /// Get or create the namespace for a fingerprint.
    ///
    /// Idempotent: repeated calls for one fingerprint return handles to the
    /// same namespace and never disturb existing records.
    fn ensure_namespace(&mut self, fingerprint: &Fingerprint) -> Result<NamespaceHandle, IndexError>;

    /// Append a path to a namespace and return its sequence number.
    fn append(&mut self, namespace: NamespaceHandle, path: &str) -> Result<u64, IndexError>;

    /// Ensure the namespace and append the path as one write.
    ///
    /// The default runs the two steps separately; backends with real
    /// transactions override it to make the pair atomic.
    fn record(&mut self, fingerprint: &Fingerprint, path: &str) -> Result<u64, IndexError> {
        let namespace = self.ensure_namespace(fingerprint)?;
        self.append(namespace, path)
    }

    /// All records of a fingerprint's namespace in ascending sequence order.
    ///
    /// An unknown fingerprint yields an empty list.
    fn list_records(&self, fingerprint: &Fingerprint) -> Result<Vec<PathRecord>, IndexError>;

    /// Paths of a fingerprint's namespace in insertion order.
    fn list_paths(&self, fingerprint: &Fingerprint) -> Result<Vec<String>, IndexError> {
        Ok(self
            .list_records(fingerprint)?
            .into_iter()
            .map(|record| record.path)
            .collect())
    }

    /// Number of namespaces (distinct fingerprints) in the index.
    fn namespace_count(&self) -> Result<usize, IndexError>;
}

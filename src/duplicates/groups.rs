//! Duplicate groups and the grouping pass.
//!
//! # Overview
//!
//! After traversal the [`DuplicateCounter`] knows which fingerprints were
//! seen more than once. The grouping pass reads the index namespace of each
//! such fingerprint and produces one [`DuplicateGroup`] holding its paths in
//! insertion order.
//!
//! # Example
//!
//! ```
//! use dupescan::duplicates::{build_groups, DuplicateCounter};
//! use dupescan::index::{DuplicateIndex, MemoryIndex};
//! use dupescan::scanner::Fingerprinter;
//!
//! let fingerprinter = Fingerprinter::default();
//! let mut index = MemoryIndex::new();
//! let mut counter = DuplicateCounter::new();
//!
//! for (path, content) in [("/a", "x"), ("/b", "x"), ("/c", "y")] {
//!     let fp = fingerprinter.fingerprint_bytes(content.as_bytes());
//!     index.record(&fp, path).unwrap();
//!     counter.increment(fp);
//! }
//!
//! let groups = build_groups(&counter, &index).unwrap();
//! assert_eq!(groups.len(), 1);
//! assert_eq!(groups[0].paths, vec!["/a", "/b"]);
//! ```

use super::DuplicateCounter;
use crate::index::{DuplicateIndex, IndexError};
use crate::scanner::Fingerprint;

/// A set of files sharing one fingerprint.
///
/// Paths are listed in the order the files were discovered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateGroup {
    /// Shared content fingerprint
    pub fingerprint: Fingerprint,
    /// Member paths in discovery order
    pub paths: Vec<String>,
}

impl DuplicateGroup {
    #[must_use]
    pub fn new(fingerprint: Fingerprint, paths: Vec<String>) -> Self {
        Self { fingerprint, paths }
    }

    /// Number of files in the group.
    #[must_use]
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Number of redundant copies (all files but the first).
    #[must_use]
    pub fn duplicate_count(&self) -> usize {
        self.paths.len().saturating_sub(1)
    }

    /// Fingerprint as a hex string.
    #[must_use]
    pub fn fingerprint_hex(&self) -> String {
        self.fingerprint.to_hex()
    }
}

/// Build one group per fingerprint seen more than once.
///
/// Groups are ordered by their first path so reports are stable between
/// runs over the same tree.
///
/// # Errors
///
/// Returns the index error if any namespace cannot be read. No partial
/// result is returned.
pub fn build_groups<I>(
    counter: &DuplicateCounter,
    index: &I,
) -> Result<Vec<DuplicateGroup>, IndexError>
where
    I: DuplicateIndex + ?Sized,
{
    let mut groups = Vec::new();

    for (fingerprint, count) in counter.duplicated() {
        let paths = index.list_paths(fingerprint)?;
        if paths.len() != count {
            log::warn!(
                "Index holds {} paths for {} but {} were counted",
                paths.len(),
                fingerprint,
                count
            );
        }
        groups.push(DuplicateGroup::new(*fingerprint, paths));
    }

    groups.sort_by(|a, b| a.paths.first().cmp(&b.paths.first()));
    log::debug!("Grouping produced {} duplicate groups", groups.len());
    Ok(groups)
}

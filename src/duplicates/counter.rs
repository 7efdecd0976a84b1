//! In-memory occurrence counts per fingerprint.

use std::collections::HashMap;

use crate::scanner::Fingerprint;

/// Counts how many files produced each fingerprint during traversal.
///
/// The counter is only incremented after the matching path record has been
/// persisted, so for every fingerprint the count equals the number of
/// records in its index namespace.
#[derive(Debug, Clone, Default)]
pub struct DuplicateCounter {
    counts: HashMap<Fingerprint, usize>,
}

impl DuplicateCounter {
    /// Create an empty counter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one occurrence and return the new count.
    pub fn increment(&mut self, fingerprint: Fingerprint) -> usize {
        let count = self.counts.entry(fingerprint).or_insert(0);
        *count += 1;
        *count
    }

    /// Occurrences seen for a fingerprint (0 if never seen).
    #[must_use]
    pub fn get(&self, fingerprint: &Fingerprint) -> usize {
        self.counts.get(fingerprint).copied().unwrap_or(0)
    }

    /// Number of distinct fingerprints.
    #[must_use]
    pub fn distinct(&self) -> usize {
        self.counts.len()
    }

    /// Total occurrences across all fingerprints.
    #[must_use]
    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Every fingerprint seen, with its count, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&Fingerprint, usize)> {
        self.counts.iter().map(|(fp, &count)| (fp, count))
    }

    /// Fingerprints seen more than once, with their counts.
    pub fn duplicated(&self) -> impl Iterator<Item = (&Fingerprint, usize)> {
        self.iter().filter(|&(_, count)| count > 1)
    }
}

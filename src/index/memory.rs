//! In-process duplicate index.

use std::collections::HashMap;

use super::{DuplicateIndex, IndexError, NamespaceHandle, PathRecord};
use crate::scanner::Fingerprint;

#[derive(Debug, Default)]
struct Namespace {
    sequence: u64,
    records: Vec<PathRecord>,
}

/// Duplicate index held entirely in memory.
///
/// Writes cannot fail part-way, so every operation is trivially atomic.
#[derive(Debug, Default)]
pub struct MemoryIndex {
    namespaces: Vec<Namespace>,
    by_fingerprint: HashMap<Fingerprint, usize>,
}

impl MemoryIndex {
    /// Create an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, namespace: NamespaceHandle) -> Option<usize> {
        usize::try_from(namespace.0)
            .ok()
            .filter(|&slot| slot < self.namespaces.len())
    }
}

impl DuplicateIndex for MemoryIndex {
    fn ensure_namespace(&mut self, fingerprint: &Fingerprint) -> Result<NamespaceHandle, IndexError> {
        let next = self.namespaces.len();
        let slot = *self.by_fingerprint.entry(*fingerprint).or_insert(next);
        if slot == next {
            self.namespaces.push(Namespace::default());
        }
        Ok(NamespaceHandle(slot as i64))
    }

    fn append(&mut self, namespace: NamespaceHandle, path: &str) -> Result<u64, IndexError> {
        let slot = self
            .slot(namespace)
            .ok_or(IndexError::UnknownNamespace(namespace))?;
        let ns = &mut self.namespaces[slot];
        ns.sequence += 1;
        ns.records.push(PathRecord {
            seq: ns.sequence,
            path: path.to_string(),
        });
        Ok(ns.sequence)
    }

    fn list_records(&self, fingerprint: &Fingerprint) -> Result<Vec<PathRecord>, IndexError> {
        Ok(self
            .by_fingerprint
            .get(fingerprint)
            .map(|&slot| self.namespaces[slot].records.clone())
            .unwrap_or_default())
    }

    fn namespace_count(&self) -> Result<usize, IndexError> {
        Ok(self.namespaces.len())
    }
}

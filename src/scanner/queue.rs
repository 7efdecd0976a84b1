//! Breadth-first traversal queue.
//!
//! Directories are handed out strictly in the order they were enqueued.
//! Running out of directories is reported through [`EmptyQueue`], which the
//! orchestrator treats as the end of traversal rather than a failure.

use std::collections::{HashSet, VecDeque};
use std::path::PathBuf;

use super::NodeId;

/// Signal returned by [`TraversalQueue::next`] when nothing is pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("traversal queue is empty")]
pub struct EmptyQueue;

/// FIFO of directory paths awaiting listing.
#[derive(Debug, Default)]
pub struct TraversalQueue {
    pending: VecDeque<PathBuf>,
    visited: HashSet<NodeId>,
    enqueued: usize,
}

impl TraversalQueue {
    /// Create a queue seeded with the scan root.
    #[must_use]
    pub fn new(root: PathBuf) -> Self {
        let mut queue = Self::default();
        queue.enqueue(root);
        queue
    }

    /// Append a directory to the tail of the queue.
    pub fn enqueue(&mut self, path: PathBuf) {
        self.pending.push_back(path);
        self.enqueued += 1;
    }

    /// Remove and return the directory at the head of the queue.
    ///
    /// # Errors
    ///
    /// Returns [`EmptyQueue`] when no directories remain.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Result<PathBuf, EmptyQueue> {
        self.pending.pop_front().ok_or(EmptyQueue)
    }

    /// Record that a directory with the given identity has been listed.
    ///
    /// Returns `false` if the same directory was already listed, which
    /// happens when followed symlinks form a cycle. Directories without an
    /// identity are always treated as new.
    pub fn mark_visited(&mut self, node: Option<NodeId>) -> bool {
        match node {
            Some(id) => self.visited.insert(id),
            None => true,
        }
    }

    /// Number of directories still pending.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Whether no directories are pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Total number of directories ever enqueued, including the root.
    #[must_use]
    pub fn total_enqueued(&self) -> usize {
        self.enqueued
    }
}

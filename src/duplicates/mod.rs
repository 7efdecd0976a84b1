//! Duplicate detection module.
//!
//! This module provides:
//! - Per-fingerprint occurrence counting during traversal
//! - The grouping pass that turns counts and index namespaces into groups

pub mod counter;
pub mod groups;

pub use counter::DuplicateCounter;
pub use groups::{build_groups, DuplicateGroup};

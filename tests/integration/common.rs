//! Shared fixtures for integration tests.

use std::fs;
use std::path::{Path, PathBuf};

use dupescan::error::ScanError;
use dupescan::session::{ScanOptions, ScanReport, ScanSession};

/// Write `content` to `root/rel`, creating parent directories.
pub fn write_file(root: &Path, rel: &str, content: &[u8]) -> PathBuf {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, content).unwrap();
    path
}

/// Number of entries left in a store directory.
pub fn store_entries(store: &Path) -> Vec<PathBuf> {
    fs::read_dir(store)
        .unwrap()
        .map(|e| e.unwrap().path())
        .collect()
}

/// Scan `root` with default options.
pub fn scan(root: &Path, store: &Path) -> Result<ScanReport, ScanError> {
    ScanSession::new(ScanOptions::new(root, store)).run()
}

/// Path string the way the scanner records it.
pub fn recorded(root: &Path, rel: &str) -> String {
    let mut path = root.to_path_buf();
    for part in rel.split('/') {
        path.push(part);
    }
    path.to_string_lossy().into_owned()
}

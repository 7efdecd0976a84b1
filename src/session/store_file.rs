//! Lifetime guard for the transient index store file.
//!
//! SQLite may leave `-journal`, `-wal` and `-shm` sidecars next to the
//! database, so removal always covers all four paths. Removal is
//! delete-if-exists and safe to run any number of times, from any thread.

use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

const SIDECAR_SUFFIXES: [&str; 3] = ["-journal", "-wal", "-shm"];

/// Remove a store file and its SQLite sidecars if they exist.
///
/// # Errors
///
/// Returns the first error other than `NotFound`; remaining paths are
/// still attempted.
pub fn remove_store_files(path: &Path) -> io::Result<()> {
    let mut first_error = None;

    for target in store_paths(path) {
        match fs::remove_file(&target) {
            Ok(()) => log::debug!("Removed {}", target.display()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => {
                if first_error.is_none() {
                    first_error = Some(e);
                }
            }
        }
    }

    match first_error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

fn store_paths(path: &Path) -> Vec<PathBuf> {
    let mut paths = vec![path.to_path_buf()];
    for suffix in SIDECAR_SUFFIXES {
        let mut name = OsString::from(path.as_os_str());
        name.push(suffix);
        paths.push(PathBuf::from(name));
    }
    paths
}

/// Owns the path of a session's store and removes it when dropped.
#[derive(Debug)]
pub struct StoreFile {
    path: PathBuf,
}

impl StoreFile {
    #[must_use]
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Remove the store now.
    ///
    /// Every call, including the one made on drop, retries the removal;
    /// files already gone are ignored, so repeating it is harmless.
    ///
    /// # Errors
    ///
    /// See [`remove_store_files`].
    pub fn remove(&self) -> io::Result<()> {
        remove_store_files(&self.path)
    }
}

impl Drop for StoreFile {
    fn drop(&mut self) {
        if let Err(e) = self.remove() {
            log::warn!("Failed to remove index store {}: {}", self.path.display(), e);
        }
    }
}

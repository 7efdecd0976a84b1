//! Structured error handling and exit codes.

use std::io;
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

use crate::index::IndexError;

/// Errors that end a scan session.
///
/// Any of these moves the session to `Aborted`; the store file is removed
/// before the error reaches the caller.
#[derive(Debug, Error)]
pub enum ScanError {
    /// The index store could not be created
    #[error("Failed to open index store {path}")]
    StoreOpenFailed {
        path: PathBuf,
        #[source]
        source: IndexError,
    },

    /// Listing a directory failed (including the root)
    #[error("Failed to read directory {path}")]
    DirectoryReadFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A file could not be opened or read to completion
    #[error("Failed to read file {path}")]
    FileReadFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Persisting a path record failed
    #[error("Failed to record {path} in the index")]
    IndexWriteFailed {
        path: PathBuf,
        #[source]
        source: IndexError,
    },

    /// Reading index namespaces during grouping failed
    #[error("Failed to read the duplicate index")]
    IndexReadFailed(#[source] IndexError),

    /// Shutdown was requested while the session was running
    #[error("Scan interrupted by user")]
    Interrupted,

    /// `run` was called on a session that already finished
    #[error("Scan session already finished")]
    SessionFinished,
}

impl ScanError {
    /// Whether this error came from a user interrupt.
    #[must_use]
    pub fn is_interrupted(&self) -> bool {
        matches!(self, Self::Interrupted)
    }
}

/// Process exit codes.
///
/// - 0: Success (scan completed, duplicates found)
/// - 1: General error (scan aborted or unexpected failure)
/// - 2: No duplicates found (scan completed, nothing to report)
/// - 3: Partial success (completed, but unreadable files were skipped)
/// - 130: Interrupted by user (Ctrl+C)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExitCode {
    /// Scan completed and duplicates were found.
    Success = 0,
    /// An error aborted the scan.
    GeneralError = 1,
    /// Scan completed but no duplicates were found.
    NoDuplicates = 2,
    /// Scan completed after skipping unreadable files.
    PartialSuccess = 3,
    /// Scan was interrupted by the user.
    Interrupted = 130,
}

impl ExitCode {
    /// Get the numeric exit code.
    #[must_use]
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Get the machine-readable code prefix.
    #[must_use]
    pub fn code_prefix(self) -> &'static str {
        match self {
            Self::Success => "DS000",
            Self::GeneralError => "DS001",
            Self::NoDuplicates => "DS002",
            Self::PartialSuccess => "DS003",
            Self::Interrupted => "DS130",
        }
    }

    /// Exit code for an error that escaped `run_app`.
    #[must_use]
    pub fn for_error(err: &anyhow::Error) -> Self {
        match err.downcast_ref::<ScanError>() {
            Some(scan) if scan.is_interrupted() => Self::Interrupted,
            _ => Self::GeneralError,
        }
    }
}

/// Structured error information for JSON output.
#[derive(Debug, Serialize)]
pub struct StructuredError {
    /// The error code (e.g., "DS001")
    pub code: String,
    /// The exit code number
    pub exit_code: i32,
    /// Human-readable error message, including its causes
    pub message: String,
    /// Whether the operation was interrupted
    pub interrupted: bool,
}

impl StructuredError {
    /// Create a new structured error from an anyhow error and an exit code.
    #[must_use]
    pub fn new(err: &anyhow::Error, exit_code: ExitCode) -> Self {
        Self {
            code: exit_code.code_prefix().to_string(),
            exit_code: exit_code.as_i32(),
            message: format!("{err:#}"),
            interrupted: exit_code == ExitCode::Interrupted,
        }
    }
}

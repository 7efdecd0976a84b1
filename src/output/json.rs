//! JSON output formatter for scan reports.
//!
//! # Shape
//!
//! ```json
//! {
//!   "duplicates": [
//!     { "fingerprint": "ab12...", "file_count": 2, "files": ["/a", "/b"] }
//!   ],
//!   "summary": { "root": "/data", "algorithm": "blake3", "files_scanned": 3, ... }
//! }
//! ```

use std::io::Write;

use serde::{Deserialize, Serialize};

use crate::duplicates::DuplicateGroup;
use crate::error::ExitCode;
use crate::session::ScanReport;

/// A duplicate group as serialized to JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonDuplicateGroup {
    /// Content fingerprint (hex)
    pub fingerprint: String,
    /// Number of files in the group
    pub file_count: usize,
    /// Paths in discovery order
    pub files: Vec<String>,
}

impl JsonDuplicateGroup {
    #[must_use]
    pub fn from_duplicate_group(group: &DuplicateGroup) -> Self {
        Self {
            fingerprint: group.fingerprint_hex(),
            file_count: group.len(),
            files: group.paths.clone(),
        }
    }
}

/// Scan counters as serialized to JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonSummary {
    pub root: String,
    pub algorithm: String,
    pub directories_scanned: usize,
    pub files_scanned: usize,
    pub bytes_hashed: u64,
    pub skipped_files: usize,
    pub skipped_entries: usize,
    pub distinct_fingerprints: usize,
    pub duplicate_groups: usize,
    pub duplicate_files: usize,
    pub scan_duration_ms: u64,
    pub exit_code: i32,
    pub exit_code_name: String,
}

impl JsonSummary {
    #[must_use]
    pub fn from_report(report: &ScanReport, exit_code: ExitCode) -> Self {
        let stats = &report.stats;
        Self {
            root: report.root.to_string_lossy().into_owned(),
            algorithm: report.algorithm.to_string(),
            directories_scanned: stats.directories_scanned,
            files_scanned: stats.files_scanned,
            bytes_hashed: stats.bytes_hashed,
            skipped_files: stats.skipped_files,
            skipped_entries: stats.skipped_entries,
            distinct_fingerprints: stats.distinct_fingerprints,
            duplicate_groups: stats.duplicate_groups,
            duplicate_files: stats.duplicate_files,
            scan_duration_ms: stats.duration.as_millis() as u64,
            exit_code: exit_code.as_i32(),
            exit_code_name: exit_code.code_prefix().to_string(),
        }
    }
}

/// Complete JSON document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonOutput {
    pub duplicates: Vec<JsonDuplicateGroup>,
    pub summary: JsonSummary,
}

impl JsonOutput {
    /// Build the JSON document for a report.
    #[must_use]
    pub fn new(report: &ScanReport, exit_code: ExitCode) -> Self {
        Self {
            duplicates: report
                .groups
                .iter()
                .map(JsonDuplicateGroup::from_duplicate_group)
                .collect(),
            summary: JsonSummary::from_report(report, exit_code),
        }
    }

    /// Serialize to compact JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serialize to pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Write JSON followed by a newline.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn write_to<W: Write>(&self, writer: &mut W, pretty: bool) -> Result<(), JsonOutputError> {
        let json = if pretty {
            self.to_json_pretty()?
        } else {
            self.to_json()?
        };
        writer.write_all(json.as_bytes())?;
        writer.write_all(b"\n")?;
        Ok(())
    }
}

/// Errors that can occur during JSON output.
#[derive(thiserror::Error, Debug)]
pub enum JsonOutputError {
    /// JSON serialization error
    #[error("JSON serialization error")]
    Serialization(#[from] serde_json::Error),

    /// I/O error during writing
    #[error("I/O error during JSON generation")]
    Io(#[from] std::io::Error),
}

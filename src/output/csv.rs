//! CSV output formatter for scan reports.
//!
//! One row is generated for each file that belongs to a duplicate group.
//!
//! # Columns
//!
//! - `group_id`: 1-based group number, in report order
//! - `fingerprint`: content fingerprint (hexadecimal)
//! - `position`: 1-based position of the file within its group
//! - `path`: path as discovered during traversal

use std::io;

use serde::Serialize;
use thiserror::Error;

use crate::duplicates::DuplicateGroup;

/// Errors that can occur during CSV output generation.
#[derive(Debug, Error)]
pub enum CsvOutputError {
    /// I/O error during writing.
    #[error("I/O error")]
    Io(#[from] io::Error),

    /// Error during CSV serialization.
    #[error("CSV error")]
    Csv(#[from] csv::Error),
}

#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    group_id: usize,
    fingerprint: &'a str,
    position: usize,
    path: &'a str,
}

/// CSV output formatter.
pub struct CsvOutput<'a> {
    groups: &'a [DuplicateGroup],
}

impl<'a> CsvOutput<'a> {
    #[must_use]
    pub fn new(groups: &'a [DuplicateGroup]) -> Self {
        Self { groups }
    }

    /// Write the CSV output (with header) to the given writer.
    ///
    /// # Errors
    ///
    /// Returns `CsvOutputError` if writing or serialization fails.
    pub fn write_to<W: io::Write>(&self, writer: W) -> Result<(), CsvOutputError> {
        let mut csv_writer = csv::Writer::from_writer(writer);

        if self.groups.is_empty() {
            csv_writer.write_record(["group_id", "fingerprint", "position", "path"])?;
        }

        for (idx, group) in self.groups.iter().enumerate() {
            let fingerprint = group.fingerprint_hex();
            for (pos, path) in group.paths.iter().enumerate() {
                csv_writer.serialize(CsvRow {
                    group_id: idx + 1,
                    fingerprint: &fingerprint,
                    position: pos + 1,
                    path,
                })?;
            }
        }

        csv_writer.flush()?;
        Ok(())
    }

    /// Generate CSV output as a string.
    ///
    /// # Errors
    ///
    /// Returns `CsvOutputError` if serialization fails.
    pub fn to_string(&self) -> Result<String, CsvOutputError> {
        let mut buffer = Vec::new();
        self.write_to(&mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}

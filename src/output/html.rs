//! HTML output formatter for scan reports.
//!
//! Produces a single self-contained page (CSS embedded) rendered with an
//! `askama` template. Paths are escaped by the template engine.

use std::io::Write;

use askama::Template;
use bytesize::ByteSize;
use chrono::Local;

use super::format_duration;
use crate::session::{ScanReport, ScanStats};

/// Template context for `templates/report.html`.
#[derive(Template)]
#[template(path = "report.html")]
pub struct HtmlOutput {
    /// Formatted generation timestamp
    pub timestamp: String,
    /// Application version
    pub version: String,
    /// Scanned root
    pub root: String,
    /// Fingerprint algorithm name
    pub algorithm: String,
    /// Scan counters
    pub stats: ScanStats,
    /// Human-readable bytes hashed
    pub bytes_hashed: String,
    /// Human-readable scan duration
    pub duration: String,
    /// Groups formatted for display
    pub groups: Vec<HtmlDuplicateGroup>,
}

/// A duplicate group formatted for HTML presentation.
pub struct HtmlDuplicateGroup {
    /// Fingerprint as hexadecimal string
    pub fingerprint: String,
    /// Member paths in discovery order
    pub paths: Vec<String>,
}

impl HtmlOutput {
    #[must_use]
    pub fn new(report: &ScanReport) -> Self {
        Self {
            timestamp: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            root: report.root.to_string_lossy().into_owned(),
            algorithm: report.algorithm.to_string(),
            stats: report.stats.clone(),
            bytes_hashed: ByteSize::b(report.stats.bytes_hashed).to_string(),
            duration: format_duration(report.stats.duration),
            groups: report
                .groups
                .iter()
                .map(|g| HtmlDuplicateGroup {
                    fingerprint: g.fingerprint_hex(),
                    paths: g.paths.clone(),
                })
                .collect(),
        }
    }

    /// Render the page.
    ///
    /// # Errors
    ///
    /// Returns an error if template rendering fails.
    pub fn to_html(&self) -> Result<String, askama::Error> {
        self.render()
    }

    /// Render the page into a writer.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering or writing fails.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<(), HtmlOutputError> {
        let html = self.to_html()?;
        writer.write_all(html.as_bytes())?;
        Ok(())
    }
}

/// Errors that can occur during HTML output generation.
#[derive(thiserror::Error, Debug)]
pub enum HtmlOutputError {
    /// Template rendering error
    #[error("HTML template error")]
    Template(#[from] askama::Error),

    /// I/O error during writing
    #[error("I/O error during HTML generation")]
    Io(#[from] std::io::Error),
}

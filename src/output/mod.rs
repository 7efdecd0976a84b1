//! Report formatters for scan results.
//!
//! - Text for terminals (optionally colored)
//! - JSON for automation and scripting
//! - CSV for spreadsheet import
//! - HTML for a standalone, shareable page
//!
//! # Example
//!
//! ```no_run
//! use dupescan::cli::OutputFormat;
//! use dupescan::error::ExitCode;
//! use dupescan::output::write_report;
//! use dupescan::session::{ScanOptions, ScanSession};
//!
//! let report = ScanSession::new(ScanOptions::new(".", std::env::temp_dir()))
//!     .run()
//!     .unwrap();
//! let mut stdout = std::io::stdout().lock();
//! write_report(&report, OutputFormat::Json, ExitCode::Success, &mut stdout, false).unwrap();
//! ```

pub mod csv;
pub mod html;
pub mod json;
pub mod text;

use std::io::Write;
use std::time::Duration;

use thiserror::Error;

use crate::cli::OutputFormat;
use crate::error::ExitCode;
use crate::session::ScanReport;

pub use csv::{CsvOutput, CsvOutputError};
pub use html::{HtmlOutput, HtmlOutputError};
pub use json::{JsonOutput, JsonOutputError};
pub use text::TextOutput;

/// Errors from any report formatter.
#[derive(Debug, Error)]
pub enum OutputError {
    #[error(transparent)]
    Json(#[from] JsonOutputError),

    #[error(transparent)]
    Csv(#[from] CsvOutputError),

    #[error(transparent)]
    Html(#[from] HtmlOutputError),

    #[error("I/O error while writing report")]
    Io(#[from] std::io::Error),
}

/// Render a report in the requested format.
///
/// `color` only affects the text format.
///
/// # Errors
///
/// Returns an error if rendering or writing fails.
pub fn write_report<W: Write>(
    report: &ScanReport,
    format: OutputFormat,
    exit_code: ExitCode,
    writer: &mut W,
    color: bool,
) -> Result<(), OutputError> {
    match format {
        OutputFormat::Text => TextOutput::new(report).write_to(writer, color)?,
        OutputFormat::Json => JsonOutput::new(report, exit_code).write_to(writer, true)?,
        OutputFormat::Csv => CsvOutput::new(&report.groups).write_to(&mut *writer)?,
        OutputFormat::Html => HtmlOutput::new(report).write_to(writer)?,
    }
    writer.flush()?;
    Ok(())
}

/// Format a duration as a short human-readable string.
pub(crate) fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs >= 3600 {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    } else if secs >= 60 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else if secs > 0 {
        format!("{}.{:03}s", secs, duration.subsec_millis())
    } else {
        format!("{}ms", duration.subsec_millis())
    }
}

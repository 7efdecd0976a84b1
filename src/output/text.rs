//! Plain-text report for terminals.
//!
//! ```text
//! 2 files share content 3a7bd3e2360a3d29...
//!   /data/a.txt
//!   /data/sub/a copy.txt
//!
//! Scanned 6 files in 2 directories (2.0 KiB hashed) in 1.500s
//! 2 duplicate groups, 3 redundant copies
//! ```

use std::io::{self, Write};

use bytesize::ByteSize;
use yansi::{Color, Paint, Style};

use super::format_duration;
use crate::session::ScanReport;

const FINGERPRINT_PREFIX_LEN: usize = 16;

/// Text formatter for a scan report.
pub struct TextOutput<'a> {
    report: &'a ScanReport,
}

impl<'a> TextOutput<'a> {
    #[must_use]
    pub fn new(report: &'a ScanReport) -> Self {
        Self { report }
    }

    /// Write the report.
    ///
    /// # Errors
    ///
    /// Returns the I/O error if writing fails.
    pub fn write_to<W: Write>(&self, writer: &mut W, color: bool) -> io::Result<()> {
        let header = Style::new().fg(Color::Cyan).bold();
        let dim = Style::new().dim();

        for group in &self.report.groups {
            let fingerprint = group.fingerprint_hex();
            let title = format!(
                "{} files share content {}...",
                group.len(),
                &fingerprint[..FINGERPRINT_PREFIX_LEN]
            );
            writeln!(writer, "{}", paint(&title, header, color))?;
            for path in &group.paths {
                writeln!(writer, "  {path}")?;
            }
            writeln!(writer)?;
        }

        let stats = &self.report.stats;
        if self.report.groups.is_empty() {
            writeln!(writer, "No duplicate files found.")?;
        }

        let summary = format!(
            "Scanned {} files in {} directories ({} hashed) in {}",
            stats.files_scanned,
            stats.directories_scanned,
            ByteSize::b(stats.bytes_hashed),
            format_duration(stats.duration)
        );
        writeln!(writer, "{}", paint(&summary, dim, color))?;

        if stats.duplicate_groups > 0 {
            writeln!(
                writer,
                "{} duplicate groups, {} redundant copies",
                stats.duplicate_groups, stats.duplicate_files
            )?;
        }
        if stats.skipped_files > 0 {
            writeln!(writer, "{} unreadable files skipped", stats.skipped_files)?;
        }
        Ok(())
    }
}

fn paint(text: &str, style: Style, color: bool) -> String {
    if color {
        text.paint(style).to_string()
    } else {
        text.to_string()
    }
}

//! Command-line interface definitions.
//!
//! Global options (verbosity, color, error format) apply to every
//! subcommand. Scan options left unset fall back to the configuration
//! file, then to `DUPESCAN_*` environment variables, then to defaults.
//!
//! # Example
//!
//! ```bash
//! # Scan a directory and print duplicate groups
//! dupescan scan ~/Downloads
//!
//! # JSON report written to a file, SHA-256 fingerprints
//! dupescan scan ~/Downloads --algorithm sha256 --output json --output-file report.json
//!
//! # Keep going past unreadable files
//! dupescan -v scan /srv/share --on-unreadable skip
//! ```

use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::scanner::FingerprintAlgorithm;
use crate::session::UnreadablePolicy;

/// Find duplicate files by content fingerprint.
///
/// dupescan walks a directory tree breadth-first, fingerprints every regular
/// file, and reports groups of files with identical content. Intermediate
/// state lives in a temporary index store that is removed when the scan ends.
#[derive(Debug, Parser)]
#[command(name = "dupescan")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity level (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    /// Print errors as JSON on stderr
    #[arg(long, global = true)]
    pub json_errors: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Scan a directory tree for duplicate files
    Scan(ScanArgs),
}

/// Arguments for the scan subcommand.
#[derive(Debug, Args)]
pub struct ScanArgs {
    /// Directory to scan
    #[arg(value_name = "PATH")]
    pub path: PathBuf,

    /// Directory for the temporary index store
    ///
    /// Defaults to the platform cache directory.
    #[arg(long, value_name = "DIR")]
    pub store_dir: Option<PathBuf>,

    /// Fingerprint algorithm
    #[arg(long, value_enum)]
    pub algorithm: Option<FingerprintAlgorithm>,

    /// What to do with files that cannot be read
    #[arg(long, value_enum, value_name = "POLICY")]
    pub on_unreadable: Option<UnreadablePolicy>,

    /// Traverse symbolic links to directories
    ///
    /// Links to files are always read. Directories reached twice through
    /// links are listed only once.
    #[arg(long)]
    pub follow_symlinks: bool,

    /// Report format
    #[arg(short, long, value_enum)]
    pub output: Option<OutputFormat>,

    /// Write the report to a file instead of stdout
    #[arg(long, value_name = "FILE")]
    pub output_file: Option<PathBuf>,

    /// Configuration file to use instead of the default location
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

/// Output format for scan reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable listing
    #[default]
    Text,
    /// JSON document for scripting
    Json,
    /// CSV rows, one per file
    Csv,
    /// Standalone HTML page
    Html,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Csv => write!(f, "csv"),
            OutputFormat::Html => write!(f, "html"),
        }
    }
}

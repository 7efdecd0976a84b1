//! dupescan - content-fingerprint duplicate file finder
//!
//! Walks a directory tree breadth-first, fingerprints every regular file,
//! records each path under its fingerprint in a transient SQLite index, and
//! reports groups of files with identical content. The index store lives
//! only for the duration of one scan session.
//!
//! # Modules
//!
//! - [`scanner`]: traversal queue and content fingerprints
//! - [`index`]: fingerprint namespaces with ordered path records
//! - [`duplicates`]: occurrence counting and the grouping pass
//! - [`session`]: the scan state machine and its I/O capabilities
//! - [`output`]: text, JSON, CSV and HTML reports

pub mod cli;
pub mod config;
pub mod duplicates;
pub mod error;
pub mod index;
pub mod logging;
pub mod output;
pub mod progress;
pub mod scanner;
pub mod session;
pub mod signal;

use std::fs::{self, File};
use std::io::{self, BufWriter, IsTerminal, Write};
use std::sync::Arc;

use anyhow::Context;

use cli::{Cli, Commands, OutputFormat, ScanArgs};
use config::Config;
use error::ExitCode;
use progress::{Progress, ProgressCallback};
use session::{ScanOptions, ScanReport, ScanSession};

/// Run the command described by `cli` and return the exit code to use.
///
/// Logging is not initialized here; the binary does that before calling.
///
/// # Errors
///
/// Returns an error if configuration is invalid, the scan aborts, or the
/// report cannot be written. A [`error::ScanError::Interrupted`] anywhere
/// in the chain maps to [`ExitCode::Interrupted`].
pub fn run_app(cli: Cli) -> anyhow::Result<ExitCode> {
    match &cli.command {
        Commands::Scan(args) => run_scan(&cli, args),
    }
}

fn run_scan(cli: &Cli, args: &ScanArgs) -> anyhow::Result<ExitCode> {
    let mut config = Config::load(args.config.as_deref())?;
    config.apply_scan_args(args);

    let store_dir = match &config.store_dir {
        Some(dir) => dir.clone(),
        None => {
            let dir = Config::default_store_dir();
            fs::create_dir_all(&dir)
                .with_context(|| format!("Failed to create store directory {}", dir.display()))?;
            dir
        }
    };

    let options = ScanOptions {
        root: args.path.clone(),
        store_dir,
        algorithm: config.algorithm,
        on_unreadable: config.on_unreadable,
        follow_symlinks: config.follow_symlinks,
    };

    let handler = signal::install_handler()?;
    let progress: Arc<dyn ProgressCallback> = Arc::new(Progress::new(cli.quiet));

    let report = ScanSession::new(options)
        .with_shutdown_handler(handler)
        .with_progress_callback(progress)
        .run()?;

    let exit_code = exit_code_for(&report);
    write_output(cli, args, config.output, &report, exit_code)?;
    Ok(exit_code)
}

fn exit_code_for(report: &ScanReport) -> ExitCode {
    if report.stats.skipped_files > 0 {
        ExitCode::PartialSuccess
    } else if report.has_duplicates() {
        ExitCode::Success
    } else {
        ExitCode::NoDuplicates
    }
}

fn write_output(
    cli: &Cli,
    args: &ScanArgs,
    format: OutputFormat,
    report: &ScanReport,
    exit_code: ExitCode,
) -> anyhow::Result<()> {
    match &args.output_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file {}", path.display()))?;
            let mut writer = BufWriter::new(file);
            output::write_report(report, format, exit_code, &mut writer, false)?;
            writer.flush()?;
            log::info!("Report written to {}", path.display());
        }
        None => {
            let stdout = io::stdout();
            let color = !cli.no_color && stdout.is_terminal();
            let mut lock = stdout.lock();
            output::write_report(report, format, exit_code, &mut lock, color)?;
        }
    }
    Ok(())
}

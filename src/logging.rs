//! Logging infrastructure.
//!
//! Structured logging goes through the `log` facade with an `env_logger`
//! backend writing to stderr. The level is chosen by, in priority order:
//!
//! 1. `RUST_LOG` environment variable (if set)
//! 2. CLI flags: `--quiet` (error only) or `--verbose` (debug/trace)
//! 3. Default: warn, so a normal scan prints only its report
//!
//! # Build-specific Formatting
//!
//! - **Debug builds**: timestamp, level and module path
//! - **Release builds**: level and message only
//!
//! # Example
//!
//! ```rust,no_run
//! use dupescan::logging::init_logging;
//!
//! init_logging(2, false); // -vv: debug
//! log::debug!("Listing directories");
//! ```

use env_logger::Builder;
use log::LevelFilter;
use std::env;
use std::io::Write;

/// Initialize the logging subsystem based on CLI verbosity flags.
///
/// Returns `false` if a logger was already installed in this process, in
/// which case the existing logger is kept.
///
/// # Arguments
///
/// * `verbose` - Verbosity count from CLI (0=warn, 1=info, 2=debug, 3+=trace)
/// * `quiet` - If true, only show errors (overridden by `RUST_LOG`)
pub fn init_logging(verbose: u8, quiet: bool) -> bool {
    let use_env = env::var("RUST_LOG").is_ok();
    let mut builder = Builder::new();

    if use_env {
        builder.parse_default_env();
    } else {
        builder.filter_level(determine_level(verbose, quiet));
    }

    configure_format(&mut builder, verbose);

    let installed = builder.try_init().is_ok();
    if installed {
        log::debug!("Logging initialized at level: {}", current_level_name());
    }
    installed
}

/// Determine the log level from CLI flags.
fn determine_level(verbose: u8, quiet: bool) -> LevelFilter {
    if quiet {
        return LevelFilter::Error;
    }
    match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

// Debug builds prefix a timestamp, and the module path from -vv on.
fn configure_format(builder: &mut Builder, verbose: u8) {
    let with_timestamp = cfg!(debug_assertions);
    let with_module = with_timestamp && verbose >= 2;

    builder.format(move |buf, record| {
        let style = buf.default_level_style(record.level());
        if with_timestamp {
            write!(buf, "{} ", buf.timestamp_seconds())?;
        }
        write!(buf, "{style}{:<5}{style:#} ", record.level())?;
        if with_module {
            write!(buf, "[{}] ", record.module_path().unwrap_or("dupescan"))?;
        }
        writeln!(buf, "{}", record.args())
    });
}

/// Name of the current maximum log level, lowercase.
#[must_use]
pub fn current_level_name() -> String {
    log::max_level().as_str().to_ascii_lowercase()
}

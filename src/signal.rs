//! Signal handling for graceful shutdown.
//!
//! A Ctrl+C (or SIGTERM) sets a shared `AtomicBool`. The scan orchestrator
//! checks it before each directory and each file, aborts, and removes its
//! store file on its own thread.
//!
//! A read that blocks forever never reaches the next check. For that case a
//! second signal removes every registered store file directly from the
//! handler thread and exits the process with code 130.
//!
//! # Usage
//!
//! ```rust,no_run
//! use dupescan::signal::install_handler;
//!
//! let handler = install_handler().expect("Failed to install signal handler");
//!
//! if handler.is_shutdown_requested() {
//!     println!("Shutdown requested, cleaning up...");
//! }
//! ```

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};

use crate::session::store_file::remove_store_files;

/// Process exit status after a forced second interrupt (128 + SIGINT).
pub const EXIT_CODE_INTERRUPTED: i32 = 130;

/// Shared shutdown state: the interrupt flag plus store files that must not
/// outlive the process.
///
/// Clones share both the flag and the cleanup list.
#[derive(Debug, Clone, Default)]
pub struct ShutdownHandler {
    flag: Arc<AtomicBool>,
    cleanup: Arc<Mutex<Vec<PathBuf>>>,
}

impl ShutdownHandler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether an interrupt arrived since the last reset.
    #[must_use]
    pub fn is_shutdown_requested(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Raise the flag as if a signal had arrived.
    pub fn request_shutdown(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Lower the flag. Registered store files are kept.
    pub fn reset(&self) {
        self.flag.store(false, Ordering::SeqCst);
    }

    /// Register a store file to be removed on forced exit.
    pub fn register_cleanup(&self, path: &Path) {
        self.cleanup_list().push(path.to_path_buf());
    }

    /// Forget a store file once its owner has removed it.
    pub fn unregister_cleanup(&self, path: &Path) {
        self.cleanup_list().retain(|p| p != path);
    }

    /// Store files currently registered.
    #[must_use]
    pub fn pending_cleanup(&self) -> Vec<PathBuf> {
        self.cleanup_list().clone()
    }

    /// Remove every registered store file and clear the list.
    ///
    /// Returns how many stores were processed. Removal failures are logged
    /// and do not stop the remaining removals.
    pub fn run_cleanup(&self) -> usize {
        let paths: Vec<PathBuf> = self.cleanup_list().drain(..).collect();
        for path in &paths {
            if let Err(e) = remove_store_files(path) {
                log::warn!("Failed to remove index store {}: {}", path.display(), e);
            }
        }
        paths.len()
    }

    fn cleanup_list(&self) -> MutexGuard<'_, Vec<PathBuf>> {
        self.cleanup.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SignalError {
    #[error("Failed to install signal handler")]
    InstallFailed(#[from] ctrlc::Error),
}

static GLOBAL_HANDLER: OnceLock<ShutdownHandler> = OnceLock::new();

/// Install a Ctrl+C handler and return the shared [`ShutdownHandler`].
///
/// Repeated calls in one process return the already installed handler with
/// its flag reset. If the signal hook cannot be registered (for example
/// because another component owns it), an unhooked handler is returned that
/// still honours [`ShutdownHandler::request_shutdown`].
///
/// # Errors
///
/// Currently always succeeds; the `Result` is kept so callers handle a
/// failed installation if the fallback is ever removed.
pub fn install_handler() -> Result<ShutdownHandler, SignalError> {
    if let Some(handler) = GLOBAL_HANDLER.get() {
        handler.reset();
        return Ok(handler.clone());
    }

    let handler = ShutdownHandler::new();
    let hooked = handler.clone();

    match ctrlc::set_handler(move || on_signal(&hooked)) {
        Ok(()) => {
            let _ = GLOBAL_HANDLER.set(handler.clone());
            Ok(handler)
        }
        Err(_) => {
            if let Some(existing) = GLOBAL_HANDLER.get() {
                existing.reset();
                Ok(existing.clone())
            } else {
                log::debug!("Ctrl+C handler already registered, using unhooked handler");
                let fallback = ShutdownHandler::new();
                let _ = GLOBAL_HANDLER.set(fallback.clone());
                Ok(fallback)
            }
        }
    }
}

fn on_signal(handler: &ShutdownHandler) {
    let already_requested = handler.flag.swap(true, Ordering::SeqCst);
    let mut stderr = std::io::stderr();

    if already_requested {
        let _ = writeln!(stderr, "\nForced exit. Removing index store...");
        let _ = stderr.flush();
        handler.run_cleanup();
        std::process::exit(EXIT_CODE_INTERRUPTED);
    }

    let _ = writeln!(
        stderr,
        "\nInterrupted. Cleaning up... (press Ctrl+C again to force exit)"
    );
    let _ = stderr.flush();
    log::info!("Shutdown signal received");
}

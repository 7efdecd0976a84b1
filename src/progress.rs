//! Progress reporting utilities using indicatif.
//!
//! The scan orchestrator reports through the [`ProgressCallback`] trait.
//! [`Progress`] renders those callbacks as terminal spinners and bars on
//! stderr, so report output on stdout is never interleaved with them.

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use bytesize::ByteSize;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

/// Phase name reported while directories are being traversed.
pub const PHASE_TRAVERSING: &str = "traversing";
/// Phase name reported while duplicate groups are read from the index.
pub const PHASE_GROUPING: &str = "grouping";

/// Progress callback for scan phases.
pub trait ProgressCallback: Send + Sync {
    /// Called when a phase starts.
    ///
    /// `total` is the number of items the phase will process, or 0 when it
    /// is not known up front (traversal).
    fn on_phase_start(&self, phase: &str, total: usize);

    /// Called for each item processed.
    ///
    /// # Arguments
    ///
    /// * `current` - Items processed so far in this phase (1-based)
    /// * `path` - Path being processed
    fn on_progress(&self, current: usize, path: &str);

    /// Called after a file's content has been fingerprinted.
    fn on_item_completed(&self, _bytes: u64) {}

    /// Called when a phase completes.
    fn on_phase_end(&self, phase: &str);

    /// Called to update the progress message.
    fn on_message(&self, _message: &str) {}
}

/// Progress reporter using indicatif.
pub struct Progress {
    multi: MultiProgress,
    traversing: Mutex<Option<ProgressBar>>,
    grouping: Mutex<Option<ProgressBar>>,
    bytes: Mutex<u64>,
    quiet: bool,
}

impl Progress {
    /// Create a new progress reporter.
    ///
    /// When `quiet` is set nothing is drawn. indicatif also hides its bars
    /// on its own when stderr is not a terminal.
    ///
    /// ```
    /// use dupescan::progress::Progress;
    ///
    /// let progress = Progress::new(true);
    /// assert!(progress.is_quiet());
    /// ```
    #[must_use]
    pub fn new(quiet: bool) -> Self {
        Self {
            multi: MultiProgress::new(),
            traversing: Mutex::new(None),
            grouping: Mutex::new(None),
            bytes: Mutex::new(0),
            quiet,
        }
    }

    #[must_use]
    pub fn is_quiet(&self) -> bool {
        self.quiet
    }

    fn traversing_style() -> ProgressStyle {
        ProgressStyle::with_template("{spinner:.green} {msg} [{elapsed_precise}] {pos} files")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
    }

    fn grouping_style() -> ProgressStyle {
        ProgressStyle::with_template(
            "[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█>-")
    }

    fn active(&self) -> Option<ProgressBar> {
        lock(&self.grouping)
            .clone()
            .or_else(|| lock(&self.traversing).clone())
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl ProgressCallback for Progress {
    fn on_phase_start(&self, phase: &str, total: usize) {
        if self.quiet {
            return;
        }

        match phase {
            PHASE_TRAVERSING => {
                let pb = self.multi.add(ProgressBar::new_spinner());
                pb.set_style(Self::traversing_style());
                pb.set_message("Scanning");
                pb.enable_steady_tick(Duration::from_millis(100));
                *lock(&self.traversing) = Some(pb);
            }
            PHASE_GROUPING => {
                let pb = self.multi.add(ProgressBar::new(total as u64));
                pb.set_style(Self::grouping_style());
                pb.set_message("Grouping");
                *lock(&self.grouping) = Some(pb);
            }
            _ => {}
        }
    }

    fn on_progress(&self, current: usize, path: &str) {
        if self.quiet {
            return;
        }
        if let Some(pb) = self.active() {
            pb.set_position(current as u64);
            pb.set_message(truncate_path(path, 40));
        }
    }

    fn on_item_completed(&self, bytes: u64) {
        *lock(&self.bytes) += bytes;
    }

    fn on_phase_end(&self, phase: &str) {
        if self.quiet {
            return;
        }

        match phase {
            PHASE_TRAVERSING => {
                if let Some(pb) = lock(&self.traversing).take() {
                    let hashed = ByteSize::b(*lock(&self.bytes));
                    pb.finish_with_message(format!("Scan complete ({hashed} hashed)"));
                }
            }
            PHASE_GROUPING => {
                if let Some(pb) = lock(&self.grouping).take() {
                    pb.finish_with_message("Grouping complete");
                }
            }
            _ => {}
        }
    }

    fn on_message(&self, message: &str) {
        if self.quiet {
            return;
        }
        if let Some(pb) = self.active() {
            pb.set_message(message.to_string());
        }
    }
}

/// Shorten a path for display, keeping the file name.
fn truncate_path(path: &str, max_len: usize) -> String {
    if path.chars().count() <= max_len {
        return path.to_string();
    }

    let file_name = std::path::Path::new(path)
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    let name_len = file_name.chars().count();
    if name_len + 4 > max_len {
        let keep = max_len.saturating_sub(3);
        let tail: String = file_name.chars().skip(name_len.saturating_sub(keep)).collect();
        return format!("...{tail}");
    }

    format!(".../{file_name}")
}

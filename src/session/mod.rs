//! Scan sessions: one traversal, one transient index store, one report.
//!
//! # Architecture
//!
//! * [`orchestrator`]: The [`ScanSession`] state machine driving traversal,
//!   fingerprinting, indexing and grouping.
//! * [`io`]: The [`ScanIo`] capability set (index store, directory listing,
//!   file reading) and its filesystem implementation.
//! * [`store_file`]: Removal guard for the on-disk store and its sidecars.
//! * [`id`]: Session identifiers used to name store files.
//!
//! # Example
//!
//! ```no_run
//! use dupescan::session::{ScanOptions, ScanSession};
//!
//! let options = ScanOptions::new("/data/photos", std::env::temp_dir());
//! let report = ScanSession::new(options).run().expect("scan failed");
//!
//! for group in &report.groups {
//!     println!("{}", group.paths.join(", "));
//! }
//! ```

pub mod id;
pub mod io;
pub mod orchestrator;
pub mod store_file;

pub use id::session_id;
pub use io::{ScanIo, StdScanIo};
pub use orchestrator::{
    ScanOptions, ScanReport, ScanSession, ScanState, ScanStats, UnreadablePolicy,
};
pub use store_file::{remove_store_files, StoreFile};

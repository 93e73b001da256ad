//! Run log files.
//!
//! A run log mirrors everything printed to the console, prefixed with a
//! timestamp and level, into `<log dir>/webpify_run_<timestamp>.log`.

pub mod setup;

pub use setup::setup_file_logging;

use std::path::{Path, PathBuf};

/// Prefix shared by every run log file name.
pub const RUN_LOG_PREFIX: &str = "webpify_run_";

/// Path of the run log for a run started at `timestamp` (`YYYYMMDD_HHMMSS`).
#[must_use]
pub fn run_log_path(log_dir: &Path, timestamp: &str) -> PathBuf {
    log_dir.join(format!("{RUN_LOG_PREFIX}{timestamp}.log"))
}

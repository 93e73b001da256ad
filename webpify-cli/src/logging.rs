// ============================================================================
// webpify-cli/src/logging.rs
// ============================================================================
//
// LOGGING SETUP: Console and run-log configuration
//
// Without --log-dir, env_logger writes to stderr (RUST_LOG is honored,
// default `info`). With --log-dir, log4rs writes the same console lines to
// stderr plus a timestamped run log file.

use crate::error::CliResult;

use console::style;
use log::{Level, LevelFilter};
use std::io::Write;
use std::path::{Path, PathBuf};
use webpify_core::CoreError;
use webpify_core::file_logging::{run_log_path, setup_file_logging};

/// Returns the current local timestamp formatted as "YYYYMMDD_HHMMSS".
///
/// # Example
/// ```
/// let log_filename = format!("webpify_run_{}.log", webpify_cli::logging::get_timestamp());
/// assert!(log_filename.ends_with(".log"));
/// ```
pub fn get_timestamp() -> String {
    chrono::Local::now().format("%Y%m%d_%H%M%S").to_string()
}

/// Installs the global logger. Returns the run log path when one is written.
pub fn init_logging(debug: bool, log_dir: Option<&Path>) -> CliResult<Option<PathBuf>> {
    let level = if debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    match log_dir {
        Some(dir) => {
            let log_path = run_log_path(dir, &get_timestamp());
            setup_file_logging(&log_path, level).map_err(|e| {
                CoreError::OperationFailed(format!(
                    "Failed to set up run log in {}: {e}",
                    dir.display()
                ))
            })?;
            log::debug!("Writing run log to {}", log_path.display());
            Ok(Some(log_path))
        }
        None => {
            let default_filter = if debug { "debug" } else { "info" };
            let mut builder = env_logger::Builder::from_env(
                env_logger::Env::default().default_filter_or(default_filter),
            );
            if debug {
                builder.filter_level(level);
            }
            builder
                .format(|buf, record| match record.level() {
                    Level::Info => writeln!(buf, "{}", record.args()),
                    Level::Warn => writeln!(buf, "{} {}", style("WARN").yellow().bold(), record.args()),
                    Level::Error => writeln!(buf, "{} {}", style("ERROR").red().bold(), record.args()),
                    other => writeln!(buf, "{} {}", style(other).dim(), record.args()),
                })
                .try_init()
                .map_err(|e| CoreError::OperationFailed(format!("Failed to initialize logger: {e}")))?;
            Ok(None)
        }
    }
}

// ============================================================================
// webpify-cli/src/main.rs
// ============================================================================
//
// WEBPIFY CLI: Main Entry Point
//
// Parses arguments, sets up logging and signal handling, runs the batch and
// turns its outcome into the process exit code.
//
// Exit codes: 0 everything converted (or nothing to do), 1 fatal error or a
// failed file, 130 interrupted.

use clap::Parser;
use std::process;
use webpify_cli::logging::init_logging;
use webpify_cli::{Cli, EXIT_CANCELLED, EXIT_FAILURE, exit_code, run_convert};
use webpify_core::CancelToken;

fn main() {
    let cli = Cli::parse();

    if let Err(e) = init_logging(cli.debug, cli.log_dir.as_deref()) {
        eprintln!("Error: {e}");
        process::exit(EXIT_FAILURE);
    }

    let cancel = CancelToken::new();
    install_signal_handler(&cancel);

    let code = match run_convert(&cli, &cancel) {
        Ok(summary) => exit_code(&summary),
        Err(e) => {
            log::debug!("Fatal error: {e:?}");
            eprintln!("Error: {e}");
            EXIT_FAILURE
        }
    };

    process::exit(code);
}

/// First Ctrl-C/SIGTERM cancels the batch; a second one exits immediately.
fn install_signal_handler(cancel: &CancelToken) {
    let token = cancel.clone();
    let result = ctrlc::set_handler(move || {
        if token.is_cancelled() {
            process::exit(EXIT_CANCELLED);
        }
        log::warn!("Interrupt received, stopping after cleaning up running conversions...");
        token.cancel();
    });

    if let Err(e) = result {
        log::warn!("Could not install interrupt handler: {e}");
    }
}

// webpify-cli/src/commands/convert.rs
//
// Implements the conversion run: build the encoder configuration, find the
// images, check for cwebp and convert everything on the worker pool.

use crate::cli::Cli;
use crate::error::{CliErrorContext, CliResult};

use webpify_core::{
    BatchSettings, BatchSummary, CancelToken, CwebpEncoder, JsonReporter, Reporter,
    TerminalReporter, check_dependency, convert_files, marshal, resolve_candidates,
};

/// Every file converted, or nothing to do.
pub const EXIT_SUCCESS: i32 = 0;
/// A fatal error, or at least one file failed.
pub const EXIT_FAILURE: i32 = 1;
/// Interrupted by Ctrl-C or SIGTERM.
pub const EXIT_CANCELLED: i32 = 130;

/// Maps a finished batch to the process exit code.
pub fn exit_code(summary: &BatchSummary) -> i32 {
    if summary.was_cancelled() {
        EXIT_CANCELLED
    } else if summary.is_success() {
        EXIT_SUCCESS
    } else {
        EXIT_FAILURE
    }
}

/// Runs one conversion batch as described by `cli`.
///
/// Configuration, discovery and dependency problems are returned as errors
/// before any file is touched. Per-file failures end up in the summary.
pub fn run_convert(cli: &Cli, cancel: &CancelToken) -> CliResult<BatchSummary> {
    let reporter: Box<dyn Reporter> = if cli.json {
        Box::new(JsonReporter::new())
    } else {
        Box::new(TerminalReporter::new())
    };

    // --- Configuration ---
    let config = cli
        .encoder_args
        .to_config()
        .cli_context("Invalid encoder options")?;
    let options = marshal(&config);
    log::debug!("Encoder options: {}", options.join(" "));

    // --- Discovery ---
    let candidates = resolve_candidates(cli.files.clone(), &cli.dir, cli.recursive)?;
    reporter.discovery_complete(candidates.len());
    if candidates.is_empty() {
        log::debug!("No images to convert");
        let summary = BatchSummary::default();
        reporter.batch_complete(&summary);
        return Ok(summary);
    }

    // --- Encoder ---
    let version = check_dependency(&cli.encoder).cli_with_context(|| {
        format!(
            "cwebp is required (install libwebp or point --encoder at it; tried '{}')",
            cli.encoder.display()
        )
    })?;
    reporter.encoder_ready(&cli.encoder, &version);

    // --- Conversion ---
    let settings = match cli.jobs {
        Some(jobs) => BatchSettings::with_jobs(usize::from(jobs)),
        None => BatchSettings::default(),
    };
    reporter.batch_started(candidates.len(), settings.jobs, &config);

    let encoder = CwebpEncoder::new(&cli.encoder);
    let summary = convert_files(
        &encoder,
        &options,
        &candidates,
        &settings,
        cancel,
        reporter.as_ref(),
    )?;

    reporter.batch_complete(&summary);
    Ok(summary)
}

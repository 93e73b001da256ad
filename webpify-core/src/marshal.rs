//! Translation of an [`EncoderConfig`] into cwebp command-line arguments.
//!
//! Flags are emitted in the order of [`ENCODER_OPTIONS`], one entry per set
//! option. Unset options never appear.
//!
//! [`ENCODER_OPTIONS`]: crate::config::ENCODER_OPTIONS

use crate::config::EncoderConfig;

use std::ffi::OsString;
use std::path::Path;

/// Flag that introduces the output path on the cwebp command line.
pub const OUTPUT_FLAG: &str = "-o";

/// Builds the shared option vector for a run.
#[must_use]
pub fn marshal(config: &EncoderConfig) -> Vec<String> {
    let mut args = Vec::with_capacity(config.len() * 2);
    for (spec, value) in config.iter() {
        args.push(spec.flag.to_string());
        args.extend(value.to_args());
    }
    args
}

/// Full argument vector for one file: `options ++ [input, "-o", output]`.
#[must_use]
pub fn command_args(options: &[String], input: &Path, output: &Path) -> Vec<OsString> {
    let mut args: Vec<OsString> = options.iter().map(OsString::from).collect();
    args.push(input.as_os_str().to_os_string());
    args.push(OsString::from(OUTPUT_FLAG));
    args.push(output.as_os_str().to_os_string());
    args
}

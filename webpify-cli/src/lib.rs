// webpify-cli/src/lib.rs
//
// Library portion of the Webpify CLI application.
// Contains argument definitions and command logic.

pub mod cli;
pub mod commands;
pub mod error;
pub mod logging;

// Re-export items needed by the binary or integration tests
pub use cli::{Cli, EncoderArgs};
pub use commands::convert::{EXIT_CANCELLED, EXIT_FAILURE, EXIT_SUCCESS, exit_code, run_convert};
pub use error::{CliErrorContext, CliResult};

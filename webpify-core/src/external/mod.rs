// ============================================================================
// webpify-core/src/external/mod.rs
// ============================================================================
//
// EXTERNAL TOOLS: Interaction with the cwebp encoder binary
//
// The conversion driver only talks to the `Encoder` trait, so tests can swap
// the real subprocess for `MockEncoder`. `CwebpEncoder` is the production
// implementation.

use crate::cancel::CancelToken;
use crate::error::{CoreError, CoreResult};

use std::ffi::OsString;
use std::io;
use std::path::Path;
use std::process::{Command, Stdio};

pub mod cwebp;

#[cfg(any(test, feature = "test-mocks"))]
pub mod mocks;

pub use cwebp::CwebpEncoder;

/// Runs one encoder invocation.
///
/// `args` is the complete argument vector (options, input, `-o`, output).
/// Implementations must return `CoreError::Cancelled` if they stop early
/// because `cancel` was tripped.
pub trait Encoder: Sync {
    fn encode(&self, args: &[OsString], cancel: &CancelToken) -> CoreResult<()>;
}

/// Checks that the encoder binary can be started.
///
/// Runs `<program> -version` and returns the first line it prints.
///
/// # Errors
///
/// * `CoreError::DependencyNotFound` if the binary does not exist
/// * `CoreError::CommandStart` if it exists but cannot be started
pub fn check_dependency(program: &Path) -> CoreResult<String> {
    let name = program.display().to_string();

    match Command::new(program)
        .arg("-version")
        .stdin(Stdio::null())
        .stderr(Stdio::null())
        .output()
    {
        Ok(output) => {
            let version = String::from_utf8_lossy(&output.stdout)
                .lines()
                .next()
                .unwrap_or_default()
                .trim()
                .to_string();
            log::debug!("Found encoder {name}, version '{version}'");
            Ok(version)
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            log::warn!("Encoder '{name}' not found.");
            Err(CoreError::DependencyNotFound(name))
        }
        Err(e) => {
            log::error!("Failed to start encoder check '{name}': {e}");
            Err(CoreError::CommandStart(name, e))
        }
    }
}

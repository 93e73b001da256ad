// webpify-core/src/external/mocks.rs

// --- Mocking Infrastructure (for testing) ---

use super::Encoder;
use crate::cancel::CancelToken;
use crate::error::{CoreError, CoreResult};
use std::collections::HashSet;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// In-process stand-in for cwebp.
///
/// Records every argument vector it receives. Inputs registered with
/// [`fail_on`](Self::fail_on) fail with exit status 1; every other call
/// succeeds and, when `create_dummy_output` is on, writes a small file at the
/// `-o` path.
#[derive(Debug, Default)]
pub struct MockEncoder {
    failing_inputs: HashSet<PathBuf>,
    create_dummy_output: bool,
    cancel_after_first: Option<CancelToken>,
    received_calls: Mutex<Vec<Vec<OsString>>>,
}

impl MockEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn fail_on(mut self, input: impl AsRef<Path>) -> Self {
        self.failing_inputs.insert(input.as_ref().to_path_buf());
        self
    }

    #[must_use]
    pub fn with_dummy_output(mut self) -> Self {
        self.create_dummy_output = true;
        self
    }

    /// Trips `token` as soon as the first call completes.
    #[must_use]
    pub fn cancel_after_first(mut self, token: CancelToken) -> Self {
        self.cancel_after_first = Some(token);
        self
    }

    pub fn calls(&self) -> Vec<Vec<OsString>> {
        self.received_calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }

    /// Input paths of all recorded calls, in call order.
    pub fn inputs(&self) -> Vec<PathBuf> {
        self.calls()
            .iter()
            .filter_map(|args| args.len().checked_sub(3).map(|i| PathBuf::from(&args[i])))
            .collect()
    }
}

impl Encoder for MockEncoder {
    fn encode(&self, args: &[OsString], cancel: &CancelToken) -> CoreResult<()> {
        if let Ok(mut calls) = self.received_calls.lock() {
            calls.push(args.to_vec());
        }

        if cancel.is_cancelled() {
            return Err(CoreError::Cancelled);
        }

        let (input, output) = match args {
            [.., input, _, output] => (Path::new(input), Path::new(output)),
            _ => {
                return Err(CoreError::OperationFailed(
                    "mock encoder received too few arguments".to_string(),
                ));
            }
        };

        let result = if self.failing_inputs.contains(input) {
            Err(CoreError::EncoderFailed {
                code: Some(1),
                detail: format!("Could not process file {}", input.display()),
            })
        } else {
            if self.create_dummy_output {
                fs::write(output, b"RIFF\0\0\0\0WEBPVP8 ")?;
            }
            Ok(())
        };

        if let Some(token) = &self.cancel_after_first {
            token.cancel();
        }
        result
    }
}

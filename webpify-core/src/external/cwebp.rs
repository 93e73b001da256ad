// ============================================================================
// webpify-core/src/external/cwebp.rs
// ============================================================================
//
// CWEBP EXECUTOR: Runs one cwebp process per file
//
// The child is polled with `try_wait` so a cancellation request can kill it
// while it is still encoding. stderr is drained on a helper thread and kept
// for the failure message; stdout is discarded.

use crate::cancel::CancelToken;
use crate::error::{CoreError, CoreResult};
use crate::external::Encoder;

use std::ffi::OsString;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::thread;
use std::time::Duration;

/// Default interval between liveness checks of a running encoder.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Encoder backed by a real cwebp binary.
#[derive(Debug, Clone)]
pub struct CwebpEncoder {
    program: PathBuf,
    poll_interval: Duration,
}

impl CwebpEncoder {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    #[must_use]
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }
}

impl Encoder for CwebpEncoder {
    fn encode(&self, args: &[OsString], cancel: &CancelToken) -> CoreResult<()> {
        let name = self.program.display().to_string();
        log::debug!("Running: {} {}", name, render_args(args));

        let mut child = Command::new(&self.program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                log::error!("Failed to spawn {name}: {e}");
                CoreError::CommandStart(name.clone(), e)
            })?;

        let stderr_handle = child.stderr.take().map(|stderr| {
            thread::spawn(move || {
                let mut lines = Vec::new();
                for line in BufReader::new(stderr).lines().map_while(Result::ok) {
                    log::debug!("cwebp: {line}");
                    lines.push(line);
                }
                lines
            })
        });

        let status = loop {
            if cancel.is_cancelled() {
                if let Err(e) = child.kill() {
                    log::debug!("Kill of {name} reported: {e}");
                }
                let _ = child.wait();
                // The stderr thread is left detached: a grandchild may still
                // hold the pipe open after the kill.
                drop(stderr_handle);
                return Err(CoreError::Cancelled);
            }

            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) => thread::sleep(self.poll_interval),
                Err(e) => {
                    let _ = child.kill();
                    return Err(CoreError::CommandWait(name, e));
                }
            }
        };

        let stderr_lines = stderr_handle
            .and_then(|handle| handle.join().ok())
            .unwrap_or_default();

        if status.success() {
            Ok(())
        } else {
            Err(CoreError::EncoderFailed {
                code: status.code(),
                detail: last_meaningful_line(&stderr_lines),
            })
        }
    }
}

fn last_meaningful_line(lines: &[String]) -> String {
    lines
        .iter()
        .rev()
        .map(|line| line.trim())
        .find(|line| !line.is_empty())
        .unwrap_or_default()
        .to_string()
}

fn render_args(args: &[OsString]) -> String {
    args.iter()
        .map(|arg| arg.to_string_lossy())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_last_non_blank_stderr_line() {
        let lines = vec![
            "Saving file 'a.webp'".to_string(),
            "Error! Could not process file a.png".to_string(),
            "   ".to_string(),
        ];
        assert_eq!(last_meaningful_line(&lines), "Error! Could not process file a.png");
        assert_eq!(last_meaningful_line(&[]), "");
    }

    #[cfg(unix)]
    mod unix {
        use super::*;
        use std::time::Instant;

        fn sh(script: &str) -> Vec<OsString> {
            vec![OsString::from("-c"), OsString::from(script)]
        }

        #[test]
        fn zero_exit_is_success() {
            let encoder = CwebpEncoder::new("sh");
            encoder.encode(&sh("exit 0"), &CancelToken::new()).unwrap();
        }

        #[test]
        fn non_zero_exit_carries_code_and_stderr() {
            let encoder = CwebpEncoder::new("sh");
            let err = encoder
                .encode(&sh("echo 'bad header' >&2; exit 3"), &CancelToken::new())
                .unwrap_err();
            match err {
                CoreError::EncoderFailed { code, detail } => {
                    assert_eq!(code, Some(3));
                    assert_eq!(detail, "bad header");
                }
                other => panic!("unexpected error: {other:?}"),
            }
        }

        #[test]
        fn missing_program_fails_to_start() {
            let encoder = CwebpEncoder::new("no-such-cwebp-binary-for-tests");
            let err = encoder.encode(&[], &CancelToken::new()).unwrap_err();
            assert!(matches!(err, CoreError::CommandStart(..)));
        }

        #[test]
        fn cancellation_kills_running_process() {
            let encoder = CwebpEncoder::new("sh").with_poll_interval(Duration::from_millis(10));
            let cancel = CancelToken::new();
            let trigger = cancel.clone();
            let canceller = thread::spawn(move || {
                thread::sleep(Duration::from_millis(100));
                trigger.cancel();
            });

            let start = Instant::now();
            let err = encoder.encode(&sh("exec sleep 30"), &cancel).unwrap_err();
            canceller.join().unwrap();

            assert!(matches!(err, CoreError::Cancelled));
            assert!(start.elapsed() < Duration::from_secs(10));
        }
    }
}

//! Progress and result reporting.
//!
//! The conversion driver and the CLI describe what happens through the
//! [`Reporter`] trait; [`TerminalReporter`] renders it for people and
//! [`JsonReporter`] as one JSON object per line for scripts.

use crate::config::{EncoderConfig, OptionValue};
use crate::conversion::{BatchSummary, ConversionOutcome, ConversionStatus};
use crate::terminal;
use crate::utils::{calculate_size_reduction, format_bytes, format_duration};

use indicatif::ProgressBar;
use serde_json::json;
use std::io::{self, Write};
use std::path::Path;
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

/// Reporter interface implemented by both human-readable and JSON reporters.
///
/// Called from worker threads, so implementations must be thread-safe.
pub trait Reporter: Send + Sync {
    fn discovery_complete(&self, _count: usize) {}
    fn encoder_ready(&self, _program: &Path, _version: &str) {}
    fn batch_started(&self, _total: usize, _jobs: usize, _config: &EncoderConfig) {}
    fn conversion_started(&self, _input: &Path) {}
    fn conversion_finished(&self, _outcome: &ConversionOutcome) {}
    fn batch_complete(&self, _summary: &BatchSummary) {}
}

/// No-op reporter that discards all updates.
pub struct NullReporter;

impl Reporter for NullReporter {}

/// Human-friendly reporter built on the `terminal` helpers.
pub struct TerminalReporter {
    progress: Mutex<Option<ProgressBar>>,
}

impl Default for TerminalReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl TerminalReporter {
    pub fn new() -> Self {
        Self {
            progress: Mutex::new(None),
        }
    }

    fn current_bar(&self) -> Option<ProgressBar> {
        self.progress.lock().ok().and_then(|guard| guard.clone())
    }

    /// Runs `f` with the progress bar out of the way.
    fn print(&self, f: impl FnOnce()) {
        match self.current_bar() {
            Some(pb) => pb.suspend(f),
            None => f(),
        }
    }

    fn finish_progress(&self) {
        if let Ok(mut guard) = self.progress.lock() {
            if let Some(pb) = guard.take() {
                pb.finish_and_clear();
            }
        }
    }
}

impl Reporter for TerminalReporter {
    fn discovery_complete(&self, count: usize) {
        terminal::print_section("Discovery");
        terminal::print_processing(&format!("Found {count} images"));
    }

    fn encoder_ready(&self, program: &Path, version: &str) {
        let label = if version.is_empty() {
            program.display().to_string()
        } else {
            format!("{} ({version})", program.display())
        };
        terminal::print_status("Encoder", &label, false);
    }

    fn batch_started(&self, total: usize, jobs: usize, config: &EncoderConfig) {
        terminal::print_section("Converting");
        terminal::print_status("Files", &total.to_string(), true);
        terminal::print_status("Workers", &jobs.to_string(), false);
        if !config.is_empty() {
            terminal::print_status("Options", &describe_options(config), false);
        }
        log::info!("");

        self.finish_progress();
        if let Ok(mut guard) = self.progress.lock() {
            *guard = Some(terminal::create_progress_bar(total as u64));
        }
    }

    fn conversion_finished(&self, outcome: &ConversionOutcome) {
        let name = outcome.input.display().to_string();
        self.print(|| match &outcome.status {
            ConversionStatus::Converted {
                input_size,
                output_size,
            } => terminal::print_success(&format!(
                "{name} converted! ({} -> {}, {}% smaller)",
                format_bytes(*input_size),
                format_bytes(*output_size),
                calculate_size_reduction(*input_size, *output_size)
            )),
            ConversionStatus::Failed { reason } => {
                terminal::print_error(&format!("{name} failed"), reason)
            }
            ConversionStatus::Cancelled => log::debug!("{name} cancelled"),
        });

        if let Some(pb) = self.current_bar() {
            pb.inc(1);
        }
    }

    fn batch_complete(&self, summary: &BatchSummary) {
        self.finish_progress();

        let (input_total, output_total) = summary.total_sizes();
        terminal::print_section("Summary");
        terminal::print_status("Converted", &summary.converted_count().to_string(), true);
        terminal::print_status("Failed", &summary.failed_count().to_string(), false);
        if summary.was_cancelled() {
            terminal::print_status("Cancelled", &summary.cancelled_count().to_string(), false);
        }
        if summary.converted_count() > 0 {
            terminal::print_status("Input size", &format_bytes(input_total), false);
            terminal::print_status("Output size", &format_bytes(output_total), false);
            terminal::print_status(
                "Reduction",
                &format!("{}%", calculate_size_reduction(input_total, output_total)),
                false,
            );
        }
        terminal::print_status("Total time", &format_duration(summary.elapsed), false);

        if summary.failed_count() > 0 {
            log::info!("");
            for (input, reason) in summary.failures() {
                terminal::print_error(&input.display().to_string(), reason);
            }
        } else if summary.was_cancelled() {
            log::info!("");
            terminal::print_warning("Conversion was interrupted");
        }
    }
}

/// `quality=80 lossless resize=800/600`
fn describe_options(config: &EncoderConfig) -> String {
    config
        .iter()
        .map(|(spec, value)| match value {
            OptionValue::Flag => spec.key.to_string(),
            other => format!("{}={other}", spec.key),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Reporter that writes one JSON object per event.
pub struct JsonReporter {
    writer: Mutex<Box<dyn Write + Send>>,
}

impl Default for JsonReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl JsonReporter {
    pub fn new() -> Self {
        Self::with_writer(Box::new(io::stdout()))
    }

    pub fn with_writer(writer: Box<dyn Write + Send>) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    fn timestamp() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs()
    }

    fn write_value(&self, value: serde_json::Value) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writeln!(writer, "{value}");
            let _ = writer.flush();
        }
    }
}

impl Reporter for JsonReporter {
    fn discovery_complete(&self, count: usize) {
        self.write_value(json!({
            "type": "discovery_complete",
            "count": count,
            "timestamp": Self::timestamp(),
        }));
    }

    fn encoder_ready(&self, program: &Path, version: &str) {
        self.write_value(json!({
            "type": "encoder_ready",
            "program": program.display().to_string(),
            "version": version,
            "timestamp": Self::timestamp(),
        }));
    }

    fn batch_started(&self, total: usize, jobs: usize, config: &EncoderConfig) {
        self.write_value(json!({
            "type": "batch_started",
            "total_files": total,
            "jobs": jobs,
            "options": config,
            "timestamp": Self::timestamp(),
        }));
    }

    fn conversion_finished(&self, outcome: &ConversionOutcome) {
        let mut value = json!({
            "type": "conversion_complete",
            "input_file": outcome.input.display().to_string(),
            "output_file": outcome.output.display().to_string(),
            "duration_ms": outcome.duration.as_millis() as u64,
            "timestamp": Self::timestamp(),
        });

        let details = match &outcome.status {
            ConversionStatus::Converted {
                input_size,
                output_size,
            } => json!({
                "status": "converted",
                "input_size": input_size,
                "output_size": output_size,
                "size_reduction_percent": calculate_size_reduction(*input_size, *output_size),
            }),
            ConversionStatus::Failed { reason } => json!({
                "status": "failed",
                "reason": reason,
            }),
            ConversionStatus::Cancelled => json!({ "status": "cancelled" }),
        };
        if let (Some(target), Some(extra)) = (value.as_object_mut(), details.as_object()) {
            target.extend(extra.clone());
        }

        self.write_value(value);
    }

    fn batch_complete(&self, summary: &BatchSummary) {
        let (input_total, output_total) = summary.total_sizes();
        let failures: Vec<_> = summary
            .failures()
            .map(|(input, reason)| {
                json!({
                    "input_file": input.display().to_string(),
                    "reason": reason,
                })
            })
            .collect();

        self.write_value(json!({
            "type": "batch_complete",
            "total_files": summary.total(),
            "converted_count": summary.converted_count(),
            "failed_count": summary.failed_count(),
            "cancelled_count": summary.cancelled_count(),
            "total_input_size": input_total,
            "total_output_size": output_total,
            "total_size_reduction_percent": calculate_size_reduction(input_total, output_total),
            "total_duration_ms": summary.elapsed.as_millis() as u64,
            "failures": failures,
            "success": summary.is_success(),
            "timestamp": Self::timestamp(),
        }));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::sync::Arc;
    use std::time::Duration;

    /// Cloneable in-memory writer for inspecting JSON output.
    #[derive(Clone, Default)]
    struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl SharedBuffer {
        fn lines(&self) -> Vec<serde_json::Value> {
            let bytes = self.0.lock().unwrap().clone();
            String::from_utf8(bytes)
                .unwrap()
                .lines()
                .map(|line| serde_json::from_str(line).unwrap())
                .collect()
        }
    }

    fn outcome(name: &str, status: ConversionStatus) -> ConversionOutcome {
        ConversionOutcome {
            input: PathBuf::from(format!("{name}.png")),
            output: PathBuf::from(format!("{name}.webp")),
            duration: Duration::from_millis(25),
            status,
        }
    }

    #[test]
    fn json_reporter_writes_one_object_per_event() {
        let buffer = SharedBuffer::default();
        let reporter = JsonReporter::with_writer(Box::new(buffer.clone()));

        reporter.discovery_complete(2);
        reporter.conversion_finished(&outcome(
            "a",
            ConversionStatus::Converted {
                input_size: 1000,
                output_size: 250,
            },
        ));
        reporter.conversion_finished(&outcome(
            "b",
            ConversionStatus::Failed {
                reason: "Encoder exited with status 1".to_string(),
            },
        ));

        let lines = buffer.lines();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0]["type"], "discovery_complete");
        assert_eq!(lines[0]["count"], 2);

        assert_eq!(lines[1]["type"], "conversion_complete");
        assert_eq!(lines[1]["status"], "converted");
        assert_eq!(lines[1]["input_file"], "a.png");
        assert_eq!(lines[1]["size_reduction_percent"], 75);

        assert_eq!(lines[2]["status"], "failed");
        assert_eq!(lines[2]["reason"], "Encoder exited with status 1");
    }

    #[test]
    fn json_batch_start_carries_encoder_options() {
        let buffer = SharedBuffer::default();
        let reporter = JsonReporter::with_writer(Box::new(buffer.clone()));
        let config = EncoderConfig::builder()
            .value("quality", "80")
            .flag("lossless", true)
            .value("crop", "0/0/640/480")
            .build()
            .unwrap();

        reporter.batch_started(3, 2, &config);

        let lines = buffer.lines();
        assert_eq!(lines[0]["type"], "batch_started");
        assert_eq!(lines[0]["total_files"], 3);
        assert_eq!(lines[0]["jobs"], 2);
        assert_eq!(lines[0]["options"]["quality"], 80.0);
        assert_eq!(lines[0]["options"]["lossless"], true);
        assert_eq!(lines[0]["options"]["crop"], serde_json::json!([0, 0, 640, 480]));
    }

    #[test]
    fn options_are_described_in_table_order() {
        let config = EncoderConfig::builder()
            .flag("lossless", true)
            .value("resize", "800/600")
            .value("quality", "80")
            .build()
            .unwrap();
        assert_eq!(describe_options(&config), "quality=80 lossless resize=800/600");
    }

    #[test]
    fn json_batch_summary_lists_failures() {
        let buffer = SharedBuffer::default();
        let reporter = JsonReporter::with_writer(Box::new(buffer.clone()));

        let summary = BatchSummary {
            outcomes: vec![
                outcome(
                    "ok",
                    ConversionStatus::Converted {
                        input_size: 10,
                        output_size: 5,
                    },
                ),
                outcome(
                    "bad",
                    ConversionStatus::Failed {
                        reason: "boom".to_string(),
                    },
                ),
                outcome("late", ConversionStatus::Cancelled),
            ],
            elapsed: Duration::from_secs(1),
        };
        reporter.batch_complete(&summary);

        let lines = buffer.lines();
        let event = &lines[0];
        assert_eq!(event["type"], "batch_complete");
        assert_eq!(event["converted_count"], 1);
        assert_eq!(event["failed_count"], 1);
        assert_eq!(event["cancelled_count"], 1);
        assert_eq!(event["success"], false);
        assert_eq!(event["failures"][0]["input_file"], "bad.png");
        assert_eq!(event["total_duration_ms"], 1000);
    }

    #[test]
    fn terminal_reporter_survives_a_full_batch() {
        let reporter = TerminalReporter::new();
        reporter.discovery_complete(1);
        reporter.batch_started(1, 1, &EncoderConfig::default());
        reporter.conversion_finished(&outcome(
            "a",
            ConversionStatus::Converted {
                input_size: 10,
                output_size: 5,
            },
        ));
        reporter.batch_complete(&BatchSummary::default());
        assert!(reporter.current_bar().is_none());
    }
}

// ============================================================================
// webpify-core/src/conversion.rs
// ============================================================================
//
// CONVERSION DRIVER: Runs the encoder for every candidate on a bounded pool
//
// Each candidate is converted independently. A failure is recorded in that
// file's outcome and never stops the batch; cancellation turns every file
// that has not started yet into a `Cancelled` outcome.
//
// KEY COMPONENTS:
// - derive_output_path: sibling `.webp` path for an input
// - convert_files: pool setup, per-file conversion, result collection
// - ConversionOutcome / BatchSummary: per-file and aggregate results

use crate::cancel::CancelToken;
use crate::error::{CoreError, CoreResult};
use crate::external::Encoder;
use crate::marshal::command_args;
use crate::reporting::Reporter;

use rayon::prelude::*;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Extension given to every converted file.
pub const OUTPUT_EXTENSION: &str = "webp";

/// Output path for `input`: everything from the last `.` of the file name
/// is replaced by `.webp`, and a name without a dot gets `.webp` appended.
///
/// Only the file name is looked at, so dots in directory names never count
/// (`.hidden` → `.webp`, `name.` → `name.webp`, `dir.d/photo` →
/// `dir.d/photo.webp`). Names that are not valid UTF-8 fall back to
/// `Path::with_extension`.
#[must_use]
pub fn derive_output_path(input: &Path) -> PathBuf {
    let Some(name) = input.file_name().and_then(|name| name.to_str()) else {
        return input.with_extension(OUTPUT_EXTENSION);
    };
    let stem = match name.rfind('.') {
        Some(dot) => &name[..dot],
        None => name,
    };
    input.with_file_name(format!("{stem}.{OUTPUT_EXTENSION}"))
}

/// Output path for every candidate, plus the reason it cannot be written
/// when it would overwrite a candidate or was already claimed by an earlier
/// one. The first candidate in order keeps a contested output.
fn plan_outputs(candidates: &[PathBuf]) -> Vec<(PathBuf, Option<String>)> {
    let inputs: HashSet<&Path> = candidates.iter().map(PathBuf::as_path).collect();
    let mut claimed: HashMap<PathBuf, &Path> = HashMap::new();

    candidates
        .iter()
        .map(|input| {
            let output = derive_output_path(input);
            let conflict = if inputs.contains(output.as_path()) {
                Some(CoreError::OutputCollision(output.clone()))
            } else if let Some(first) = claimed.get(&output).copied() {
                Some(CoreError::DuplicateOutput {
                    output: output.clone(),
                    first: first.to_path_buf(),
                })
            } else {
                claimed.insert(output.clone(), input.as_path());
                None
            };
            (output, conflict.map(|e| e.to_string()))
        })
        .collect()
}

/// Tuning for one batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchSettings {
    /// Maximum number of encoder processes running at once.
    pub jobs: usize,
}

impl Default for BatchSettings {
    fn default() -> Self {
        Self {
            jobs: num_cpus::get(),
        }
    }
}

impl BatchSettings {
    pub fn with_jobs(jobs: usize) -> Self {
        Self { jobs: jobs.max(1) }
    }
}

/// How a single file ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversionStatus {
    Converted { input_size: u64, output_size: u64 },
    Failed { reason: String },
    Cancelled,
}

/// Result of converting one candidate.
#[derive(Debug, Clone)]
pub struct ConversionOutcome {
    pub input: PathBuf,
    pub output: PathBuf,
    pub duration: Duration,
    pub status: ConversionStatus,
}

impl ConversionOutcome {
    pub fn is_converted(&self) -> bool {
        matches!(self.status, ConversionStatus::Converted { .. })
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.status, ConversionStatus::Failed { .. })
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self.status, ConversionStatus::Cancelled)
    }
}

/// Outcomes of a whole batch, in candidate order.
#[derive(Debug, Clone, Default)]
pub struct BatchSummary {
    pub outcomes: Vec<ConversionOutcome>,
    pub elapsed: Duration,
}

impl BatchSummary {
    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    pub fn converted_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_converted()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_failed()).count()
    }

    pub fn cancelled_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_cancelled()).count()
    }

    pub fn was_cancelled(&self) -> bool {
        self.cancelled_count() > 0
    }

    /// True when every file converted (vacuously true for an empty batch).
    pub fn is_success(&self) -> bool {
        self.outcomes.iter().all(ConversionOutcome::is_converted)
    }

    /// Failed outcomes with their reasons.
    pub fn failures(&self) -> impl Iterator<Item = (&Path, &str)> {
        self.outcomes.iter().filter_map(|o| match &o.status {
            ConversionStatus::Failed { reason } => Some((o.input.as_path(), reason.as_str())),
            _ => None,
        })
    }

    /// Summed (input, output) sizes of converted files.
    pub fn total_sizes(&self) -> (u64, u64) {
        self.outcomes
            .iter()
            .fold((0, 0), |(total_in, total_out), o| match o.status {
                ConversionStatus::Converted {
                    input_size,
                    output_size,
                } => (total_in + input_size, total_out + output_size),
                _ => (total_in, total_out),
            })
    }
}

/// Converts every candidate with `options ++ [input, "-o", output]`.
///
/// At most `settings.jobs` conversions run at once. Outcomes are handed to
/// `reporter` as they finish and returned in candidate order. A candidate
/// whose output would overwrite another candidate, or whose output an
/// earlier candidate already writes, fails without running the encoder.
///
/// # Errors
///
/// Only `CoreError::ThreadPool` when the worker pool cannot be created.
/// Per-file problems are recorded in the returned summary.
pub fn convert_files<E>(
    encoder: &E,
    options: &[String],
    candidates: &[PathBuf],
    settings: &BatchSettings,
    cancel: &CancelToken,
    reporter: &dyn Reporter,
) -> CoreResult<BatchSummary>
where
    E: Encoder + ?Sized,
{
    let jobs = settings.jobs.max(1);
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(jobs)
        .thread_name(|i| format!("webpify-worker-{i}"))
        .build()
        .map_err(|e| CoreError::ThreadPool(e.to_string()))?;

    log::debug!(
        "Converting {} file(s) with up to {} concurrent encoder process(es)",
        candidates.len(),
        jobs
    );

    let plan = plan_outputs(candidates);
    let start = Instant::now();
    let outcomes: Vec<ConversionOutcome> = pool.install(|| {
        candidates
            .par_iter()
            .zip(plan.par_iter())
            .map(|(input, (output, conflict))| {
                let outcome = convert_one(
                    encoder,
                    options,
                    input,
                    output,
                    conflict.as_deref(),
                    cancel,
                    reporter,
                );
                reporter.conversion_finished(&outcome);
                outcome
            })
            .collect()
    });

    let summary = BatchSummary {
        outcomes,
        elapsed: start.elapsed(),
    };
    log::debug!(
        "Batch finished: {} converted, {} failed, {} cancelled",
        summary.converted_count(),
        summary.failed_count(),
        summary.cancelled_count()
    );
    Ok(summary)
}

fn convert_one<E>(
    encoder: &E,
    options: &[String],
    input: &Path,
    output: &Path,
    conflict: Option<&str>,
    cancel: &CancelToken,
    reporter: &dyn Reporter,
) -> ConversionOutcome
where
    E: Encoder + ?Sized,
{
    let start = Instant::now();

    let status = if cancel.is_cancelled() {
        ConversionStatus::Cancelled
    } else if let Some(reason) = conflict {
        log::debug!("{}: {}", input.display(), reason);
        ConversionStatus::Failed {
            reason: reason.to_string(),
        }
    } else {
        reporter.conversion_started(input);
        let args = command_args(options, input, output);
        match encoder.encode(&args, cancel) {
            Ok(()) => ConversionStatus::Converted {
                input_size: file_size(input),
                output_size: file_size(output),
            },
            Err(CoreError::Cancelled) => ConversionStatus::Cancelled,
            Err(e) => {
                log::debug!("Failed to convert {}: {}", input.display(), e);
                ConversionStatus::Failed {
                    reason: e.to_string(),
                }
            }
        }
    };

    ConversionOutcome {
        input: input.to_path_buf(),
        output: output.to_path_buf(),
        duration: start.elapsed(),
        status,
    }
}

fn file_size(path: &Path) -> u64 {
    fs::metadata(path).map(|m| m.len()).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::external::mocks::MockEncoder;
    use crate::reporting::NullReporter;
    use std::ffi::OsString;
    use tempfile::tempdir;

    fn write_images(dir: &Path, names: &[&str]) -> Vec<PathBuf> {
        names
            .iter()
            .map(|name| {
                let path = dir.join(name);
                fs::write(&path, [0xFF, 0xD8, 0xFF, 0xE0, 0, 0, 0, 0]).unwrap();
                path
            })
            .collect()
    }

    #[test]
    fn output_path_replaces_last_extension() {
        assert_eq!(derive_output_path(Path::new("photo.JPG")), PathBuf::from("photo.webp"));
        assert_eq!(
            derive_output_path(Path::new("archive.tar.png")),
            PathBuf::from("archive.tar.webp")
        );
        assert_eq!(
            derive_output_path(Path::new("shots/2024.06/img.jpeg")),
            PathBuf::from("shots/2024.06/img.webp")
        );
    }

    #[test]
    fn output_path_for_names_without_extension() {
        assert_eq!(derive_output_path(Path::new("photo")), PathBuf::from("photo.webp"));
        assert_eq!(derive_output_path(Path::new("dir.d/photo")), PathBuf::from("dir.d/photo.webp"));
        assert_eq!(derive_output_path(Path::new("name.")), PathBuf::from("name.webp"));
    }

    #[test]
    fn output_path_for_dotfiles_replaces_from_the_leading_dot() {
        assert_eq!(derive_output_path(Path::new(".hidden")), PathBuf::from(".webp"));
        assert_eq!(derive_output_path(Path::new("dir/.photo")), PathBuf::from("dir/.webp"));
        assert_eq!(
            derive_output_path(Path::new("dir/.photo.png")),
            PathBuf::from("dir/.photo.webp")
        );
    }

    #[test]
    fn every_file_gets_options_input_and_output() {
        let dir = tempdir().unwrap();
        let files = write_images(dir.path(), &["a.png", "b.jpg"]);
        let encoder = MockEncoder::new().with_dummy_output();
        let options = vec!["-q".to_string(), "80".to_string(), "-lossless".to_string()];

        let summary = convert_files(
            &encoder,
            &options,
            &files,
            &BatchSettings::with_jobs(1),
            &CancelToken::new(),
            &NullReporter,
        )
        .unwrap();

        assert!(summary.is_success());
        assert_eq!(summary.converted_count(), 2);

        let calls = encoder.calls();
        assert_eq!(calls.len(), 2);
        let expected: Vec<OsString> = vec![
            "-q".into(),
            "80".into(),
            "-lossless".into(),
            files[0].clone().into_os_string(),
            "-o".into(),
            dir.path().join("a.webp").into_os_string(),
        ];
        assert_eq!(calls[0], expected);

        for outcome in &summary.outcomes {
            match outcome.status {
                ConversionStatus::Converted {
                    input_size,
                    output_size,
                } => {
                    assert_eq!(input_size, 8);
                    assert!(output_size > 0);
                }
                ref other => panic!("unexpected status {other:?}"),
            }
        }
    }

    #[test]
    fn one_failure_does_not_stop_the_batch() {
        let dir = tempdir().unwrap();
        let files = write_images(dir.path(), &["one.png", "two.png", "three.png"]);
        let encoder = MockEncoder::new().fail_on(&files[1]);

        let summary = convert_files(
            &encoder,
            &[],
            &files,
            &BatchSettings::with_jobs(3),
            &CancelToken::new(),
            &NullReporter,
        )
        .unwrap();

        assert_eq!(encoder.calls().len(), 3);
        assert_eq!(summary.total(), 3);
        assert_eq!(summary.converted_count(), 2);
        assert_eq!(summary.failed_count(), 1);
        assert!(!summary.is_success());

        // Outcomes stay in candidate order regardless of completion order.
        let inputs: Vec<&Path> = summary.outcomes.iter().map(|o| o.input.as_path()).collect();
        assert_eq!(inputs, files.iter().map(PathBuf::as_path).collect::<Vec<_>>());

        let failures: Vec<_> = summary.failures().collect();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].0, files[1].as_path());
        assert!(failures[0].1.contains("status 1"));
    }

    #[test]
    fn input_that_is_already_webp_is_not_overwritten() {
        let dir = tempdir().unwrap();
        let files = write_images(dir.path(), &["already.webp", "fine.png"]);
        let encoder = MockEncoder::new();

        let summary = convert_files(
            &encoder,
            &[],
            &files,
            &BatchSettings::with_jobs(2),
            &CancelToken::new(),
            &NullReporter,
        )
        .unwrap();

        assert_eq!(encoder.inputs(), vec![files[1].clone()]);
        assert!(summary.outcomes[0].is_failed());
        assert!(summary.outcomes[1].is_converted());
    }

    #[test]
    fn inputs_sharing_an_output_convert_only_once() {
        let dir = tempdir().unwrap();
        let files = write_images(dir.path(), &["a.png", "a.jpg", "b.png"]);
        let encoder = MockEncoder::new().with_dummy_output();

        let summary = convert_files(
            &encoder,
            &[],
            &files,
            &BatchSettings::with_jobs(2),
            &CancelToken::new(),
            &NullReporter,
        )
        .unwrap();

        assert_eq!(encoder.inputs().len(), 2);
        assert!(!encoder.inputs().contains(&files[1]));
        assert!(summary.outcomes[0].is_converted());
        assert!(summary.outcomes[2].is_converted());

        let failures: Vec<_> = summary.failures().collect();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].0, files[1].as_path());
        assert!(failures[0].1.contains("a.png"));
    }

    #[test]
    fn output_that_overwrites_another_candidate_fails() {
        let dir = tempdir().unwrap();
        let files = write_images(dir.path(), &["photo.png", "photo.webp", "other.png"]);
        let encoder = MockEncoder::new();

        let summary = convert_files(
            &encoder,
            &[],
            &files,
            &BatchSettings::with_jobs(2),
            &CancelToken::new(),
            &NullReporter,
        )
        .unwrap();

        assert_eq!(encoder.inputs(), vec![files[2].clone()]);
        assert!(summary.outcomes[0].is_failed());
        assert!(summary.outcomes[1].is_failed());
        assert!(summary.outcomes[2].is_converted());
    }

    #[test]
    fn cancellation_stops_new_launches() {
        let dir = tempdir().unwrap();
        let files = write_images(dir.path(), &["1.png", "2.png", "3.png", "4.png"]);
        let cancel = CancelToken::new();
        let encoder = MockEncoder::new().cancel_after_first(cancel.clone());

        let summary = convert_files(
            &encoder,
            &[],
            &files,
            &BatchSettings::with_jobs(1),
            &cancel,
            &NullReporter,
        )
        .unwrap();

        assert_eq!(encoder.calls().len(), 1);
        assert_eq!(summary.converted_count(), 1);
        assert_eq!(summary.cancelled_count(), 3);
        assert!(summary.was_cancelled());
        assert!(!summary.is_success());
    }

    #[test]
    fn empty_batch_is_success() {
        let encoder = MockEncoder::new();
        let summary = convert_files(
            &encoder,
            &[],
            &[],
            &BatchSettings::default(),
            &CancelToken::new(),
            &NullReporter,
        )
        .unwrap();
        assert!(summary.is_success());
        assert_eq!(summary.total(), 0);
        assert!(encoder.calls().is_empty());
    }

    #[test]
    fn zero_jobs_is_clamped_to_one() {
        assert_eq!(BatchSettings::with_jobs(0).jobs, 1);
        assert!(BatchSettings::default().jobs >= 1);
    }
}

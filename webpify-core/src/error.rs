//! Error types for webpify-core.
//!
//! Fatal errors (discovery root, configuration, missing encoder) abort a run.
//! Conversion errors are attached to a single file's outcome and never stop
//! the rest of the batch.

use std::path::PathBuf;
use thiserror::Error;

/// Custom error types for webpify
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cannot read input directory '{}': {source}", .path.display())]
    Discovery {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Input path '{}' is not a directory", .0.display())]
    NotADirectory(PathBuf),

    #[error("Invalid value for option '{option}': {message}")]
    InvalidOption { option: String, message: String },

    #[error("Unknown encoder option '{0}'")]
    UnknownOption(String),

    #[error("Required encoder '{0}' not found")]
    DependencyNotFound(String),

    #[error("Failed to start '{0}': {1}")]
    CommandStart(String, #[source] std::io::Error),

    #[error("Failed while waiting for '{0}': {1}")]
    CommandWait(String, #[source] std::io::Error),

    #[error("Encoder exited with {}{}", exit_label(.code), detail_suffix(.detail))]
    EncoderFailed { code: Option<i32>, detail: String },

    #[error("Output path '{}' would overwrite an input file", .0.display())]
    OutputCollision(PathBuf),

    #[error("Output path '{}' is already written for '{}'", .output.display(), .first.display())]
    DuplicateOutput { output: PathBuf, first: PathBuf },

    #[error("Conversion cancelled")]
    Cancelled,

    #[error("Failed to build worker pool: {0}")]
    ThreadPool(String),

    #[error("{0}")]
    OperationFailed(String),

    #[error("{context}: {source}")]
    Context {
        context: String,
        #[source]
        source: Box<CoreError>,
    },
}

/// Result type for webpify operations
pub type CoreResult<T> = std::result::Result<T, CoreError>;

impl CoreError {
    /// Shorthand for a configuration error tied to one option.
    pub fn invalid_option(option: &str, message: impl Into<String>) -> Self {
        CoreError::InvalidOption {
            option: option.to_string(),
            message: message.into(),
        }
    }

    /// Wraps `self` with a description of what was being done.
    pub fn context(self, context: impl Into<String>) -> Self {
        CoreError::Context {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// The innermost error beneath any context layers.
    pub fn root_cause(&self) -> &CoreError {
        match self {
            CoreError::Context { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {code}"),
        None => "no status (terminated by signal)".to_string(),
    }
}

fn detail_suffix(detail: &str) -> String {
    if detail.is_empty() {
        String::new()
    } else {
        format!(": {detail}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encoder_failure_message_includes_detail() {
        let err = CoreError::EncoderFailed {
            code: Some(255),
            detail: "Could not process file input.png".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Encoder exited with status 255: Could not process file input.png"
        );
    }

    #[test]
    fn encoder_failure_without_code_or_detail() {
        let err = CoreError::EncoderFailed {
            code: None,
            detail: String::new(),
        };
        assert_eq!(
            err.to_string(),
            "Encoder exited with no status (terminated by signal)"
        );
    }

    #[test]
    fn context_keeps_the_typed_source() {
        let err = CoreError::DependencyNotFound("cwebp".into())
            .context("Checking encoder")
            .context("Preparing run");
        assert_eq!(
            err.to_string(),
            "Preparing run: Checking encoder: Required encoder 'cwebp' not found"
        );
        assert!(matches!(err.root_cause(), CoreError::DependencyNotFound(name) if name == "cwebp"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn invalid_option_names_the_option() {
        let err = CoreError::invalid_option("resize", "expected 2 numbers");
        assert!(err.to_string().contains("'resize'"));
    }
}

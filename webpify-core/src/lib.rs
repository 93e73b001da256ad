//! Core library for batch-converting JPEG and PNG images to WebP with cwebp.
//!
//! This crate finds candidate images by sniffing their magic bytes, turns a
//! typed encoder configuration into cwebp arguments, and runs the encoder for
//! every file on a bounded worker pool, collecting one outcome per file.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use std::path::Path;
//! use webpify_core::{
//!     BatchSettings, CancelToken, CwebpEncoder, EncoderConfigBuilder, TerminalReporter,
//!     convert_files, find_image_files, marshal,
//! };
//!
//! let config = EncoderConfigBuilder::new()
//!     .value("quality", "80")
//!     .flag("lossless", true)
//!     .build()
//!     .unwrap();
//! let options = marshal(&config);
//!
//! let files = find_image_files(Path::new("photos"), true).unwrap();
//! let summary = convert_files(
//!     &CwebpEncoder::new("cwebp"),
//!     &options,
//!     &files,
//!     &BatchSettings::default(),
//!     &CancelToken::new(),
//!     &TerminalReporter::new(),
//! )
//! .unwrap();
//!
//! println!("{} of {} converted", summary.converted_count(), summary.total());
//! ```

pub mod cancel;
pub mod config;
pub mod conversion;
pub mod discovery;
pub mod error;
pub mod external;
pub mod file_logging;
pub mod marshal;
pub mod reporting;
pub mod terminal;
pub mod utils;

// Re-exports for public API
pub use cancel::CancelToken;
pub use config::{EncoderConfig, EncoderConfigBuilder, OptionValue};
pub use conversion::{
    BatchSettings, BatchSummary, ConversionOutcome, ConversionStatus, convert_files,
    derive_output_path,
};
pub use discovery::{ImageKind, detect_image_kind, find_image_files, resolve_candidates};
pub use error::{CoreError, CoreResult};
pub use external::{CwebpEncoder, Encoder, check_dependency};
pub use marshal::{command_args, marshal};
pub use reporting::{JsonReporter, NullReporter, Reporter, TerminalReporter};
pub use utils::{calculate_size_reduction, format_bytes, format_duration};

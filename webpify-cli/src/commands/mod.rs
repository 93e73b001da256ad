//! Command implementations for the CLI.

/// Batch conversion of JPEG/PNG images to WebP.
pub mod convert;

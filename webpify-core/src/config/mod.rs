//! Configuration structures and constants for the webpify-core library.
//!
//! `EncoderConfig` is the typed, immutable set of cwebp options for a run.
//! It is created through [`EncoderConfigBuilder`], which parses raw values
//! against the descriptor table in [`options`] and rejects malformed input
//! before any file is touched.

mod builder;
pub mod options;

use std::collections::BTreeMap;
use std::fmt;

use serde::{Serialize, Serializer};

pub use builder::EncoderConfigBuilder;
pub use options::{ENCODER_OPTIONS, OptionKind, OptionSpec};

// Default constants

/// Default compression factor passed when the user gives none.
pub const DEFAULT_QUALITY: &str = "75";

/// Encoder binary looked up on `PATH` when none is configured.
pub const DEFAULT_ENCODER: &str = "cwebp";

/// Environment variable that overrides the encoder binary.
pub const ENCODER_ENV_VAR: &str = "WEBPIFY_CWEBP";

/// A parsed option value.
#[derive(Debug, Clone, PartialEq)]
pub enum OptionValue {
    Flag,
    Integer(i64),
    Float(f64),
    Text(String),
    Numbers(Vec<u32>),
}

impl OptionValue {
    /// Renders the value as encoder arguments (without the flag itself).
    pub fn to_args(&self) -> Vec<String> {
        match self {
            OptionValue::Flag => Vec::new(),
            OptionValue::Integer(n) => vec![n.to_string()],
            OptionValue::Float(x) => vec![format_float(*x)],
            OptionValue::Text(s) => vec![s.clone()],
            OptionValue::Numbers(parts) => parts.iter().map(u32::to_string).collect(),
        }
    }
}

/// Flags serialize as `true`, pairs and rectangles as number arrays.
impl Serialize for OptionValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            OptionValue::Flag => serializer.serialize_bool(true),
            OptionValue::Integer(n) => serializer.serialize_i64(*n),
            OptionValue::Float(x) => serializer.serialize_f64(*x),
            OptionValue::Text(s) => serializer.serialize_str(s),
            OptionValue::Numbers(parts) => parts.serialize(serializer),
        }
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionValue::Flag => f.write_str("on"),
            OptionValue::Numbers(parts) => {
                let joined: Vec<String> = parts.iter().map(u32::to_string).collect();
                f.write_str(&joined.join("/"))
            }
            other => f.write_str(&other.to_args().join(" ")),
        }
    }
}

/// `80.0` renders as `80`, `0.5` as `0.5`.
fn format_float(value: f64) -> String {
    format!("{value}")
}

/// Immutable encoder configuration for one run.
///
/// Only set options are stored; an absent key means "let cwebp decide".
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct EncoderConfig {
    values: BTreeMap<&'static str, OptionValue>,
}

impl EncoderConfig {
    /// Starts a new builder.
    pub fn builder() -> EncoderConfigBuilder {
        EncoderConfigBuilder::new()
    }

    pub(crate) fn from_values(values: BTreeMap<&'static str, OptionValue>) -> Self {
        Self { values }
    }

    /// Returns the value for `key`, if it was set.
    pub fn get(&self, key: &str) -> Option<&OptionValue> {
        self.values.get(key)
    }

    pub fn is_set(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Set options in canonical table order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static OptionSpec, &OptionValue)> {
        ENCODER_OPTIONS
            .iter()
            .filter_map(|spec| self.values.get(spec.key).map(|value| (spec, value)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn float_rendering_drops_trailing_zero() {
        assert_eq!(OptionValue::Float(80.0).to_args(), vec!["80"]);
        assert_eq!(OptionValue::Float(72.5).to_args(), vec!["72.5"]);
    }

    #[test]
    fn numbers_display_with_slashes() {
        assert_eq!(OptionValue::Numbers(vec![800, 600]).to_string(), "800/600");
    }

    #[test]
    fn config_serializes_as_a_flat_map() {
        let config = EncoderConfig::builder()
            .value("quality", "80")
            .flag("lossless", true)
            .value("resize", "800/600")
            .value("preset", "photo")
            .build()
            .unwrap();

        let value = serde_json::to_value(&config).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "quality": 80.0,
                "lossless": true,
                "resize": [800, 600],
                "preset": "photo",
            })
        );
    }

    #[test]
    fn iter_follows_table_order() {
        let config = EncoderConfig::builder()
            .flag("lossless", true)
            .value("preset", "photo")
            .value("quality", "80")
            .build()
            .unwrap();

        let keys: Vec<_> = config.iter().map(|(spec, _)| spec.key).collect();
        assert_eq!(keys, vec!["preset", "quality", "lossless"]);
    }
}

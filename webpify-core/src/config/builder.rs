// ============================================================================
// webpify-core/src/config/builder.rs
// ============================================================================
//
// CONFIGURATION BUILDER: Builder Pattern for EncoderConfig
//
// Raw option values arrive as strings (from the CLI or a caller) and are only
// interpreted in `build()`, where every value is checked against its
// descriptor. A builder that built successfully yields a config that can be
// marshalled without further checks.

use std::collections::BTreeMap;

use super::options::{self, OptionKind, OptionSpec};
use super::{EncoderConfig, OptionValue};
use crate::error::{CoreError, CoreResult};

#[derive(Debug, Clone)]
enum RawValue {
    Flag(bool),
    Value(String),
}

/// Builder for creating EncoderConfig instances.
///
/// Later calls for the same key replace earlier ones, so a built config
/// never holds a key twice.
///
/// # Examples
///
/// ```rust
/// use webpify_core::config::EncoderConfigBuilder;
///
/// let config = EncoderConfigBuilder::new()
///     .value("quality", "80")
///     .flag("lossless", true)
///     .value("resize", "800/0")
///     .build()
///     .unwrap();
///
/// assert!(config.is_set("lossless"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct EncoderConfigBuilder {
    raw: Vec<(String, RawValue)>,
}

impl EncoderConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a flag option. `false` leaves the option unset.
    #[must_use]
    pub fn flag(mut self, key: &str, enabled: bool) -> Self {
        self.raw.push((key.to_string(), RawValue::Flag(enabled)));
        self
    }

    /// Sets a valued option from its raw string form.
    #[must_use]
    pub fn value(mut self, key: &str, raw: impl Into<String>) -> Self {
        self.raw.push((key.to_string(), RawValue::Value(raw.into())));
        self
    }

    /// Like [`value`](Self::value), but `None` leaves the option unset.
    #[must_use]
    pub fn value_opt<S: Into<String>>(self, key: &str, raw: Option<S>) -> Self {
        match raw {
            Some(raw) => self.value(key, raw),
            None => self,
        }
    }

    /// Parses every raw value and produces the immutable configuration.
    ///
    /// # Errors
    ///
    /// * `CoreError::UnknownOption` for a key not in the option table
    /// * `CoreError::InvalidOption` for a malformed or out-of-range value
    pub fn build(self) -> CoreResult<EncoderConfig> {
        let mut values = BTreeMap::new();

        for (key, raw) in self.raw {
            let spec = options::lookup(&key).ok_or_else(|| CoreError::UnknownOption(key.clone()))?;

            match parse_raw(spec, raw)? {
                Some(value) => {
                    values.insert(spec.key, value);
                }
                None => {
                    values.remove(spec.key);
                }
            }
        }

        log::debug!("Encoder configuration has {} option(s) set", values.len());
        Ok(EncoderConfig::from_values(values))
    }
}

fn parse_raw(spec: &OptionSpec, raw: RawValue) -> CoreResult<Option<OptionValue>> {
    match (spec.kind, raw) {
        (OptionKind::Flag, RawValue::Flag(enabled)) => Ok(enabled.then_some(OptionValue::Flag)),
        (OptionKind::Flag, RawValue::Value(_)) => Err(CoreError::invalid_option(
            spec.key,
            "is a flag and takes no value",
        )),
        (kind, RawValue::Flag(_)) => Err(CoreError::invalid_option(
            spec.key,
            format!("expects {}", kind.describe()),
        )),
        (kind, RawValue::Value(text)) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                return Ok(None);
            }
            parse_value(spec, kind, trimmed).map(Some)
        }
    }
}

fn parse_value(spec: &OptionSpec, kind: OptionKind, text: &str) -> CoreResult<OptionValue> {
    match kind {
        OptionKind::Integer => {
            let number = parse_number(spec, text)?.trunc();
            check_range(spec, number)?;
            // i64::MAX as f64 rounds up to 2^63, which is already out of range.
            if number >= i64::MAX as f64 || number < i64::MIN as f64 {
                return Err(CoreError::invalid_option(
                    spec.key,
                    format!("'{text}' is too large"),
                ));
            }
            Ok(OptionValue::Integer(number as i64))
        }
        OptionKind::Float => {
            let number = parse_number(spec, text)?;
            check_range(spec, number)?;
            Ok(OptionValue::Float(number))
        }
        OptionKind::Text => Ok(OptionValue::Text(text.to_string())),
        OptionKind::Numbers(arity) => parse_numbers(spec, arity, text).map(OptionValue::Numbers),
        OptionKind::Flag => Ok(OptionValue::Flag),
    }
}

fn parse_number(spec: &OptionSpec, text: &str) -> CoreResult<f64> {
    text.parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        // -0 becomes 0 so it never reaches the encoder as "-0".
        .map(|n| if n == 0.0 { 0.0 } else { n })
        .ok_or_else(|| CoreError::invalid_option(spec.key, format!("'{text}' is not a number")))
}

fn check_range(spec: &OptionSpec, number: f64) -> CoreResult<()> {
    match spec.range {
        Some((min, max)) if number < min || number > max => Err(CoreError::invalid_option(
            spec.key,
            if max == f64::MAX {
                format!("{number} must be at least {min}")
            } else {
                format!("{number} is outside the range {min}-{max}")
            },
        )),
        _ => Ok(()),
    }
}

fn parse_numbers(spec: &OptionSpec, arity: usize, text: &str) -> CoreResult<Vec<u32>> {
    let parts: Vec<&str> = text.split('/').collect();
    if parts.len() != arity {
        return Err(CoreError::invalid_option(
            spec.key,
            format!("expected {arity} slash-separated numbers, got '{text}'"),
        ));
    }

    parts
        .iter()
        .map(|part| {
            part.trim().parse::<u32>().map_err(|_| {
                CoreError::invalid_option(
                    spec.key,
                    format!("'{}' in '{text}' is not a whole number", part.trim()),
                )
            })
        })
        .collect()
}

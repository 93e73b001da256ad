// ============================================================================
// webpify-core/src/config/options.rs
// ============================================================================
//
// ENCODER OPTION TABLE: Every cwebp option webpify knows how to pass through
//
// The order of `ENCODER_OPTIONS` is the canonical order in which flags are
// emitted on the encoder command line. Tests pin this order.

/// How an option's raw value is interpreted and rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionKind {
    /// Present or absent; renders as the bare flag.
    Flag,
    /// Whole number; decimal input is truncated toward zero.
    Integer,
    /// Decimal number.
    Float,
    /// Passed through unchanged.
    Text,
    /// Slash-delimited list of exactly N unsigned integers (`800/600`).
    Numbers(usize),
}

impl OptionKind {
    /// Human-readable name used in error messages.
    pub fn describe(self) -> String {
        match self {
            OptionKind::Flag => "a flag".to_string(),
            OptionKind::Integer => "an integer".to_string(),
            OptionKind::Float => "a number".to_string(),
            OptionKind::Text => "a string".to_string(),
            OptionKind::Numbers(arity) => format!("{arity} slash-separated numbers"),
        }
    }
}

/// Descriptor for one encoder option.
#[derive(Debug, Clone, Copy)]
pub struct OptionSpec {
    /// Configuration key (snake_case, as accepted by the builder).
    pub key: &'static str,
    /// Flag passed to cwebp.
    pub flag: &'static str,
    pub kind: OptionKind,
    /// Inclusive bounds for numeric kinds.
    pub range: Option<(f64, f64)>,
}

const fn flag(key: &'static str, flag: &'static str) -> OptionSpec {
    OptionSpec { key, flag, kind: OptionKind::Flag, range: None }
}

const fn integer(key: &'static str, flag: &'static str, range: Option<(f64, f64)>) -> OptionSpec {
    OptionSpec { key, flag, kind: OptionKind::Integer, range }
}

const fn float(key: &'static str, flag: &'static str, range: Option<(f64, f64)>) -> OptionSpec {
    OptionSpec { key, flag, kind: OptionKind::Float, range }
}

const fn text(key: &'static str, flag: &'static str) -> OptionSpec {
    OptionSpec { key, flag, kind: OptionKind::Text, range: None }
}

const fn numbers(key: &'static str, flag: &'static str, arity: usize) -> OptionSpec {
    OptionSpec { key, flag, kind: OptionKind::Numbers(arity), range: None }
}

/// All pass-through options, in emission order.
///
/// `preset` leads because cwebp applies a preset over any option given
/// before it.
pub const ENCODER_OPTIONS: &[OptionSpec] = &[
    text("preset", "-preset"),
    float("quality", "-q", Some((0.0, 100.0))),
    integer("method", "-m", Some((0.0, 6.0))),
    flag("lossless", "-lossless"),
    integer("near_lossless", "-near_lossless", Some((0.0, 100.0))),
    integer("zip", "-z", Some((0.0, 9.0))),
    integer("alpha_q", "-alpha_q", Some((0.0, 100.0))),
    numbers("resize", "-resize", 2),
    numbers("crop", "-crop", 4),
    flag("multithread", "-mt"),
    flag("low_memory", "-low_memory"),
    integer("size", "-size", Some((0.0, f64::MAX))),
    float("psnr", "-psnr", Some((0.0, f64::MAX))),
    integer("pass", "-pass", Some((1.0, 10.0))),
    flag("autofilter", "-af"),
    flag("jpeg_like", "-jpeg_like"),
    integer("filter", "-f", Some((0.0, 100.0))),
    integer("sharpness", "-sharpness", Some((0.0, 7.0))),
    flag("strong", "-strong"),
    flag("nostrong", "-nostrong"),
    flag("sharp_yuv", "-sharp_yuv"),
    integer("sns", "-sns", Some((0.0, 100.0))),
    integer("segments", "-segments", Some((1.0, 4.0))),
    integer("partition_limit", "-partition_limit", Some((0.0, 100.0))),
    flag("verbose", "-v"),
    flag("print_psnr", "-print_psnr"),
    flag("print_ssim", "-print_ssim"),
    flag("print_lsim", "-print_lsim"),
    flag("progress", "-progress"),
    flag("quiet", "-quiet"),
    flag("short", "-short"),
    integer("map", "-map", None),
    numbers("specify", "-s", 2),
    integer("pre", "-pre", None),
    text("alpha_filter", "-alpha_filter"),
    integer("alpha_method", "-alpha_method", Some((0.0, 1.0))),
    flag("exact", "-exact"),
    text("blend_alpha", "-blend_alpha"),
    flag("noalpha", "-noalpha"),
    text("hint", "-hint"),
    text("metadata", "-metadata"),
    flag("noasm", "-noasm"),
];

/// Looks up an option descriptor by configuration key.
pub fn lookup(key: &str) -> Option<&'static OptionSpec> {
    ENCODER_OPTIONS.iter().find(|spec| spec.key == key)
}

// webpify-cli/src/cli.rs
//
// Defines the command-line argument structures using clap.

use clap::{Args, Parser};
use std::path::PathBuf;
use webpify_core::config::{DEFAULT_ENCODER, DEFAULT_QUALITY, ENCODER_ENV_VAR};
use webpify_core::{CoreResult, EncoderConfig, EncoderConfigBuilder};

// --- CLI Argument Definition ---

#[derive(Parser, Debug)]
#[command(
    author,
    version, // Reads from Cargo.toml via "cargo" feature in clap
    about = "Webpify: Batch JPEG/PNG to WebP converter",
    long_about = "Finds JPEG and PNG images by content and converts each one to a sibling \
                  .webp file with cwebp. Encoder options are passed straight through."
)]
pub struct Cli {
    /// Directory to search for images
    #[arg(value_name = "DIR", default_value = ".")]
    pub dir: PathBuf,

    /// Descend into subdirectories
    #[arg(short, long)]
    pub recursive: bool,

    /// Comma-separated list of files to convert instead of searching DIR
    #[arg(short, long, value_delimiter = ',', value_name = "FILES")]
    pub files: Option<Vec<PathBuf>>,

    /// Maximum number of concurrent encoder processes (default: CPU count)
    #[arg(short, long, value_name = "N", value_parser = clap::value_parser!(u16).range(1..))]
    pub jobs: Option<u16>,

    /// cwebp binary to run
    #[arg(long, value_name = "PATH", env = ENCODER_ENV_VAR, default_value = DEFAULT_ENCODER)]
    pub encoder: PathBuf,

    /// Emit JSON-lines progress events on stdout instead of terminal output
    #[arg(long)]
    pub json: bool,

    /// Also write a timestamped run log into this directory
    #[arg(long, value_name = "LOG_DIR")]
    pub log_dir: Option<PathBuf>,

    /// Enable debug-level logging
    #[arg(long)]
    pub debug: bool,

    #[command(flatten)]
    pub encoder_args: EncoderArgs,
}

/// Pass-through cwebp options.
///
/// Values are kept as strings here and checked by `EncoderConfigBuilder`,
/// so every option reports problems the same way.
#[derive(Args, Debug, Clone)]
#[command(next_help_heading = "Encoder options")]
pub struct EncoderArgs {
    /// Preset: default, photo, picture, drawing, icon or text
    #[arg(long, value_name = "NAME")]
    pub preset: Option<String>,

    /// Compression factor for RGB channels (0-100)
    #[arg(short, long, value_name = "FLOAT", default_value = DEFAULT_QUALITY)]
    pub quality: String,

    /// Compression method (0=fast, 6=slowest)
    #[arg(short, long, value_name = "INT")]
    pub method: Option<String>,

    /// Encode the image without any loss
    #[arg(long)]
    pub lossless: bool,

    /// Near-lossless preprocessing level (0-100, 100=off)
    #[arg(long, value_name = "INT")]
    pub near_lossless: Option<String>,

    /// Lossless compression effort preset (0-9)
    #[arg(short = 'z', long, value_name = "INT")]
    pub zip: Option<String>,

    /// Transparency compression quality (0-100)
    #[arg(long, value_name = "INT")]
    pub alpha_q: Option<String>,

    /// Resize to WIDTH/HEIGHT (0 keeps the aspect ratio)
    #[arg(long, value_name = "W/H")]
    pub resize: Option<String>,

    /// Crop to X/Y/WIDTH/HEIGHT before encoding
    #[arg(long, value_name = "X/Y/W/H")]
    pub crop: Option<String>,

    /// Use multi-threading if available
    #[arg(long, visible_alias = "mt")]
    pub multithread: bool,

    /// Reduce memory usage (slower encoding)
    #[arg(long)]
    pub low_memory: bool,

    /// Target size in bytes
    #[arg(long, value_name = "INT")]
    pub size: Option<String>,

    /// Target PSNR in dB
    #[arg(long, value_name = "FLOAT")]
    pub psnr: Option<String>,

    /// Number of analysis passes (1-10)
    #[arg(long, value_name = "INT")]
    pub pass: Option<String>,

    /// Auto-adjust filter strength
    #[arg(long, visible_alias = "af")]
    pub autofilter: bool,

    /// Roughly match the expected JPEG size
    #[arg(long)]
    pub jpeg_like: bool,

    /// Filter strength (0=off, 100)
    #[arg(long, value_name = "INT")]
    pub filter: Option<String>,

    /// Filter sharpness (0=sharpest, 7)
    #[arg(long, value_name = "INT")]
    pub sharpness: Option<String>,

    /// Use strong filtering
    #[arg(long)]
    pub strong: bool,

    /// Use simple filtering
    #[arg(long)]
    pub nostrong: bool,

    /// Use sharper (and slower) RGB->YUV conversion
    #[arg(long)]
    pub sharp_yuv: bool,

    /// Spatial noise shaping (0=off, 100)
    #[arg(long, value_name = "INT")]
    pub sns: Option<String>,

    /// Number of segments (1-4)
    #[arg(long, value_name = "INT")]
    pub segments: Option<String>,

    /// Limit quality to fit the 512k limit on the first partition (0-100)
    #[arg(long, value_name = "INT")]
    pub partition_limit: Option<String>,

    /// Verbose encoder output
    #[arg(long)]
    pub verbose: bool,

    /// Print averaged PSNR distortion
    #[arg(long)]
    pub print_psnr: bool,

    /// Print averaged SSIM distortion
    #[arg(long)]
    pub print_ssim: bool,

    /// Print averaged LSIM distortion
    #[arg(long)]
    pub print_lsim: bool,

    /// Report encoding progress
    #[arg(long)]
    pub progress: bool,

    /// Don't print anything
    #[arg(long)]
    pub quiet: bool,

    /// Condense printed message
    #[arg(long)]
    pub short: bool,

    /// Print map of extra info
    #[arg(long, value_name = "INT")]
    pub map: Option<String>,

    /// Input size (width/height) for YUV input
    #[arg(long, value_name = "W/H")]
    pub specify: Option<String>,

    /// Pre-processing filter
    #[arg(long, value_name = "INT")]
    pub pre: Option<String>,

    /// Predictive filtering for alpha plane: none, fast or best
    #[arg(long, value_name = "MODE")]
    pub alpha_filter: Option<String>,

    /// Transparency-compression method (0-1)
    #[arg(long, value_name = "INT")]
    pub alpha_method: Option<String>,

    /// Preserve RGB values in transparent areas
    #[arg(long)]
    pub exact: bool,

    /// Blend colors against a background color (e.g. 0xc0e0d0)
    #[arg(long, value_name = "HEX")]
    pub blend_alpha: Option<String>,

    /// Discard any transparency information
    #[arg(long)]
    pub noalpha: bool,

    /// Image characteristics hint: photo, picture or graph
    #[arg(long, value_name = "HINT")]
    pub hint: Option<String>,

    /// Comma-separated metadata to copy: all, none, exif, icc, xmp
    #[arg(long, value_name = "LIST")]
    pub metadata: Option<String>,

    /// Disable all assembly optimizations
    #[arg(long)]
    pub noasm: bool,
}

impl EncoderArgs {
    /// Builds the validated encoder configuration.
    pub fn to_config(&self) -> CoreResult<EncoderConfig> {
        EncoderConfigBuilder::new()
            .value_opt("preset", self.preset.as_deref())
            .value("quality", self.quality.as_str())
            .value_opt("method", self.method.as_deref())
            .flag("lossless", self.lossless)
            .value_opt("near_lossless", self.near_lossless.as_deref())
            .value_opt("zip", self.zip.as_deref())
            .value_opt("alpha_q", self.alpha_q.as_deref())
            .value_opt("resize", self.resize.as_deref())
            .value_opt("crop", self.crop.as_deref())
            .flag("multithread", self.multithread)
            .flag("low_memory", self.low_memory)
            .value_opt("size", self.size.as_deref())
            .value_opt("psnr", self.psnr.as_deref())
            .value_opt("pass", self.pass.as_deref())
            .flag("autofilter", self.autofilter)
            .flag("jpeg_like", self.jpeg_like)
            .value_opt("filter", self.filter.as_deref())
            .value_opt("sharpness", self.sharpness.as_deref())
            .flag("strong", self.strong)
            .flag("nostrong", self.nostrong)
            .flag("sharp_yuv", self.sharp_yuv)
            .value_opt("sns", self.sns.as_deref())
            .value_opt("segments", self.segments.as_deref())
            .value_opt("partition_limit", self.partition_limit.as_deref())
            .flag("verbose", self.verbose)
            .flag("print_psnr", self.print_psnr)
            .flag("print_ssim", self.print_ssim)
            .flag("print_lsim", self.print_lsim)
            .flag("progress", self.progress)
            .flag("quiet", self.quiet)
            .flag("short", self.short)
            .value_opt("map", self.map.as_deref())
            .value_opt("specify", self.specify.as_deref())
            .value_opt("pre", self.pre.as_deref())
            .value_opt("alpha_filter", self.alpha_filter.as_deref())
            .value_opt("alpha_method", self.alpha_method.as_deref())
            .flag("exact", self.exact)
            .value_opt("blend_alpha", self.blend_alpha.as_deref())
            .flag("noalpha", self.noalpha)
            .value_opt("hint", self.hint.as_deref())
            .value_opt("metadata", self.metadata.as_deref())
            .flag("noasm", self.noasm)
            .build()
    }
}

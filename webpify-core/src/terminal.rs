//! Terminal UI components and styling for webpify.
//!
//! Output goes through the `log` facade at info level so that whatever
//! logger the binary installs (console, run log file, or both) sees the same
//! lines. Colors are skipped when `NO_COLOR` is set.

use console::style;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use log::info;
use owo_colors::OwoColorize;
use std::io::IsTerminal;
use std::time::Duration;
use unicode_width::UnicodeWidthStr;

/// Represents the visual hierarchy levels in the CLI output
#[derive(Debug, Clone, Copy)]
pub enum OutputLevel {
    /// Per-file lines and major operations (» Operation)
    Subsection,
    /// Key-value status information
    Status,
}

impl OutputLevel {
    fn indent(&self) -> &'static str {
        match self {
            OutputLevel::Subsection => "  ",
            OutputLevel::Status => "    ",
        }
    }
}

/// Check if color should be used (respects NO_COLOR environment variable)
fn should_use_color() -> bool {
    std::env::var_os("NO_COLOR").is_none()
}

/// Print a section header for major workflow phases
pub fn print_section(title: &str) {
    info!("");
    if should_use_color() {
        info!("===== {} =====", title.to_uppercase().cyan());
    } else {
        info!("===== {} =====", title.to_uppercase());
    }
    info!("");
}

/// Print a subsection or processing step
pub fn print_processing(message: &str) {
    let indent = OutputLevel::Subsection.indent();
    if should_use_color() {
        info!("{indent}» {}", style(message).bold());
    } else {
        info!("{indent}» {message}");
    }
}

/// Print a status line (key-value pair)
pub fn print_status(label: &str, value: &str, highlight: bool) {
    let label_width = 15;
    let padding = if label.width() < label_width {
        label_width - label.width()
    } else {
        1
    };

    let colored_value = if !should_use_color() {
        value.to_string()
    } else if label.contains("Reduction") {
        match value.strip_suffix('%').and_then(|v| v.parse::<u64>().ok()) {
            Some(reduction) if reduction >= 50 => value.green().to_string(),
            _ => value.to_string(),
        }
    } else if label.contains("Failed") && value != "0" {
        value.red().bold().to_string()
    } else if highlight {
        value.bold().to_string()
    } else {
        value.to_string()
    };

    info!(
        "{}{}:{} {}",
        OutputLevel::Status.indent(),
        label,
        " ".repeat(padding),
        colored_value
    );
}

/// Print a success message
pub fn print_success(message: &str) {
    let indent = OutputLevel::Subsection.indent();
    if should_use_color() {
        info!("{indent}✓ {}", message.green());
    } else {
        info!("{indent}✓ {message}");
    }
}

/// Print a warning message
pub fn print_warning(message: &str) {
    let indent = OutputLevel::Subsection.indent();
    if should_use_color() {
        info!("{indent}⚠ {}", message.yellow());
    } else {
        info!("{indent}⚠ {message}");
    }
}

/// Print a per-file error with its reason on the following line
pub fn print_error(title: &str, message: &str) {
    let indent = OutputLevel::Subsection.indent();
    if should_use_color() {
        info!("{indent}✗ {}", title.red().bold());
    } else {
        info!("{indent}✗ {title}");
    }
    info!("{}{message}", OutputLevel::Status.indent());
}

/// Creates the batch progress bar. Hidden when stderr is not a terminal.
pub fn create_progress_bar(total: u64) -> ProgressBar {
    let pb = ProgressBar::new(total);

    let template = "  ⧖ Converting: [{bar:30}] {pos}/{len} ({elapsed_precise})";
    match ProgressStyle::default_bar().template(template) {
        Ok(progress_style) => pb.set_style(progress_style.progress_chars("##.")),
        Err(e) => log::debug!("Invalid progress bar template: {e}"),
    }

    if !std::io::stderr().is_terminal() {
        pb.set_draw_target(ProgressDrawTarget::hidden());
    } else {
        pb.enable_steady_tick(Duration::from_millis(100));
    }
    pb
}

//! CLI output formatting.
//!
//! # Output Format
//!
//! ```text
//! image-snip (v2025.3.1)
//!
//! Reading options from 'opts.txt'.
//! Reading '/photos/IMG_01.jpg'
//! WARNING: Target image size reduced from specified value.
//!   Current width is less than the specified target width.
//!   Process instruction: crop_from_left_top(2000, 1000)
//!   Current size: (1920, 1440)
//!   Adjusted target size: (1920, 1000)
//! Saving '/photos/crop_20250301_142530/IMG_01-crop.jpg'
//! Reading '/photos/crop_20250301_142530/IMG_01-crop.jpg'
//! Writing '/photos/crop_20250301_142530/zgif-IMG_01-crop.gif' (1 frame)
//! ```
//!
//! # Architecture
//!
//! Each output has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format functions
//! are pure: no I/O, no side effects.

use crate::process::{RunEvent, RunSummary};
use crate::types::Warning;
use std::path::Path;

fn quoted(path: &Path) -> String {
    format!("'{}'", path.display())
}

/// Program label printed before anything else.
pub fn app_label() -> String {
    format!("image-snip (v{})", env!("CARGO_PKG_VERSION"))
}

/// Format a warning as display lines.
///
/// The first line carries the `WARNING:` tag; detail lines are indented two
/// spaces.
pub fn format_warning(warning: &Warning) -> Vec<String> {
    match warning {
        Warning::TargetSizeReduced {
            directive,
            current,
            adjusted,
            width_reduced,
            height_reduced,
        } => {
            let mut lines =
                vec!["WARNING: Target image size reduced from specified value.".to_string()];
            if *width_reduced {
                lines.push("  Current width is less than the specified target width.".to_string());
            }
            if *height_reduced {
                lines.push(
                    "  Current height is less than the specified target height.".to_string(),
                );
            }
            lines.push(format!("  Process instruction: {directive}"));
            lines.push(format!("  Current size: {current}"));
            lines.push(format!("  Adjusted target size: {adjusted}"));
            lines
        }
        Warning::BoxAdjusted {
            directive,
            adjusted,
        } => vec![
            "WARNING: Box coordinates adjusted to fit image size.".to_string(),
            format!("  Process instruction: {directive}"),
            format!("  Adjusted box: {adjusted}"),
        ],
        Warning::OutputFormatDefaulted { value } => vec![format!(
            "WARNING: output_format '{value}' not valid. Defaulting to 'PNG'."
        )],
    }
}

/// Format a single run progress event as display lines.
pub fn format_event(event: &RunEvent) -> Vec<String> {
    match event {
        RunEvent::OutputDirCreated { path } => {
            vec![format!("Created output folder {}", quoted(path))]
        }
        RunEvent::Reading { path } => vec![format!("Reading {}", quoted(path))],
        RunEvent::Warning(warning) => format_warning(warning),
        RunEvent::Replacing { path } => vec![format!("Replacing {}", quoted(path))],
        RunEvent::Saving { path } => vec![format!("Saving {}", quoted(path))],
        RunEvent::WritingGif { path, frames } => {
            let plural = if *frames == 1 { "" } else { "s" };
            vec![format!("Writing {} ({frames} frame{plural})", quoted(path))]
        }
    }
}

pub fn print_event(event: &RunEvent) {
    for line in format_event(event) {
        println!("{}", line);
    }
}

/// Format the end-of-run summary.
///
/// ```text
/// Done: 3 images, 1 animated GIF → /photos/crop_20250301_142530
/// ```
pub fn format_summary(summary: &RunSummary) -> Vec<String> {
    let images = summary.outputs.len();
    let noun = if images == 1 { "image" } else { "images" };
    let gif = if summary.gif.is_some() {
        ", 1 animated GIF"
    } else {
        ""
    };
    vec![format!(
        "Done: {images} {noun}{gif} \u{2192} {}",
        summary.output_dir.display()
    )]
}

pub fn print_summary(summary: &RunSummary) {
    for line in format_summary(summary) {
        println!("{}", line);
    }
}

//! Output file naming.
//!
//! A still output is named `<stem><suffix>.<ext>`:
//!
//! - **stem**: `new_name` when set (with `-NNN` appended when the run has more
//!   than one image), otherwise the source file's stem.
//! - **suffix**: `-<timestamp>` when a timestamp mode is set; otherwise `-crop`,
//!   but only when no `new_name` was given.
//! - **ext**: the configured output format, or the source's own extension.
//!
//! ```text
//! IMG_01.jpg                               → IMG_01-crop.jpg
//! IMG_01.jpg, new_name: trip (3 images)    → trip-002.jpg
//! IMG_01.jpg, timestamp_mode: second       → IMG_01-20250301_142530.jpg
//! IMG_01.jpg, output_format: PNG           → IMG_01-crop.png
//! ```

use crate::types::{RunSettings, TimestampMode};
use chrono::{DateTime, Local};
use std::path::Path;

/// Format for the `crop_<timestamp>` directory and the options snapshot.
pub const RUN_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Render the file-name timestamp for `mode`, or `None` when disabled.
pub fn timestamp_tag(mode: TimestampMode, now: DateTime<Local>) -> Option<String> {
    match mode {
        TimestampMode::None => None,
        TimestampMode::Second => Some(now.format(RUN_TIMESTAMP_FORMAT).to_string()),
        TimestampMode::Microsecond => Some(now.format("%Y%m%d_%H%M%S_%6f").to_string()),
    }
}

/// File name (no directory) for the output of image `file_num` (1-based).
pub fn output_name(
    source: &Path,
    settings: &RunSettings,
    file_num: usize,
    file_count: usize,
    timestamp: Option<&str>,
) -> String {
    let source_stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    let mut stem = match settings.new_name.as_deref() {
        Some(name) if file_count > 1 => format!("{name}-{file_num:03}"),
        Some(name) => name.to_string(),
        None => source_stem,
    };

    match timestamp {
        Some(ts) => {
            stem.push('-');
            stem.push_str(ts);
        }
        None if settings.new_name.is_none() => stem.push_str("-crop"),
        None => {}
    }

    let ext = match settings.output_format {
        Some(format) => Some(format.extension().to_string()),
        None => source
            .extension()
            .map(|e| e.to_string_lossy().into_owned()),
    };

    match ext {
        Some(ext) => format!("{stem}.{ext}"),
        None => stem,
    }
}

/// Name of the snapshot of the options document written into the output
/// directory.
pub fn snapshot_name(run_stamp: &str) -> String {
    format!("image_snip_options-{run_stamp}.txt")
}

/// Name of the default output directory.
pub fn default_output_dir_name(run_stamp: &str) -> String {
    format!("crop_{run_stamp}")
}

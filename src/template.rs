//! Options document template.
//!
//! `image-snip --template <file>` appends a commented reference of every
//! setting and process instruction to `<file>`, creating it if needed. The
//! block is only added once: a file that already contains the template's
//! header line is left alone.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

/// First line of the template; its presence marks the block as written.
pub const TEMPLATE_HEADER: &str = "# --- image-snip --- Available options:";

const TEMPLATE_BODY: &str = r#"
# output_folder:

# --- Give files a new name. If more than one file, a sequence
#     number will be added to the file name.
# new_name:

# output_format: JPG | PNG

# timestamp_mode:
    # 1 = Add date_time to file name, to the second.
    # 2 = Add date_time to file name, to the microsecond.

# --- Available process instructions:

# crop_from_left_top(width, height)

# crop_from_right_top(width, height)

# crop_from_left_bottom(width, height)

# crop_from_right_bottom(width, height)

# crop_from_center(width, height)

# crop_to_box(x1, y1, x2, y2)

# crop_zoom(width, height)

# --- border with default color
# border(width)

# --- border - specify RGB color
# border(width, red, green, blue)

# --- rounded border with transparent background
# rounded(radius, padding)

# --- rounded border - specify RGB background color
# rounded(radius, padding, red, green, blue)

# animated_gif(duration_milliseconds)

# text_footers("font-file-name", font-size, numbering)
#   numbering:
#     0 = No numbering
#     1 = Image number in footer.
#     2 = Image number of total in footer.

#--- Put list of image files below, one per line:
#      If adding text_footers, put the text (caption) on the
#      line above the image file name, and begin that line
#      with the '>' character to indicate a caption.

"#;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateOutcome {
    Appended,
    AlreadyPresent,
}

/// The full template block, header included.
pub fn template_text() -> String {
    format!("\n{TEMPLATE_HEADER}\n{TEMPLATE_BODY}")
}

/// Append the template to `path` unless it is already there.
pub fn append_template(path: &Path) -> io::Result<TemplateOutcome> {
    if path.exists() {
        let existing = fs::read_to_string(path)?;
        if existing.lines().any(|line| line.trim() == TEMPLATE_HEADER) {
            return Ok(TemplateOutcome::AlreadyPresent);
        }
    }

    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    file.write_all(template_text().as_bytes())?;
    Ok(TemplateOutcome::Appended)
}

//! Shared test fixtures for the image-snip test suite.
//!
//! Builds real image files and options documents in temp directories so
//! runner tests can go through parsing, decoding and encoding end to end.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = TempDir::new().unwrap();
//! let photo = write_solid_image(tmp.path(), "photo.png", 100, 100, [255, 255, 255]);
//! let opts = parse_in(tmp.path(), &format!("border(4, 0, 0, 0)\n{}\n", photo.display()));
//! ```

use std::path::{Path, PathBuf};

use image::{Rgb, RgbImage};

use crate::parse::{ParsedOptions, parse_options};

// =========================================================================
// Image fixtures
// =========================================================================

/// Write a single-color RGB image; format follows the extension.
pub fn write_solid_image(dir: &Path, name: &str, width: u32, height: u32, rgb: [u8; 3]) -> PathBuf {
    let path = dir.join(name);
    RgbImage::from_pixel(width, height, Rgb(rgb))
        .save(&path)
        .unwrap();
    path
}

/// Write a gradient image so crops from different regions differ.
pub fn write_gradient_image(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
    let path = dir.join(name);
    RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
    })
    .save(&path)
    .unwrap();
    path
}

// =========================================================================
// Options documents
// =========================================================================

/// Parse `text` with relative paths anchored at `dir`. Panics on error.
pub fn parse_in(dir: &Path, text: &str) -> ParsedOptions {
    parse_options(text, dir).unwrap_or_else(|e| panic!("options did not parse: {e}"))
}

/// Names of the files in `dir` with the given extension, sorted.
pub fn files_with_extension(dir: &Path, ext: &str) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .filter_map(|entry| {
            let path = entry.unwrap().path();
            let matches = path
                .extension()
                .is_some_and(|e| e.eq_ignore_ascii_case(ext));
            matches.then(|| path.file_name().unwrap().to_string_lossy().into_owned())
        })
        .collect();
    names.sort();
    names
}

// =========================================================================
// Fonts
// =========================================================================

/// A TrueType font for footer tests: `IMAGE_SNIP_TEST_FONT` if set, else
/// DejaVu Sans. `None` when neither exists, so font tests can skip.
pub fn test_font_path() -> Option<PathBuf> {
    let path = std::env::var_os("IMAGE_SNIP_TEST_FONT")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf"));
    path.is_file().then_some(path)
}

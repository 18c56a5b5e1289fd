//! Caption footers: font loading, band sizing and text rendering.
//!
//! A footer grows the canvas downward by a band tall enough for one line of
//! text. There is no reliable line-height query across font formats, so the
//! band height is estimated from the advance width of `M` at the requested
//! size plus a fixed padding.

use crate::types::{Directive, Numbering, Rgb, ValidationError};
use ab_glyph::{Font, FontVec, PxScale, ScaleFont};
use image::{DynamicImage, RgbImage, imageops};
use imageproc::drawing::draw_text_mut;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FontError {
    #[error("cannot read font '{}': {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("'{}' is not a TrueType or OpenType font", .path.display())]
    Invalid { path: PathBuf },
}

impl From<FontError> for ValidationError {
    fn from(err: FontError) -> Self {
        let reason = err.to_string();
        let path = match err {
            FontError::Read { path, .. } | FontError::Invalid { path } => path,
        };
        ValidationError::FontUnreadable { path, reason }
    }
}

/// Colors and spacing of the footer band.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FooterStyle {
    /// Space above and below the text line.
    pub padding: u32,
    /// Added to the `M` advance when estimating the line height.
    pub text_height_padding: u32,
    pub foreground: Rgb,
    pub background: Rgb,
}

impl Default for FooterStyle {
    fn default() -> Self {
        Self {
            padding: 10,
            text_height_padding: 20,
            foreground: Rgb([255, 255, 255]),
            background: Rgb([25, 25, 112]),
        }
    }
}

/// Fonts loaded up front, keyed by the resolved path from the directive.
#[derive(Default)]
pub struct FontCache {
    fonts: HashMap<PathBuf, FontVec>,
}

impl FontCache {
    /// Load every font named by a `text_footers` directive.
    ///
    /// Each distinct path is read once. A zero font size is rejected here so
    /// the run fails before any image is touched.
    pub fn for_directives(directives: &[Directive]) -> Result<Self, ValidationError> {
        let mut cache = Self::default();
        for directive in directives {
            if let Directive::TextFooter {
                font, font_size, ..
            } = directive
            {
                if *font_size == 0 {
                    return Err(ValidationError::MissingFontSize {
                        directive: directive.to_string(),
                    });
                }
                if !cache.fonts.contains_key(font) {
                    let loaded = load_font(font)?;
                    tracing::debug!(font = %font.display(), "loaded font");
                    cache.fonts.insert(font.clone(), loaded);
                }
            }
        }
        Ok(cache)
    }

    pub fn get(&self, path: &Path) -> Option<&FontVec> {
        self.fonts.get(path)
    }

    pub fn is_empty(&self) -> bool {
        self.fonts.is_empty()
    }
}

pub fn load_font(path: &Path) -> Result<FontVec, FontError> {
    let bytes = std::fs::read(path).map_err(|source| FontError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    FontVec::try_from_vec(bytes).map_err(|_| FontError::Invalid {
        path: path.to_path_buf(),
    })
}

/// Caption text plus the numbering suffix.
///
/// The suffix is added even when there is no caption, so numbered footers
/// always show something.
pub fn footer_label(
    caption: Option<&str>,
    numbering: Numbering,
    n: usize,
    total: usize,
) -> String {
    let caption = caption.unwrap_or("");
    match numbering {
        Numbering::None => caption.to_string(),
        Numbering::Index => format!("{caption}  ({n})"),
        Numbering::IndexOfTotal => format!("{caption}  ({n}/{total})"),
    }
}

fn scale_for(font: &FontVec, font_size: u32) -> PxScale {
    font.pt_to_px_scale(font_size as f32)
        .unwrap_or_else(|| PxScale::from(font_size as f32))
}

/// Estimated pixel height of one text line, padding included.
///
/// `None` when the estimate does not fit in a `u32`.
pub fn estimate_text_height(font: &FontVec, font_size: u32, style: &FooterStyle) -> Option<u32> {
    let scaled = font.as_scaled(scale_for(font, font_size));
    let advance = scaled.h_advance(font.glyph_id('M'));
    // Float-to-int casts saturate, so a huge advance lands on u32::MAX.
    (advance.max(0.0) as u32).checked_add(style.text_height_padding)
}

/// Height of `image_height` plus a footer band with a line estimate of
/// `estimate`. `None` past `i32::MAX`, the limit for drawing coordinates.
pub fn footered_height(image_height: u32, estimate: u32, style: &FooterStyle) -> Option<u32> {
    let height = image_height
        .checked_add(estimate)?
        .checked_add(style.padding.checked_mul(2)?)?;
    i32::try_from(height).ok().map(|_| height)
}

/// Return `image` with a footer band appended below it.
///
/// The result is always RGB: the band is opaque and any alpha in `image` is
/// dropped. The text starts at `x = estimate` so it is inset about as far as
/// the band is tall. Returns `None` when the grown canvas would be too tall.
pub fn add_text_footer(
    image: &DynamicImage,
    label: &str,
    font: &FontVec,
    font_size: u32,
    style: &FooterStyle,
) -> Option<DynamicImage> {
    let estimate = estimate_text_height(font, font_size, style)?;
    let new_height = footered_height(image.height(), estimate, style)?;
    let src = image.to_rgb8();

    let mut canvas =
        RgbImage::from_pixel(src.width(), new_height, image::Rgb(style.background.0));
    imageops::replace(&mut canvas, &src, 0, 0);

    if !label.is_empty() {
        // Both coordinates are below new_height, which fits in i32.
        draw_text_mut(
            &mut canvas,
            image::Rgb(style.foreground.0),
            estimate as i32,
            (src.height() + style.padding) as i32,
            scale_for(font, font_size),
            font,
            label,
        );
    }

    Some(DynamicImage::ImageRgb8(canvas))
}

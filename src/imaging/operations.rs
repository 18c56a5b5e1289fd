//! Directive executor: apply one [`Directive`] to a working image.
//!
//! Each call takes the current image by reference and returns a new one; the
//! input is never modified. Geometry comes from
//! [`calculations`](super::calculations), so this module only turns boxes and
//! sizes into pixel work and clamp outcomes into [`Warning`]s.
//!
//! | Directive | Steps |
//! |---|---|
//! | corner / center crop | clamp target → box → crop |
//! | `crop_zoom` | clamp → scale to cover → clamp again → center crop |
//! | `crop_to_box` | clamp box → crop |
//! | `border` | squeeze image by `2*width` (nearest) onto a canvas of the same size |
//! | `rounded` | blurred rounded-rectangle mask → composite over background |
//! | `text_footers` | grow canvas, draw caption (see [`footer`](super::footer)) |

use super::calculations::{
    clamp_box, clamp_target_size, crop_box_center, crop_box_corner, zoom_resize_size,
};
use super::footer::{FontCache, FooterStyle, add_text_footer, footer_label};
use crate::types::{
    Background, CropBox, Dimensions, Directive, Numbering, Rgb, ValidationError, Warning,
};
use image::imageops::{self, FilterType};
use image::{DynamicImage, GrayImage, Luma, RgbImage, RgbaImage};
use std::path::Path;
use tracing::trace;

/// Drawing constants that are not part of any directive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderStyle {
    /// Used by `border(width)` without a color.
    pub border_color: Rgb,
    /// Gaussian sigma applied to the rounded mask. 0 disables smoothing.
    pub mask_blur: f32,
    pub footer: FooterStyle,
}

impl Default for RenderStyle {
    fn default() -> Self {
        Self {
            border_color: Rgb([25, 25, 112]),
            mask_blur: 1.0,
            footer: FooterStyle::default(),
        }
    }
}

/// Everything a directive may need besides the image itself.
pub struct ExecContext<'a> {
    pub style: &'a RenderStyle,
    pub fonts: &'a FontCache,
    /// Caption of the image being processed.
    pub caption: Option<&'a str>,
    /// 1-based position of the image in the document.
    pub file_num: usize,
    pub file_count: usize,
}

/// Result of one directive: the new working image and any clamp warnings.
#[derive(Debug)]
pub struct Applied {
    pub image: DynamicImage,
    pub warnings: Vec<Warning>,
}

fn dimensions(img: &DynamicImage) -> Dimensions {
    Dimensions::new(img.width(), img.height())
}

fn crop(img: &DynamicImage, b: CropBox) -> DynamicImage {
    img.crop_imm(b.x1, b.y1, b.width(), b.height())
}

/// Clamp `requested` to `img`, recording a warning when it shrank.
fn clamped_target(
    directive: &Directive,
    requested: Dimensions,
    img: &DynamicImage,
    warnings: &mut Vec<Warning>,
) -> Dimensions {
    let current = dimensions(img);
    let clamp = clamp_target_size(requested, current);
    if clamp.adjusted() {
        warnings.push(Warning::TargetSizeReduced {
            directive: directive.to_string(),
            current,
            adjusted: clamp.size,
            width_reduced: clamp.width_reduced,
            height_reduced: clamp.height_reduced,
        });
    }
    clamp.size
}

/// Apply `directive` to `image`.
pub fn apply(
    image: &DynamicImage,
    directive: &Directive,
    ctx: &ExecContext<'_>,
) -> Result<Applied, ValidationError> {
    let mut warnings = Vec::new();
    trace!(%directive, size = %dimensions(image), "applying");

    let out = match *directive {
        Directive::CropFromCorner {
            corner,
            width,
            height,
        } => {
            let requested = Dimensions::new(width, height);
            let target = clamped_target(directive, requested, image, &mut warnings);
            crop(image, crop_box_corner(dimensions(image), target, corner))
        }
        Directive::CropCenter { width, height } => {
            let requested = Dimensions::new(width, height);
            let target = clamped_target(directive, requested, image, &mut warnings);
            crop(image, crop_box_center(dimensions(image), target))
        }
        Directive::CropZoom { width, height } => {
            let requested = Dimensions::new(width, height);
            let target = clamped_target(directive, requested, image, &mut warnings);
            let scaled = zoom_resize_size(dimensions(image), target);
            let resized = image.resize_exact(scaled.width, scaled.height, FilterType::Lanczos3);
            // The resized frame is what the final crop must fit.
            let target = clamped_target(directive, requested, &resized, &mut warnings);
            crop(&resized, crop_box_center(dimensions(&resized), target))
        }
        Directive::CropToBox(requested) => {
            let current = dimensions(image);
            let clamp = clamp_box(requested, current).map_err(|_| ValidationError::InvalidBox {
                directive: directive.to_string(),
            })?;
            if clamp.adjusted {
                warnings.push(Warning::BoxAdjusted {
                    directive: directive.to_string(),
                    adjusted: clamp.crop_box,
                });
            }
            if clamp.crop_box.width() == 0 || clamp.crop_box.height() == 0 {
                return Err(ValidationError::EmptyBox {
                    directive: directive.to_string(),
                    size: current,
                });
            }
            crop(image, clamp.crop_box)
        }
        Directive::Border { width, color } => {
            let color = color.unwrap_or(ctx.style.border_color);
            add_border(image, width, color).ok_or_else(|| ValidationError::BorderTooWide {
                directive: directive.to_string(),
                size: dimensions(image),
            })?
        }
        Directive::RoundedMask {
            radius,
            padding,
            background,
        } => add_rounded_mask(image, radius, padding, background, ctx.style.mask_blur),
        Directive::TextFooter {
            ref font,
            font_size,
            numbering,
        } => text_footer(image, directive, font, font_size, numbering, ctx)?,
    };

    Ok(Applied {
        image: out,
        warnings,
    })
}

/// Squeeze `image` inward by `width` on every side onto a `color` canvas.
///
/// Returns `None` when the border would leave nothing of the image.
pub fn add_border(image: &DynamicImage, width: u32, color: Rgb) -> Option<DynamicImage> {
    let inner_w = image.width().checked_sub(width.checked_mul(2)?)?;
    let inner_h = image.height().checked_sub(width.checked_mul(2)?)?;
    if inner_w == 0 || inner_h == 0 {
        return None;
    }

    let mut canvas = RgbImage::from_pixel(image.width(), image.height(), image::Rgb(color.0));
    let inner = imageops::resize(&image.to_rgb8(), inner_w, inner_h, FilterType::Nearest);
    imageops::replace(&mut canvas, &inner, width as i64, width as i64);
    Some(DynamicImage::ImageRgb8(canvas))
}

/// Single-channel rounded rectangle covering `[padding, size - padding]`
/// inclusive on both axes.
pub fn rounded_mask(size: Dimensions, radius: u32, padding: u32) -> GrayImage {
    let (w, h) = (size.width as i64, size.height as i64);
    let (left, top) = (padding as i64, padding as i64);
    let (right, bottom) = (w - padding as i64, h - padding as i64);

    let mut mask = GrayImage::new(size.width, size.height);
    if right < left || bottom < top {
        return mask;
    }

    let r = (radius as i64).min((right - left) / 2).min((bottom - top) / 2);
    let (cx_l, cx_r) = (left + r, right - r);
    let (cy_t, cy_b) = (top + r, bottom - r);

    for y in top.max(0)..=bottom.min(h - 1) {
        for x in left.max(0)..=right.min(w - 1) {
            let dx = if x < cx_l { cx_l - x } else { (x - cx_r).max(0) };
            let dy = if y < cy_t { cy_t - y } else { (y - cy_b).max(0) };
            if dx * dx + dy * dy <= r * r {
                mask.put_pixel(x as u32, y as u32, Luma([255]));
            }
        }
    }
    mask
}

/// Composite `image` over `background` through a blurred rounded mask.
///
/// A transparent background yields RGBA with the mask as alpha; a solid one
/// yields RGB blended by the mask.
pub fn add_rounded_mask(
    image: &DynamicImage,
    radius: u32,
    padding: u32,
    background: Background,
    blur: f32,
) -> DynamicImage {
    let mut mask = rounded_mask(dimensions(image), radius, padding);
    if blur > 0.0 {
        mask = imageops::blur(&mask, blur);
    }
    let src = image.to_rgb8();

    match background {
        Background::Transparent => {
            let out = RgbaImage::from_fn(src.width(), src.height(), |x, y| {
                let [r, g, b] = src.get_pixel(x, y).0;
                image::Rgba([r, g, b, mask.get_pixel(x, y)[0]])
            });
            DynamicImage::ImageRgba8(out)
        }
        Background::Solid(bg) => {
            let out = RgbImage::from_fn(src.width(), src.height(), |x, y| {
                let m = mask.get_pixel(x, y)[0] as u32;
                let p = src.get_pixel(x, y).0;
                let mix =
                    |fg: u8, bg: u8| ((fg as u32 * m + bg as u32 * (255 - m) + 127) / 255) as u8;
                image::Rgb([mix(p[0], bg.0[0]), mix(p[1], bg.0[1]), mix(p[2], bg.0[2])])
            });
            DynamicImage::ImageRgb8(out)
        }
    }
}

fn text_footer(
    image: &DynamicImage,
    directive: &Directive,
    font: &Path,
    font_size: u32,
    numbering: Numbering,
    ctx: &ExecContext<'_>,
) -> Result<DynamicImage, ValidationError> {
    let loaded = ctx
        .fonts
        .get(font)
        .ok_or_else(|| ValidationError::FontUnreadable {
            path: font.to_path_buf(),
            reason: "font was not loaded".to_string(),
        })?;
    let label = footer_label(ctx.caption, numbering, ctx.file_num, ctx.file_count);
    add_text_footer(image, &label, loaded, font_size, &ctx.style.footer).ok_or_else(|| {
        ValidationError::FooterTooTall {
            directive: directive.to_string(),
            size: dimensions(image),
        }
    })
}

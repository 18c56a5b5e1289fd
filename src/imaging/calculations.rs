//! Pure geometry for crop boxes and resize targets.
//!
//! All functions here are pure and testable without any I/O or images. The
//! clamp functions report what they changed instead of printing; the executor
//! turns that into a user-visible warning.

use crate::types::{CropBox, Corner, Dimensions};

/// Outcome of fitting a requested size inside the current image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeClamp {
    pub size: Dimensions,
    pub width_reduced: bool,
    pub height_reduced: bool,
}

impl SizeClamp {
    pub fn adjusted(&self) -> bool {
        self.width_reduced || self.height_reduced
    }
}

/// Outcome of fitting a requested box inside the current image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoxClamp {
    pub crop_box: CropBox,
    pub adjusted: bool,
}

/// The requested box has `x2 < x1` or `y2 < y1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvertedBox;

/// Place a `target`-sized box flush against `corner`.
///
/// Left and top edges sit at offset 0; right and bottom edges at
/// `current - target`. The caller must clamp first: `target` has to fit
/// inside `current`.
///
/// # Examples
/// ```
/// # use image_snip::imaging::calculations::crop_box_corner;
/// # use image_snip::types::{Corner, Dimensions};
/// let current = Dimensions::new(1920, 1440);
/// let b = crop_box_corner(current, Dimensions::new(640, 480), Corner::RightBottom);
/// assert_eq!((b.x1, b.y1, b.x2, b.y2), (1280, 960, 1920, 1440));
/// ```
pub fn crop_box_corner(current: Dimensions, target: Dimensions, corner: Corner) -> CropBox {
    debug_assert!(target.width <= current.width, "target wider than image");
    debug_assert!(target.height <= current.height, "target taller than image");

    let right = current.width.saturating_sub(target.width);
    let bottom = current.height.saturating_sub(target.height);

    let (x1, y1) = match corner {
        Corner::LeftTop => (0, 0),
        Corner::RightTop => (right, 0),
        Corner::LeftBottom => (0, bottom),
        Corner::RightBottom => (right, bottom),
    };

    CropBox::new(x1, y1, x1 + target.width, y1 + target.height)
}

/// Center a `target`-sized box inside `current`.
///
/// On each axis the offset is `floor((current - target) / 2)`. An axis whose
/// target is not smaller than the image keeps its full extent; nothing is
/// enlarged.
pub fn crop_box_center(current: Dimensions, target: Dimensions) -> CropBox {
    let (x1, x2) = center_span(current.width, target.width);
    let (y1, y2) = center_span(current.height, target.height);
    CropBox::new(x1, y1, x2, y2)
}

fn center_span(current: u32, target: u32) -> (u32, u32) {
    if target < current {
        let offset = (current - target) / 2;
        (offset, offset + target)
    } else {
        (0, current)
    }
}

/// Size to scale an image to so it covers `target` on both axes.
///
/// Uses one uniform factor, `max(target_w / current_w, target_h / current_h)`,
/// so a following center crop can cut exactly `target` without letterboxing.
pub fn zoom_resize_size(current: Dimensions, target: Dimensions) -> Dimensions {
    let scale_w = target.width as f64 / current.width as f64;
    let scale_h = target.height as f64 / current.height as f64;
    let scale = scale_w.max(scale_h);

    Dimensions::new(
        ((current.width as f64 * scale).round() as u32).max(1),
        ((current.height as f64 * scale).round() as u32).max(1),
    )
}

/// Reduce a requested size so it fits inside `current`.
///
/// Never fails: any axis larger than the image is replaced by the image's
/// own extent. Applying it twice gives the same result as applying it once.
pub fn clamp_target_size(requested: Dimensions, current: Dimensions) -> SizeClamp {
    let width_reduced = requested.width > current.width;
    let height_reduced = requested.height > current.height;

    SizeClamp {
        size: Dimensions::new(
            requested.width.min(current.width),
            requested.height.min(current.height),
        ),
        width_reduced,
        height_reduced,
    }
}

/// Fit a requested box inside `current`.
///
/// An inverted box is rejected. Otherwise every coordinate beyond the image
/// bounds is pulled back to the bound.
pub fn clamp_box(requested: CropBox, current: Dimensions) -> Result<BoxClamp, InvertedBox> {
    if requested.x2 < requested.x1 || requested.y2 < requested.y1 {
        return Err(InvertedBox);
    }

    let clamped = CropBox::new(
        requested.x1.min(current.width),
        requested.y1.min(current.height),
        requested.x2.min(current.width),
        requested.y2.min(current.height),
    );

    Ok(BoxClamp {
        crop_box: clamped,
        adjusted: clamped != requested,
    })
}

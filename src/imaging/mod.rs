//! Pixel work for the pipeline, built on `image`, `imageproc` and `ab_glyph`.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Decode / encode** | `image` codecs behind [`ImageBackend`] |
//! | **Crop / resize** | `DynamicImage::crop_imm`, `resize_exact` (Lanczos3, Nearest) |
//! | **Rounded mask** | hand-drawn mask + `imageops::blur` |
//! | **Text footer** | `imageproc::drawing::draw_text_mut` + `ab_glyph` fonts |
//! | **Animated GIF** | `image::codecs::gif::GifEncoder` |
//!
//! The module is split into:
//! - **Calculations**: pure crop box and resize geometry (unit testable)
//! - **Operations**: the directive executor, one directive per call
//! - **Footer / Animation**: caption rendering and GIF frame preparation
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]

pub mod animation;
pub mod backend;
pub mod calculations;
pub mod footer;
pub mod operations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, ImageBackend};
pub use footer::{FontCache, FontError, FooterStyle};
pub use operations::{Applied, ExecContext, RenderStyle, apply};
pub use params::{GifParams, Quality};
pub use rust_backend::RustBackend;

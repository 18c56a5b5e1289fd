//! Pure Rust codec backend built on the `image` crate.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, GIF, TIFF, WebP, BMP) | `image::ImageReader` with content sniffing |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder` (alpha flattened over white) |
//! | Encode → PNG | `image::codecs::png::PngEncoder` |
//! | Encode → other stills | `DynamicImage::save_with_format` from the extension |
//! | Animated GIF | `image::codecs::gif::GifEncoder`, infinite repeat |

use super::backend::{BackendError, ImageBackend};
use super::params::{GifParams, Quality};
use image::codecs::gif::{GifEncoder, Repeat};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{Delay, DynamicImage, Frame, ImageEncoder, ImageFormat, ImageReader, Rgb, RgbImage};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// Backend using the `image` crate's codecs.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase()
}

fn encode_error(path: &Path, e: impl std::fmt::Display) -> BackendError {
    BackendError::Encode {
        path: path.display().to_string(),
        reason: e.to_string(),
    }
}

/// Composite an image with alpha over white; JPEG has no alpha channel.
fn flatten_on_white(img: &DynamicImage) -> RgbImage {
    if !img.color().has_alpha() {
        return img.to_rgb8();
    }
    let rgba = img.to_rgba8();
    RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        let p = rgba.get_pixel(x, y);
        let a = p[3] as u32;
        let blend = |c: u8| ((c as u32 * a + 255 * (255 - a) + 127) / 255) as u8;
        Rgb([blend(p[0]), blend(p[1]), blend(p[2])])
    })
}

fn save_jpeg(img: &DynamicImage, path: &Path, quality: Quality) -> Result<(), BackendError> {
    let rgb = flatten_on_white(img);
    let writer = BufWriter::new(File::create(path)?);
    JpegEncoder::new_with_quality(writer, quality.value())
        .write_image(
            rgb.as_raw(),
            rgb.width(),
            rgb.height(),
            image::ExtendedColorType::Rgb8,
        )
        .map_err(|e| encode_error(path, e))
}

fn save_png(img: &DynamicImage, path: &Path) -> Result<(), BackendError> {
    let writer = BufWriter::new(File::create(path)?);
    img.write_with_encoder(PngEncoder::new(writer))
        .map_err(|e| encode_error(path, e))
}

impl ImageBackend for RustBackend {
    fn load(&self, path: &Path) -> Result<DynamicImage, BackendError> {
        ImageReader::open(path)?
            .with_guessed_format()?
            .decode()
            .map_err(|e| BackendError::Decode {
                path: path.display().to_string(),
                reason: e.to_string(),
            })
    }

    fn save(
        &self,
        image: &DynamicImage,
        path: &Path,
        quality: Quality,
    ) -> Result<(), BackendError> {
        match extension_of(path).as_str() {
            "jpg" | "jpeg" => save_jpeg(image, path, quality),
            "png" => save_png(image, path),
            other => {
                let format = ImageFormat::from_extension(other)
                    .filter(|f| f.writing_enabled())
                    .ok_or_else(|| {
                        encode_error(path, format!("unsupported output format '{other}'"))
                    })?;
                image
                    .save_with_format(path, format)
                    .map_err(|e| encode_error(path, e))
            }
        }
    }

    fn save_gif(&self, frames: Vec<DynamicImage>, params: &GifParams) -> Result<(), BackendError> {
        let path = params.output.as_path();
        let writer = BufWriter::new(File::create(path)?);
        let mut encoder = GifEncoder::new(writer);
        encoder
            .set_repeat(Repeat::Infinite)
            .map_err(|e| encode_error(path, e))?;

        let delay = Delay::from_numer_denom_ms(params.frame_ms, 1);
        let frames = frames
            .into_iter()
            .map(|f| Frame::from_parts(f.to_rgba8(), 0, 0, delay));
        encoder
            .encode_frames(frames)
            .map_err(|e| encode_error(path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{AnimationDecoder, Rgba, RgbaImage};
    use std::io::BufReader;

    fn gradient(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
            Rgb([(x % 256) as u8, (y % 256) as u8, 128])
        }))
    }

    #[test]
    fn save_and_load_jpeg() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("out.jpg");
        let backend = RustBackend::new();

        backend
            .save(&gradient(200, 150), &path, Quality::default())
            .unwrap();

        let loaded = backend.load(&path).unwrap();
        assert_eq!((loaded.width(), loaded.height()), (200, 150));
    }

    #[test]
    fn save_png_keeps_alpha() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("out.png");
        let backend = RustBackend::new();
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(4, 4, Rgba([10, 20, 30, 0])));

        backend.save(&img, &path, Quality::default()).unwrap();

        let loaded = backend.load(&path).unwrap().to_rgba8();
        assert_eq!(loaded.get_pixel(0, 0)[3], 0);
    }

    #[test]
    fn jpeg_flattens_transparent_pixels_to_white() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(2, 2, Rgba([0, 0, 0, 0])));
        let flat = flatten_on_white(&img);
        assert_eq!(flat.get_pixel(0, 0), &Rgb([255, 255, 255]));
    }

    #[test]
    fn load_sniffs_content_not_extension() {
        let tmp = tempfile::TempDir::new().unwrap();
        let png_path = tmp.path().join("real.png");
        let backend = RustBackend::new();
        backend
            .save(&gradient(10, 10), &png_path, Quality::default())
            .unwrap();
        let misnamed = tmp.path().join("misnamed.jpg");
        std::fs::copy(&png_path, &misnamed).unwrap();

        assert!(backend.load(&misnamed).is_ok());
    }

    #[test]
    fn load_nonexistent_file_errors() {
        let backend = RustBackend::new();
        assert!(matches!(
            backend.load(Path::new("/nonexistent/image.jpg")),
            Err(BackendError::Io(_))
        ));
    }

    #[test]
    fn save_unknown_extension_errors() {
        let tmp = tempfile::TempDir::new().unwrap();
        let backend = RustBackend::new();
        let result = backend.save(
            &gradient(4, 4),
            &tmp.path().join("out.xyz"),
            Quality::default(),
        );
        assert!(matches!(result, Err(BackendError::Encode { .. })));
    }

    #[test]
    fn save_gif_writes_all_frames() {
        let tmp = tempfile::TempDir::new().unwrap();
        let output = tmp.path().join("anim.gif");
        let backend = RustBackend::new();

        backend
            .save_gif(
                vec![gradient(16, 16), gradient(16, 16), gradient(16, 16)],
                &GifParams {
                    output: output.clone(),
                    frame_ms: 200,
                },
            )
            .unwrap();

        let reader = BufReader::new(File::open(&output).unwrap());
        let decoder = image::codecs::gif::GifDecoder::new(reader).unwrap();
        let frames = decoder.into_frames().collect_frames().unwrap();
        assert_eq!(frames.len(), 3);
        let (num, den) = frames[0].delay().numer_denom_ms();
        assert_eq!(num / den, 200);
    }
}

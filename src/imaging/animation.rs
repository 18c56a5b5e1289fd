//! Frame preparation for the shared animated GIF.
//!
//! Every queued frame is pushed through the GIF codec once in memory so all
//! frames carry a GIF palette before assembly, then sized to match the first
//! frame.

use super::backend::BackendError;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageFormat};
use std::io::Cursor;
use std::path::{Path, PathBuf};

/// `zgif-<name of first frame>.gif` inside `output_dir`.
pub fn gif_path(output_dir: &Path, first_frame: &Path) -> PathBuf {
    let stem = first_frame
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    output_dir.join(format!("zgif-{stem}.gif"))
}

/// Re-encode one frame as GIF and decode it back.
pub fn quantize_frame(frame: &DynamicImage) -> Result<DynamicImage, BackendError> {
    let mut buf = Cursor::new(Vec::new());
    DynamicImage::ImageRgba8(frame.to_rgba8())
        .write_to(&mut buf, ImageFormat::Gif)
        .map_err(|e| BackendError::ProcessingFailed(format!("GIF re-encode failed: {e}")))?;
    image::load_from_memory_with_format(buf.get_ref(), ImageFormat::Gif)
        .map_err(|e| BackendError::ProcessingFailed(format!("GIF re-decode failed: {e}")))
}

/// Quantize every frame and resize frames after the first to its size.
pub fn normalize_frames(frames: Vec<DynamicImage>) -> Result<Vec<DynamicImage>, BackendError> {
    let mut out: Vec<DynamicImage> = Vec::with_capacity(frames.len());
    for frame in frames {
        let frame = quantize_frame(&frame)?;
        let frame = match out.first() {
            Some(first) if first.dimensions() != frame.dimensions() => {
                tracing::debug!(
                    from = ?frame.dimensions(),
                    to = ?first.dimensions(),
                    "resizing GIF frame"
                );
                frame.resize_exact(first.width(), first.height(), FilterType::Lanczos3)
            }
            _ => frame,
        };
        out.push(frame);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn solid(width: u32, height: u32, rgb: [u8; 3]) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb(rgb)))
    }

    #[test]
    fn gif_path_uses_first_stem() {
        assert_eq!(
            gif_path(Path::new("/out"), Path::new("/photos/IMG_001.jpg")),
            PathBuf::from("/out/zgif-IMG_001.gif")
        );
    }

    #[test]
    fn gif_path_drops_only_last_extension() {
        assert_eq!(
            gif_path(Path::new("/out"), Path::new("/p/shot.crop.png")),
            PathBuf::from("/out/zgif-shot.crop.gif")
        );
    }

    #[test]
    fn quantize_keeps_size_and_flat_color() {
        let frame = quantize_frame(&solid(12, 8, [200, 10, 10])).unwrap();
        assert_eq!((frame.width(), frame.height()), (12, 8));
        let px = frame.to_rgb8().get_pixel(3, 3).0;
        for (got, want) in px.iter().zip([200u8, 10, 10]) {
            assert!(got.abs_diff(want) <= 8, "{px:?}");
        }
    }

    #[test]
    fn later_frames_resized_to_first() {
        let frames = normalize_frames(vec![
            solid(40, 30, [0, 0, 0]),
            solid(80, 60, [255, 255, 255]),
            solid(40, 30, [10, 10, 10]),
        ])
        .unwrap();

        let sizes: Vec<_> = frames.iter().map(|f| (f.width(), f.height())).collect();
        assert_eq!(sizes, vec![(40, 30), (40, 30), (40, 30)]);
    }

    #[test]
    fn empty_frame_list_is_empty() {
        assert!(normalize_frames(Vec::new()).unwrap().is_empty());
    }
}

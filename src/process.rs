//! Pipeline runner.
//!
//! Takes a parsed options document and produces the run's artifacts:
//!
//! ```text
//! <output dir>/
//! ├── image_snip_options-20250301_142530.txt   # verbatim options document
//! ├── IMG_01-crop.jpg                          # one still per image
//! ├── IMG_02-crop.jpg
//! └── zgif-IMG_01-crop.gif                     # only with animated_gif(ms)
//! ```
//!
//! ## Per-image flow
//!
//! ```text
//! load → RGB working copy → directive 1 … directive N → name → overwrite check → save
//! ```
//!
//! With no directives and a GIF requested, images are not saved individually:
//! their source paths become GIF frames directly.
//!
//! Images and directives run strictly in document order on one thread. The
//! first fatal error stops the run; outputs already written stay on disk.
//!
//! Progress is reported through a caller-supplied sink of [`RunEvent`]s;
//! [`crate::output::format_event`] renders them.

use crate::config::StyleConfig;
use crate::imaging::{
    BackendError, ExecContext, FontCache, GifParams, ImageBackend, RustBackend, animation, apply,
};
use crate::naming;
use crate::parse::{ParseError, ParsedOptions};
use crate::types::{Dimensions, ImageTask, RunSettings, ValidationError, Warning};
use chrono::Local;
use image::DynamicImage;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum RunError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("cannot replace existing file: '{}'", .0.display())]
    Collision(PathBuf),
    #[error("Image processing failed: {0}")]
    Imaging(#[from] BackendError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Progress reported while a run executes.
#[derive(Debug, Clone, PartialEq)]
pub enum RunEvent {
    /// A fresh `crop_<timestamp>` output directory was created.
    OutputDirCreated { path: PathBuf },
    /// An image is being read, either as a source or as a GIF frame.
    Reading { path: PathBuf },
    /// A clamp or normalization adjustment.
    Warning(Warning),
    /// An existing output is about to be replaced.
    Replacing { path: PathBuf },
    Saving { path: PathBuf },
    WritingGif { path: PathBuf, frames: usize },
}

/// One written still image.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOutput {
    pub path: PathBuf,
    pub dimensions: Dimensions,
}

/// What a completed run produced.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub output_dir: PathBuf,
    pub snapshot: PathBuf,
    pub outputs: Vec<PipelineOutput>,
    pub gif: Option<PathBuf>,
}

/// Run the pipeline with the `image`-crate backend.
pub fn run(
    options: &ParsedOptions,
    style: &StyleConfig,
    report: &mut dyn FnMut(&RunEvent),
) -> Result<RunSummary, RunError> {
    run_with_backend(&RustBackend::new(), options, style, report)
}

/// Run the pipeline using a specific backend (allows testing with mock).
pub fn run_with_backend(
    backend: &impl ImageBackend,
    options: &ParsedOptions,
    style: &StyleConfig,
    report: &mut dyn FnMut(&RunEvent),
) -> Result<RunSummary, RunError> {
    let settings = &options.settings;
    let render = style.render_style();
    let quality = style.quality();

    for warning in &options.warnings {
        report(&RunEvent::Warning(warning.clone()));
    }

    // Fonts fail the run before anything is written.
    let fonts = FontCache::for_directives(&options.directives)?;

    let run_stamp = Local::now().format(naming::RUN_TIMESTAMP_FORMAT).to_string();
    let output_dir = resolve_output_dir(settings, &options.images, &run_stamp, report)?;

    let snapshot = output_dir.join(naming::snapshot_name(&run_stamp));
    fs::write(&snapshot, &options.text)?;
    debug!(path = %snapshot.display(), "wrote options snapshot");

    let file_count = options.images.len();
    let mut outputs = Vec::new();
    let mut gif_frames: Vec<PathBuf> = Vec::new();

    for (index, task) in options.images.iter().enumerate() {
        let file_num = index + 1;
        report(&RunEvent::Reading {
            path: task.source.clone(),
        });

        if options.directives.is_empty() {
            if settings.gif_enabled() {
                gif_frames.push(task.source.clone());
            }
            continue;
        }

        let mut working = DynamicImage::ImageRgb8(backend.load(&task.source)?.to_rgb8());
        let ctx = ExecContext {
            style: &render,
            fonts: &fonts,
            caption: task.caption.as_deref(),
            file_num,
            file_count,
        };
        for directive in &options.directives {
            let applied = apply(&working, directive, &ctx)?;
            for warning in applied.warnings {
                report(&RunEvent::Warning(warning));
            }
            working = applied.image;
        }

        let timestamp = naming::timestamp_tag(settings.timestamp_mode, Local::now());
        let name = naming::output_name(
            &task.source,
            settings,
            file_num,
            file_count,
            timestamp.as_deref(),
        );
        let path = output_dir.join(name);

        report(&RunEvent::Saving { path: path.clone() });
        clear_target(&path, settings.overwrite, report)?;
        backend.save(&working, &path, quality)?;

        outputs.push(PipelineOutput {
            path: path.clone(),
            dimensions: Dimensions::new(working.width(), working.height()),
        });
        if settings.gif_enabled() {
            gif_frames.push(path);
        }
    }

    let gif = match gif_frames.first() {
        Some(first) => {
            let gif_path = animation::gif_path(&output_dir, first);
            write_gif(backend, &gif_frames, &gif_path, settings, report)?;
            Some(gif_path)
        }
        None => None,
    };

    Ok(RunSummary {
        output_dir,
        snapshot,
        outputs,
        gif,
    })
}

/// Use `output_folder` if given, else create `crop_<stamp>` next to the
/// first image.
fn resolve_output_dir(
    settings: &RunSettings,
    images: &[ImageTask],
    run_stamp: &str,
    report: &mut dyn FnMut(&RunEvent),
) -> Result<PathBuf, RunError> {
    if let Some(dir) = &settings.output_dir {
        if !dir.is_dir() {
            return Err(ValidationError::OutputFolderNotFound(dir.clone()).into());
        }
        return Ok(dir.clone());
    }

    let first = images.first().ok_or(ParseError::NoImages)?;
    let parent = first.source.parent().unwrap_or(Path::new("."));
    let dir = parent.join(naming::default_output_dir_name(run_stamp));
    if dir.exists() {
        return Err(RunError::Collision(dir));
    }
    fs::create_dir(&dir)?;
    report(&RunEvent::OutputDirCreated { path: dir.clone() });
    Ok(dir)
}

/// Enforce the overwrite policy for an output about to be written.
fn clear_target(
    path: &Path,
    overwrite: bool,
    report: &mut dyn FnMut(&RunEvent),
) -> Result<(), RunError> {
    if !path.exists() {
        return Ok(());
    }
    if !overwrite {
        return Err(RunError::Collision(path.to_path_buf()));
    }
    report(&RunEvent::Replacing {
        path: path.to_path_buf(),
    });
    fs::remove_file(path)?;
    Ok(())
}

fn write_gif(
    backend: &impl ImageBackend,
    frame_paths: &[PathBuf],
    gif_path: &Path,
    settings: &RunSettings,
    report: &mut dyn FnMut(&RunEvent),
) -> Result<(), RunError> {
    let mut frames = Vec::with_capacity(frame_paths.len());
    for path in frame_paths {
        report(&RunEvent::Reading { path: path.clone() });
        frames.push(backend.load(path)?);
    }
    let frames = animation::normalize_frames(frames)?;

    report(&RunEvent::WritingGif {
        path: gif_path.to_path_buf(),
        frames: frames.len(),
    });
    clear_target(gif_path, settings.overwrite, report)?;
    backend.save_gif(
        frames,
        &GifParams {
            output: gif_path.to_path_buf(),
            frame_ms: settings.gif_frame_ms,
        },
    )?;
    Ok(())
}

//! # image-snip
//!
//! Batch-crop and decorate images from a small line-oriented options file.
//! One document lists the process instructions, the run settings and the
//! images; every image goes through the same instructions in order.
//!
//! # Architecture: Parse, Execute, Run
//!
//! ```text
//! 1. Parse     options text  →  ParsedOptions   (settings, directives, images)
//! 2. Execute   image + directive  →  image      (one directive at a time)
//! 3. Run       ParsedOptions  →  output dir     (naming, overwrite policy, GIF)
//! ```
//!
//! - **Parsing is total**: every bad line in the document is reported at once,
//!   and dispatch over directive names happens only there. Nothing downstream
//!   looks at the original text again.
//! - **Execution is pure**: the executor takes an image and returns a new one,
//!   with geometry in [`imaging::calculations`] so crop math is unit testable
//!   without pixels.
//! - **The runner owns I/O**: decoding and encoding go through the
//!   [`imaging::ImageBackend`] trait, so runner tests can use a mock.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`parse`] | Options document → settings, ordered directives and image list |
//! | [`template`] | Appends the commented options reference to a file |
//! | [`imaging`] | Crop geometry, the directive executor, footers, GIF frames, codecs |
//! | [`naming`] | Output file names, timestamps, run artifact names |
//! | [`process`] | Pipeline runner: output directory, per-image loop, overwrite policy |
//! | [`output`] | CLI output formatting of progress events and warnings |
//! | [`config`] | Optional TOML style configuration (colors, padding, quality) |
//! | [`types`] | Shared types: `Directive`, `RunSettings`, `ImageTask`, errors, warnings |
//!
//! # Design Decisions
//!
//! ## Clamp, Don't Fail
//!
//! A crop target larger than the image is reduced to the image size and
//! reported as a warning. Only inputs that cannot mean anything (an inverted
//! box, a border wider than the image, an unreadable font) stop the run.
//!
//! ## Fail Fast on Collisions
//!
//! An existing output file stops the whole run unless `--overwrite` is given.
//! Outputs written before the collision stay on disk.

pub mod config;
pub mod imaging;
pub mod naming;
pub mod output;
pub mod parse;
pub mod process;
pub mod template;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;

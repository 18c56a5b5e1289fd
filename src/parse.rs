//! Options document parser.
//!
//! An options document is line oriented. Each non-blank line that does not
//! start with `#` is one of:
//!
//! | Form | Meaning |
//! |---|---|
//! | `name(arg, ...)` | a process instruction, kept in document order |
//! | `key: value` | a run setting (`output_folder`, `new_name`, `output_format`, ...) |
//! | `> caption` | caption for the images listed after it; a bare `>` clears it |
//! | anything else | an image file path |
//!
//! ```text
//! output_folder: ~/Pictures/snips
//! timestamp_mode: 1
//!
//! crop_zoom(800, 800)
//! border(4, 0, 0, 0)
//! text_footers("DejaVuSans.ttf", 18, 2)
//!
//! > Harbour at dawn
//! ./001-harbour.jpg
//! ./002-harbour.jpg
//! >
//! ./003-boats.jpg
//! ```
//!
//! The parser never stops at the first bad line. Every missing image and every
//! malformed line is collected and returned together in
//! [`ParseError::Issues`].

use crate::types::{
    Background, CropBox, Corner, Directive, ImageTask, Numbering, OutputFormat, Rgb, RunSettings,
    TimestampMode, ValidationError, Warning,
};
use std::fmt;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// A single problem found while reading the document.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseIssue {
    MissingImage {
        path: PathBuf,
    },
    UnknownDirective {
        line: usize,
        text: String,
    },
    MalformedDirective {
        line: usize,
        text: String,
        reason: String,
    },
    MalformedSetting {
        line: usize,
        text: String,
        reason: String,
    },
}

impl fmt::Display for ParseIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseIssue::MissingImage { path } => write!(f, "File not found: '{}'", path.display()),
            ParseIssue::UnknownDirective { line, text } => {
                write!(f, "line {line}: unknown process instruction '{text}'")
            }
            ParseIssue::MalformedDirective { line, text, reason } => {
                write!(f, "line {line}: invalid process instruction '{text}': {reason}")
            }
            ParseIssue::MalformedSetting { line, text, reason } => {
                write!(f, "line {line}: invalid setting '{text}': {reason}")
            }
        }
    }
}

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("{}", format_issues(.0))]
    Issues(Vec<ParseIssue>),
    #[error("options file did not contain any image file names")]
    NoImages,
    #[error("options file did not contain any process instructions")]
    NoInstructions,
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

fn format_issues(issues: &[ParseIssue]) -> String {
    let mut out = format!("{} problem(s) in options file:", issues.len());
    for issue in issues {
        out.push_str("\n  ");
        out.push_str(&issue.to_string());
    }
    out
}

/// Everything a run needs from the options document.
#[derive(Debug, Clone)]
pub struct ParsedOptions {
    /// Verbatim document text, snapshotted into the output directory.
    pub text: String,
    pub settings: RunSettings,
    pub directives: Vec<Directive>,
    pub images: Vec<ImageTask>,
    /// Non-fatal adjustments made while parsing.
    pub warnings: Vec<Warning>,
}

/// How a cleaned-up line is interpreted.
#[derive(Debug, Clone, PartialEq)]
enum Line<'a> {
    Call { name: &'a str, args: &'a str },
    Setting { key: &'a str, value: &'a str },
    Caption(&'a str),
    Image(&'a str),
}

/// Parse an options document.
///
/// Relative paths (images, fonts, `output_folder`) are resolved against
/// `base_dir`; a leading `~` expands to the user's home directory.
pub fn parse_options(text: &str, base_dir: &Path) -> Result<ParsedOptions, ParseError> {
    let mut settings = RunSettings::default();
    let mut directives = Vec::new();
    let mut images = Vec::new();
    let mut warnings = Vec::new();
    let mut issues = Vec::new();
    let mut caption: Option<String> = None;

    for (index, raw) in text.lines().enumerate() {
        let line_no = index + 1;
        let s = clean_line(raw);
        if s.is_empty() || s.starts_with('#') {
            continue;
        }

        match classify(s) {
            Line::Call { name, args } => match parse_call(name, args, base_dir) {
                Ok(Call::Directive(d)) => {
                    debug!(line = line_no, directive = %d, "parsed directive");
                    directives.push(d);
                }
                Ok(Call::AnimatedGif(ms)) => settings.gif_frame_ms = ms,
                Err(CallError::Unknown) => issues.push(ParseIssue::UnknownDirective {
                    line: line_no,
                    text: s.to_string(),
                }),
                Err(CallError::Malformed(reason)) => issues.push(ParseIssue::MalformedDirective {
                    line: line_no,
                    text: s.to_string(),
                    reason,
                }),
            },
            Line::Setting { key, value } => {
                if let Err(reason) =
                    apply_setting(&mut settings, &mut warnings, key, value, base_dir)
                {
                    issues.push(ParseIssue::MalformedSetting {
                        line: line_no,
                        text: s.to_string(),
                        reason,
                    });
                }
            }
            Line::Caption(rest) => {
                let text = rest.trim_matches(|c: char| c == ' ' || c == '\'' || c == '"');
                caption = (!text.is_empty()).then(|| text.to_string());
            }
            Line::Image(path) => match resolve_existing(path, base_dir) {
                Ok(source) => images.push(ImageTask {
                    source,
                    caption: caption.clone(),
                }),
                Err(path) => issues.push(ParseIssue::MissingImage { path }),
            },
        }
    }

    if !issues.is_empty() {
        return Err(ParseError::Issues(issues));
    }
    if images.is_empty() {
        return Err(ParseError::NoImages);
    }
    if directives.is_empty() && !settings.gif_enabled() {
        return Err(ParseError::NoInstructions);
    }
    if let Some(dir) = &settings.output_dir {
        if !dir.is_dir() {
            return Err(ValidationError::OutputFolderNotFound(dir.clone()).into());
        }
    }

    Ok(ParsedOptions {
        text: text.to_string(),
        settings,
        directives,
        images,
        warnings,
    })
}

/// Trim whitespace, then any quote characters wrapping the line.
fn clean_line(raw: &str) -> &str {
    raw.trim().trim_matches(|c: char| c == '\'' || c == '"')
}

fn classify(s: &str) -> Line<'_> {
    if let Some(rest) = s.strip_prefix('>') {
        return Line::Caption(rest);
    }
    if let Some((name, args)) = split_call(s) {
        return Line::Call { name, args };
    }
    if let Some((key, value)) = split_setting(s) {
        return Line::Setting { key, value };
    }
    Line::Image(s)
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// `name(args)` with an identifier name and a closing paren at the very end.
fn split_call(s: &str) -> Option<(&str, &str)> {
    let body = s.strip_suffix(')')?;
    let open = body.find('(')?;
    let name = body[..open].trim_end();
    is_identifier(name).then(|| (name, &body[open + 1..]))
}

/// `key: value` where the key is a lowercase identifier of two or more
/// characters. The length rule keeps Windows drive letters (`C:\...`) out.
fn split_setting(s: &str) -> Option<(&str, &str)> {
    let (key, value) = s.split_once(':')?;
    let key = key.trim_end();
    let valid = key.len() >= 2
        && is_identifier(key)
        && key.chars().all(|c| !c.is_ascii_uppercase());
    valid.then(|| (key, value.trim()))
}

enum Call {
    Directive(Directive),
    AnimatedGif(u32),
}

enum CallError {
    Unknown,
    Malformed(String),
}

impl From<String> for CallError {
    fn from(reason: String) -> Self {
        CallError::Malformed(reason)
    }
}

fn parse_call(name: &str, args: &str, base_dir: &Path) -> Result<Call, CallError> {
    let args: Vec<&str> = if args.trim().is_empty() {
        Vec::new()
    } else {
        args.split(',').map(str::trim).collect()
    };

    let directive = match name {
        "crop_from_left_top" => corner_crop(Corner::LeftTop, &args)?,
        "crop_from_right_top" => corner_crop(Corner::RightTop, &args)?,
        "crop_from_left_bottom" => corner_crop(Corner::LeftBottom, &args)?,
        "crop_from_right_bottom" => corner_crop(Corner::RightBottom, &args)?,
        "crop_from_center" => {
            let (width, height) = size_args(&args)?;
            Directive::CropCenter { width, height }
        }
        "crop_zoom" => {
            let (width, height) = size_args(&args)?;
            Directive::CropZoom { width, height }
        }
        "crop_to_box" => {
            expect_count(&args, &[4])?;
            Directive::CropToBox(CropBox::new(
                int_arg(args[0], "x1")?,
                int_arg(args[1], "y1")?,
                int_arg(args[2], "x2")?,
                int_arg(args[3], "y2")?,
            ))
        }
        "border" => {
            expect_count(&args, &[1, 4])?;
            let width = int_arg(args[0], "width")?;
            let color = if args.len() == 4 {
                Some(rgb_args(&args[1..])?)
            } else {
                None
            };
            Directive::Border { width, color }
        }
        "rounded" => {
            expect_count(&args, &[2, 5])?;
            let background = if args.len() == 5 {
                Background::Solid(rgb_args(&args[2..])?)
            } else {
                Background::Transparent
            };
            Directive::RoundedMask {
                radius: int_arg(args[0], "radius")?,
                padding: int_arg(args[1], "padding")?,
                background,
            }
        }
        "text_footers" => {
            expect_count(&args, &[3])?;
            let font_name = args[0].trim_matches(|c: char| c == '\'' || c == '"');
            if font_name.is_empty() {
                return Err(CallError::Malformed("missing font file name".into()));
            }
            let mode = int_arg(args[2], "numbering")?;
            let numbering = Numbering::from_mode(mode)
                .ok_or_else(|| format!("numbering must be 0, 1 or 2, got {mode}"))?;
            Directive::TextFooter {
                font: resolve_path(font_name, base_dir),
                font_size: int_arg(args[1], "font size")?,
                numbering,
            }
        }
        "animated_gif" => {
            expect_count(&args, &[1])?;
            return Ok(Call::AnimatedGif(int_arg(args[0], "duration")?));
        }
        _ => return Err(CallError::Unknown),
    };

    Ok(Call::Directive(directive))
}

fn expect_count(args: &[&str], allowed: &[usize]) -> Result<(), String> {
    if allowed.contains(&args.len()) {
        return Ok(());
    }
    let expected: Vec<String> = allowed.iter().map(|n| n.to_string()).collect();
    Err(format!(
        "expected {} argument(s), got {}",
        expected.join(" or "),
        args.len()
    ))
}

fn int_arg(arg: &str, what: &str) -> Result<u32, String> {
    arg.parse::<u32>()
        .map_err(|_| format!("{what} must be a non-negative integer, got '{arg}'"))
}

fn size_args(args: &[&str]) -> Result<(u32, u32), String> {
    expect_count(args, &[2])?;
    let width = int_arg(args[0], "width")?;
    let height = int_arg(args[1], "height")?;
    if width == 0 || height == 0 {
        return Err("width and height must be greater than zero".into());
    }
    Ok((width, height))
}

fn corner_crop(corner: Corner, args: &[&str]) -> Result<Directive, String> {
    let (width, height) = size_args(args)?;
    Ok(Directive::CropFromCorner {
        corner,
        width,
        height,
    })
}

fn rgb_args(args: &[&str]) -> Result<Rgb, String> {
    let mut rgb = [0u8; 3];
    for (slot, arg) in rgb.iter_mut().zip(args) {
        *slot = arg
            .parse::<u8>()
            .map_err(|_| format!("color components must be 0-255, got '{arg}'"))?;
    }
    Ok(Rgb(rgb))
}

fn apply_setting(
    settings: &mut RunSettings,
    warnings: &mut Vec<Warning>,
    key: &str,
    value: &str,
    base_dir: &Path,
) -> Result<(), String> {
    match key {
        "output_folder" => {
            settings.output_dir = (!value.is_empty()).then(|| {
                let dir = resolve_path(value, base_dir);
                dir.canonicalize().unwrap_or(dir)
            });
        }
        "new_name" => {
            settings.new_name = (!value.is_empty()).then(|| value.to_string());
        }
        "output_format" => {
            settings.output_format = if value.is_empty() {
                None
            } else {
                Some(normalize_output_format(value, warnings))
            };
        }
        "timestamp_mode" => settings.timestamp_mode = parse_timestamp_mode(value)?,
        _ => debug!(key, "ignoring unrecognized setting"),
    }
    Ok(())
}

fn normalize_output_format(value: &str, warnings: &mut Vec<Warning>) -> OutputFormat {
    match value.to_ascii_uppercase().as_str() {
        "JPG" | "JPEG" => OutputFormat::Jpg,
        "PNG" => OutputFormat::Png,
        _ => {
            warnings.push(Warning::OutputFormatDefaulted {
                value: value.to_string(),
            });
            OutputFormat::Png
        }
    }
}

fn parse_timestamp_mode(value: &str) -> Result<TimestampMode, String> {
    match value.to_ascii_lowercase().as_str() {
        "0" | "none" => Ok(TimestampMode::None),
        "1" | "second" => Ok(TimestampMode::Second),
        "2" | "microsecond" => Ok(TimestampMode::Microsecond),
        _ => Err(format!(
            "expected 0 (none), 1 (second) or 2 (microsecond), got '{value}'"
        )),
    }
}

fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .filter(|h| !h.is_empty())
        .map(PathBuf::from)
}

/// Expand `~`, anchor relative paths at `base_dir`, and drop `.`/`..`
/// segments lexically.
pub(crate) fn resolve_path(raw: &str, base_dir: &Path) -> PathBuf {
    let expanded = match raw.strip_prefix('~') {
        Some(rest) if rest.is_empty() || rest.starts_with(['/', '\\']) => match home_dir() {
            Some(home) => home.join(rest.trim_start_matches(['/', '\\'])),
            None => PathBuf::from(raw),
        },
        _ => PathBuf::from(raw),
    };
    let anchored = if expanded.is_absolute() {
        expanded
    } else {
        base_dir.join(expanded)
    };
    normalize_lexically(&anchored)
}

fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other),
        }
    }
    out
}

/// Resolve an image path, returning the resolved path in `Err` when the file
/// does not exist.
fn resolve_existing(raw: &str, base_dir: &Path) -> Result<PathBuf, PathBuf> {
    let path = resolve_path(raw, base_dir);
    if path.is_file() {
        Ok(path.canonicalize().unwrap_or(path))
    } else {
        Err(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, b"").unwrap();
        path.canonicalize().unwrap()
    }

    // =========================================================================
    // Line classification
    // =========================================================================

    #[test]
    fn classify_call() {
        assert_eq!(
            classify("crop_zoom(800, 800)"),
            Line::Call {
                name: "crop_zoom",
                args: "800, 800"
            }
        );
    }

    #[test]
    fn classify_setting() {
        assert_eq!(
            classify("output_format: png"),
            Line::Setting {
                key: "output_format",
                value: "png"
            }
        );
    }

    #[test]
    fn classify_caption() {
        assert_eq!(classify("> Sunrise"), Line::Caption(" Sunrise"));
        assert_eq!(classify(">"), Line::Caption(""));
    }

    #[test]
    fn classify_paths_with_parens_and_colons_as_images() {
        assert_eq!(classify("photo (1).jpg"), Line::Image("photo (1).jpg"));
        assert_eq!(classify("C:\\photos\\a.jpg"), Line::Image("C:\\photos\\a.jpg"));
        assert_eq!(classify("./images/a.jpg"), Line::Image("./images/a.jpg"));
    }

    #[test]
    fn clean_line_strips_wrapping_quotes() {
        assert_eq!(clean_line("  '/tmp/a b.jpg'  "), "/tmp/a b.jpg");
        assert_eq!(clean_line("\"crop_zoom(1, 2)\""), "crop_zoom(1, 2)");
    }

    // =========================================================================
    // Directive parsing
    // =========================================================================

    fn parse_one(line: &str) -> Result<Vec<Directive>, ParseError> {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "a.jpg");
        let doc = format!("{line}\na.jpg\n");
        parse_options(&doc, tmp.path()).map(|p| p.directives)
    }

    #[test]
    fn parses_every_crop_form() {
        let doc = "crop_from_left_top(1, 2)\ncrop_from_right_top(3, 4)\n\
                   crop_from_left_bottom(5, 6)\ncrop_from_right_bottom(7, 8)\n\
                   crop_from_center(9, 10)\ncrop_zoom(11, 12)\ncrop_to_box(1, 2, 3, 4)";
        let d = parse_one(doc).unwrap();
        assert_eq!(d.len(), 7);
        assert_eq!(
            d[1],
            Directive::CropFromCorner {
                corner: Corner::RightTop,
                width: 3,
                height: 4
            }
        );
        assert_eq!(d[4], Directive::CropCenter { width: 9, height: 10 });
        assert_eq!(d[5], Directive::CropZoom { width: 11, height: 12 });
        assert_eq!(d[6], Directive::CropToBox(CropBox::new(1, 2, 3, 4)));
    }

    #[test]
    fn directives_keep_document_order() {
        let d = parse_one("border(4)\ncrop_zoom(10, 10)\nrounded(8, 2)").unwrap();
        assert!(matches!(d[0], Directive::Border { .. }));
        assert!(matches!(d[1], Directive::CropZoom { .. }));
        assert!(matches!(d[2], Directive::RoundedMask { .. }));
    }

    #[test]
    fn border_with_and_without_color() {
        let d = parse_one("border(4)\nborder(2, 10, 20, 30)").unwrap();
        assert_eq!(d[0], Directive::Border { width: 4, color: None });
        assert_eq!(
            d[1],
            Directive::Border {
                width: 2,
                color: Some(Rgb([10, 20, 30]))
            }
        );
    }

    #[test]
    fn rounded_transparent_and_solid() {
        let d = parse_one("rounded(8, 2)\nrounded(8, 2, 255, 0, 0)").unwrap();
        assert_eq!(
            d[0],
            Directive::RoundedMask {
                radius: 8,
                padding: 2,
                background: Background::Transparent
            }
        );
        assert_eq!(
            d[1],
            Directive::RoundedMask {
                radius: 8,
                padding: 2,
                background: Background::Solid(Rgb([255, 0, 0]))
            }
        );
    }

    #[test]
    fn text_footers_resolves_font_and_numbering() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "a.jpg");
        let doc = "text_footers(\"fonts/Sans.ttf\", 18, 2)\na.jpg";
        let parsed = parse_options(doc, tmp.path()).unwrap();
        assert_eq!(
            parsed.directives,
            vec![Directive::TextFooter {
                font: tmp.path().join("fonts/Sans.ttf"),
                font_size: 18,
                numbering: Numbering::IndexOfTotal,
            }]
        );
    }

    #[test]
    fn animated_gif_sets_duration_without_a_directive() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "a.jpg");
        let parsed = parse_options("animated_gif(2000)\na.jpg", tmp.path()).unwrap();
        assert!(parsed.directives.is_empty());
        assert_eq!(parsed.settings.gif_frame_ms, 2000);
    }

    #[test]
    fn unknown_directive_is_reported_with_line() {
        let err = parse_one("crop_sideways(1, 2)").unwrap_err();
        match err {
            ParseError::Issues(issues) => assert_eq!(
                issues,
                vec![ParseIssue::UnknownDirective {
                    line: 1,
                    text: "crop_sideways(1, 2)".into()
                }]
            ),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn malformed_arguments_are_reported() {
        for line in [
            "crop_zoom(800)",
            "crop_zoom(800, abc)",
            "crop_from_center(0, 10)",
            "border(4, 300, 0, 0)",
            "rounded(8)",
            "text_footers(\"a.ttf\", 12, 7)",
            "animated_gif()",
        ] {
            match parse_one(line) {
                Err(ParseError::Issues(issues)) => {
                    assert!(
                        matches!(issues[0], ParseIssue::MalformedDirective { .. }),
                        "{line}: {issues:?}"
                    );
                }
                other => panic!("{line}: expected malformed issue, got {other:?}"),
            }
        }
    }

    // =========================================================================
    // Settings
    // =========================================================================

    #[test]
    fn settings_are_applied() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "a.jpg");
        fs::create_dir(tmp.path().join("out")).unwrap();
        let doc = "output_folder: ./out\nnew_name: holiday\noutput_format: jpeg\n\
                   timestamp_mode: 2\ncrop_zoom(1, 1)\na.jpg";
        let parsed = parse_options(doc, tmp.path()).unwrap();
        let s = &parsed.settings;
        assert_eq!(
            s.output_dir.as_deref(),
            Some(tmp.path().join("out").canonicalize().unwrap().as_path())
        );
        assert_eq!(s.new_name.as_deref(), Some("holiday"));
        assert_eq!(s.output_format, Some(OutputFormat::Jpg));
        assert_eq!(s.timestamp_mode, TimestampMode::Microsecond);
        assert!(!s.overwrite);
    }

    #[test]
    fn unknown_output_format_defaults_to_png_with_warning() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "a.jpg");
        let parsed =
            parse_options("output_format: tiff\ncrop_zoom(1, 1)\na.jpg", tmp.path()).unwrap();
        assert_eq!(parsed.settings.output_format, Some(OutputFormat::Png));
        assert_eq!(
            parsed.warnings,
            vec![Warning::OutputFormatDefaulted {
                value: "tiff".into()
            }]
        );
    }

    #[test]
    fn unknown_setting_keys_are_ignored() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "a.jpg");
        let parsed =
            parse_options("future_option: 42\ncrop_zoom(1, 1)\na.jpg", tmp.path()).unwrap();
        assert_eq!(parsed.images.len(), 1);
        assert_eq!(parsed.settings, RunSettings::default());
    }

    #[test]
    fn bad_timestamp_mode_is_an_issue() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "a.jpg");
        let err = parse_options("timestamp_mode: 9\ncrop_zoom(1, 1)\na.jpg", tmp.path())
            .unwrap_err();
        assert!(matches!(
            err,
            ParseError::Issues(ref i)
                if matches!(i[0], ParseIssue::MalformedSetting { line: 1, .. })
        ));
    }

    #[test]
    fn missing_output_folder_is_a_validation_error() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "a.jpg");
        let err = parse_options("output_folder: nowhere\ncrop_zoom(1, 1)\na.jpg", tmp.path())
            .unwrap_err();
        assert!(matches!(
            err,
            ParseError::Validation(ValidationError::OutputFolderNotFound(_))
        ));
    }

    // =========================================================================
    // Images and captions
    // =========================================================================

    #[test]
    fn captions_apply_forward_until_cleared() {
        let tmp = TempDir::new().unwrap();
        let a = touch(tmp.path(), "a.jpg");
        let b = touch(tmp.path(), "b.jpg");
        let c = touch(tmp.path(), "c.jpg");
        let d = touch(tmp.path(), "d.jpg");
        let doc = "crop_zoom(1, 1)\na.jpg\n> 'First caption'\nb.jpg\nc.jpg\n>\nd.jpg";
        let parsed = parse_options(doc, tmp.path()).unwrap();
        assert_eq!(
            parsed.images,
            vec![
                ImageTask { source: a, caption: None },
                ImageTask { source: b, caption: Some("First caption".into()) },
                ImageTask { source: c, caption: Some("First caption".into()) },
                ImageTask { source: d, caption: None },
            ]
        );
    }

    #[test]
    fn comments_and_blank_lines_are_skipped() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "a.jpg");
        let doc = "# crop_nothing(1)\n\n   \n#missing.jpg\ncrop_zoom(1, 1)\na.jpg\n";
        let parsed = parse_options(doc, tmp.path()).unwrap();
        assert_eq!(parsed.images.len(), 1);
        assert_eq!(parsed.directives.len(), 1);
    }

    #[test]
    fn missing_images_are_reported_together() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "a.jpg");
        let doc = "crop_zoom(1, 1)\nmissing-1.jpg\na.jpg\nsub/../missing-2.jpg";
        let err = parse_options(doc, tmp.path()).unwrap_err();
        match err {
            ParseError::Issues(issues) => assert_eq!(
                issues,
                vec![
                    ParseIssue::MissingImage {
                        path: tmp.path().join("missing-1.jpg")
                    },
                    ParseIssue::MissingImage {
                        path: tmp.path().join("missing-2.jpg")
                    },
                ]
            ),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn issue_message_lists_every_problem() {
        let err = ParseError::Issues(vec![
            ParseIssue::MissingImage {
                path: PathBuf::from("/x/a.jpg"),
            },
            ParseIssue::UnknownDirective {
                line: 3,
                text: "warp(1)".into(),
            },
        ]);
        let msg = err.to_string();
        assert!(msg.starts_with("2 problem(s)"));
        assert!(msg.contains("File not found: '/x/a.jpg'"));
        assert!(msg.contains("line 3: unknown process instruction 'warp(1)'"));
    }

    #[test]
    fn no_images_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let err = parse_options("crop_zoom(1, 1)\n", tmp.path()).unwrap_err();
        assert!(matches!(err, ParseError::NoImages));
    }

    #[test]
    fn no_instructions_is_an_error() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "a.jpg");
        let err = parse_options("output_format: png\na.jpg", tmp.path()).unwrap_err();
        assert!(matches!(err, ParseError::NoInstructions));
    }

    #[test]
    fn snapshot_text_is_verbatim() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "a.jpg");
        let doc = "# keep me\ncrop_zoom(1, 1)\n'a.jpg'\n";
        let parsed = parse_options(doc, tmp.path()).unwrap();
        assert_eq!(parsed.text, doc);
    }

    // =========================================================================
    // Path resolution
    // =========================================================================

    #[test]
    fn resolve_path_anchors_relative_and_drops_dot_segments() {
        let base = Path::new("/base/dir");
        assert_eq!(resolve_path("./a/../b.jpg", base), PathBuf::from("/base/dir/b.jpg"));
        assert_eq!(resolve_path("/abs/c.jpg", base), PathBuf::from("/abs/c.jpg"));
    }

    #[test]
    fn resolve_path_expands_home() {
        let Some(home) = home_dir() else { return };
        assert_eq!(resolve_path("~/pics/a.jpg", Path::new("/base")), home.join("pics/a.jpg"));
    }
}

//! Shared types used by every stage of a run.
//!
//! The parser builds these once from the options document; the executor and
//! runner only read them. [`Directive`] is the tagged form of a process
//! instruction line, decided at parse time so nothing downstream re-reads the
//! original text.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Width and height of an image, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.width, self.height)
    }
}

/// A crop rectangle. `x2`/`y2` are exclusive, so the box covers
/// `x2 - x1` by `y2 - y1` pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropBox {
    pub x1: u32,
    pub y1: u32,
    pub x2: u32,
    pub y2: u32,
}

impl CropBox {
    pub fn new(x1: u32, y1: u32, x2: u32, y2: u32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    pub fn width(&self) -> u32 {
        self.x2.saturating_sub(self.x1)
    }

    pub fn height(&self) -> u32 {
        self.y2.saturating_sub(self.y1)
    }
}

impl fmt::Display for CropBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {}, {})", self.x1, self.y1, self.x2, self.y2)
    }
}

/// An 8-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Rgb(pub [u8; 3]);

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b] = self.0;
        write!(f, "{r}, {g}, {b}")
    }
}

/// Corner a crop box is anchored to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Corner {
    LeftTop,
    RightTop,
    LeftBottom,
    RightBottom,
}

impl Corner {
    /// Suffix used in the directive name, e.g. `left_top`.
    pub fn as_str(self) -> &'static str {
        match self {
            Corner::LeftTop => "left_top",
            Corner::RightTop => "right_top",
            Corner::LeftBottom => "left_bottom",
            Corner::RightBottom => "right_bottom",
        }
    }
}

/// What shows through outside a rounded mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Background {
    Transparent,
    Solid(Rgb),
}

/// Image numbering appended to footer captions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Numbering {
    #[default]
    None,
    /// `(n)`
    Index,
    /// `(n/total)`
    IndexOfTotal,
}

impl Numbering {
    pub fn from_mode(mode: u32) -> Option<Self> {
        match mode {
            0 => Some(Numbering::None),
            1 => Some(Numbering::Index),
            2 => Some(Numbering::IndexOfTotal),
            _ => None,
        }
    }

    pub fn mode(self) -> u32 {
        match self {
            Numbering::None => 0,
            Numbering::Index => 1,
            Numbering::IndexOfTotal => 2,
        }
    }
}

/// One parsed process instruction.
#[derive(Debug, Clone, PartialEq)]
pub enum Directive {
    CropFromCorner {
        corner: Corner,
        width: u32,
        height: u32,
    },
    CropCenter {
        width: u32,
        height: u32,
    },
    CropZoom {
        width: u32,
        height: u32,
    },
    CropToBox(CropBox),
    /// `color` is `None` for `border(width)`; the style default applies.
    Border {
        width: u32,
        color: Option<Rgb>,
    },
    RoundedMask {
        radius: u32,
        padding: u32,
        background: Background,
    },
    TextFooter {
        font: PathBuf,
        font_size: u32,
        numbering: Numbering,
    },
}

/// Renders the directive back in options-document syntax. Used in warnings.
impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Directive::CropFromCorner {
                corner,
                width,
                height,
            } => write!(f, "crop_from_{}({width}, {height})", corner.as_str()),
            Directive::CropCenter { width, height } => {
                write!(f, "crop_from_center({width}, {height})")
            }
            Directive::CropZoom { width, height } => write!(f, "crop_zoom({width}, {height})"),
            Directive::CropToBox(b) => {
                write!(f, "crop_to_box({}, {}, {}, {})", b.x1, b.y1, b.x2, b.y2)
            }
            Directive::Border { width, color: None } => write!(f, "border({width})"),
            Directive::Border {
                width,
                color: Some(rgb),
            } => write!(f, "border({width}, {rgb})"),
            Directive::RoundedMask {
                radius,
                padding,
                background: Background::Transparent,
            } => write!(f, "rounded({radius}, {padding})"),
            Directive::RoundedMask {
                radius,
                padding,
                background: Background::Solid(rgb),
            } => write!(f, "rounded({radius}, {padding}, {rgb})"),
            Directive::TextFooter {
                font,
                font_size,
                numbering,
            } => write!(
                f,
                "text_footers(\"{}\", {font_size}, {})",
                font.display(),
                numbering.mode()
            ),
        }
    }
}

/// A listed source image and the caption in effect when it was listed.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageTask {
    pub source: PathBuf,
    pub caption: Option<String>,
}

/// Output encoding for still images.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Jpg,
    Png,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Jpg => "jpg",
            OutputFormat::Png => "png",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Jpg => f.write_str("JPG"),
            OutputFormat::Png => f.write_str("PNG"),
        }
    }
}

/// Timestamp appended to output file names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimestampMode {
    #[default]
    None,
    Second,
    Microsecond,
}

/// Global settings for one run.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RunSettings {
    /// Pre-existing output directory. `None` means a fresh `crop_<timestamp>`
    /// directory next to the first image.
    pub output_dir: Option<PathBuf>,
    /// `None` keeps each source file's extension.
    pub output_format: Option<OutputFormat>,
    pub new_name: Option<String>,
    pub timestamp_mode: TimestampMode,
    /// Frame duration for the shared animated GIF; 0 disables it.
    pub gif_frame_ms: u32,
    pub overwrite: bool,
}

impl RunSettings {
    pub fn gif_enabled(&self) -> bool {
        self.gif_frame_ms > 0
    }
}

/// Problems with otherwise well-formed input that make a run impossible.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("output_folder not found: {}", .0.display())]
    OutputFolderNotFound(PathBuf),
    #[error("invalid box coordinates in '{directive}': x2 must be >= x1 and y2 must be >= y1")]
    InvalidBox { directive: String },
    #[error("box in '{directive}' is empty after fitting it to image size {size}")]
    EmptyBox {
        directive: String,
        size: Dimensions,
    },
    #[error("border in '{directive}' is too wide for image size {size}")]
    BorderTooWide {
        directive: String,
        size: Dimensions,
    },
    #[error("footer in '{directive}' would make image size {size} too tall")]
    FooterTooTall {
        directive: String,
        size: Dimensions,
    },
    #[error("cannot load font '{}': {reason}", .path.display())]
    FontUnreadable { path: PathBuf, reason: String },
    #[error("no font size specified in '{directive}'")]
    MissingFontSize { directive: String },
}

/// Non-fatal adjustments reported on the progress stream.
#[derive(Debug, Clone, PartialEq)]
pub enum Warning {
    /// A crop target was larger than the image and was reduced to fit.
    TargetSizeReduced {
        directive: String,
        current: Dimensions,
        adjusted: Dimensions,
        width_reduced: bool,
        height_reduced: bool,
    },
    /// A `crop_to_box` coordinate fell outside the image and was pulled back.
    BoxAdjusted {
        directive: String,
        adjusted: CropBox,
    },
    /// `output_format` named something other than JPG or PNG.
    OutputFormatDefaulted { value: String },
}

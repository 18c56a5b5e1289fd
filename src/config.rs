//! Style configuration.
//!
//! The options document says *what* to do to each image. The few drawing
//! constants it never mentions (footer colors and spacing, the default border
//! color, mask smoothing, JPEG quality) live here and can be overridden with
//! a TOML file passed as `--config`.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [footer]
//! padding = 10                  # Space above and below the caption line (px, 0-10000)
//! text_height_padding = 20      # Added to the estimated line height (px, 0-10000)
//! foreground = [255, 255, 255]  # Caption color
//! background = [25, 25, 112]    # Footer band color
//!
//! [border]
//! color = [25, 25, 112]         # Used by border(width) without a color
//!
//! [mask]
//! blur = 1.0                    # Gaussian sigma smoothing rounded corners
//!
//! [output]
//! jpeg_quality = 75             # 1-100
//! ```
//!
//! ## Partial Configuration
//!
//! Config files are sparse. Override just the values you want:
//!
//! ```toml
//! [footer]
//! background = [0, 0, 0]
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::imaging::{FooterStyle, Quality, RenderStyle};
use crate::types::Rgb;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Upper bound for `footer.padding` and `footer.text_height_padding`.
pub const MAX_FOOTER_PADDING: u32 = 10_000;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Drawing constants for a run. Every field has a default.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StyleConfig {
    /// Caption footer band.
    pub footer: FooterConfig,
    /// Default border color.
    pub border: BorderConfig,
    /// Rounded mask smoothing.
    pub mask: MaskConfig,
    /// Encoder settings.
    pub output: OutputConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FooterConfig {
    pub padding: u32,
    pub text_height_padding: u32,
    pub foreground: Rgb,
    pub background: Rgb,
}

impl Default for FooterConfig {
    fn default() -> Self {
        let style = FooterStyle::default();
        Self {
            padding: style.padding,
            text_height_padding: style.text_height_padding,
            foreground: style.foreground,
            background: style.background,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BorderConfig {
    pub color: Rgb,
}

impl Default for BorderConfig {
    fn default() -> Self {
        Self {
            color: RenderStyle::default().border_color,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MaskConfig {
    pub blur: f32,
}

impl Default for MaskConfig {
    fn default() -> Self {
        Self {
            blur: RenderStyle::default().mask_blur,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    pub jpeg_quality: u32,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            jpeg_quality: Quality::default().value() as u32,
        }
    }
}

impl StyleConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=100).contains(&self.output.jpeg_quality) {
            return Err(ConfigError::Validation(
                "output.jpeg_quality must be 1-100".into(),
            ));
        }
        if self.footer.padding > MAX_FOOTER_PADDING {
            return Err(ConfigError::Validation(format!(
                "footer.padding must be 0-{MAX_FOOTER_PADDING}"
            )));
        }
        if self.footer.text_height_padding > MAX_FOOTER_PADDING {
            return Err(ConfigError::Validation(format!(
                "footer.text_height_padding must be 0-{MAX_FOOTER_PADDING}"
            )));
        }
        if !self.mask.blur.is_finite() || self.mask.blur < 0.0 {
            return Err(ConfigError::Validation(
                "mask.blur must be a non-negative number".into(),
            ));
        }
        Ok(())
    }

    pub fn render_style(&self) -> RenderStyle {
        RenderStyle {
            border_color: self.border.color,
            mask_blur: self.mask.blur,
            footer: FooterStyle {
                padding: self.footer.padding,
                text_height_padding: self.footer.text_height_padding,
                foreground: self.footer.foreground,
                background: self.footer.background,
            },
        }
    }

    pub fn quality(&self) -> Quality {
        Quality::new(self.output.jpeg_quality)
    }
}

/// Parse and validate a style config from TOML text.
pub fn parse_config(content: &str) -> Result<StyleConfig, ConfigError> {
    let config: StyleConfig = toml::from_str(content)?;
    config.validate()?;
    Ok(config)
}

/// Load the style config file, or the defaults when `path` is `None`.
pub fn load_config(path: Option<&Path>) -> Result<StyleConfig, ConfigError> {
    match path {
        Some(path) => parse_config(&fs::read_to_string(path)?),
        None => Ok(StyleConfig::default()),
    }
}

/// Returns a fully-commented stock style config with all keys and explanations.
///
/// Used by the `--print-config` CLI flag.
pub fn stock_config_toml() -> &'static str {
    r##"# image-snip style configuration
# ==============================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Pass this file with --config. Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Caption footer added by text_footers(...)
# ---------------------------------------------------------------------------
[footer]
# Space above and below the caption line, in pixels (0-10000).
padding = 10

# Extra height added to the estimated caption line height, in pixels (0-10000).
text_height_padding = 20

# Caption text color, [r, g, b].
foreground = [255, 255, 255]

# Footer band color, [r, g, b].
background = [25, 25, 112]

# ---------------------------------------------------------------------------
# border(width) without an explicit color
# ---------------------------------------------------------------------------
[border]
color = [25, 25, 112]

# ---------------------------------------------------------------------------
# rounded(...) mask
# ---------------------------------------------------------------------------
[mask]
# Gaussian blur sigma that smooths the rounded corners. 0 disables it.
blur = 1.0

# ---------------------------------------------------------------------------
# Encoding
# ---------------------------------------------------------------------------
[output]
# JPEG quality, 1-100. PNG output is lossless and ignores this.
jpeg_quality = 75
"##
}

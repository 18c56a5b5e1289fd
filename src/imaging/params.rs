//! Encoding parameters passed from the runner to the backend.

/// JPEG encoding quality (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(pub u8);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100) as u8)
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(75)
    }
}

/// One-shot description of the animated GIF to write.
#[derive(Debug, Clone, PartialEq)]
pub struct GifParams {
    pub output: std::path::PathBuf,
    /// Display time of every frame, in milliseconds.
    pub frame_ms: u32,
}

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub mod batch;
pub mod codec;
pub mod compositor;
pub mod error;
pub mod font;
pub mod metadata;
pub mod placement;
pub mod prompt;
pub mod startup_checks;
pub mod style;

pub use error::WatermarkError;

/// Extensions (lowercase, without the dot) the batch driver will process.
pub const SUPPORTED_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub watermark: WatermarkConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WatermarkConfig {
    pub font_family: String,
    /// Explicit font file; when unset the font is looked up by family and weight
    pub font_path: Option<PathBuf>,
    pub font_size: u32,
    pub bold: bool,
    pub color: String,
    pub opacity: u8,
    pub placement: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OutputConfig {
    pub jpeg_quality: u8,
    /// Appended to the input directory name to form the output directory name
    pub suffix: String,
}

impl Default for WatermarkConfig {
    fn default() -> Self {
        Self {
            font_family: style::DEFAULT_FONT_FAMILY.to_string(),
            font_path: None,
            font_size: style::DEFAULT_FONT_SIZE,
            bold: true,
            color: "WHITE".to_string(),
            opacity: style::DEFAULT_OPACITY,
            placement: "BOTTOM_RIGHT".to_string(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            jpeg_quality: 90,
            suffix: "_watermark".to_string(),
        }
    }
}

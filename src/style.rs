use ab_glyph::PxScale;
use image::{Rgb, Rgba};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::WatermarkConfig;

pub const DEFAULT_FONT_FAMILY: &str = "DejaVu Sans";
pub const DEFAULT_FONT_SIZE: u32 = 36;
pub const DEFAULT_OPACITY: u8 = 128;

/// Colours the operator can pick by name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NamedColor {
    Black,
    #[default]
    White,
    Red,
    Green,
    Blue,
    Yellow,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown color '{0}'")]
pub struct UnknownColor(pub String);

impl NamedColor {
    pub const ALL: [NamedColor; 6] = [
        NamedColor::Black,
        NamedColor::White,
        NamedColor::Red,
        NamedColor::Green,
        NamedColor::Blue,
        NamedColor::Yellow,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            NamedColor::Black => "BLACK",
            NamedColor::White => "WHITE",
            NamedColor::Red => "RED",
            NamedColor::Green => "GREEN",
            NamedColor::Blue => "BLUE",
            NamedColor::Yellow => "YELLOW",
        }
    }

    pub fn rgb(&self) -> Rgb<u8> {
        match self {
            NamedColor::Black => Rgb([0, 0, 0]),
            NamedColor::White => Rgb([255, 255, 255]),
            NamedColor::Red => Rgb([255, 0, 0]),
            NamedColor::Green => Rgb([0, 255, 0]),
            NamedColor::Blue => Rgb([0, 0, 255]),
            NamedColor::Yellow => Rgb([255, 255, 0]),
        }
    }
}

impl fmt::Display for NamedColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for NamedColor {
    type Err = UnknownColor;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_uppercase();
        NamedColor::ALL
            .into_iter()
            .find(|c| c.name() == normalized)
            .ok_or_else(|| UnknownColor(s.trim().to_string()))
    }
}

/// How the watermark text looks. Built once per batch.
#[derive(Debug, Clone, PartialEq)]
pub struct WatermarkStyle {
    pub font_family: String,
    pub font_size: u32,
    pub bold: bool,
    pub color: Rgb<u8>,
    pub opacity: u8,
}

impl Default for WatermarkStyle {
    fn default() -> Self {
        Self {
            font_family: DEFAULT_FONT_FAMILY.to_string(),
            font_size: DEFAULT_FONT_SIZE,
            bold: true,
            color: NamedColor::default().rgb(),
            opacity: DEFAULT_OPACITY,
        }
    }
}

impl WatermarkStyle {
    pub fn new(config: &WatermarkConfig, font_size: u32, color: NamedColor) -> Self {
        Self {
            font_family: config.font_family.clone(),
            font_size,
            bold: config.bold,
            color: color.rgb(),
            opacity: config.opacity,
        }
    }

    /// Base colour with the watermark opacity as alpha
    pub fn rgba(&self) -> Rgba<u8> {
        let [r, g, b] = self.color.0;
        Rgba([r, g, b, self.opacity])
    }

    pub fn scale(&self) -> PxScale {
        PxScale::from(self.font_size as f32)
    }
}

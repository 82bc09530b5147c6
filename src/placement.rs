use crate::font::TextMetrics;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Distance in pixels between the text and any edge it is anchored to.
pub const MARGIN: i32 = 10;

/// Where the watermark goes on every image of a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Placement {
    TopLeft,
    TopRight,
    BottomLeft,
    #[default]
    BottomRight,
    Center,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown placement '{0}'")]
pub struct UnknownPlacement(pub String);

impl Placement {
    pub const ALL: [Placement; 5] = [
        Placement::TopLeft,
        Placement::TopRight,
        Placement::BottomLeft,
        Placement::BottomRight,
        Placement::Center,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Placement::TopLeft => "TOP_LEFT",
            Placement::TopRight => "TOP_RIGHT",
            Placement::BottomLeft => "BOTTOM_LEFT",
            Placement::BottomRight => "BOTTOM_RIGHT",
            Placement::Center => "CENTER",
        }
    }

    /// Compute the text origin for an image of `image_width` x `image_height`.
    ///
    /// The returned `y` is the text baseline, not the top of the text box.
    /// Nothing is clamped: text wider than the image yields a negative `x`.
    pub fn resolve(&self, image_width: u32, image_height: u32, text: &TextMetrics) -> (i32, i32) {
        let width = image_width as i32;
        let height = image_height as i32;

        let right = width - text.width - MARGIN;
        let top = text.ascent + MARGIN;
        let bottom = height - text.height + text.ascent - MARGIN;

        match self {
            Placement::TopLeft => (MARGIN, top),
            Placement::TopRight => (right, top),
            Placement::BottomLeft => (MARGIN, bottom),
            Placement::BottomRight => (right, bottom),
            // Baseline at the vertical midpoint plus half a line, unlike the
            // ascent-based corners.
            Placement::Center => ((width - text.width) / 2, (height + text.height) / 2),
        }
    }
}

impl fmt::Display for Placement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Placement {
    type Err = UnknownPlacement;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_uppercase().replace(['-', ' '], "_");
        Placement::ALL
            .into_iter()
            .find(|p| p.name() == normalized)
            .ok_or_else(|| UnknownPlacement(s.trim().to_string()))
    }
}

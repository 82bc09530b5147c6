use ab_glyph::{Font, FontVec, PxScale, ScaleFont};
use imageproc::drawing::text_size;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::{WatermarkConfig, WatermarkError};

const FONT_EXTENSIONS: [&str; 2] = ["ttf", "otf"];

/// Measured size of a rendered string, in whole pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextMetrics {
    pub width: i32,
    /// Line height of the font (ascent + descent + line gap)
    pub height: i32,
    /// Baseline to top of the tallest glyph
    pub ascent: i32,
}

/// File stem a font family is conventionally installed under, e.g.
/// `DejaVu Sans` bold -> `DejaVuSans-Bold`.
pub fn file_stem_for(family: &str, bold: bool) -> String {
    let base: String = family.chars().filter(|c| !c.is_whitespace()).collect();
    if bold { format!("{}-Bold", base) } else { base }
}

/// Directories searched for fonts, most specific first
pub fn search_directories() -> Vec<PathBuf> {
    let mut dirs = vec![PathBuf::from("static"), PathBuf::from("fonts")];

    if let Some(home) = std::env::var_os("HOME") {
        let home = PathBuf::from(home);
        dirs.push(home.join(".local/share/fonts"));
        dirs.push(home.join(".fonts"));
    }

    for dir in [
        "/usr/share/fonts/truetype/dejavu",
        "/usr/share/fonts/dejavu",
        "/usr/share/fonts/TTF",
        "/usr/share/fonts/truetype",
        "/usr/local/share/fonts",
        "/Library/Fonts",
        "/System/Library/Fonts",
        "C:\\Windows\\Fonts",
    ] {
        dirs.push(PathBuf::from(dir));
    }

    dirs
}

/// Find a font file for `family` in `dirs`. A missing bold face falls back to
/// the regular face.
pub fn locate_in(dirs: &[PathBuf], family: &str, bold: bool) -> Option<PathBuf> {
    let preferred = file_stem_for(family, bold);
    let mut stems = vec![preferred.clone()];
    if bold {
        stems.push(file_stem_for(family, false));
    }

    for stem in &stems {
        for dir in dirs {
            for ext in FONT_EXTENSIONS {
                let candidate = dir.join(format!("{}.{}", stem, ext));
                if candidate.is_file() {
                    if *stem != preferred {
                        warn!(
                            "Bold face of '{}' not found, using {:?}",
                            family, candidate
                        );
                    }
                    debug!("Using font {:?}", candidate);
                    return Some(candidate);
                }
            }
        }
    }

    None
}

/// Font file to use for a batch: the configured path if set, otherwise a
/// lookup by family and weight.
pub fn resolve_font_path(config: &WatermarkConfig) -> Option<PathBuf> {
    match &config.font_path {
        Some(path) if path.is_file() => Some(path.clone()),
        Some(path) => {
            warn!("Configured font {:?} does not exist", path);
            None
        }
        None => locate_in(&search_directories(), &config.font_family, config.bold),
    }
}

pub fn load_font(path: &Path) -> Result<FontVec, WatermarkError> {
    let font_data = std::fs::read(path)?;
    FontVec::try_from_vec(font_data)
        .map_err(|e| WatermarkError::Font(format!("{}: {}", path.display(), e)))
}

pub fn measure<F: Font>(font: &F, scale: PxScale, text: &str) -> TextMetrics {
    let (width, _) = text_size(scale, font, text);
    let scaled = font.as_scaled(scale);
    let line_height = scaled.ascent() - scaled.descent() + scaled.line_gap();

    TextMetrics {
        width: width as i32,
        height: line_height.ceil() as i32,
        ascent: scaled.ascent().ceil() as i32,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_file_stem_for() {
        assert_eq!(file_stem_for("DejaVu Sans", true), "DejaVuSans-Bold");
        assert_eq!(file_stem_for("DejaVu Sans", false), "DejaVuSans");
        assert_eq!(file_stem_for("Arial", true), "Arial-Bold");
    }

    #[test]
    fn test_locate_prefers_bold_then_regular() {
        let temp_dir = TempDir::new().unwrap();
        let dirs = vec![temp_dir.path().to_path_buf()];

        assert!(locate_in(&dirs, "Test Sans", true).is_none());

        let regular = temp_dir.path().join("TestSans.ttf");
        std::fs::write(&regular, b"not really a font").unwrap();
        assert_eq!(locate_in(&dirs, "Test Sans", true), Some(regular.clone()));

        let bold = temp_dir.path().join("TestSans-Bold.otf");
        std::fs::write(&bold, b"not really a font").unwrap();
        assert_eq!(locate_in(&dirs, "Test Sans", true), Some(bold));
        assert_eq!(locate_in(&dirs, "Test Sans", false), Some(regular));
    }

    #[test]
    fn test_configured_font_path_must_exist() {
        let config = WatermarkConfig {
            font_path: Some(PathBuf::from("/definitely/missing/font.ttf")),
            ..WatermarkConfig::default()
        };
        assert!(resolve_font_path(&config).is_none());
    }

    #[test]
    fn test_load_font_rejects_garbage() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("broken.ttf");
        std::fs::write(&path, b"garbage").unwrap();
        assert!(matches!(load_font(&path), Err(WatermarkError::Font(_))));
    }

    #[test]
    fn test_measure() {
        // Skip test if no font is installed
        let Some(path) = resolve_font_path(&WatermarkConfig::default()) else {
            return;
        };
        let font = load_font(&path).unwrap();
        let scale = PxScale::from(36.0);

        let short = measure(&font, scale, "2023");
        let long = measure(&font, scale, "2023-05-17");

        assert!(short.width > 0);
        assert!(long.width > short.width);
        assert!(short.ascent > 0);
        assert!(short.height > short.ascent);
        assert_eq!(short.height, long.height);
    }
}

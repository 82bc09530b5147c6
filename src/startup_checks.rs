use ab_glyph::FontVec;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{error, info};

use crate::{WatermarkConfig, font};

/// Problems that stop the tool before any image is touched
#[derive(Debug, Error)]
pub enum StartupCheckError {
    #[error("Input path does not exist: {0}")]
    InputMissing(String),

    #[error("Input path is not a directory: {0}")]
    InputNotDirectory(String),

    #[error("Input path has no directory name: {0}")]
    InputUnnamed(String),

    #[error("Failed to create output directory {path}: {source}")]
    OutputDirectoryCreationFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("No font found for family '{0}'")]
    FontMissing(String),

    #[error("Failed to load font: {0}")]
    FontUnreadable(String),
}

pub fn check_input_directory(input: &Path) -> Result<(), StartupCheckError> {
    if !input.exists() {
        return Err(StartupCheckError::InputMissing(input.display().to_string()));
    }
    if !input.is_dir() {
        return Err(StartupCheckError::InputNotDirectory(
            input.display().to_string(),
        ));
    }
    Ok(())
}

/// `<parent>/<name><suffix>` for an existing input directory
pub fn output_directory_for(input: &Path, suffix: &str) -> Result<PathBuf, StartupCheckError> {
    let absolute = std::fs::canonicalize(input)
        .map_err(|_| StartupCheckError::InputMissing(input.display().to_string()))?;

    let name = absolute
        .file_name()
        .ok_or_else(|| StartupCheckError::InputUnnamed(input.display().to_string()))?;
    let parent = absolute
        .parent()
        .ok_or_else(|| StartupCheckError::InputUnnamed(input.display().to_string()))?;

    let mut output_name = name.to_os_string();
    output_name.push(suffix);
    Ok(parent.join(output_name))
}

/// Validate the input directory and create the output directory next to it.
/// An output directory left over from an earlier run is reused.
pub fn prepare_output_directory(input: &Path, suffix: &str) -> Result<PathBuf, StartupCheckError> {
    check_input_directory(input)?;
    let output_dir = output_directory_for(input, suffix)?;

    if output_dir.is_dir() {
        info!("Output directory exists: {:?}", output_dir);
        return Ok(output_dir);
    }

    info!("Creating output directory: {:?}", output_dir);
    std::fs::create_dir_all(&output_dir).map_err(|source| {
        error!("Failed to create output directory {:?}: {}", output_dir, source);
        StartupCheckError::OutputDirectoryCreationFailed {
            path: output_dir.display().to_string(),
            source,
        }
    })?;

    Ok(output_dir)
}

pub fn load_watermark_font(config: &WatermarkConfig) -> Result<FontVec, StartupCheckError> {
    let path = font::resolve_font_path(config)
        .ok_or_else(|| StartupCheckError::FontMissing(config.font_family.clone()))?;
    info!("Required font found: {:?}", path);

    font::load_font(&path).map_err(|e| StartupCheckError::FontUnreadable(e.to_string()))
}

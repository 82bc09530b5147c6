pub mod jpeg;
pub mod png;

use image::{DynamicImage, ImageDecoder, ImageReader};
use std::path::Path;
use tracing::debug;

use crate::WatermarkError;

/// Output container, chosen from the file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Jpeg,
    Png,
}

/// Lowercased text after the last `.` of the file name. Unlike
/// `Path::extension`, a bare `.png` counts as having extension `png`.
pub fn file_extension(path: &Path) -> Option<String> {
    let name = path.file_name()?.to_str()?.to_lowercase();
    let (_, extension) = name.rsplit_once('.')?;
    Some(extension.to_string())
}

impl OutputFormat {
    pub fn from_path(path: &Path) -> Result<Self, WatermarkError> {
        let extension = file_extension(path).unwrap_or_default();

        match extension.as_str() {
            "jpg" | "jpeg" => Ok(OutputFormat::Jpeg),
            "png" => Ok(OutputFormat::Png),
            _ => Err(WatermarkError::UnsupportedFormat(extension)),
        }
    }
}

/// A decoded raster plus what is needed to write it back faithfully
pub struct LoadedImage {
    pub image: DynamicImage,
    pub icc_profile: Option<Vec<u8>>,
}

impl LoadedImage {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }
}

/// Decode an image, sniffing the format from its content
pub fn load(path: &Path) -> Result<LoadedImage, WatermarkError> {
    let mut decoder = ImageReader::open(path)?
        .with_guessed_format()?
        .into_decoder()?;

    let icc_profile = match decoder.icc_profile() {
        Ok(profile) => profile,
        Err(e) => {
            debug!("Could not read ICC profile from {}: {}", path.display(), e);
            None
        }
    };
    let image = DynamicImage::from_decoder(decoder)?;

    debug!(
        "Loaded {} ({}x{}, {:?})",
        path.display(),
        image.width(),
        image.height(),
        image.color()
    );

    Ok(LoadedImage { image, icc_profile })
}

/// Write `image` to `path` in the format named by its extension
pub fn save(
    image: &DynamicImage,
    path: &Path,
    jpeg_quality: u8,
    icc_profile: Option<&[u8]>,
) -> Result<(), WatermarkError> {
    match OutputFormat::from_path(path)? {
        OutputFormat::Jpeg => jpeg::save_with_profile(image, path, jpeg_quality, icc_profile),
        OutputFormat::Png => png::save_with_profile(image, path, icc_profile),
    }
}

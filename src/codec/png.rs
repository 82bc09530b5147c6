use image::{DynamicImage, ImageEncoder, codecs::png::PngEncoder};
use std::io::BufWriter;
use std::path::Path;
use tracing::debug;

use crate::WatermarkError;

/// Save image as PNG, keeping an alpha channel only if the image has one
pub fn save_with_profile(
    image: &DynamicImage,
    path: &Path,
    icc_profile: Option<&[u8]>,
) -> Result<(), WatermarkError> {
    let output = BufWriter::new(std::fs::File::create(path)?);
    let mut encoder = PngEncoder::new(output);

    if let Some(profile_data) = icc_profile
        && let Err(e) = encoder.set_icc_profile(profile_data.to_vec())
    {
        debug!("PNG encoder rejected ICC profile ({}), writing without", e);
    }

    if image.color().has_alpha() {
        let rgba_image = image.to_rgba8();
        encoder.write_image(
            &rgba_image,
            rgba_image.width(),
            rgba_image.height(),
            image::ExtendedColorType::Rgba8,
        )?;
    } else {
        let rgb_image = image.to_rgb8();
        encoder.write_image(
            &rgb_image,
            rgb_image.width(),
            rgb_image.height(),
            image::ExtendedColorType::Rgb8,
        )?;
    }

    Ok(())
}

use ab_glyph::{Font, FontVec};
use image::{DynamicImage, GrayImage, Luma, Rgba, RgbaImage};
use imageproc::drawing::draw_text_mut;
use tracing::trace;

use crate::font::{self, TextMetrics};
use crate::placement::Placement;
use crate::style::WatermarkStyle;

/// Draw `text` once with its baseline at `origin`, alpha-blending the style
/// colour over the existing pixels.
pub fn draw_watermark<F: Font>(
    canvas: &mut RgbaImage,
    text: &str,
    style: &WatermarkStyle,
    font: &F,
    origin: (i32, i32),
    ascent: i32,
) {
    let (x, baseline) = origin;
    // imageproc positions text by the top of the line box
    let top = baseline - ascent;

    let mut coverage = GrayImage::new(canvas.width(), canvas.height());
    draw_text_mut(&mut coverage, Luma([255]), x, top, style.scale(), font, text);

    let color = style.rgba();
    for (pixel, cov) in canvas.pixels_mut().zip(coverage.pixels()) {
        if cov[0] > 0 {
            source_over(pixel, color, cov[0]);
        }
    }
}

/// Composite `color`, scaled by glyph `coverage`, over `dst`
fn source_over(dst: &mut Rgba<u8>, color: Rgba<u8>, coverage: u8) {
    let src_alpha = (color[3] as f32 / 255.0) * (coverage as f32 / 255.0);
    let dst_alpha = dst[3] as f32 / 255.0;
    let out_alpha = src_alpha + dst_alpha * (1.0 - src_alpha);
    if out_alpha <= 0.0 {
        return;
    }

    for c in 0..3 {
        let blended = (color[c] as f32 * src_alpha
            + dst[c] as f32 * dst_alpha * (1.0 - src_alpha))
            / out_alpha;
        dst[c] = blended.round().clamp(0.0, 255.0) as u8;
    }
    dst[3] = (out_alpha * 255.0).round().clamp(0.0, 255.0) as u8;
}

/// Everything needed to stamp a batch of images the same way
pub struct Watermarker {
    style: WatermarkStyle,
    placement: Placement,
    font: FontVec,
}

impl Watermarker {
    pub fn new(style: WatermarkStyle, placement: Placement, font: FontVec) -> Self {
        Self {
            style,
            placement,
            font,
        }
    }

    pub fn style(&self) -> &WatermarkStyle {
        &self.style
    }

    pub fn placement(&self) -> Placement {
        self.placement
    }

    pub fn measure(&self, text: &str) -> TextMetrics {
        font::measure(&self.font, self.style.scale(), text)
    }

    /// Stamp `text` onto a copy of `image`. The result keeps an alpha channel
    /// only if the input had one.
    pub fn apply(&self, image: &DynamicImage, text: &str) -> DynamicImage {
        let metrics = self.measure(text);
        let origin = self.placement.resolve(image.width(), image.height(), &metrics);
        trace!(
            "Drawing '{}' at {:?} ({:?}, {:?})",
            text, origin, self.placement, metrics
        );

        let mut canvas = image.to_rgba8();
        draw_watermark(
            &mut canvas,
            text,
            &self.style,
            &self.font,
            origin,
            metrics.ascent,
        );

        if image.color().has_alpha() {
            DynamicImage::ImageRgba8(canvas)
        } else {
            DynamicImage::ImageRgb8(DynamicImage::ImageRgba8(canvas).to_rgb8())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::WatermarkConfig;
    use image::{Rgb, RgbImage};

    fn test_watermarker(placement: Placement) -> Option<Watermarker> {
        let path = font::resolve_font_path(&WatermarkConfig::default())?;
        let font = font::load_font(&path).ok()?;
        Some(Watermarker::new(WatermarkStyle::default(), placement, font))
    }

    fn changed_pixels(
        before: &RgbImage,
        after: &RgbImage,
        x_range: std::ops::Range<u32>,
        y_range: std::ops::Range<u32>,
    ) -> usize {
        let mut count = 0;
        for y in y_range {
            for x in x_range.clone() {
                if before.get_pixel(x, y) != after.get_pixel(x, y) {
                    count += 1;
                }
            }
        }
        count
    }

    #[test]
    fn test_source_over_keeps_opaque_destination_opaque() {
        let mut pixel = Rgba([40, 40, 40, 255]);
        source_over(&mut pixel, Rgba([255, 255, 255, 128]), 255);
        assert_eq!(pixel, Rgba([148, 148, 148, 255]));

        for coverage in [1u8, 37, 128, 200, 254] {
            let mut pixel = Rgba([0, 0, 0, 255]);
            source_over(&mut pixel, Rgba([255, 255, 255, 128]), coverage);
            assert_eq!(pixel[3], 255, "coverage {}", coverage);
        }
    }

    #[test]
    fn test_source_over_transparent_destination() {
        let mut pixel = Rgba([0, 0, 0, 0]);
        source_over(&mut pixel, Rgba([255, 0, 0, 128]), 255);
        assert_eq!(pixel, Rgba([255, 0, 0, 128]));

        let mut pixel = Rgba([0, 0, 255, 100]);
        source_over(&mut pixel, Rgba([255, 0, 0, 128]), 0);
        assert_eq!(pixel, Rgba([0, 0, 255, 100]));
    }

    #[test]
    fn test_draw_is_translucent() {
        // Skip test if no font is installed
        let Some(watermarker) = test_watermarker(Placement::TopLeft) else {
            return;
        };

        let mut canvas = RgbaImage::from_pixel(400, 100, Rgba([0, 0, 0, 255]));
        let metrics = watermarker.measure("2023-05-17");
        draw_watermark(
            &mut canvas,
            "2023-05-17",
            watermarker.style(),
            &watermarker.font,
            (10, metrics.ascent + 10),
            metrics.ascent,
        );

        let brightest = canvas.pixels().map(|p| p[0]).max().unwrap();
        assert!(brightest > 100, "text should be drawn, got {}", brightest);
        assert!(brightest < 160, "text should be half transparent, got {}", brightest);
        assert!(canvas.pixels().all(|p| p[3] == 255));
    }

    #[test]
    fn test_apply_bottom_right() {
        // Skip test if no font is installed
        let Some(watermarker) = test_watermarker(Placement::BottomRight) else {
            return;
        };

        let before = RgbImage::from_pixel(400, 300, Rgb([40, 40, 40]));
        let source = DynamicImage::ImageRgb8(before.clone());
        let result = watermarker.apply(&source, "2023-05-17");

        assert!(!result.color().has_alpha());
        assert_eq!((result.width(), result.height()), (400, 300));

        let after = result.to_rgb8();
        let metrics = watermarker.measure("2023-05-17");
        let left = (400 - metrics.width - 10).max(0) as u32;
        let top = (300 - metrics.height - 10).max(0) as u32;

        assert!(changed_pixels(&before, &after, left..390, top..290) > 0);
        assert_eq!(changed_pixels(&before, &after, 0..left, 0..300), 0);
        assert_eq!(changed_pixels(&before, &after, 0..400, 0..top), 0);
    }

    #[test]
    fn test_apply_keeps_alpha_channel() {
        // Skip test if no font is installed
        let Some(watermarker) = test_watermarker(Placement::Center) else {
            return;
        };

        let source = DynamicImage::ImageRgba8(RgbaImage::from_pixel(300, 200, Rgba([0, 0, 0, 255])));
        let result = watermarker.apply(&source, "2023-05-17");
        assert!(result.color().has_alpha());

        let rgba = result.to_rgba8();
        assert!(rgba.pixels().any(|p| p[0] > 100));
        assert!(rgba.pixels().all(|p| p[3] == 255));
    }

    #[test]
    fn test_text_outside_image_is_clipped() {
        // Skip test if no font is installed
        let Some(watermarker) = test_watermarker(Placement::BottomRight) else {
            return;
        };

        // Narrower than the text: x goes negative and nothing panics
        let source = DynamicImage::ImageRgb8(RgbImage::from_pixel(40, 30, Rgb([0, 0, 0])));
        let result = watermarker.apply(&source, "2023-05-17");
        assert_eq!((result.width(), result.height()), (40, 30));
    }
}

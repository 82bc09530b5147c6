use chrono::NaiveDate;
use std::path::Path;
use tracing::{debug, trace};

use crate::WatermarkError;

const PNG_SIGNATURE: &[u8; 8] = b"\x89PNG\r\n\x1a\n";
const JPEG_SOI: &[u8; 2] = b"\xFF\xD8";
const EXIF_HEADER: &[u8; 6] = b"Exif\0\0";

/// Read the capture date (EXIF `DateTimeOriginal`) of an image as `yyyy-MM-dd`.
///
/// `Ok(None)` means the file is a readable container without a usable capture
/// date. Anything that cannot be parsed as an image container is an error.
pub fn read_capture_date(path: &Path) -> Result<Option<String>, WatermarkError> {
    let buffer = std::fs::read(path)?;
    let date = capture_date_from_bytes(&buffer)?;
    if let Some(date) = &date {
        debug!("Capture date of {}: {}", path.display(), date);
    }
    Ok(date.map(|d| d.format("%Y-%m-%d").to_string()))
}

pub fn capture_date_from_bytes(buffer: &[u8]) -> Result<Option<NaiveDate>, WatermarkError> {
    let tiff = if buffer.starts_with(PNG_SIGNATURE) {
        find_png_exif(buffer)
    } else if buffer.starts_with(JPEG_SOI) {
        find_jpeg_exif(buffer)
    } else {
        // Bare TIFF, or something rexif will reject
        Some(buffer)
    };

    let Some(tiff) = tiff else {
        trace!("Container has no EXIF block");
        return Ok(None);
    };

    let exif = rexif::parse_buffer(tiff).map_err(|e| WatermarkError::Metadata(e.to_string()))?;

    Ok(exif
        .entries
        .iter()
        .find(|e| e.tag == rexif::ExifTag::DateTimeOriginal)
        .and_then(|entry| parse_exif_date(entry.value_more_readable.trim())))
}

/// Parse the date part of an EXIF timestamp ("2005:07:30 07:22:46").
pub fn parse_exif_date(value: &str) -> Option<NaiveDate> {
    let date_part = value.split_whitespace().next()?;
    let date_part = date_part.trim_end_matches('\0');

    ["%Y:%m:%d", "%Y-%m-%d", "%Y/%m/%d"]
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(date_part, format).ok())
}

/// Locate the TIFF payload of the first `Exif` APP1 segment. Other APP1
/// segments (XMP) are skipped; the search stops at the start of scan data.
fn find_jpeg_exif(buffer: &[u8]) -> Option<&[u8]> {
    let mut pos = JPEG_SOI.len();

    while pos + 4 <= buffer.len() {
        if buffer[pos] != 0xFF {
            return None;
        }
        let marker = buffer[pos + 1];
        match marker {
            // Fill byte before a marker
            0xFF => {
                pos += 1;
                continue;
            }
            // Markers without a length field
            0x01 | 0xD0..=0xD7 => {
                pos += 2;
                continue;
            }
            // Start of scan, end of image
            0xDA | 0xD9 => return None,
            _ => {}
        }

        let segment_length = u16::from_be_bytes([buffer[pos + 2], buffer[pos + 3]]) as usize;
        let segment_end = pos + 2 + segment_length;
        if segment_length < 2 || segment_end > buffer.len() {
            return None;
        }

        let segment_data = &buffer[pos + 4..segment_end];
        if marker == 0xE1 && segment_data.starts_with(EXIF_HEADER) {
            return Some(&segment_data[EXIF_HEADER.len()..]);
        }

        pos = segment_end;
    }

    None
}

/// Locate the raw TIFF payload of a PNG `eXIf` chunk
fn find_png_exif(buffer: &[u8]) -> Option<&[u8]> {
    let mut pos = PNG_SIGNATURE.len();

    while pos + 12 <= buffer.len() {
        let chunk_length = u32::from_be_bytes([
            buffer[pos],
            buffer[pos + 1],
            buffer[pos + 2],
            buffer[pos + 3],
        ]) as usize;
        let chunk_type = &buffer[pos + 4..pos + 8];
        let data_start = pos + 8;
        let data_end = data_start.checked_add(chunk_length)?;

        if data_end > buffer.len() {
            return None;
        }

        match chunk_type {
            b"eXIf" => return Some(&buffer[data_start..data_end]),
            b"IEND" => return None,
            _ => {}
        }

        // length + type + data + CRC
        pos = data_end + 4;
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_exif_date() {
        assert_eq!(
            parse_exif_date("2023:05:17 10:30:00"),
            NaiveDate::from_ymd_opt(2023, 5, 17)
        );
        assert_eq!(
            parse_exif_date("2005:07:30"),
            NaiveDate::from_ymd_opt(2005, 7, 30)
        );
        assert_eq!(
            parse_exif_date("2019-12-01 23:59:59"),
            NaiveDate::from_ymd_opt(2019, 12, 1)
        );
        assert_eq!(
            parse_exif_date("2019/01/02"),
            NaiveDate::from_ymd_opt(2019, 1, 2)
        );
    }

    #[test]
    fn test_parse_exif_date_rejects_garbage() {
        assert_eq!(parse_exif_date(""), None);
        assert_eq!(parse_exif_date("    :  :     :  :  "), None);
        assert_eq!(parse_exif_date("2023:13:40 00:00:00"), None);
        assert_eq!(parse_exif_date("yesterday"), None);
    }

    #[test]
    fn test_png_without_exif_chunk() {
        let mut png = PNG_SIGNATURE.to_vec();
        // IEND chunk: zero length, type, CRC
        png.extend_from_slice(&[0, 0, 0, 0]);
        png.extend_from_slice(b"IEND");
        png.extend_from_slice(&[0xAE, 0x42, 0x60, 0x82]);

        assert_eq!(find_png_exif(&png), None);
        assert!(matches!(capture_date_from_bytes(&png), Ok(None)));
    }

    #[test]
    fn test_png_chunk_walk_finds_exif() {
        let payload = b"II*\0fake";
        let mut png = PNG_SIGNATURE.to_vec();
        png.extend_from_slice(&(payload.len() as u32).to_be_bytes());
        png.extend_from_slice(b"eXIf");
        png.extend_from_slice(payload);
        png.extend_from_slice(&[0, 0, 0, 0]);

        assert_eq!(find_png_exif(&png), Some(&payload[..]));
    }

    #[test]
    fn test_truncated_png_chunk() {
        let mut png = PNG_SIGNATURE.to_vec();
        png.extend_from_slice(&1000u32.to_be_bytes());
        png.extend_from_slice(b"eXIf");
        png.extend_from_slice(&[0; 8]);

        assert_eq!(find_png_exif(&png), None);
    }

    fn jpeg_with_segments(segments: &[(u8, &[u8])]) -> Vec<u8> {
        let mut jpeg = JPEG_SOI.to_vec();
        for (marker, data) in segments {
            jpeg.extend_from_slice(&[0xFF, *marker]);
            jpeg.extend_from_slice(&((data.len() + 2) as u16).to_be_bytes());
            jpeg.extend_from_slice(data);
        }
        // Start of scan followed by junk that must not be searched
        jpeg.extend_from_slice(&[0xFF, 0xDA, 0x00, 0x02, 0xFF, 0xE1]);
        jpeg.extend_from_slice(&[0xFF, 0xD9]);
        jpeg
    }

    #[test]
    fn test_jpeg_exif_after_xmp_segment() {
        let xmp = b"http://ns.adobe.com/xap/1.0/\0<x:xmpmeta/>";
        let exif = b"Exif\0\0II*\0tiff";
        let jpeg = jpeg_with_segments(&[
            (0xE0, &b"JFIF\0"[..]),
            (0xE1, &xmp[..]),
            (0xE1, &exif[..]),
        ]);

        assert_eq!(find_jpeg_exif(&jpeg), Some(&b"II*\0tiff"[..]));
    }

    #[test]
    fn test_jpeg_with_only_xmp_has_no_capture_date() {
        let xmp = b"http://ns.adobe.com/xap/1.0/\0<x:xmpmeta/>";
        let jpeg = jpeg_with_segments(&[(0xE0, &b"JFIF\0"[..]), (0xE1, &xmp[..])]);

        assert_eq!(find_jpeg_exif(&jpeg), None);
        assert!(matches!(capture_date_from_bytes(&jpeg), Ok(None)));
    }

    #[test]
    fn test_jpeg_segment_walk_stops_on_bad_length() {
        let mut jpeg = JPEG_SOI.to_vec();
        jpeg.extend_from_slice(&[0xFF, 0xE1, 0x40, 0x00]);
        jpeg.extend_from_slice(b"Exif\0\0");

        assert_eq!(find_jpeg_exif(&jpeg), None);
    }

    #[test]
    fn test_unrecognized_container_is_an_error() {
        let result = capture_date_from_bytes(b"this is plainly not an image file");
        assert!(matches!(result, Err(WatermarkError::Metadata(_))));
    }
}

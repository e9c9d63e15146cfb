//! JPEG encoding.
//!
//! Uses the `image` crate's baseline JPEG encoder. JPEG has no alpha
//! channel, so only RGB surfaces are accepted.

use image::codecs::jpeg::JpegEncoder;
use image::ImageEncoder;
use std::io::Cursor;

use super::{check_dimensions, EncodeError};
use crate::format::ImageFormat;
use crate::surface::PixelSurface;

/// Encode an RGB surface to JPEG bytes.
///
/// # Arguments
///
/// * `surface` - RGB surface to encode
/// * `quality` - JPEG quality (1-100, where 100 is highest quality)
///
/// # Quality Guidelines
///
/// * 90-100: High quality, suitable for archival or further editing
/// * 80-90: Good quality, recommended for most uses
/// * 60-80: Medium quality, acceptable for web/social media
/// * Below 60: Low quality, visible artifacts
pub fn encode_jpeg(surface: &PixelSurface, quality: u8) -> Result<Vec<u8>, EncodeError> {
    check_dimensions(surface)?;

    if surface.has_alpha() {
        return Err(EncodeError::UnsupportedChannels {
            format: ImageFormat::Jpeg,
            channels: surface.channels().count(),
        });
    }

    // Clamp quality to valid range (1-100)
    let quality = quality.clamp(1, 100);

    let mut buffer = Cursor::new(Vec::new());
    let encoder = JpegEncoder::new_with_quality(&mut buffer, quality);

    encoder
        .write_image(
            surface.pixels(),
            surface.width(),
            surface.height(),
            surface.channels().color_type(),
        )
        .map_err(|e| EncodeError::EncodingFailed {
            format: ImageFormat::Jpeg,
            message: e.to_string(),
        })?;

    Ok(buffer.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::Channels;

    fn gray(width: u32, height: u32) -> PixelSurface {
        PixelSurface::try_filled(width, height, Channels::Rgb, 128).unwrap()
    }

    #[test]
    fn test_encode_jpeg_basic() {
        let jpeg_bytes = encode_jpeg(&gray(100, 100), 90).unwrap();

        // Check JPEG magic bytes (SOI marker)
        assert_eq!(&jpeg_bytes[0..2], &[0xFF, 0xD8]);

        // Check JPEG ends with EOI marker
        let len = jpeg_bytes.len();
        assert_eq!(&jpeg_bytes[len - 2..], &[0xFF, 0xD9]);
    }

    #[test]
    fn test_encode_jpeg_quality_clamping() {
        // Quality 0 should be clamped to 1
        assert!(encode_jpeg(&gray(10, 10), 0).is_ok());

        // Quality 255 should be clamped to 100
        assert!(encode_jpeg(&gray(10, 10), 255).is_ok());
    }

    #[test]
    fn test_encode_jpeg_zero_width() {
        let img = PixelSurface::try_new(0, 100, Channels::Rgb, vec![]).unwrap();
        assert!(matches!(
            encode_jpeg(&img, 90),
            Err(EncodeError::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn test_encode_jpeg_small_image() {
        // 1x1 pixel image
        let img = PixelSurface::try_new(1, 1, Channels::Rgb, vec![255, 0, 0]).unwrap();
        let jpeg_bytes = encode_jpeg(&img, 90).unwrap();
        assert_eq!(&jpeg_bytes[0..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn test_encode_jpeg_non_square() {
        assert!(encode_jpeg(&gray(200, 50), 90).is_ok());
        assert!(encode_jpeg(&gray(50, 200), 90).is_ok());
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

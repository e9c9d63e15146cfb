//! PNG encoding.

use image::codecs::png::PngEncoder;
use image::ImageEncoder;

use super::{check_dimensions, EncodeError};
use crate::format::ImageFormat;
use crate::surface::PixelSurface;

/// Encode an RGB or RGBA surface to PNG bytes. PNG is lossless, so there is
/// no quality parameter.
pub fn encode_png(surface: &PixelSurface) -> Result<Vec<u8>, EncodeError> {
    check_dimensions(surface)?;

    let mut buffer = Vec::new();
    PngEncoder::new(&mut buffer)
        .write_image(
            surface.pixels(),
            surface.width(),
            surface.height(),
            surface.channels().color_type(),
        )
        .map_err(|e| EncodeError::EncodingFailed {
            format: ImageFormat::Png,
            message: e.to_string(),
        })?;

    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::Channels;

    const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

    #[test]
    fn test_encode_png_signature() {
        let img = PixelSurface::try_filled(8, 8, Channels::Rgba, 64).unwrap();
        let bytes = encode_png(&img).unwrap();
        assert_eq!(&bytes[..8], &PNG_SIGNATURE);
    }

    #[test]
    fn test_encode_png_rgb_and_rgba() {
        for channels in [Channels::Rgb, Channels::Rgba] {
            let img = PixelSurface::try_filled(3, 5, channels, 10).unwrap();
            assert!(encode_png(&img).is_ok());
        }
    }
}

//! WebP encoding.
//!
//! With the `lossy-webp` feature (default) this goes through libwebp via the
//! `webp` crate and honours quality. Without it, the `image` crate's
//! lossless encoder is used and quality is ignored.

use super::{check_dimensions, EncodeError};
use crate::format::ImageFormat;
use crate::surface::PixelSurface;

/// Largest width or height a WebP bitstream can describe.
pub const WEBP_MAX_DIMENSION: u32 = 16383;

/// Encode an RGB or RGBA surface to WebP bytes.
///
/// # Arguments
///
/// * `surface` - Surface to encode; alpha is preserved
/// * `quality` - libwebp quality (0-100)
pub fn encode_webp(surface: &PixelSurface, quality: f32) -> Result<Vec<u8>, EncodeError> {
    check_dimensions(surface)?;

    let (width, height) = surface.dimensions();
    if width > WEBP_MAX_DIMENSION || height > WEBP_MAX_DIMENSION {
        return Err(EncodeError::TooLarge {
            format: ImageFormat::WebP,
            width,
            height,
            max: WEBP_MAX_DIMENSION,
        });
    }

    encode_impl(surface, quality.clamp(0.0, 100.0))
}

#[cfg(feature = "lossy-webp")]
fn encode_impl(surface: &PixelSurface, quality: f32) -> Result<Vec<u8>, EncodeError> {
    use crate::surface::Channels;

    let (width, height) = surface.dimensions();
    let encoder = match surface.channels() {
        Channels::Rgb => webp::Encoder::from_rgb(surface.pixels(), width, height),
        Channels::Rgba => webp::Encoder::from_rgba(surface.pixels(), width, height),
    };
    let memory = encoder
        .encode_simple(false, quality)
        .map_err(|e| EncodeError::EncodingFailed {
            format: ImageFormat::WebP,
            message: format!("{:?}", e),
        })?;
    Ok(memory.to_vec())
}

#[cfg(not(feature = "lossy-webp"))]
fn encode_impl(surface: &PixelSurface, _quality: f32) -> Result<Vec<u8>, EncodeError> {
    use image::codecs::webp::WebPEncoder;
    use image::ImageEncoder;

    let mut buffer = Vec::new();
    WebPEncoder::new_lossless(&mut buffer)
        .write_image(
            surface.pixels(),
            surface.width(),
            surface.height(),
            surface.channels().color_type(),
        )
        .map_err(|e| EncodeError::EncodingFailed {
            format: ImageFormat::WebP,
            message: e.to_string(),
        })?;
    Ok(buffer)
}

//! Image encoding pipeline for tinypix.
//!
//! This module provides functionality for:
//! - Encoding surfaces to JPEG, PNG or WebP
//! - Mapping the `(0, 1]` quality knob onto each codec's own scale
//!
//! Encoders are stateless and delegate to the `image` crate (JPEG, PNG) and
//! to libwebp through the `webp` crate (lossy WebP). Without the
//! `lossy-webp` feature WebP falls back to the `image` crate's lossless
//! encoder and quality is ignored.
//!
//! Quality bounds are the caller's contract: values are clamped into the
//! codec's range, not rejected.

mod jpeg;
mod png;
mod webp;

use thiserror::Error;

use crate::format::ImageFormat;
use crate::surface::PixelSurface;

pub use jpeg::encode_jpeg;
pub use png::encode_png;
pub use webp::{encode_webp, WEBP_MAX_DIMENSION};

/// Errors that can occur during encoding.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// Width or height is zero
    #[error("Invalid dimensions: width ({width}) and height ({height}) must be non-zero")]
    InvalidDimensions { width: u32, height: u32 },

    /// The codec cannot represent an image this large.
    #[error("{format} cannot encode a {width}x{height} image (maximum {max} pixels per side)")]
    TooLarge {
        format: ImageFormat,
        width: u32,
        height: u32,
        max: u32,
    },

    /// The codec does not accept this channel layout.
    #[error("{format} cannot encode {channels}-channel pixel data")]
    UnsupportedChannels { format: ImageFormat, channels: usize },

    /// The codec itself failed.
    #[error("{format} encoding failed: {message}")]
    EncodingFailed {
        format: ImageFormat,
        message: String,
    },
}

/// A compressed image and the dimensions it was encoded at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub format: ImageFormat,
}

impl EncodedImage {
    pub fn byte_size(&self) -> usize {
        self.bytes.len()
    }
}

/// Quality in `(0, 1]` as a JPEG quality in `1..=100`.
pub fn jpeg_quality(quality: f32) -> u8 {
    (quality * 100.0).round().clamp(1.0, 100.0) as u8
}

/// Quality in `(0, 1]` as a libwebp quality in `0.0..=100.0`.
pub fn webp_quality(quality: f32) -> f32 {
    (quality * 100.0).clamp(0.0, 100.0)
}

pub(crate) fn check_dimensions(surface: &PixelSurface) -> Result<(), EncodeError> {
    if surface.is_empty() {
        return Err(EncodeError::InvalidDimensions {
            width: surface.width(),
            height: surface.height(),
        });
    }
    Ok(())
}

/// Encode `surface` to `format` at `quality`.
///
/// JPEG requires an RGB surface; run alpha-bearing surfaces through
/// [`prepare_for_format`](crate::composite::prepare_for_format) first. PNG
/// is lossless and ignores quality.
pub fn encode(
    surface: &PixelSurface,
    format: ImageFormat,
    quality: f32,
) -> Result<EncodedImage, EncodeError> {
    let bytes = match format {
        ImageFormat::Jpeg => encode_jpeg(surface, jpeg_quality(quality))?,
        ImageFormat::Png => encode_png(surface)?,
        ImageFormat::WebP => encode_webp(surface, webp_quality(quality))?,
    };
    Ok(EncodedImage {
        bytes,
        width: surface.width(),
        height: surface.height(),
        format,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::decode_source;
    use crate::surface::Channels;

    fn gradient(width: u32, height: u32) -> PixelSurface {
        let mut pixels = Vec::with_capacity((width * height * 3) as usize);
        for y in 0..height {
            for x in 0..width {
                pixels.push((x * 255 / width) as u8);
                pixels.push((y * 255 / height) as u8);
                pixels.push(((x + y) * 127 / (width + height)) as u8);
            }
        }
        PixelSurface::try_new(width, height, Channels::Rgb, pixels).unwrap()
    }

    #[test]
    fn test_quality_mapping() {
        assert_eq!(jpeg_quality(0.8), 80);
        assert_eq!(jpeg_quality(1.0), 100);
        assert_eq!(jpeg_quality(0.0), 1);
        assert_eq!(jpeg_quality(0.004), 1);
        assert!((webp_quality(0.8) - 80.0).abs() < 1e-3);
        assert_eq!(webp_quality(1.5), 100.0);
    }

    #[test]
    fn test_encode_all_formats_decode_back() {
        let img = gradient(64, 48);
        for format in ImageFormat::ALL {
            let encoded = encode(&img, format, 0.8).unwrap();
            assert_eq!((encoded.width, encoded.height), (64, 48));
            assert_eq!(encoded.format, format);

            let decoded = decode_source(&encoded.bytes).unwrap();
            assert_eq!(decoded.format, format);
            assert_eq!(decoded.surface.dimensions(), (64, 48));
        }
    }

    #[test]
    fn test_png_is_lossless() {
        let img = gradient(20, 10);
        let encoded = encode(&img, ImageFormat::Png, 0.1).unwrap();
        let decoded = decode_source(&encoded.bytes).unwrap();
        assert_eq!(decoded.surface, img);
    }

    #[test]
    fn test_jpeg_rejects_alpha() {
        let img = PixelSurface::try_filled(4, 4, Channels::Rgba, 200).unwrap();
        assert!(matches!(
            encode(&img, ImageFormat::Jpeg, 0.8),
            Err(EncodeError::UnsupportedChannels { channels: 4, .. })
        ));
    }

    #[test]
    fn test_empty_surface_rejected() {
        let img = PixelSurface::try_new(0, 0, Channels::Rgb, vec![]).unwrap();
        for format in ImageFormat::ALL {
            assert!(matches!(
                encode(&img, format, 0.8),
                Err(EncodeError::InvalidDimensions { .. })
            ));
        }
    }

    #[test]
    fn test_error_display() {
        let err = EncodeError::EncodingFailed {
            format: ImageFormat::WebP,
            message: "boom".to_string(),
        };
        assert_eq!(err.to_string(), "image/webp encoding failed: boom");
    }
}

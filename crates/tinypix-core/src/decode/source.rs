//! Source validation, probing and decoding.

use std::io::Cursor;

use image::ImageReader;

use super::{DecodeError, DecodedSource, SourceInfo, MAX_SOURCE_BYTES};
use crate::format::ImageFormat;
use crate::surface::PixelSurface;

/// Check a candidate source by its declared MIME type and byte size.
///
/// # Errors
///
/// Returns `DecodeError::UnsupportedFormat` for anything but JPEG, PNG or
/// WebP and `DecodeError::TooLarge` above [`MAX_SOURCE_BYTES`].
pub fn validate_source(mime: &str, size: u64) -> Result<ImageFormat, DecodeError> {
    let format = ImageFormat::from_mime_type(mime).ok_or_else(|| {
        DecodeError::UnsupportedFormat(if mime.is_empty() {
            "unknown".to_string()
        } else {
            mime.to_string()
        })
    })?;
    if size > MAX_SOURCE_BYTES {
        return Err(DecodeError::TooLarge {
            size,
            max: MAX_SOURCE_BYTES,
        });
    }
    Ok(format)
}

fn reader(bytes: &[u8]) -> Result<(ImageReader<Cursor<&[u8]>>, ImageFormat), DecodeError> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| DecodeError::CorruptedFile(e.to_string()))?;
    let format = reader
        .format()
        .and_then(ImageFormat::from_image_format)
        .ok_or(DecodeError::InvalidFormat)?;
    Ok((reader, format))
}

/// Read the format and dimensions of a source without decoding its pixels.
pub fn probe(bytes: &[u8]) -> Result<SourceInfo, DecodeError> {
    let (reader, format) = reader(bytes)?;
    let (width, height) = reader
        .into_dimensions()
        .map_err(|e| DecodeError::CorruptedFile(e.to_string()))?;
    Ok(SourceInfo {
        format,
        width,
        height,
    })
}

/// Decode JPEG, PNG or WebP bytes into a pixel surface.
///
/// The format is detected from the content, not from any declared type.
///
/// # Errors
///
/// Returns `DecodeError::InvalidFormat` if the bytes are not one of the
/// supported formats and `DecodeError::CorruptedFile` if decoding fails.
pub fn decode_source(bytes: &[u8]) -> Result<DecodedSource, DecodeError> {
    let (reader, format) = reader(bytes)?;
    let img = reader
        .decode()
        .map_err(|e| DecodeError::CorruptedFile(e.to_string()))?;
    Ok(DecodedSource {
        format,
        surface: PixelSurface::from_dynamic(img),
    })
}

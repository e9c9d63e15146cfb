//! Core types for source decoding.

use thiserror::Error;

use crate::format::ImageFormat;
use crate::surface::PixelSurface;

/// Largest source file accepted: 100 MiB.
pub const MAX_SOURCE_BYTES: u64 = 100 * 1024 * 1024;

/// Error types for source decoding operations.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The bytes are not in a recognized format.
    #[error("Invalid or unsupported image format")]
    InvalidFormat,

    /// The declared MIME type is not one of JPEG, PNG or WebP.
    #[error("Unsupported format: {0}. Only JPEG, PNG and WebP are supported")]
    UnsupportedFormat(String),

    /// The source is above [`MAX_SOURCE_BYTES`].
    #[error("File too large: {size} bytes (maximum {max} bytes)")]
    TooLarge { size: u64, max: u64 },

    /// The image file is corrupted or incomplete.
    #[error("Corrupted or incomplete image file: {0}")]
    CorruptedFile(String),
}

/// Format and dimensions of a source, read from its header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceInfo {
    pub format: ImageFormat,
    pub width: u32,
    pub height: u32,
}

/// A fully decoded source.
#[derive(Debug, Clone)]
pub struct DecodedSource {
    pub format: ImageFormat,
    pub surface: PixelSurface,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_error_display() {
        let err = DecodeError::UnsupportedFormat("image/gif".to_string());
        assert_eq!(
            err.to_string(),
            "Unsupported format: image/gif. Only JPEG, PNG and WebP are supported"
        );

        let err = DecodeError::InvalidFormat;
        assert_eq!(err.to_string(), "Invalid or unsupported image format");
    }
}

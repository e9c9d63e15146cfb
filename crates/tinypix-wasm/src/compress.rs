//! Compression WASM bindings.
//!
//! Runs one compression task synchronously. In the browser these are called
//! from a Web Worker, which plays the part of the isolated execution
//! context; the host keeps the worklist and the generation check.
//!
//! ```typescript
//! import { compress_pixels } from '@tinypix/wasm';
//!
//! const bitmap = await createImageBitmap(file);
//! const { data } = ctx.getImageData(0, 0, bitmap.width, bitmap.height);
//! const out = compress_pixels(data, bitmap.width, bitmap.height, {
//!   quality: 0.8, maxWidth: 1200, outputFormat: 'image/webp', sourceType: file.type,
//! });
//! const blob = new Blob([out.bytes()], { type: out.mimeType });
//! ```

use crate::types::{JsCompressOptions, JsCompressedImage};
use tinypix_core::{
    probe, transcode, transcode_source, validate_source, Channels, EncodedImage, PixelSurface,
    ResampleStrategy,
};
use wasm_bindgen::prelude::*;

/// Compress RGBA pixel data, e.g. from `ImageData`.
///
/// # Arguments
///
/// * `pixels` - RGBA pixel data (4 bytes per pixel, row-major order)
/// * `width` - Image width in pixels
/// * `height` - Image height in pixels
/// * `options` - `{ quality?, maxWidth?, outputFormat?, sourceType? }`
#[wasm_bindgen]
pub fn compress_pixels(
    pixels: Vec<u8>,
    width: u32,
    height: u32,
    options: JsValue,
) -> Result<JsCompressedImage, JsValue> {
    let options = parse_options(options)?;
    compress_rgba(pixels, width, height, &options)
        .map(JsCompressedImage::from)
        .map_err(|e| JsValue::from_str(&e))
}

/// Decode and compress an encoded JPEG, PNG or WebP file.
#[wasm_bindgen]
pub fn compress_file(bytes: &[u8], options: JsValue) -> Result<JsCompressedImage, JsValue> {
    let options = parse_options(options)?;
    compress_encoded(bytes, &options)
        .map(JsCompressedImage::from)
        .map_err(|e| JsValue::from_str(&e))
}

fn parse_options(options: JsValue) -> Result<JsCompressOptions, JsValue> {
    if options.is_undefined() || options.is_null() {
        return Ok(JsCompressOptions::default());
    }
    serde_wasm_bindgen::from_value(options)
        .map_err(|e| JsValue::from_str(&format!("Invalid compression options: {}", e)))
}

pub(crate) fn compress_rgba(
    pixels: Vec<u8>,
    width: u32,
    height: u32,
    options: &JsCompressOptions,
) -> Result<EncodedImage, String> {
    let settings = options.settings()?;
    let source = options.source_format()?;
    let surface =
        PixelSurface::try_new(width, height, Channels::Rgba, pixels).map_err(|e| e.to_string())?;
    transcode(surface, &settings.params_for(source), ResampleStrategy::Area)
        .map_err(|e| e.to_string())
}

pub(crate) fn compress_encoded(
    bytes: &[u8],
    options: &JsCompressOptions,
) -> Result<EncodedImage, String> {
    let settings = options.settings()?;
    let info = probe(bytes).map_err(|e| e.to_string())?;
    validate_source(info.format.mime_type(), bytes.len() as u64).map_err(|e| e.to_string())?;
    transcode_source(bytes, &settings.params_for(info.format), ResampleStrategy::Area)
        .map_err(|e| e.to_string())
}

/// Tests for compress bindings.
///
/// Functions returning `Result<T, JsValue>` only work on wasm32 targets, so
/// host tests go through the inner helpers.
#[cfg(test)]
mod tests {
    use super::*;
    use tinypix_core::decode::MAX_SOURCE_BYTES;
    use tinypix_core::{ImageFormat, OutputFormat};

    fn options(max_width: u32, output_format: OutputFormat) -> JsCompressOptions {
        JsCompressOptions {
            quality: Some(0.8),
            max_width: Some(max_width),
            output_format: Some(output_format),
            source_type: None,
        }
    }

    #[test]
    fn test_compress_rgba_to_jpeg() {
        let pixels = vec![0u8; 40 * 20 * 4];
        let out = compress_rgba(pixels, 40, 20, &options(20, OutputFormat::Jpeg)).unwrap();
        assert_eq!((out.width, out.height), (20, 10));
        assert_eq!(out.format, ImageFormat::Jpeg);
        assert_eq!(&out.bytes[0..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn test_compress_rgba_preserve_defaults_to_png() {
        let pixels = vec![90u8; 8 * 8 * 4];
        let out = compress_rgba(pixels, 8, 8, &options(0, OutputFormat::PreserveOriginal)).unwrap();
        assert_eq!(out.format, ImageFormat::Png);
    }

    #[test]
    fn test_compress_rgba_wrong_length() {
        let result = compress_rgba(vec![0u8; 10], 8, 8, &options(0, OutputFormat::WebP));
        assert!(result.is_err());
    }

    #[test]
    fn test_compress_encoded_keeps_source_format() {
        let pixels = vec![200u8; 30 * 10 * 4];
        let preserve = options(0, OutputFormat::PreserveOriginal);
        let png = compress_rgba(pixels, 30, 10, &preserve).unwrap();
        let out =
            compress_encoded(&png.bytes, &options(15, OutputFormat::PreserveOriginal)).unwrap();
        assert_eq!(out.format, ImageFormat::Png);
        assert_eq!((out.width, out.height), (15, 5));
    }

    #[test]
    fn test_compress_encoded_rejects_oversized_source() {
        let preserve = options(0, OutputFormat::PreserveOriginal);
        let png = compress_rgba(vec![1u8; 4 * 4 * 4], 4, 4, &preserve).unwrap();

        // A valid header followed by padding past the size limit.
        let mut bytes = png.bytes;
        bytes.resize(MAX_SOURCE_BYTES as usize + 1, 0);
        let err = compress_encoded(&bytes, &preserve).unwrap_err();
        assert!(err.starts_with("File too large"), "{}", err);
    }

    #[test]
    fn test_compress_encoded_garbage() {
        assert!(compress_encoded(&[0, 1, 2], &JsCompressOptions::default()).is_err());
    }
}

/// WASM-specific tests that require JsValue.
#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_compress_pixels_default_options() {
        let pixels = vec![128u8; 16 * 16 * 4];
        let out = compress_pixels(pixels, 16, 16, JsValue::UNDEFINED).unwrap();
        assert_eq!(out.mime_type(), "image/webp");
        assert_eq!(out.width(), 16);
    }

    #[wasm_bindgen_test]
    fn test_compress_pixels_with_options() {
        let options = serde_wasm_bindgen::to_value(&JsCompressOptions {
            quality: Some(0.6),
            max_width: Some(8),
            output_format: Some(tinypix_core::OutputFormat::Jpeg),
            source_type: None,
        })
        .unwrap();
        let out = compress_pixels(vec![0u8; 16 * 16 * 4], 16, 16, options).unwrap();
        assert_eq!(out.mime_type(), "image/jpeg");
        assert_eq!((out.width(), out.height()), (8, 8));
    }

    #[wasm_bindgen_test]
    fn test_compress_pixels_invalid_options() {
        let result = compress_pixels(vec![0u8; 4], 1, 1, JsValue::from_str("nope"));
        assert!(result.is_err());
    }
}

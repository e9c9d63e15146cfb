//! WASM-compatible wrapper types for compression options and results.

use serde::{Deserialize, Serialize};
use tinypix_core::{EncodedImage, ImageFormat, OutputFormat, Settings};
use wasm_bindgen::prelude::*;

/// Options object passed from TypeScript, decoded with serde_wasm_bindgen.
///
/// Every field is optional; missing fields take the core defaults.
///
/// ```typescript
/// { quality: 0.8, maxWidth: 1200, outputFormat: 'image/webp', sourceType: 'image/png' }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct JsCompressOptions {
    pub quality: Option<f32>,
    /// `0` means no limit.
    pub max_width: Option<u32>,
    pub output_format: Option<OutputFormat>,
    /// MIME type of the original file, used by `outputFormat: 'original'`
    /// for raw pixel input.
    pub source_type: Option<String>,
}

impl JsCompressOptions {
    pub(crate) fn settings(&self) -> Result<Settings, String> {
        let mut settings = Settings::default();
        if let Some(quality) = self.quality {
            settings.quality = quality;
        }
        settings.set_max_width(self.max_width);
        if let Some(output_format) = self.output_format {
            settings.output_format = output_format;
        }
        settings.validate().map_err(|e| e.to_string())?;
        Ok(settings)
    }

    /// Source format for raw pixels: the declared type, else PNG so that
    /// `original` keeps alpha.
    pub(crate) fn source_format(&self) -> Result<ImageFormat, String> {
        match self.source_type.as_deref() {
            None => Ok(ImageFormat::Png),
            Some(mime) => ImageFormat::from_mime_type(mime)
                .ok_or_else(|| format!("Unsupported source type: {}", mime)),
        }
    }
}

/// A compressed image handed back to JavaScript.
#[wasm_bindgen]
pub struct JsCompressedImage {
    width: u32,
    height: u32,
    format: ImageFormat,
    bytes: Vec<u8>,
}

#[wasm_bindgen]
impl JsCompressedImage {
    /// Output width in pixels
    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Output height in pixels
    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// MIME type of the encoded bytes, e.g. `image/webp`
    #[wasm_bindgen(getter, js_name = mimeType)]
    pub fn mime_type(&self) -> String {
        self.format.mime_type().to_string()
    }

    #[wasm_bindgen(getter, js_name = byteLength)]
    pub fn byte_length(&self) -> usize {
        self.bytes.len()
    }

    /// Encoded bytes as a Uint8Array.
    ///
    /// Note: This copies out of WASM memory.
    pub fn bytes(&self) -> Vec<u8> {
        self.bytes.clone()
    }

    /// Explicitly free WASM memory.
    pub fn free(self) {}
}

impl From<EncodedImage> for JsCompressedImage {
    fn from(image: EncodedImage) -> Self {
        Self {
            width: image.width,
            height: image.height,
            format: image.format,
            bytes: image.bytes,
        }
    }
}

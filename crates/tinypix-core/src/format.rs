//! Image formats and the small presentation helpers built on them.

use serde::{Deserialize, Serialize};

use crate::settings::OutputFormat;

/// A concrete compressed image format, identified by its MIME type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ImageFormat {
    #[serde(rename = "image/jpeg")]
    Jpeg,
    #[serde(rename = "image/png")]
    Png,
    #[serde(rename = "image/webp")]
    WebP,
}

impl ImageFormat {
    /// All formats accepted as sources and produced as outputs.
    pub const ALL: [ImageFormat; 3] = [ImageFormat::Jpeg, ImageFormat::Png, ImageFormat::WebP];

    pub fn mime_type(self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Png => "image/png",
            ImageFormat::WebP => "image/webp",
        }
    }

    pub fn from_mime_type(mime: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.mime_type() == mime)
    }

    /// Map the `image` crate's detected format onto the supported set.
    pub fn from_image_format(format: image::ImageFormat) -> Option<Self> {
        match format {
            image::ImageFormat::Jpeg => Some(ImageFormat::Jpeg),
            image::ImageFormat::Png => Some(ImageFormat::Png),
            image::ImageFormat::WebP => Some(ImageFormat::WebP),
            _ => None,
        }
    }

    /// Formats that cannot store transparency and need a background fill.
    #[inline]
    pub fn is_opaque(self) -> bool {
        matches!(self, ImageFormat::Jpeg)
    }

    /// File extension including the leading dot.
    pub fn extension(self) -> &'static str {
        match self {
            ImageFormat::Jpeg => ".jpg",
            ImageFormat::Png => ".png",
            ImageFormat::WebP => ".webp",
        }
    }
}

impl std::fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.mime_type())
    }
}

/// Extension for an output MIME type; unknown types fall back to `.jpg`.
pub fn output_extension(mime: &str) -> &'static str {
    ImageFormat::from_mime_type(mime)
        .map(ImageFormat::extension)
        .unwrap_or(".jpg")
}

/// Replace the extension of `original_name` with the one the output will have.
pub fn output_file_name(original_name: &str, output: OutputFormat, source: ImageFormat) -> String {
    let base = strip_extension(original_name);
    format!("{}{}", base, output.resolve(source).extension())
}

fn strip_extension(name: &str) -> &str {
    match name.rfind('.') {
        Some(dot) if dot + 1 < name.len() && !name[dot + 1..].contains('/') => &name[..dot],
        _ => name,
    }
}

const SIZE_UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];

/// Human readable byte count, e.g. `1.5 MB`.
pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 B".to_string();
    }
    let mut unit = 0;
    let mut value = bytes as f64;
    while value >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} {}", bytes, SIZE_UNITS[0])
    } else {
        format!("{:.1} {}", value, SIZE_UNITS[unit])
    }
}

/// Size change as a signed percentage, e.g. `-63%` for a saving and `+4%`
/// when the output grew.
pub fn format_compression_ratio(original: u64, compressed: u64) -> String {
    if original == 0 {
        return "0%".to_string();
    }
    let ratio = (original as f64 - compressed as f64) / original as f64 * 100.0;
    let rounded = ratio.round() as i64;
    if rounded < 0 {
        format!("+{}%", -rounded)
    } else {
        format!("-{}%", rounded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mime_round_trip() {
        for format in ImageFormat::ALL {
            assert_eq!(ImageFormat::from_mime_type(format.mime_type()), Some(format));
        }
        assert_eq!(ImageFormat::from_mime_type("image/gif"), None);
    }

    #[test]
    fn test_from_image_format() {
        assert_eq!(
            ImageFormat::from_image_format(image::ImageFormat::Png),
            Some(ImageFormat::Png)
        );
        assert_eq!(ImageFormat::from_image_format(image::ImageFormat::Gif), None);
    }

    #[test]
    fn test_only_jpeg_is_opaque() {
        assert!(ImageFormat::Jpeg.is_opaque());
        assert!(!ImageFormat::Png.is_opaque());
        assert!(!ImageFormat::WebP.is_opaque());
    }

    #[test]
    fn test_output_extension() {
        assert_eq!(output_extension("image/webp"), ".webp");
        assert_eq!(output_extension("image/jpeg"), ".jpg");
        assert_eq!(output_extension("image/png"), ".png");
        assert_eq!(output_extension("application/zip"), ".jpg");
    }

    #[test]
    fn test_output_file_name() {
        assert_eq!(
            output_file_name("holiday.png", OutputFormat::WebP, ImageFormat::Png),
            "holiday.webp"
        );
        assert_eq!(
            output_file_name("scan.final.jpeg", OutputFormat::PreserveOriginal, ImageFormat::Jpeg),
            "scan.final.jpg"
        );
        assert_eq!(
            output_file_name("noext", OutputFormat::Jpeg, ImageFormat::Png),
            "noext.jpg"
        );
        assert_eq!(
            output_file_name("trailing.", OutputFormat::Jpeg, ImageFormat::Png),
            "trailing..jpg"
        );
    }

    #[test]
    fn test_format_file_size() {
        assert_eq!(format_file_size(0), "0 B");
        assert_eq!(format_file_size(512), "512 B");
        assert_eq!(format_file_size(1536), "1.5 KB");
        assert_eq!(format_file_size(5 * 1024 * 1024), "5.0 MB");
        assert_eq!(format_file_size(3 * 1024 * 1024 * 1024), "3.0 GB");
        assert_eq!(format_file_size(4096 * 1024 * 1024 * 1024), "4096.0 GB");
    }

    #[test]
    fn test_format_compression_ratio() {
        assert_eq!(format_compression_ratio(0, 10), "0%");
        assert_eq!(format_compression_ratio(1000, 370), "-63%");
        assert_eq!(format_compression_ratio(1000, 1000), "-0%");
        assert_eq!(format_compression_ratio(1000, 1040), "+4%");
    }
}

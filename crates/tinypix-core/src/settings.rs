//! Global compression settings and compressor configuration.
//!
//! [`Settings`] are shared by every image in the worklist; changing them
//! re-submits the whole worklist. [`CompressorConfig`] holds the knobs that
//! are fixed for the lifetime of a [`Compressor`](crate::dispatch::Compressor).
//! Both are plain serde types so hosts can persist them as JSON.

use std::num::NonZeroU32;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::format::ImageFormat;
use crate::resample::ResampleStrategy;
use crate::transcode::CompressionParams;

/// Errors raised while loading or validating settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// Quality must lie in `(0, 1]`.
    #[error("Invalid quality {0}: expected a value in (0, 1]")]
    InvalidQuality(f32),

    /// JSON could not be parsed or produced.
    #[error("Settings parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Output format selection. `PreserveOriginal` re-encodes into the source's
/// own format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OutputFormat {
    #[serde(rename = "original")]
    PreserveOriginal,
    #[default]
    #[serde(rename = "image/webp")]
    WebP,
    #[serde(rename = "image/jpeg")]
    Jpeg,
}

impl OutputFormat {
    /// The concrete format an image of `source` format will be encoded to.
    pub fn resolve(self, source: ImageFormat) -> ImageFormat {
        match self {
            OutputFormat::PreserveOriginal => source,
            OutputFormat::WebP => ImageFormat::WebP,
            OutputFormat::Jpeg => ImageFormat::Jpeg,
        }
    }
}

/// Compression settings applied to every image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Encoder quality in `(0, 1]`, forwarded to the codec.
    pub quality: f32,
    /// Images wider than this are downsampled to exactly this width.
    pub max_width: Option<NonZeroU32>,
    pub output_format: OutputFormat,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            quality: 0.8,
            max_width: None,
            output_format: OutputFormat::WebP,
        }
    }
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if !(self.quality > 0.0 && self.quality <= 1.0) {
            return Err(SettingsError::InvalidQuality(self.quality));
        }
        Ok(())
    }

    /// Set the maximum width; `0` clears the limit.
    pub fn set_max_width(&mut self, max_width: Option<u32>) {
        self.max_width = max_width.and_then(NonZeroU32::new);
    }

    /// Resolve these settings into per-task parameters for an image of
    /// `source` format.
    pub fn params_for(&self, source: ImageFormat) -> CompressionParams {
        CompressionParams {
            quality: self.quality,
            max_width: self.max_width,
            output_format: self.output_format.resolve(source),
        }
    }

    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Default debounce window for settings changes.
pub const DEFAULT_DEBOUNCE_MS: u64 = 500;

/// Construction-time configuration of a compressor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompressorConfig {
    /// Settings changes within this window are coalesced into one wave.
    pub debounce_ms: u64,
    /// Downsampling strategy used by the worker.
    pub resample: ResampleStrategy,
    /// Thread name of the worker.
    pub worker_name: String,
}

impl Default for CompressorConfig {
    fn default() -> Self {
        Self {
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            resample: ResampleStrategy::default(),
            worker_name: "tinypix-worker".to_string(),
        }
    }
}

impl CompressorConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

//! The single-task compression pipeline.
//!
//! `surface -> (scale < 1 ? downsample : passthrough) -> (opaque target ?
//! flatten) -> encode`. Everything here is synchronous and pure; the
//! dispatcher runs it on the worker thread.

use std::num::NonZeroU32;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::composite::prepare_for_format;
use crate::decode::{decode_source, DecodeError};
use crate::encode::{encode, EncodeError, EncodedImage};
use crate::format::ImageFormat;
use crate::resample::{downsample, scale_for_max_width, ResampleError, ResampleStrategy};
use crate::surface::{PixelSurface, SurfaceError};

/// Parameters for one task, with the output format already resolved.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompressionParams {
    /// Encoder quality in `(0, 1]`.
    pub quality: f32,
    pub max_width: Option<NonZeroU32>,
    pub output_format: ImageFormat,
}

/// Coarse error classification carried on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    Decode,
    SurfaceAllocation,
    Resample,
    Encode,
    /// The task panicked on the worker.
    Panicked,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ErrorKind::Decode => "DecodeError",
            ErrorKind::SurfaceAllocation => "SurfaceAllocationError",
            ErrorKind::Resample => "ResampleError",
            ErrorKind::Encode => "EncodeError",
            ErrorKind::Panicked => "Panicked",
        };
        f.write_str(name)
    }
}

/// Any failure of a single transcode.
#[derive(Debug, Error)]
pub enum TranscodeError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    SurfaceAllocation(#[from] SurfaceError),

    #[error(transparent)]
    Resample(#[from] ResampleError),

    #[error(transparent)]
    Encode(#[from] EncodeError),
}

impl TranscodeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            TranscodeError::Decode(_) => ErrorKind::Decode,
            TranscodeError::SurfaceAllocation(_) => ErrorKind::SurfaceAllocation,
            TranscodeError::Resample(ResampleError::Surface(_)) => ErrorKind::SurfaceAllocation,
            TranscodeError::Resample(_) => ErrorKind::Resample,
            TranscodeError::Encode(_) => ErrorKind::Encode,
        }
    }
}

/// Compress a decoded surface. The surface is consumed and every
/// intermediate buffer is dropped before this returns.
pub fn transcode(
    surface: PixelSurface,
    params: &CompressionParams,
    strategy: ResampleStrategy,
) -> Result<EncodedImage, TranscodeError> {
    let scale = scale_for_max_width(surface.width(), params.max_width);
    let scaled = downsample(surface, scale, strategy)?;
    let prepared = prepare_for_format(scaled, params.output_format)?;
    Ok(encode(&prepared, params.output_format, params.quality)?)
}

/// Decode `bytes` and compress the result.
pub fn transcode_source(
    bytes: &[u8],
    params: &CompressionParams,
    strategy: ResampleStrategy,
) -> Result<EncodedImage, TranscodeError> {
    let decoded = decode_source(bytes)?;
    transcode(decoded.surface, params, strategy)
}

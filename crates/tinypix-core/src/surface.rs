//! Raw decoded pixel surfaces.
//!
//! A [`PixelSurface`] is the in-memory form of an image between decoding and
//! encoding: interleaved, row-major 8-bit channel data with either three (RGB)
//! or four (RGBA) channels per pixel. The buffer length always equals
//! `width * height * channels`; every constructor enforces it.

use image::{DynamicImage, ExtendedColorType, ImageBuffer, Rgb, Rgba};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised when a surface cannot be built or allocated.
#[derive(Debug, Error)]
pub enum SurfaceError {
    /// Buffer length does not match the declared dimensions.
    #[error("Invalid pixel buffer: expected {expected} bytes ({width}x{height}x{channels}), got {actual}")]
    BufferMismatch {
        width: u32,
        height: u32,
        channels: usize,
        expected: usize,
        actual: usize,
    },

    /// The platform could not provide memory for an off-screen surface.
    #[error("Cannot allocate a {width}x{height} surface with {channels} channels")]
    AllocationFailed {
        width: u32,
        height: u32,
        channels: usize,
    },
}

/// Channel layout of a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum Channels {
    /// Red, green, blue. Always opaque.
    Rgb = 3,
    /// Red, green, blue, straight (non-premultiplied) alpha.
    #[default]
    Rgba = 4,
}

impl Channels {
    /// Number of bytes per pixel.
    #[inline]
    pub fn count(self) -> usize {
        self as usize
    }

    #[inline]
    pub fn has_alpha(self) -> bool {
        matches!(self, Channels::Rgba)
    }

    /// Color type handed to the `image` crate encoders.
    pub fn color_type(self) -> ExtendedColorType {
        match self {
            Channels::Rgb => ExtendedColorType::Rgb8,
            Channels::Rgba => ExtendedColorType::Rgba8,
        }
    }
}

/// Number of bytes a `width x height` surface needs, or `None` on overflow.
pub(crate) fn buffer_len(width: u32, height: u32, channels: Channels) -> Option<usize> {
    (width as usize)
        .checked_mul(height as usize)?
        .checked_mul(channels.count())
}

/// Allocate a zeroed buffer for a `width x height` surface without aborting
/// the process on failure. Used for byte surfaces and float accumulators.
pub(crate) fn try_alloc<T: Clone + Default>(
    width: u32,
    height: u32,
    channels: Channels,
) -> Result<Vec<T>, SurfaceError> {
    let failed = || SurfaceError::AllocationFailed {
        width,
        height,
        channels: channels.count(),
    };
    let len = buffer_len(width, height, channels).ok_or_else(failed)?;
    let mut buffer = Vec::new();
    buffer.try_reserve_exact(len).map_err(|_| failed())?;
    buffer.resize(len, T::default());
    Ok(buffer)
}

/// A decoded image: dimensions, channel layout and interleaved pixel bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelSurface {
    width: u32,
    height: u32,
    channels: Channels,
    pixels: Vec<u8>,
}

impl PixelSurface {
    /// Wrap an existing buffer, validating its length.
    pub fn try_new(
        width: u32,
        height: u32,
        channels: Channels,
        pixels: Vec<u8>,
    ) -> Result<Self, SurfaceError> {
        let expected = buffer_len(width, height, channels).ok_or(SurfaceError::AllocationFailed {
            width,
            height,
            channels: channels.count(),
        })?;
        if pixels.len() != expected {
            return Err(SurfaceError::BufferMismatch {
                width,
                height,
                channels: channels.count(),
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            channels,
            pixels,
        })
    }

    /// Allocate a surface with every byte set to `value`.
    ///
    /// Allocation goes through `try_reserve_exact`, so an oversized request
    /// comes back as [`SurfaceError::AllocationFailed`] instead of aborting.
    pub fn try_filled(
        width: u32,
        height: u32,
        channels: Channels,
        value: u8,
    ) -> Result<Self, SurfaceError> {
        let mut pixels: Vec<u8> = try_alloc(width, height, channels)?;
        if value != 0 {
            pixels.fill(value);
        }
        Ok(Self {
            width,
            height,
            channels,
            pixels,
        })
    }

    /// Build a surface from a decoded `image` value, keeping alpha only when
    /// the source color type carries it.
    pub fn from_dynamic(img: DynamicImage) -> Self {
        if img.color().has_alpha() {
            let rgba = img.into_rgba8();
            let (width, height) = rgba.dimensions();
            Self {
                width,
                height,
                channels: Channels::Rgba,
                pixels: rgba.into_raw(),
            }
        } else {
            let rgb = img.into_rgb8();
            let (width, height) = rgb.dimensions();
            Self {
                width,
                height,
                channels: Channels::Rgb,
                pixels: rgb.into_raw(),
            }
        }
    }

    /// Convert into an owned `image` value. The buffer is moved, not copied.
    pub fn into_dynamic(self) -> Result<DynamicImage, SurfaceError> {
        let (width, height, channels) = (self.width, self.height, self.channels);
        let mismatch = |actual: usize| SurfaceError::BufferMismatch {
            width,
            height,
            channels: channels.count(),
            expected: buffer_len(width, height, channels).unwrap_or(0),
            actual,
        };
        let len = self.pixels.len();
        match channels {
            Channels::Rgb => ImageBuffer::<Rgb<u8>, _>::from_raw(width, height, self.pixels)
                .map(DynamicImage::ImageRgb8)
                .ok_or_else(|| mismatch(len)),
            Channels::Rgba => ImageBuffer::<Rgba<u8>, _>::from_raw(width, height, self.pixels)
                .map(DynamicImage::ImageRgba8)
                .ok_or_else(|| mismatch(len)),
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    #[inline]
    pub fn channels(&self) -> Channels {
        self.channels
    }

    #[inline]
    pub fn has_alpha(&self) -> bool {
        self.channels.has_alpha()
    }

    /// Raw interleaved channel data.
    #[inline]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Give up the surface and keep its buffer.
    pub fn into_pixels(self) -> Vec<u8> {
        self.pixels
    }

    /// Channel bytes of the pixel at `(x, y)`, or `None` when out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Option<&[u8]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let stride = self.channels.count();
        let start = (y as usize * self.width as usize + x as usize) * stride;
        self.pixels.get(start..start + stride)
    }

    /// True when no pixel is even partially transparent.
    pub fn is_opaque(&self) -> bool {
        match self.channels {
            Channels::Rgb => true,
            Channels::Rgba => self.pixels.chunks_exact(4).all(|px| px[3] == 255),
        }
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn byte_size(&self) -> usize {
        self.pixels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

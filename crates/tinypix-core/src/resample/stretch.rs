//! Bilinear stretch through the `image` crate.
//!
//! The low-cost fallback to the area filter: each output pixel interpolates
//! a small neighbourhood instead of averaging its whole footprint, so it is
//! faster on large reductions but aliases fine detail. Alpha is interpolated
//! straight, not premultiplied.

use image::imageops::{self, FilterType};
use image::{ImageBuffer, Rgb, Rgba};

use super::{check_scale, target_dimensions, ResampleError};
use crate::surface::{Channels, PixelSurface, SurfaceError};

/// Downsample `surface` by `scale` in `(0, 1]` with a bilinear stretch.
///
/// The source buffer is borrowed by the resizer, not copied.
pub fn downsample_stretch(
    surface: &PixelSurface,
    scale: f64,
) -> Result<PixelSurface, ResampleError> {
    check_scale(scale)?;
    if surface.is_empty() {
        return Err(ResampleError::EmptySurface);
    }

    let (width, height) = surface.dimensions();
    let (tw, th) = target_dimensions(width, height, scale);
    let mismatch = || SurfaceError::BufferMismatch {
        width,
        height,
        channels: surface.channels().count(),
        expected: surface.byte_size(),
        actual: surface.byte_size(),
    };

    let pixels = match surface.channels() {
        Channels::Rgb => {
            let view = ImageBuffer::<Rgb<u8>, &[u8]>::from_raw(width, height, surface.pixels())
                .ok_or_else(mismatch)?;
            imageops::resize(&view, tw, th, FilterType::Triangle).into_raw()
        }
        Channels::Rgba => {
            let view = ImageBuffer::<Rgba<u8>, &[u8]>::from_raw(width, height, surface.pixels())
                .ok_or_else(mismatch)?;
            imageops::resize(&view, tw, th, FilterType::Triangle).into_raw()
        }
    };

    Ok(PixelSurface::try_new(tw, th, surface.channels(), pixels)?)
}

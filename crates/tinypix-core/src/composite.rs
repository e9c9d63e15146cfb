//! Background compositing for formats without an alpha channel.
//!
//! Runs after downsampling so blending happens at the final resolution.

use crate::format::ImageFormat;
use crate::surface::{Channels, PixelSurface, SurfaceError};

/// Flatten an RGBA surface onto opaque white using source-over blending.
///
/// A white RGB destination is allocated first and every source pixel is
/// blended over it, so fully transparent pixels come out as `(255, 255, 255)`.
/// RGB surfaces are already opaque and are returned as an equal copy.
pub fn flatten_onto_white(surface: &PixelSurface) -> Result<PixelSurface, SurfaceError> {
    if !surface.has_alpha() {
        return Ok(surface.clone());
    }
    let (width, height) = surface.dimensions();
    let mut dest = PixelSurface::try_filled(width, height, Channels::Rgb, 255)?.into_pixels();

    for (dst, src) in dest.chunks_exact_mut(3).zip(surface.pixels().chunks_exact(4)) {
        match src[3] {
            0 => {}
            255 => dst.copy_from_slice(&src[..3]),
            alpha => {
                let a = alpha as u32;
                for (d, &s) in dst.iter_mut().zip(&src[..3]) {
                    *d = ((s as u32 * a + *d as u32 * (255 - a) + 127) / 255) as u8;
                }
            }
        }
    }

    PixelSurface::try_new(width, height, Channels::Rgb, dest)
}

/// Prepare a surface for encoding to `format`.
///
/// Opaque targets get alpha-bearing surfaces flattened onto white; anything
/// else passes through unmodified.
pub fn prepare_for_format(
    surface: PixelSurface,
    format: ImageFormat,
) -> Result<PixelSurface, SurfaceError> {
    if format.is_opaque() && surface.has_alpha() {
        flatten_onto_white(&surface)
    } else {
        Ok(surface)
    }
}

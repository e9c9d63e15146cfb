//! Downsampling of pixel surfaces.
//!
//! Two strategies are available:
//! - [`ResampleStrategy::Area`]: area-weighted (box) filter that visits every
//!   source pixel once and splits it across the destination cells it overlaps.
//!   This is the default and does not alias high-frequency content.
//! - [`ResampleStrategy::Stretch`]: bilinear stretch through the `image`
//!   crate. Cheaper, but samples rather than averages, so fine detail aliases.
//!
//! Both produce the same output dimensions for a given scale, see
//! [`target_dimensions`]. A scale of `1` is an identity passthrough.

mod area;
mod stretch;

use std::num::NonZeroU32;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::surface::{PixelSurface, SurfaceError};

pub use area::downsample_area;
pub use stretch::downsample_stretch;

/// Absorbs representation error in `width * (max_width / width)` so the
/// product floors to `max_width` rather than one below it.
const DIMENSION_EPSILON: f64 = 1e-7;

/// Errors raised while downsampling.
#[derive(Debug, Error)]
pub enum ResampleError {
    /// Scale outside `(0, 1]`.
    #[error("Invalid scale factor {0}: expected a value in (0, 1]")]
    InvalidScale(f64),

    /// The source has zero width or height.
    #[error("Cannot resample an empty surface")]
    EmptySurface,

    /// The destination surface could not be allocated.
    #[error(transparent)]
    Surface(#[from] SurfaceError),
}

/// Downsampling algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResampleStrategy {
    /// Area-weighted box filter.
    #[default]
    Area,
    /// Bilinear stretch, the low-cost fallback.
    Stretch,
}

/// Scale factor that brings `width` down to `max_width`, or `1.0` when there
/// is no limit or the image already fits.
pub fn scale_for_max_width(width: u32, max_width: Option<NonZeroU32>) -> f64 {
    match max_width {
        Some(max) if width > max.get() => max.get() as f64 / width as f64,
        _ => 1.0,
    }
}

/// Output dimensions for a scale: `floor(w * s) x floor(h * s)`, each at
/// least 1.
pub fn target_dimensions(width: u32, height: u32, scale: f64) -> (u32, u32) {
    let scaled = |len: u32| ((len as f64 * scale + DIMENSION_EPSILON).floor() as u32).max(1);
    (scaled(width), scaled(height))
}

pub(crate) fn check_scale(scale: f64) -> Result<(), ResampleError> {
    if scale > 0.0 && scale <= 1.0 {
        Ok(())
    } else {
        Err(ResampleError::InvalidScale(scale))
    }
}

/// Downsample `surface` by `scale` with the chosen strategy.
///
/// The surface is consumed; at `scale == 1` it is returned untouched, with
/// no filter pass and no copy.
pub fn downsample(
    surface: PixelSurface,
    scale: f64,
    strategy: ResampleStrategy,
) -> Result<PixelSurface, ResampleError> {
    check_scale(scale)?;
    if scale == 1.0 {
        return Ok(surface);
    }
    match strategy {
        ResampleStrategy::Area => downsample_area(&surface, scale),
        ResampleStrategy::Stretch => downsample_stretch(&surface, scale),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::Channels;

    fn gradient(width: u32, height: u32) -> PixelSurface {
        let mut pixels = Vec::with_capacity((width * height * 3) as usize);
        for y in 0..height {
            for x in 0..width {
                pixels.push(((x * 255) / width.max(1)) as u8);
                pixels.push(((y * 255) / height.max(1)) as u8);
                pixels.push(128);
            }
        }
        PixelSurface::try_new(width, height, Channels::Rgb, pixels).unwrap()
    }

    #[test]
    fn test_scale_for_max_width() {
        assert_eq!(scale_for_max_width(4000, None), 1.0);
        assert_eq!(scale_for_max_width(4000, NonZeroU32::new(4000)), 1.0);
        assert_eq!(scale_for_max_width(4000, NonZeroU32::new(5000)), 1.0);
        assert_eq!(scale_for_max_width(4000, NonZeroU32::new(1200)), 0.3);
    }

    #[test]
    fn test_target_dimensions() {
        assert_eq!(target_dimensions(4000, 3000, 0.3), (1200, 900));
        assert_eq!(target_dimensions(10, 10, 0.35), (3, 3));
        assert_eq!(target_dimensions(100, 1, 0.5), (50, 1));
        assert_eq!(target_dimensions(3, 3, 0.1), (1, 1));
    }

    #[test]
    fn test_target_dimensions_hits_max_width_exactly() {
        for width in [1001u32, 1333, 2999, 4000, 6016, 7777] {
            for max in [100u32, 640, 800, 999, 1000] {
                let scale = scale_for_max_width(width, NonZeroU32::new(max));
                let (w, _) = target_dimensions(width, 10, scale);
                assert_eq!(w, max, "width {} max {}", width, max);
            }
        }
    }

    #[test]
    fn test_downsample_identity_is_byte_identical() {
        let img = gradient(37, 21);
        let expected = img.clone();
        for strategy in [ResampleStrategy::Area, ResampleStrategy::Stretch] {
            let out = downsample(img.clone(), 1.0, strategy).unwrap();
            assert_eq!(out, expected);
        }
    }

    #[test]
    fn test_downsample_invalid_scale() {
        for scale in [0.0, -0.5, 1.5, f64::NAN] {
            let result = downsample(gradient(4, 4), scale, ResampleStrategy::Area);
            assert!(matches!(result, Err(ResampleError::InvalidScale(_))));
        }
    }

    #[test]
    fn test_strategies_agree_on_dimensions() {
        let img = gradient(101, 67);
        for strategy in [ResampleStrategy::Area, ResampleStrategy::Stretch] {
            let out = downsample(img.clone(), 0.37, strategy).unwrap();
            assert_eq!(out.dimensions(), target_dimensions(101, 67, 0.37));
            assert_eq!(out.channels(), Channels::Rgb);
        }
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: output dimensions are floor(W*s) x floor(H*s), never zero.
        #[test]
        fn prop_target_dimensions_floor(
            width in 1u32..=5000,
            height in 1u32..=5000,
            scale in 0.001f64..=1.0,
        ) {
            let (w, h) = target_dimensions(width, height, scale);
            prop_assert!(w >= 1 && h >= 1);
            prop_assert!(w <= width && h <= height);
            let exact_w = (width as f64 * scale).floor() as u32;
            let exact_h = (height as f64 * scale).floor() as u32;
            prop_assert!(w == exact_w.max(1) || w == exact_w + 1);
            prop_assert!(h == exact_h.max(1) || h == exact_h + 1);
        }
    }
}

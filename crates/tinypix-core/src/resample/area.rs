//! Area-weighted (box) downsampling.
//!
//! Resampling is treated as a single 2D convolution in source space rather
//! than separate horizontal and vertical passes. Every source pixel is a unit
//! square; scaled by `s` it becomes an `s x s` square in destination space
//! that overlaps at most four destination cells. Its value is added to each
//! of those cells weighted by the overlap area:
//!
//! ```text
//!  fits on both axes        straddles x              straddles x and y
//!  +-------+-------+        +-------+-------+        +-------+-------+
//!  | [#]   |       |        |    [##|#]     |        |       |       |
//!  |       |       |        |       |       |        |    [##|#]     |
//!  +-------+-------+        +-------+-------+        +----[##|#]-----+
//!  w = s * s                w = wx * s, nwx * s      w = wx*wy, nwx*wy, wx*nwy, nwx*nwy
//! ```
//!
//! Each axis is described by an [`AxisSpan`] (cell index, share inside it,
//! share spilling into the next cell), and the 2D weight is the product of
//! the two spans, which covers all three cases above.
//!
//! The accumulator is one `f32` per destination channel. Colour is
//! accumulated premultiplied by alpha and divided back out on emit, so a
//! transparent pixel never tints its neighbours and the output keeps a true
//! alpha channel. Values are rounded up when written back to bytes.

use super::{check_scale, target_dimensions, ResampleError};
use crate::surface::{try_alloc, Channels, PixelSurface};

/// Where one source pixel lands along a single axis.
#[derive(Debug, Clone, Copy, PartialEq)]
struct AxisSpan {
    /// Destination cell containing the start of the pixel.
    index: usize,
    /// Extent inside `index`, in destination units.
    near: f32,
    /// Extent spilling into `index + 1`; zero when the pixel fits in one cell.
    far: f32,
}

impl AxisSpan {
    fn new(source_index: usize, scale: f64) -> Self {
        let start = source_index as f64 * scale;
        let end = start + scale;
        let cell = start.floor();
        if end.floor() != cell {
            let boundary = cell + 1.0;
            Self {
                index: cell as usize,
                near: (boundary - start) as f32,
                far: (end - boundary) as f32,
            }
        } else {
            Self {
                index: cell as usize,
                near: scale as f32,
                far: 0.0,
            }
        }
    }

    /// `(cell, weight)` pairs with a non-zero weight inside `0..len`.
    #[inline]
    fn cells(self, len: usize) -> impl Iterator<Item = (usize, f32)> {
        [(self.index, self.near), (self.index + 1, self.far)]
            .into_iter()
            .filter(move |&(cell, weight)| weight > 0.0 && cell < len)
    }
}

/// Total weight each destination cell receives along one axis. Close to 1
/// everywhere except when the output was clamped up to one pixel.
fn coverage(spans: impl Iterator<Item = AxisSpan>, len: usize) -> Vec<f32> {
    let mut cover = vec![0.0f32; len];
    for span in spans {
        for (cell, weight) in span.cells(len) {
            cover[cell] += weight;
        }
    }
    cover
}

#[inline]
fn to_channel(value: f32) -> u8 {
    value.ceil().clamp(0.0, 255.0) as u8
}

/// Downsample `surface` by `scale` in `(0, 1]` with the area-weighted filter.
///
/// Output dimensions follow [`target_dimensions`]. Source pixels that fall
/// past the last whole destination column or row are dropped. Every other
/// source pixel is visited exactly once.
///
/// # Errors
///
/// `ResampleError::InvalidScale` for a scale outside `(0, 1]`,
/// `ResampleError::EmptySurface` for a zero-sized source and
/// `ResampleError::Surface` if the accumulator or output cannot be allocated.
pub fn downsample_area(surface: &PixelSurface, scale: f64) -> Result<PixelSurface, ResampleError> {
    check_scale(scale)?;
    if surface.is_empty() {
        return Err(ResampleError::EmptySurface);
    }

    let channels = surface.channels();
    let stride = channels.count();
    let (tw, th) = target_dimensions(surface.width(), surface.height(), scale);
    let mut acc: Vec<f32> = try_alloc(tw, th, channels)?;
    let (tw, th) = (tw as usize, th as usize);

    let columns: Vec<AxisSpan> = (0..surface.width() as usize)
        .map(|sx| AxisSpan::new(sx, scale))
        .collect();
    let rows = (0..surface.height() as usize).map(|sy| AxisSpan::new(sy, scale));
    let col_cover = coverage(columns.iter().copied(), tw);
    let row_cover = coverage(rows.clone(), th);

    let row_len = surface.width() as usize * stride;
    for (row_span, row) in rows.zip(surface.pixels().chunks_exact(row_len)) {
        if row_span.index >= th {
            break;
        }
        for (col_span, px) in columns.iter().zip(row.chunks_exact(stride)) {
            if col_span.index >= tw {
                break;
            }
            let sample = premultiplied(px, channels);
            for (ty, wy) in row_span.cells(th) {
                for (tx, wx) in col_span.cells(tw) {
                    let weight = wx * wy;
                    let base = (ty * tw + tx) * stride;
                    for (slot, value) in acc[base..base + stride].iter_mut().zip(sample) {
                        *slot += value * weight;
                    }
                }
            }
        }
    }

    let mut out: Vec<u8> = try_alloc(tw as u32, th as u32, channels)?;
    let cells = out.chunks_exact_mut(stride).zip(acc.chunks_exact(stride));
    for (i, (dst, src)) in cells.enumerate() {
        let cover = row_cover[i / tw] * col_cover[i % tw];
        match channels {
            Channels::Rgb => {
                for (d, s) in dst.iter_mut().zip(src) {
                    *d = to_channel(s / cover);
                }
            }
            Channels::Rgba => {
                let alpha = src[3];
                if alpha <= 0.0 {
                    continue;
                }
                let unpremultiply = 255.0 / alpha;
                for (d, s) in dst[..3].iter_mut().zip(&src[..3]) {
                    *d = to_channel(s * unpremultiply);
                }
                dst[3] = to_channel(alpha / cover);
            }
        }
    }

    Ok(PixelSurface::try_new(tw as u32, th as u32, channels, out)?)
}

/// Channel values ready for accumulation: colour multiplied by normalized
/// alpha, alpha as is.
#[inline]
fn premultiplied(px: &[u8], channels: Channels) -> [f32; 4] {
    match channels {
        Channels::Rgb => [px[0] as f32, px[1] as f32, px[2] as f32, 0.0],
        Channels::Rgba => {
            let alpha = px[3] as f32;
            let a = alpha / 255.0;
            [px[0] as f32 * a, px[1] as f32 * a, px[2] as f32 * a, alpha]
        }
    }
}

//! Source decoding for tinypix.
//!
//! This module provides functionality for:
//! - Validating a candidate source by MIME type and size
//! - Probing a source's format and dimensions from its header
//! - Decoding JPEG, PNG and WebP bytes into a [`PixelSurface`](crate::surface::PixelSurface)
//!
//! Decoding is delegated to the `image` crate. Opaque sources decode to RGB,
//! sources with an alpha channel decode to straight RGBA. EXIF orientation is
//! not applied.

mod source;
mod types;

pub use source::{decode_source, probe, validate_source};
pub use types::{DecodeError, DecodedSource, SourceInfo, MAX_SOURCE_BYTES};

//! tinypix WASM - WebAssembly bindings for tinypix
//!
//! This crate exposes the tinypix-core compression step to JavaScript so a
//! Web Worker can run it off the main thread.
//!
//! # Module Structure
//!
//! - `types` - Options and result wrapper types
//! - `compress` - Compression of raw RGBA pixels or encoded files
//!
//! # Usage
//!
//! ```typescript
//! import init, { compress_file } from '@tinypix/wasm';
//!
//! await init();
//!
//! const bytes = new Uint8Array(await file.arrayBuffer());
//! const out = compress_file(bytes, { quality: 0.8, maxWidth: 1200 });
//! console.log(`Compressed to ${out.width}x${out.height}, ${out.byteLength} bytes`);
//! ```

use wasm_bindgen::prelude::*;

mod compress;
mod types;

pub use compress::{compress_file, compress_pixels};
pub use types::{JsCompressOptions, JsCompressedImage};

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Human-readable file size, e.g. `1.5 MB`.
#[wasm_bindgen]
pub fn format_file_size(bytes: f64) -> String {
    tinypix_core::format_file_size(bytes.max(0.0) as u64)
}

/// Size change as a percentage, e.g. `-42%`.
#[wasm_bindgen]
pub fn format_compression_ratio(original: f64, compressed: f64) -> String {
    tinypix_core::format_compression_ratio(original.max(0.0) as u64, compressed.max(0.0) as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
    }

    #[test]
    fn test_size_helpers() {
        assert_eq!(format_file_size(-1.0), "0 B");
        assert_eq!(format_compression_ratio(1000.0, 250.0), "-75%");
    }
}

//! End-to-end transcoding through the public API.

use std::num::NonZeroU32;

use tinypix_core::encode::encode_jpeg;
use tinypix_core::{
    decode_source, probe, transcode_source, Channels, CompressionParams, ImageFormat,
    PixelSurface, ResampleStrategy,
};

fn photo_like(width: u32, height: u32) -> PixelSurface {
    let mut pixels = Vec::with_capacity((width * height * 3) as usize);
    for y in 0..height {
        for x in 0..width {
            let noise = (x.wrapping_mul(2_654_435_761) ^ y.wrapping_mul(40_503)) >> 28;
            pixels.push(((x * 255 / width) as u8).wrapping_add(noise as u8));
            pixels.push((y * 255 / height) as u8);
            pixels.push((((x + y) / 16) % 256) as u8);
        }
    }
    PixelSurface::try_new(width, height, Channels::Rgb, pixels).unwrap()
}

#[test]
fn large_jpeg_to_webp_at_max_width() {
    let source = encode_jpeg(&photo_like(4000, 3000), 92).unwrap();
    let info = probe(&source).unwrap();
    assert_eq!((info.width, info.height), (4000, 3000));

    let params = CompressionParams {
        quality: 0.8,
        max_width: NonZeroU32::new(1200),
        output_format: ImageFormat::WebP,
    };
    let out = transcode_source(&source, &params, ResampleStrategy::Area).unwrap();

    assert_eq!((out.width, out.height), (1200, 900));
    assert_eq!(out.format, ImageFormat::WebP);
    assert!(
        out.byte_size() < source.len(),
        "output {} bytes, input {} bytes",
        out.byte_size(),
        source.len()
    );

    let decoded = decode_source(&out.bytes).unwrap();
    assert_eq!(decoded.format, ImageFormat::WebP);
    assert_eq!(decoded.surface.dimensions(), (1200, 900));
}

#[test]
fn preserve_original_round_trips_png() {
    let surface = photo_like(300, 200);
    let png = tinypix_core::encode(&surface, ImageFormat::Png, 1.0).unwrap();
    let params = CompressionParams {
        quality: 0.8,
        max_width: None,
        output_format: ImageFormat::Png,
    };
    let out = transcode_source(&png.bytes, &params, ResampleStrategy::Area).unwrap();
    let decoded = decode_source(&out.bytes).unwrap();
    assert_eq!(decoded.surface, surface);
}

#[test]
fn both_strategies_produce_requested_width() {
    let source = encode_jpeg(&photo_like(640, 480), 85).unwrap();
    for strategy in [ResampleStrategy::Area, ResampleStrategy::Stretch] {
        let params = CompressionParams {
            quality: 0.7,
            max_width: NonZeroU32::new(200),
            output_format: ImageFormat::Jpeg,
        };
        let out = transcode_source(&source, &params, strategy).unwrap();
        assert_eq!((out.width, out.height), (200, 150));
    }
}

//! tinypix Core - Image transcoding library
//!
//! This crate provides the compression pipeline behind tinypix: decoding
//! JPEG, PNG and WebP sources, area-weighted downsampling to a maximum
//! width, flattening onto white for JPEG, re-encoding, and running all of it
//! on a dedicated worker thread with debounced re-submission when settings
//! change.

pub mod composite;
pub mod decode;
pub mod dispatch;
pub mod encode;
pub mod format;
pub mod resample;
pub mod settings;
pub mod surface;
pub mod transcode;

pub use composite::{flatten_onto_white, prepare_for_format};
pub use decode::{decode_source, probe, validate_source, DecodeError, SourceInfo};
pub use dispatch::{Compressor, DispatchError, Dispatcher, ImageId, ImageStatus};
pub use encode::{encode, EncodeError, EncodedImage};
pub use format::{format_compression_ratio, format_file_size, output_file_name, ImageFormat};
pub use resample::{downsample, ResampleStrategy};
pub use settings::{CompressorConfig, OutputFormat, Settings};
pub use surface::{Channels, PixelSurface};
pub use transcode::{transcode, transcode_source, CompressionParams, ErrorKind, TranscodeError};

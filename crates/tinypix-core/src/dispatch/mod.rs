//! Off-thread compression of a worklist of images.
//!
//! - [`Dispatcher`]: one named worker thread consuming [`Request`]s in FIFO
//!   order and answering each with exactly one [`Response`].
//! - [`Worklist`]: per-image records, updated by id and guarded by a
//!   per-image [`Generation`] so slow stale results never overwrite newer
//!   ones.
//! - [`Debouncer`]: coalesces bursts of settings changes into one wave.
//! - [`Compressor`]: ties the three together.

mod compressor;
mod debounce;
mod protocol;
mod worker;
mod worklist;

use thiserror::Error;

use crate::decode::DecodeError;
use crate::settings::SettingsError;

pub use compressor::Compressor;
pub use debounce::Debouncer;
pub use protocol::{CompressionTask, Generation, ImageId, Request, Response};
pub use worker::Dispatcher;
pub use worklist::{Applied, ImageRecord, ImageStatus, NewImage, Worklist};

/// Errors raised by the coordinator and the worker plumbing.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The worker thread could not be started.
    #[error("Failed to start worker thread: {0}")]
    Spawn(#[source] std::io::Error),

    /// The worker has been terminated.
    #[error("Compression worker is not running")]
    ContextClosed,

    /// The source was rejected before submission.
    #[error(transparent)]
    Source(#[from] DecodeError),

    #[error(transparent)]
    Settings(#[from] SettingsError),
}

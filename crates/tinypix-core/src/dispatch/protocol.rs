//! Messages exchanged with the worker thread.

use serde::{Deserialize, Serialize};

use crate::encode::EncodedImage;
use crate::surface::PixelSurface;
use crate::transcode::{CompressionParams, ErrorKind, TranscodeError};

/// Stable identifier of an image in the worklist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ImageId(pub u64);

impl std::fmt::Display for ImageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Per-image submission counter. A response is only applied if its
/// generation matches the image's latest one.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Generation(u64);

impl Generation {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }

    pub fn value(self) -> u64 {
        self.0
    }
}

/// One unit of work. The surface is moved into the worker.
#[derive(Debug)]
pub struct CompressionTask {
    pub id: ImageId,
    pub generation: Generation,
    pub surface: PixelSurface,
    pub params: CompressionParams,
}

#[derive(Debug)]
pub enum Request {
    Compress(CompressionTask),
}

/// Exactly one response is sent per [`Request::Compress`].
#[derive(Debug, Clone)]
pub enum Response {
    Complete {
        id: ImageId,
        generation: Generation,
        image: EncodedImage,
    },
    Error {
        id: ImageId,
        generation: Generation,
        kind: ErrorKind,
        message: String,
    },
}

impl Response {
    pub fn from_result(
        id: ImageId,
        generation: Generation,
        result: Result<EncodedImage, TranscodeError>,
    ) -> Self {
        match result {
            Ok(image) => Response::Complete {
                id,
                generation,
                image,
            },
            Err(e) => Response::Error {
                id,
                generation,
                kind: e.kind(),
                message: e.to_string(),
            },
        }
    }

    pub fn id(&self) -> ImageId {
        match self {
            Response::Complete { id, .. } | Response::Error { id, .. } => *id,
        }
    }

    pub fn generation(&self) -> Generation {
        match self {
            Response::Complete { generation, .. } | Response::Error { generation, .. } => {
                *generation
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encode::EncodeError;

    #[test]
    fn test_generation_ordering() {
        let first = Generation::default();
        let second = first.next();
        assert!(second > first);
        assert_eq!(second.value(), 1);
        assert_eq!(Generation::new(u64::MAX).next().value(), 0);
    }

    #[test]
    fn test_response_from_error() {
        let err = TranscodeError::from(EncodeError::InvalidDimensions { width: 0, height: 3 });
        let response = Response::from_result(ImageId(7), Generation::new(2), Err(err));
        assert_eq!(response.id(), ImageId(7));
        assert_eq!(response.generation(), Generation::new(2));
        match response {
            Response::Error { kind, message, .. } => {
                assert_eq!(kind, ErrorKind::Encode);
                assert!(message.contains("Invalid dimensions"));
            }
            other => panic!("expected error, got {:?}", other),
        }
    }
}

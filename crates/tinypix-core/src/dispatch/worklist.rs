//! Per-image state owned by the coordinator.
//!
//! Responses from the worker are applied here by id. A response whose
//! generation is older than the record's current generation is stale and
//! is dropped.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::protocol::{Generation, ImageId, Response};
use crate::encode::EncodedImage;
use crate::format::ImageFormat;

/// Where an image is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageStatus {
    #[default]
    Pending,
    Processing,
    Done,
    Error,
}

/// One image in the worklist.
#[derive(Debug, Clone)]
pub struct ImageRecord {
    pub id: ImageId,
    pub name: String,
    /// Original compressed bytes, kept so every wave can decode afresh.
    pub source: Arc<[u8]>,
    pub source_format: ImageFormat,
    pub original_size: u64,
    pub original_width: u32,
    pub original_height: u32,
    pub status: ImageStatus,
    pub generation: Generation,
    pub compressed: Option<EncodedImage>,
    pub error: Option<String>,
}

impl ImageRecord {
    /// Bytes saved by compression; negative when the output grew.
    pub fn saved_bytes(&self) -> Option<i64> {
        self.compressed
            .as_ref()
            .map(|c| self.original_size as i64 - c.byte_size() as i64)
    }
}

/// Data needed to add an image.
#[derive(Debug, Clone)]
pub struct NewImage {
    pub name: String,
    pub source: Arc<[u8]>,
    pub source_format: ImageFormat,
    pub original_width: u32,
    pub original_height: u32,
}

/// What [`Worklist::apply`] did with a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Updated,
    /// A newer submission exists for this image.
    Stale,
    /// The image was removed before its response arrived.
    Unknown,
}

/// Images in insertion order, keyed by id.
#[derive(Debug, Default)]
pub struct Worklist {
    records: BTreeMap<ImageId, ImageRecord>,
    next_id: u64,
}

impl Worklist {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, image: NewImage) -> ImageId {
        let id = ImageId(self.next_id);
        self.next_id += 1;
        let record = ImageRecord {
            id,
            name: image.name,
            original_size: image.source.len() as u64,
            source: image.source,
            source_format: image.source_format,
            original_width: image.original_width,
            original_height: image.original_height,
            status: ImageStatus::Pending,
            generation: Generation::default(),
            compressed: None,
            error: None,
        };
        self.records.insert(id, record);
        id
    }

    pub fn remove(&mut self, id: ImageId) -> Option<ImageRecord> {
        self.records.remove(&id)
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    pub fn get(&self, id: ImageId) -> Option<&ImageRecord> {
        self.records.get(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ImageRecord> {
        self.records.values()
    }

    pub fn ids(&self) -> Vec<ImageId> {
        self.records.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of images still waiting on a response.
    pub fn in_flight(&self) -> usize {
        self.records
            .values()
            .filter(|r| matches!(r.status, ImageStatus::Pending | ImageStatus::Processing))
            .count()
    }

    /// Start a new submission for `id`: bump its generation and mark it
    /// processing. Previous output stays visible until replaced.
    pub fn begin(&mut self, id: ImageId) -> Option<Generation> {
        let record = self.records.get_mut(&id)?;
        record.generation = record.generation.next();
        record.status = ImageStatus::Processing;
        record.error = None;
        Some(record.generation)
    }

    /// Apply a worker response.
    pub fn apply(&mut self, response: Response) -> Applied {
        let Some(record) = self.records.get_mut(&response.id()) else {
            return Applied::Unknown;
        };
        if response.generation() < record.generation {
            return Applied::Stale;
        }
        match response {
            Response::Complete { image, .. } => {
                record.status = ImageStatus::Done;
                record.compressed = Some(image);
                record.error = None;
            }
            Response::Error { message, .. } => {
                record.status = ImageStatus::Error;
                record.compressed = None;
                record.error = Some(message);
            }
        }
        Applied::Updated
    }

    /// Mark `id` failed without a worker round trip.
    pub fn fail(&mut self, id: ImageId, message: impl Into<String>) {
        if let Some(record) = self.records.get_mut(&id) {
            record.status = ImageStatus::Error;
            record.compressed = None;
            record.error = Some(message.into());
        }
    }
}

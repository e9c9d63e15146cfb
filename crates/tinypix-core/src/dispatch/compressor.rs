//! The coordinator: owns the worklist, the settings and the dispatcher.
//!
//! Sources are decoded here and the surface is moved into the worker, so the
//! worker never sees compressed input. Settings changes are debounced and
//! then re-submit every image as one wave.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use super::debounce::Debouncer;
use super::protocol::{CompressionTask, ImageId, Response};
use super::worker::Dispatcher;
use super::worklist::{Applied, ImageRecord, ImageStatus, NewImage, Worklist};
use super::DispatchError;
use crate::decode::{decode_source, probe, validate_source};
use crate::settings::{CompressorConfig, OutputFormat, Settings, SettingsError};
use crate::transcode::ErrorKind;

pub struct Compressor {
    dispatcher: Dispatcher,
    worklist: Worklist,
    settings: Settings,
    debounce: Debouncer,
}

impl Compressor {
    /// Spawn the worker and start with `settings`.
    pub fn new(config: &CompressorConfig, settings: Settings) -> Result<Self, DispatchError> {
        settings.validate()?;
        let dispatcher = Dispatcher::spawn(&config.worker_name, config.resample)?;
        Ok(Self {
            dispatcher,
            worklist: Worklist::new(),
            settings,
            debounce: Debouncer::new(config.debounce()),
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn worklist(&self) -> &Worklist {
        &self.worklist
    }

    pub fn get(&self, id: ImageId) -> Option<&ImageRecord> {
        self.worklist.get(id)
    }

    /// Validate, register and immediately submit a source.
    ///
    /// `mime` is the type declared by the host. The recorded source format
    /// is the one sniffed from the bytes.
    pub fn add_image(
        &mut self,
        name: &str,
        mime: &str,
        bytes: impl Into<Arc<[u8]>>,
    ) -> Result<ImageId, DispatchError> {
        let source: Arc<[u8]> = bytes.into();
        validate_source(mime, source.len() as u64)?;
        let info = probe(&source)?;

        let id = self.worklist.insert(NewImage {
            name: name.to_string(),
            source,
            source_format: info.format,
            original_width: info.width,
            original_height: info.height,
        });
        info!(%id, file = name, width = info.width, height = info.height, "image added");
        self.submit(id)?;
        Ok(id)
    }

    pub fn remove_image(&mut self, id: ImageId) -> Option<ImageRecord> {
        let removed = self.worklist.remove(id);
        if self.worklist.is_empty() {
            self.debounce.cancel();
        }
        removed
    }

    /// Drop every image. Responses still in flight are ignored on arrival.
    pub fn clear(&mut self) {
        self.worklist.clear();
        self.debounce.cancel();
    }

    /// Replace the settings. When images are present a wave is scheduled
    /// after the debounce window.
    pub fn set_settings(&mut self, settings: Settings, now: Instant) -> Result<(), SettingsError> {
        settings.validate()?;
        if settings == self.settings {
            return Ok(());
        }
        self.settings = settings;
        if !self.worklist.is_empty() {
            self.debounce.trigger(now);
        }
        Ok(())
    }

    pub fn set_quality(&mut self, quality: f32, now: Instant) -> Result<(), SettingsError> {
        self.set_settings(
            Settings {
                quality,
                ..self.settings
            },
            now,
        )
    }

    /// `None` or `Some(0)` removes the limit.
    pub fn set_max_width(
        &mut self,
        max_width: Option<u32>,
        now: Instant,
    ) -> Result<(), SettingsError> {
        let mut settings = self.settings;
        settings.set_max_width(max_width);
        self.set_settings(settings, now)
    }

    pub fn set_output_format(
        &mut self,
        output_format: OutputFormat,
        now: Instant,
    ) -> Result<(), SettingsError> {
        self.set_settings(
            Settings {
                output_format,
                ..self.settings
            },
            now,
        )
    }

    /// Submit every image now with the current settings. Cancels any
    /// pending debounced wave. Returns the number of tasks submitted.
    pub fn process_all(&mut self) -> Result<usize, DispatchError> {
        self.debounce.cancel();
        let ids = self.worklist.ids();
        debug!(images = ids.len(), "submitting wave");
        for &id in &ids {
            self.submit(id)?;
        }
        Ok(ids.len())
    }

    /// Fire the debounced wave if it is due, then apply every response
    /// that has already arrived. Returns the number of records updated.
    pub fn poll(&mut self, now: Instant) -> Result<usize, DispatchError> {
        if self.debounce.fire_if_due(now) {
            self.process_all()?;
        }
        let mut updated = 0;
        while let Some(response) = self.dispatcher.try_recv() {
            if self.apply(response) {
                updated += 1;
            }
        }
        Ok(updated)
    }

    /// Block until no image is waiting on the worker, or `timeout` passes.
    /// A pending debounced wave is not fired. Returns true when idle.
    pub fn wait(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while self.worklist.in_flight() > 0 {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return false;
            }
            if let Some(response) = self.dispatcher.recv_timeout(remaining) {
                self.apply(response);
            } else if !self.dispatcher.is_running() {
                return false;
            }
        }
        true
    }

    /// No wave pending and nothing in flight.
    pub fn is_idle(&self) -> bool {
        !self.debounce.is_pending() && self.worklist.in_flight() == 0
    }

    /// When the pending debounced wave is due, if any.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.debounce.deadline()
    }

    /// Tear down the worker. Images still in flight are marked failed.
    pub fn shutdown(&mut self) {
        self.debounce.cancel();
        self.dispatcher.terminate();
        let cancelled: Vec<ImageId> = self
            .worklist
            .iter()
            .filter(|r| matches!(r.status, ImageStatus::Pending | ImageStatus::Processing))
            .map(|r| r.id)
            .collect();
        for id in cancelled {
            self.worklist.fail(id, DispatchError::ContextClosed.to_string());
        }
        info!("compressor shut down");
    }

    fn submit(&mut self, id: ImageId) -> Result<(), DispatchError> {
        let Some(record) = self.worklist.get(id) else {
            return Ok(());
        };
        let source = Arc::clone(&record.source);
        let params = self.settings.params_for(record.source_format);
        let Some(generation) = self.worklist.begin(id) else {
            return Ok(());
        };

        let surface = match decode_source(&source) {
            Ok(decoded) => decoded.surface,
            Err(e) => {
                warn!(%id, error = %e, "decode failed");
                self.worklist.apply(Response::Error {
                    id,
                    generation,
                    kind: ErrorKind::Decode,
                    message: e.to_string(),
                });
                return Ok(());
            }
        };

        let task = CompressionTask {
            id,
            generation,
            surface,
            params,
        };
        if let Err(e) = self.dispatcher.submit(task) {
            self.worklist.fail(id, e.to_string());
            return Err(e);
        }
        Ok(())
    }

    fn apply(&mut self, response: Response) -> bool {
        let id = response.id();
        let generation = response.generation();
        match self.worklist.apply(response) {
            Applied::Updated => true,
            Applied::Stale => {
                debug!(%id, generation = generation.value(), "stale result dropped");
                false
            }
            Applied::Unknown => {
                debug!(%id, "result for removed image dropped");
                false
            }
        }
    }
}

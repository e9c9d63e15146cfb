//! The isolated execution context: one named worker thread fed by a FIFO
//! channel.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender, TryRecvError};
use tracing::{debug, info, warn};

use super::protocol::{CompressionTask, Request, Response};
use super::DispatchError;
use crate::resample::ResampleStrategy;
use crate::transcode::{transcode, ErrorKind};

/// Owns the worker thread and both ends of its message channels.
///
/// Requests are processed in submission order. Dropping the dispatcher
/// terminates the worker and discards anything still queued.
pub struct Dispatcher {
    requests: Option<Sender<Request>>,
    responses: Receiver<Response>,
    cancelled: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl Dispatcher {
    /// Start a worker thread called `name`.
    ///
    /// # Errors
    ///
    /// Returns `DispatchError::Spawn` if the OS refuses to create the thread.
    pub fn spawn(name: &str, strategy: ResampleStrategy) -> Result<Self, DispatchError> {
        let (request_tx, request_rx) = unbounded::<Request>();
        let (response_tx, response_rx) = unbounded::<Response>();
        let cancelled = Arc::new(AtomicBool::new(false));

        let flag = Arc::clone(&cancelled);
        let handle = thread::Builder::new()
            .name(name.to_string())
            .spawn(move || run(request_rx, response_tx, flag, strategy))
            .map_err(DispatchError::Spawn)?;

        info!(worker = name, ?strategy, "worker started");
        Ok(Self {
            requests: Some(request_tx),
            responses: response_rx,
            cancelled,
            handle: Some(handle),
        })
    }

    /// Queue a task. Returns immediately; the result arrives later as a
    /// [`Response`] carrying the same id and generation.
    pub fn submit(&self, task: CompressionTask) -> Result<(), DispatchError> {
        let sender = self.requests.as_ref().ok_or(DispatchError::ContextClosed)?;
        sender
            .send(Request::Compress(task))
            .map_err(|_| DispatchError::ContextClosed)
    }

    /// Next finished response, if one is ready.
    pub fn try_recv(&self) -> Option<Response> {
        match self.responses.try_recv() {
            Ok(response) => Some(response),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }

    /// Block up to `timeout` for the next response.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<Response> {
        match self.responses.recv_timeout(timeout) {
            Ok(response) => Some(response),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.requests.is_some()
    }

    /// Tear down the worker. Queued tasks are discarded; a task already
    /// running is allowed to finish, but its response is never delivered
    /// through this dispatcher again.
    pub fn terminate(&mut self) {
        self.cancelled.store(true, Ordering::SeqCst);
        // Closing the request channel ends the worker's receive loop.
        self.requests.take();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("worker thread exited abnormally");
            }
            debug!("worker terminated");
        }
        while self.responses.try_recv().is_ok() {}
    }
}

impl Drop for Dispatcher {
    fn drop(&mut self) {
        self.terminate();
    }
}

fn run(
    requests: Receiver<Request>,
    responses: Sender<Response>,
    cancelled: Arc<AtomicBool>,
    strategy: ResampleStrategy,
) {
    while let Ok(request) = requests.recv() {
        if cancelled.load(Ordering::SeqCst) {
            break;
        }
        let response = match request {
            Request::Compress(task) => process(task, strategy),
        };
        if responses.send(response).is_err() {
            break;
        }
    }
}

fn process(task: CompressionTask, strategy: ResampleStrategy) -> Response {
    let CompressionTask {
        id,
        generation,
        surface,
        params,
    } = task;
    let (width, height) = surface.dimensions();
    let started = Instant::now();
    debug!(
        %id,
        generation = generation.value(),
        width,
        height,
        format = %params.output_format,
        "task started"
    );

    // The surface is owned by the closure, so it is freed on every exit
    // path including unwinding.
    let outcome = panic::catch_unwind(AssertUnwindSafe(move || {
        transcode(surface, &params, strategy)
    }));

    let response = match outcome {
        Ok(result) => Response::from_result(id, generation, result),
        Err(payload) => Response::Error {
            id,
            generation,
            kind: ErrorKind::Panicked,
            message: panic_message(payload.as_ref()),
        },
    };

    match &response {
        Response::Complete { image, .. } => debug!(
            %id,
            generation = generation.value(),
            out_width = image.width,
            out_height = image.height,
            bytes = image.byte_size(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "task finished"
        ),
        Response::Error { kind, message, .. } => warn!(
            %id,
            generation = generation.value(),
            %kind,
            message = message.as_str(),
            "task failed"
        ),
    }
    response
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("worker panicked: {}", s)
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("worker panicked: {}", s)
    } else {
        "worker panicked".to_string()
    }
}

//! Single background worker per run.
//!
//! The caller keeps a [`RunState`] to request cancellation and reads
//! [`RunEvent`]s from the returned [`RunHandle`]. Cancellation is cooperative:
//! the worker only looks at the flag between items.
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, RecvTimeoutError, channel};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{info, trace};

use super::{BatchPipeline, PhaseWatch};
use crate::core::params::ProcessingRequest;
use crate::error::{Error, Result};
use crate::types::{RunPhase, RunSummary};

/// Shared cancel flag: `Running` until `request_cancel`, reset at the start of each run.
#[derive(Debug, Clone, Default)]
pub struct RunState {
    cancel_requested: Arc<AtomicBool>,
}

impl RunState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request_cancel(&self) {
        if !self.cancel_requested.swap(true, Ordering::SeqCst) {
            info!("Cancelling processing...");
        }
    }

    pub fn is_cancel_requested(&self) -> bool {
        self.cancel_requested.load(Ordering::SeqCst)
    }

    pub fn reset(&self) {
        self.cancel_requested.store(false, Ordering::SeqCst);
    }
}

/// Messages from the worker thread.
#[derive(Debug)]
pub enum RunEvent {
    Progress { completed: usize, total: usize },
    Log(String),
    /// Always the last event of a run.
    Finished(Result<RunSummary>),
}

pub struct RunHandle {
    events: Receiver<RunEvent>,
    state: RunState,
    phase: PhaseWatch,
    thread: Option<JoinHandle<BatchPipeline>>,
}

impl RunHandle {
    pub fn state(&self) -> &RunState {
        &self.state
    }

    /// Phase of the pipeline inside the worker. `Idle` again before `Finished` is sent.
    pub fn phase(&self) -> RunPhase {
        self.phase.current()
    }

    pub fn last_run_phase(&self) -> Option<RunPhase> {
        self.phase.last_run()
    }

    /// Block until the next event; `None` once the worker has gone away.
    pub fn recv(&self) -> Option<RunEvent> {
        self.events.recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<RunEvent> {
        match self.events.recv_timeout(timeout) {
            Ok(event) => Some(event),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }

    /// Wait for the worker and take the pipeline back, with its model still loaded.
    pub fn join(mut self) -> Result<BatchPipeline> {
        let thread = self
            .thread
            .take()
            .ok_or_else(|| Error::Worker("worker already joined".to_string()))?;
        thread
            .join()
            .map_err(|_| Error::Worker("worker thread panicked".to_string()))
    }
}

/// Start one run of `pipeline` on a background thread.
///
/// `state` is reset before the thread starts; keep a clone to cancel.
pub fn spawn_run(
    pipeline: BatchPipeline,
    request: ProcessingRequest,
    state: RunState,
) -> Result<RunHandle> {
    state.reset();
    let (tx, rx) = channel::<RunEvent>();
    let worker_state = state.clone();
    let phase = pipeline.phase_watch();

    let thread = thread::Builder::new()
        .name("loraprep-worker".to_string())
        .spawn(move || {
            trace!("Background processing thread started");
            let mut pipeline = pipeline;
            let result = pipeline.run(
                &request,
                || worker_state.is_cancel_requested(),
                |completed, total| {
                    let _ = tx.send(RunEvent::Progress { completed, total });
                },
                |message| {
                    let _ = tx.send(RunEvent::Log(message.to_string()));
                },
            );
            let _ = tx.send(RunEvent::Finished(result));
            pipeline
        })?;

    info!("Processing started in background thread");
    Ok(RunHandle {
        events: rx,
        state,
        phase,
        thread: Some(thread),
    })
}

//! High-level library API: the batch pipeline that walks a directory,
//! letterboxes and captions every image, and reports progress; plus a
//! background `worker` that runs it off the caller's thread.
//!
//! Only one run may be active per `BatchPipeline`. `run` takes `&mut self`,
//! and `worker::spawn_run` moves the pipeline into the worker until it is
//! joined, so a second concurrent run on the same pipeline cannot be expressed.
//! Running two pipelines into the same output directory is the caller's problem.
use std::fs;
use std::sync::{Arc, Mutex};

use tracing::{error, info, warn};

use crate::caption::CaptionGenerator;
use crate::core::params::ProcessingRequest;
use crate::core::processing::pipeline::process_item_result;
use crate::error::{Error, Result};
use crate::io::scan_images;
use crate::types::{ProcessingResult, RunOutcome, RunPhase, RunSummary};

pub mod worker;

#[derive(Debug, Default)]
struct PhaseTracker {
    current: RunPhase,
    last_terminal: Option<RunPhase>,
}

/// Read-only view of a pipeline's phase that stays valid while the pipeline
/// itself is moved into a worker thread.
#[derive(Debug, Clone, Default)]
pub struct PhaseWatch {
    tracker: Arc<Mutex<PhaseTracker>>,
}

impl PhaseWatch {
    /// `Running` while a run is in progress, `Idle` otherwise.
    pub fn current(&self) -> RunPhase {
        self.tracker.lock().map(|t| t.current).unwrap_or(RunPhase::Idle)
    }

    /// How the most recent run ended (`Completed`, `Cancelled` or `Failed`).
    pub fn last_run(&self) -> Option<RunPhase> {
        self.tracker.lock().ok().and_then(|t| t.last_terminal)
    }
}

/// Puts the pipeline in `Running` and always returns it to `Idle`, even if the run panics.
struct PhaseGuard {
    tracker: Arc<Mutex<PhaseTracker>>,
    terminal: RunPhase,
}

impl PhaseGuard {
    fn enter(tracker: Arc<Mutex<PhaseTracker>>) -> Self {
        if let Ok(mut t) = tracker.lock() {
            t.current = RunPhase::Running;
        }
        Self {
            tracker,
            terminal: RunPhase::Failed,
        }
    }

    fn finish(mut self, terminal: RunPhase) {
        self.terminal = terminal;
    }
}

impl Drop for PhaseGuard {
    fn drop(&mut self) {
        if let Ok(mut t) = self.tracker.lock() {
            t.last_terminal = Some(self.terminal);
            t.current = RunPhase::Idle;
        }
    }
}

/// Drives letterboxing and captioning over one directory per run.
#[derive(Debug)]
pub struct BatchPipeline {
    captioner: CaptionGenerator,
    phase: PhaseWatch,
}

impl BatchPipeline {
    pub fn new(captioner: CaptionGenerator) -> Self {
        Self {
            captioner,
            phase: PhaseWatch::default(),
        }
    }

    pub fn captioner(&self) -> &CaptionGenerator {
        &self.captioner
    }

    /// Handle for observing this pipeline's phase from another thread.
    pub fn phase_watch(&self) -> PhaseWatch {
        self.phase.clone()
    }

    pub fn phase(&self) -> RunPhase {
        self.phase.current()
    }

    pub fn last_run_phase(&self) -> Option<RunPhase> {
        self.phase.last_run()
    }

    /// Process every supported image in `request.input_dir`.
    ///
    /// `cancel_check` is polled once before each item; when it returns true the
    /// loop stops and outputs already written stay on disk. `on_progress` fires
    /// after every item, success or failure. `on_log` receives human-readable
    /// status lines, including the text of a fatal error.
    ///
    /// Returns `Err` only for validation failures, an output directory that
    /// cannot be created, an unreadable input directory, or a model that fails
    /// to load. Per-item failures are counted in the summary.
    pub fn run<C, P, L>(
        &mut self,
        request: &ProcessingRequest,
        cancel_check: C,
        mut on_progress: P,
        mut on_log: L,
    ) -> Result<RunSummary>
    where
        C: Fn() -> bool,
        P: FnMut(usize, usize),
        L: FnMut(&str),
    {
        let guard = PhaseGuard::enter(self.phase.tracker.clone());

        let result = self.run_inner(request, &cancel_check, &mut on_progress, &mut on_log);
        match &result {
            Ok(summary) => guard.finish(summary.outcome.into()),
            Err(e) => {
                error!("Error during processing: {}", e);
                on_log(&format!("Error during processing: {}", e));
                guard.finish(RunPhase::Failed);
            }
        }
        result
    }

    fn run_inner<C, P, L>(
        &mut self,
        request: &ProcessingRequest,
        cancel_check: &C,
        on_progress: &mut P,
        on_log: &mut L,
    ) -> Result<RunSummary>
    where
        C: Fn() -> bool,
        P: FnMut(usize, usize),
        L: FnMut(&str),
    {
        request.validate()?;

        fs::create_dir_all(&request.output_dir).map_err(|source| Error::OutputDir {
            path: request.output_dir.clone(),
            source,
        })?;
        info!("Starting batch processing from directory: {:?}", request.input_dir);
        info!("Output directory: {:?}", request.output_dir);

        if !self.captioner.is_loaded() {
            on_log("Loading captioning model...");
            self.captioner.load()?;
            on_log("Model loaded successfully!");
        }

        let items = scan_images(&request.input_dir, &request.output_dir)?;
        let total = items.len();
        let mut summary = RunSummary {
            outcome: RunOutcome::Completed,
            total,
            processed: 0,
            failed: 0,
        };

        if total == 0 {
            warn!("No image files found in {:?}", request.input_dir);
            on_log("No image files found in input directory!");
            return Ok(summary);
        }

        info!("Found {} images to process", total);
        on_log(&format!("Found {} images to process", total));

        for (index, item) in items.iter().enumerate() {
            if cancel_check() {
                info!("Processing cancelled after {} of {} items", index, total);
                on_log("Processing cancelled");
                summary.outcome = RunOutcome::Cancelled;
                break;
            }

            let file_name = item.file_name();
            on_log(&format!("Processing {}...", file_name));

            match process_item_result(
                item,
                request.target_width,
                request.target_height,
                &mut self.captioner,
            ) {
                ProcessingResult::Success { caption } => {
                    info!("Successfully processed: {:?}", item.source_path);
                    summary.processed += 1;
                    on_log(&format!("Generated caption: {}", caption));
                }
                ProcessingResult::Failure { reason } => {
                    warn!("Error processing {:?}: {}", item.source_path, reason);
                    summary.failed += 1;
                    on_log(&format!("Failed: {}: {}", file_name, reason));
                }
            }

            on_progress(index + 1, total);
        }

        if summary.outcome == RunOutcome::Completed {
            on_log("Processing completed!");
        }
        info!("Batch processing finished: {:?}", summary.outcome);
        info!("Processed: {}", summary.processed);
        info!("Errors: {}", summary.failed);
        info!("Skipped: {}", summary.skipped());
        Ok(summary)
    }
}

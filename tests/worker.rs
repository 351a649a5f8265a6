//! Background worker: events, cancellation, and pipeline hand-back.

mod common;

use std::sync::mpsc::channel;
use std::time::Duration;

use common::*;
use loraprep::api::worker::{RunEvent, RunHandle, RunState, spawn_run};
use loraprep::{
    BatchPipeline, CaptionGenerator, ProcessingRequest, RunOutcome, RunPhase, RunSummary,
};

const EVENT_TIMEOUT: Duration = Duration::from_secs(30);

/// Drain events until `Finished`, returning progress pairs, log lines and the result.
fn drain(handle: &RunHandle) -> (Vec<(usize, usize)>, Vec<String>, loraprep::Result<RunSummary>) {
    let mut progress = Vec::new();
    let mut logs = Vec::new();
    loop {
        match handle.recv_timeout(EVENT_TIMEOUT) {
            Some(RunEvent::Progress { completed, total }) => progress.push((completed, total)),
            Some(RunEvent::Log(line)) => logs.push(line),
            Some(RunEvent::Finished(result)) => return (progress, logs, result),
            None => panic!("worker stopped without a Finished event"),
        }
    }
}

#[test]
fn worker_streams_events_and_returns_loaded_pipeline() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    write_image(input.path(), "a.png", 30, 20);
    write_image(input.path(), "b.jpeg", 20, 30);

    let (generator, loads) = counting_generator();
    let request = ProcessingRequest::new(input.path(), output.path(), 24, 24);
    let handle = spawn_run(BatchPipeline::new(generator), request.clone(), RunState::new()).unwrap();

    let (progress, logs, result) = drain(&handle);
    let summary = result.unwrap();
    assert_eq!(summary.outcome, RunOutcome::Completed);
    assert_eq!(progress, vec![(1, 2), (2, 2)]);
    assert!(logs.iter().any(|l| l == "Found 2 images to process"));

    let pipeline = handle.join().unwrap();
    assert!(pipeline.captioner().is_loaded());

    // A second run reuses the model.
    let handle = spawn_run(pipeline, request, RunState::new()).unwrap();
    let (_, _, result) = drain(&handle);
    assert_eq!(result.unwrap().processed, 2);
    handle.join().unwrap();
    assert_eq!(loads.load(std::sync::atomic::Ordering::SeqCst), 1);
}

#[test]
fn cancel_requested_mid_run_stops_at_next_item() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    for i in 0..5 {
        write_image(input.path(), &format!("img{}.png", i), 12, 12);
    }

    let state = RunState::new();
    let model = CancelAfter {
        state: state.clone(),
        after: 2,
        seen: 0,
    };
    let request = ProcessingRequest::new(input.path(), output.path(), 12, 12);
    let handle = spawn_run(
        BatchPipeline::new(CaptionGenerator::from_model(model)),
        request,
        state.clone(),
    )
    .unwrap();

    let (progress, logs, result) = drain(&handle);
    let summary = result.unwrap();
    assert_eq!(summary.outcome, RunOutcome::Cancelled);
    assert_eq!(summary.processed, 2);
    assert_eq!(progress.len(), 2);
    assert!(logs.iter().any(|l| l == "Processing cancelled"));
    assert_eq!(files_with_suffix(output.path(), ".txt").len(), 2);
    assert!(handle.state().is_cancel_requested());
    handle.join().unwrap();
}

#[test]
fn stale_cancel_is_cleared_when_a_new_run_starts() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    write_image(input.path(), "a.png", 8, 8);

    let state = RunState::new();
    state.request_cancel();

    let request = ProcessingRequest::new(input.path(), output.path(), 8, 8);
    let handle = spawn_run(
        BatchPipeline::new(CaptionGenerator::from_model(DescribeSize)),
        request,
        state,
    )
    .unwrap();

    let (_, _, result) = drain(&handle);
    assert_eq!(result.unwrap().outcome, RunOutcome::Completed);
    handle.join().unwrap();
}

#[test]
fn fatal_error_arrives_as_finished_event() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    write_image(input.path(), "a.png", 8, 8);

    let request = ProcessingRequest::new(input.path(), output.path(), 8, 8);
    let handle = spawn_run(BatchPipeline::new(failing_loader()), request, RunState::new()).unwrap();

    let (progress, logs, result) = drain(&handle);
    assert!(result.unwrap_err().is_model_load());
    assert!(progress.is_empty());
    assert!(logs.iter().any(|l| l.starts_with("Error during processing")));
    let pipeline = handle.join().unwrap();
    assert!(!pipeline.captioner().is_loaded());
}

#[test]
fn phase_is_running_while_worker_is_busy_and_idle_after() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    write_image(input.path(), "a.png", 8, 8);

    let (release, gate) = channel();
    let pipeline = BatchPipeline::new(CaptionGenerator::from_model(Gate { release: gate }));
    let request = ProcessingRequest::new(input.path(), output.path(), 8, 8);
    let handle = spawn_run(pipeline, request, RunState::new()).unwrap();
    assert_eq!(handle.last_run_phase(), None);

    // Wait until the worker is inside the item loop.
    loop {
        match handle.recv_timeout(EVENT_TIMEOUT) {
            Some(RunEvent::Log(line)) if line == "Processing a.png..." => break,
            Some(RunEvent::Finished(result)) => panic!("finished early: {:?}", result),
            Some(_) => {}
            None => panic!("worker stopped before processing"),
        }
    }
    assert_eq!(handle.phase(), RunPhase::Running);

    release.send(()).unwrap();
    let (_, _, result) = drain(&handle);
    assert_eq!(result.unwrap().processed, 1);
    assert_eq!(handle.phase(), RunPhase::Idle);
    assert_eq!(handle.last_run_phase(), Some(RunPhase::Completed));
    handle.join().unwrap();
}

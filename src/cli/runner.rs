use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use loraprep::api::worker::{RunEvent, RunState, spawn_run};
use loraprep::{BatchPipeline, CaptionConfig, CaptionGenerator, Preset, ProcessingRequest, RunOutcome};

use super::args::CliArgs;
use super::errors::AppError;

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Preset (or defaults) overlaid with whatever was given on the command line.
fn effective_preset(args: &CliArgs) -> Result<Preset, AppError> {
    let mut preset = match &args.preset {
        Some(path) => Preset::load(path)?,
        None => Preset::default(),
    };

    if let Some(width) = args.width {
        preset.target_width = width;
    }
    if let Some(height) = args.height {
        preset.target_height = height;
    }
    if let Some(repo) = &args.model_repo {
        preset.caption.model_repo = repo.clone();
    }
    if let Some(revision) = &args.model_revision {
        preset.caption.model_revision = revision.clone();
    }
    if let Some(repo) = &args.tokenizer_repo {
        preset.caption.tokenizer_repo = repo.clone();
    }
    if let Some(max) = args.max_new_tokens {
        preset.caption.max_new_tokens = max;
    }
    if args.cpu {
        preset.caption.cpu = true;
    }
    Ok(preset)
}

#[cfg(feature = "blip")]
fn build_captioner(config: CaptionConfig) -> Result<CaptionGenerator, AppError> {
    Ok(CaptionGenerator::blip(config))
}

#[cfg(not(feature = "blip"))]
fn build_captioner(_config: CaptionConfig) -> Result<CaptionGenerator, AppError> {
    Err(AppError::NoCaptioner)
}

pub fn run(args: CliArgs) -> Result<(), Box<dyn std::error::Error>> {
    init_logging(args.log);

    let preset = effective_preset(&args)?;
    debug!("Effective settings: {:?}", preset);

    if let Some(path) = &args.save_preset {
        preset.save(path)?;
        return Ok(());
    }

    let input = args.input.ok_or(AppError::MissingArgument {
        arg: "--input".to_string(),
    })?;
    let output = args.output.ok_or(AppError::MissingArgument {
        arg: "--output".to_string(),
    })?;
    let request = ProcessingRequest::new(input, output, preset.target_width, preset.target_height);

    let pipeline = BatchPipeline::new(build_captioner(preset.caption)?);
    let handle = spawn_run(pipeline, request, RunState::new())?;

    let mut finished = None;
    while let Some(event) = handle.recv() {
        match event {
            RunEvent::Progress { completed, total } => {
                let percent = completed as f64 / total as f64 * 100.0;
                info!("Progress: {}/{} ({:.0}%)", completed, total, percent);
            }
            RunEvent::Log(message) => info!("{}", message),
            RunEvent::Finished(result) => {
                finished = Some(result);
                break;
            }
        }
    }
    handle.join()?;

    let summary = finished.ok_or(AppError::NoResult)??;
    match summary.outcome {
        RunOutcome::Completed => info!(
            "Done. Processed: {}, Errors: {}",
            summary.processed, summary.failed
        ),
        RunOutcome::Cancelled => warn!(
            "Cancelled. Processed: {}, Errors: {}, Skipped: {}",
            summary.processed,
            summary.failed,
            summary.skipped()
        ),
    }
    Ok(())
}

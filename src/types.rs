//! Shared types used across loraprep.
//! Includes the supported `ImageFormat`s, per-item `ProcessingResult`,
//! and the run lifecycle types (`RunPhase`, `RunOutcome`, `RunSummary`).
use serde::{Deserialize, Serialize};

/// Image formats accepted as input and written back as output.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Serialize, Deserialize)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Webp,
}

impl ImageFormat {
    /// Detect the format from a file name suffix, case-insensitively.
    pub fn from_file_name(name: &str) -> Option<Self> {
        let lower = name.to_lowercase();
        if lower.ends_with(".png") {
            Some(ImageFormat::Png)
        } else if lower.ends_with(".jpg") || lower.ends_with(".jpeg") {
            Some(ImageFormat::Jpeg)
        } else if lower.ends_with(".webp") {
            Some(ImageFormat::Webp)
        } else {
            None
        }
    }
}

impl std::fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImageFormat::Png => write!(f, "PNG"),
            ImageFormat::Jpeg => write!(f, "JPEG"),
            ImageFormat::Webp => write!(f, "WebP"),
        }
    }
}

/// Outcome of processing one image.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum ProcessingResult {
    Success { caption: String },
    Failure { reason: String },
}

/// Lifecycle of the batch pipeline: `Idle -> Running -> {Completed | Cancelled | Failed} -> Idle`.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub enum RunPhase {
    #[default]
    Idle,
    Running,
    Completed,
    Cancelled,
    Failed,
}

impl std::fmt::Display for RunPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunPhase::Idle => write!(f, "Idle"),
            RunPhase::Running => write!(f, "Running"),
            RunPhase::Completed => write!(f, "Completed"),
            RunPhase::Cancelled => write!(f, "Cancelled"),
            RunPhase::Failed => write!(f, "Failed"),
        }
    }
}

/// How a non-fatal run ended. Fatal runs surface as `Err(crate::Error)`.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum RunOutcome {
    Completed,
    Cancelled,
}

impl From<RunOutcome> for RunPhase {
    fn from(outcome: RunOutcome) -> Self {
        match outcome {
            RunOutcome::Completed => RunPhase::Completed,
            RunOutcome::Cancelled => RunPhase::Cancelled,
        }
    }
}

/// Batch processing report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub outcome: RunOutcome,
    /// Matching image files found in the input directory.
    pub total: usize,
    /// Items written with both image and caption.
    pub processed: usize,
    pub failed: usize,
}

impl RunSummary {
    /// Items never attempted because the run was cancelled.
    pub fn skipped(&self) -> usize {
        self.total - self.processed - self.failed
    }
}

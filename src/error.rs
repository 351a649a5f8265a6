//! Crate-level error types and `Result` alias.
//!
//! `Error` is fatal to a run (bad request, model that will not load, output
//! directory that cannot be created). `ItemError` describes why a single image
//! was skipped; the batch pipeline logs it and moves on to the next file.
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid request: {field} {reason}")]
    Validation { field: &'static str, reason: String },

    #[error("Failed to load captioning model: {0}")]
    ModelLoad(String),

    #[error("Error creating output directory {path:?}: {source}")]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Preset error: {0}")]
    Preset(String),

    #[error("Worker error: {0}")]
    Worker(String),
}

impl Error {
    pub fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        Error::Validation {
            field,
            reason: reason.into(),
        }
    }

    pub fn model_load<E: std::fmt::Display>(e: E) -> Self {
        Error::ModelLoad(e.to_string())
    }

    /// True for the two run-fatal kinds the pipeline reports before touching any item.
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation { .. })
    }

    pub fn is_model_load(&self) -> bool {
        matches!(self, Error::ModelLoad(_))
    }
}

/// Failure while processing one image. Never fatal to the run.
#[derive(Debug, Error)]
pub enum ItemError {
    #[error("Error processing image: {0}")]
    Image(#[from] image::ImageError),

    #[error("Source image has zero size ({width}x{height})")]
    EmptySource { width: u32, height: u32 },

    #[error("Target canvas has zero size ({width}x{height})")]
    EmptyTarget { width: u32, height: u32 },

    #[error("Canvas buffer does not match {width}x{height}")]
    Canvas { width: u32, height: u32 },

    #[error("Resize buffer error: {0}")]
    Buffer(#[from] fast_image_resize::ImageBufferError),

    #[error("Resize error: {0}")]
    Resize(#[from] fast_image_resize::ResizeError),

    #[error("JPEG encoding error: {0}")]
    Jpeg(#[from] jpeg_encoder::EncodingError),

    #[error("Image {width}x{height} exceeds the JPEG dimension limit")]
    JpegTooLarge { width: u32, height: u32 },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Caption error: {0}")]
    Caption(String),
}

use thiserror::Error;

/// Application-specific errors for the CLI
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Missing required argument: {arg}")]
    MissingArgument { arg: String },

    #[error("Run ended without a result from the worker")]
    NoResult,

    #[cfg(not(feature = "blip"))]
    #[error("Captioning support not compiled in; rebuild with --features blip")]
    NoCaptioner,

    #[error(transparent)]
    Library(#[from] loraprep::Error),
}

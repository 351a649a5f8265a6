//! Command Line Interface (CLI) layer for loraprep.
//!
//! This module defines argument parsing (`args`), error types (`errors`),
//! and the orchestration logic (`runner`) that builds a `ProcessingRequest`,
//! starts the background worker and reports its events.
//!
//! If you are embedding loraprep into another application, use
//! `loraprep::api` instead of calling the CLI code.
pub mod args;
pub mod errors;
pub mod runner;

pub use args::CliArgs;
pub use runner::run;

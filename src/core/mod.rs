//! Core building blocks: request parameters and presets, the letterbox
//! resize/padding primitives, and the per-item processing pipeline. The batch
//! loop in `api` is built on top of these.
pub mod params;
pub mod processing;

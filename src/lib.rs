#![doc = r#"
loraprep: batch letterboxing and captioning for image training sets.

Point it at a directory of `.png`, `.jpg`, `.jpeg` or `.webp` files and it
writes, for every image, a copy scaled onto a fixed black-barred canvas plus a
`.txt` caption produced by a pretrained BLIP model. It powers the `loraprep`
CLI and can be embedded in your own Rust applications.

Quick start: one run on the current thread
------------------------------------------
```rust,no_run
# #[cfg(not(feature = "blip"))] fn main() {}
use loraprep::{BatchPipeline, CaptionConfig, CaptionGenerator, ProcessingRequest};

# #[cfg(feature = "blip")]
fn main() -> loraprep::Result<()> {
    let mut pipeline = BatchPipeline::new(CaptionGenerator::blip(CaptionConfig::default()));
    let request = ProcessingRequest::new("/data/raw", "/data/train", 512, 512);

    let summary = pipeline.run(
        &request,
        || false,
        |done, total| println!("{done}/{total}"),
        |msg| println!("{msg}"),
    )?;
    println!("processed={} failed={}", summary.processed, summary.failed);
    Ok(())
}
```

Background worker with cancellation
-----------------------------------
```rust,no_run
# #[cfg(not(feature = "blip"))] fn main() {}
use loraprep::{BatchPipeline, CaptionConfig, CaptionGenerator, ProcessingRequest};
use loraprep::api::worker::{RunEvent, RunState, spawn_run};

# #[cfg(feature = "blip")]
fn main() -> loraprep::Result<()> {
    let pipeline = BatchPipeline::new(CaptionGenerator::blip(CaptionConfig::default()));
    let request = ProcessingRequest::new("/data/raw", "/data/train", 768, 768);
    let state = RunState::new();

    let handle = spawn_run(pipeline, request, state.clone())?;
    while let Some(event) = handle.recv() {
        match event {
            RunEvent::Progress { completed, .. } if completed == 10 => state.request_cancel(),
            RunEvent::Finished(result) => {
                println!("{:?}", result.map(|s| s.outcome));
                break;
            }
            _ => {}
        }
    }
    let _pipeline = handle.join()?; // model stays loaded for the next run
    Ok(())
}
```

Error handling
--------------
Run-fatal problems come back as `loraprep::Error` (`Validation`, `ModelLoad`,
`OutputDir`, ...). A file that fails to decode, write or caption is an
`ItemError`: it is logged, counted in `RunSummary::failed`, and the run goes on.

Feature flags
-------------
- `blip` (default): the candle-based BLIP captioner and its hub download.
- `full`: everything.

Useful modules
--------------
- [`api`]: `BatchPipeline` and the background `worker`.
- [`core`]: request/preset parameters, letterbox resize and padding.
- [`caption`]: `CaptionGenerator` and the `CaptionModel` seam.
- [`io`]: directory scan and output writers.
- [`error`]: crate-level `Error`, `ItemError` and `Result`.
"#]

pub mod api;
pub mod caption;
pub mod core;
pub mod error;
pub mod io;
pub mod types;

// Curated public API surface
pub use api::BatchPipeline;
pub use caption::{CaptionConfig, CaptionGenerator, CaptionModel};
pub use crate::core::params::{DEFAULT_TARGET_SIZE, Preset, ProcessingRequest};
pub use crate::core::processing::resize::{LetterboxLayout, letterbox_layout, resize_letterbox};
pub use error::{Error, ItemError, Result};
pub use io::ImageItem;
pub use types::{ImageFormat, ProcessingResult, RunOutcome, RunPhase, RunSummary};

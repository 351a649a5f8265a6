//! I/O layer: directory scanning for candidate images and the `writers`
//! that encode letterboxed images and caption files.
pub mod scan;
pub use scan::{ImageItem, scan_images};

pub mod writers;

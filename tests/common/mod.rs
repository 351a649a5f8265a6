//! Shared fixtures: stub caption models and on-disk test images.
#![allow(dead_code)]

use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::sync::mpsc::Receiver;
use std::sync::atomic::{AtomicUsize, Ordering};

use image::{Rgb, RgbImage};
use loraprep::api::worker::RunState;
use loraprep::{CaptionGenerator, CaptionModel, Error, ItemError};

/// Describes the canvas it was given, so tests can check what the model saw.
pub struct DescribeSize;

impl CaptionModel for DescribeSize {
    fn caption(&mut self, image: &RgbImage) -> Result<String, ItemError> {
        Ok(format!("a {}x{} picture", image.width(), image.height()))
    }
}

/// Always fails, as a model that chokes on its input would.
pub struct AlwaysFails;

impl CaptionModel for AlwaysFails {
    fn caption(&mut self, _image: &RgbImage) -> Result<String, ItemError> {
        Err(ItemError::Caption("inference failed".to_string()))
    }
}

/// Requests cancellation while captioning the `after`-th image.
pub struct CancelAfter {
    pub state: RunState,
    pub after: usize,
    pub seen: usize,
}

impl CaptionModel for CancelAfter {
    fn caption(&mut self, _image: &RgbImage) -> Result<String, ItemError> {
        self.seen += 1;
        if self.seen == self.after {
            self.state.request_cancel();
        }
        Ok(format!("image number {}", self.seen))
    }
}

/// Blocks inside `caption` until the test releases it.
pub struct Gate {
    pub release: Receiver<()>,
}

impl CaptionModel for Gate {
    fn caption(&mut self, _image: &RgbImage) -> Result<String, ItemError> {
        self.release
            .recv()
            .map_err(|_| ItemError::Caption("gate dropped".to_string()))?;
        Ok("released".to_string())
    }
}

/// A generator whose loader counts how many times it actually ran.
pub fn counting_generator() -> (CaptionGenerator, Arc<AtomicUsize>) {
    let loads = Arc::new(AtomicUsize::new(0));
    let counter = loads.clone();
    let generator = CaptionGenerator::new(move || {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(DescribeSize)
    });
    (generator, loads)
}

pub fn failing_loader() -> CaptionGenerator {
    CaptionGenerator::new(|| -> loraprep::Result<DescribeSize> {
        Err(Error::model_load("weights not found"))
    })
}

pub fn write_image(dir: &Path, name: &str, width: u32, height: u32) {
    let img = RgbImage::from_pixel(width, height, Rgb([180, 90, 30]));
    img.save(dir.join(name)).unwrap();
}

pub fn write_corrupt(dir: &Path, name: &str) {
    fs::write(dir.join(name), b"this is not an image").unwrap();
}

pub fn files_with_suffix(dir: &Path, suffix: &str) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .filter(|n| n.ends_with(suffix))
        .collect();
    names.sort();
    names
}

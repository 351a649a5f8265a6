use image::ImageReader;
use tracing::debug;

use crate::caption::CaptionGenerator;
use crate::core::processing::resize::resize_letterbox;
use crate::error::ItemError;
use crate::io::ImageItem;
use crate::io::writers::caption::write_caption;
use crate::io::writers::image_file::save_rgb_image;
use crate::types::ProcessingResult;

/// Letterbox one image, write it, caption the letterboxed pixels, write the caption.
///
/// The image file is written before captioning starts, so a captioning failure
/// leaves the resized image on disk without a caption.
pub fn process_item(
    item: &ImageItem,
    target_width: u32,
    target_height: u32,
    captioner: &mut CaptionGenerator,
) -> Result<String, ItemError> {
    let source = ImageReader::open(&item.source_path)?
        .with_guessed_format()?
        .decode()?;
    debug!(
        "Decoded {:?}: {}x{}",
        item.source_path,
        source.width(),
        source.height()
    );

    let letterboxed = resize_letterbox(&source, target_width, target_height)?;
    save_rgb_image(&letterboxed, &item.output_image_path, item.format)?;

    let caption = captioner.generate(&letterboxed)?;
    write_caption(&item.output_caption_path, &caption)?;
    Ok(caption)
}

/// Same as [`process_item`], folded into a `ProcessingResult`.
pub fn process_item_result(
    item: &ImageItem,
    target_width: u32,
    target_height: u32,
    captioner: &mut CaptionGenerator,
) -> ProcessingResult {
    match process_item(item, target_width, target_height, captioner) {
        Ok(caption) => ProcessingResult::Success { caption },
        Err(e) => ProcessingResult::Failure {
            reason: e.to_string(),
        },
    }
}

use fast_image_resize::{FilterType, PixelType, ResizeAlg, ResizeOptions, Resizer, images::Image};
use image::{DynamicImage, RgbImage};
use tracing::{debug, trace};

use crate::core::processing::padding::paste_centered;
use crate::error::ItemError;

/// Where the scaled source lands on the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LetterboxLayout {
    pub new_width: u32,
    pub new_height: u32,
    pub offset_x: u32,
    pub offset_y: u32,
}

/// Fit a `source_width x source_height` image inside the target canvas.
///
/// Wider-than-tall sources (`aspect > 1`) fill the target width; everything
/// else, squares included, fills the target height. The branch condition is
/// observable in the output and must stay `> 1`.
pub fn letterbox_layout(
    source_width: u32,
    source_height: u32,
    target_width: u32,
    target_height: u32,
) -> LetterboxLayout {
    let aspect = source_width as f64 / source_height as f64;

    let (new_width, new_height) = if aspect > 1.0 {
        let h = (target_height as f64 / aspect).round() as u32;
        (target_width, h)
    } else {
        let w = (target_width as f64 * aspect).round() as u32;
        (w, target_height)
    };
    let new_width = new_width.max(1).min(target_width);
    let new_height = new_height.max(1).min(target_height);

    LetterboxLayout {
        new_width,
        new_height,
        offset_x: (target_width - new_width) / 2,
        offset_y: (target_height - new_height) / 2,
    }
}

/// Lanczos3 resize of a tightly packed RGB8 buffer.
pub fn resize_rgb8(
    data: &[u8],
    original_width: u32,
    original_height: u32,
    target_width: u32,
    target_height: u32,
) -> Result<Vec<u8>, ItemError> {
    let resize_options =
        ResizeOptions::new().resize_alg(ResizeAlg::Convolution(FilterType::Lanczos3));
    let mut resizer = Resizer::new();

    let src_image = Image::from_vec_u8(
        original_width,
        original_height,
        data.to_vec(),
        PixelType::U8x3,
    )?;
    let mut dst_image = Image::new(target_width, target_height, PixelType::U8x3);
    resizer.resize(&src_image, &mut dst_image, &resize_options)?;

    Ok(dst_image.into_vec())
}

/// Scale `image` to fit a `target_width x target_height` canvas and center it on black.
///
/// The result is always exactly the target size; the source is never cropped.
pub fn resize_letterbox(
    image: &DynamicImage,
    target_width: u32,
    target_height: u32,
) -> Result<RgbImage, ItemError> {
    if target_width == 0 || target_height == 0 {
        return Err(ItemError::EmptyTarget {
            width: target_width,
            height: target_height,
        });
    }
    let rgb = image.to_rgb8();
    let (width, height) = rgb.dimensions();
    if width == 0 || height == 0 {
        return Err(ItemError::EmptySource { width, height });
    }

    let layout = letterbox_layout(width, height, target_width, target_height);
    debug!(
        "Original size: {}x{}, New size: {}x{}, offset ({}, {})",
        width, height, layout.new_width, layout.new_height, layout.offset_x, layout.offset_y
    );

    let scaled = if (layout.new_width, layout.new_height) == (width, height) {
        trace!("Source already at fitted size, skipping resample");
        rgb.into_raw()
    } else {
        resize_rgb8(
            rgb.as_raw(),
            width,
            height,
            layout.new_width,
            layout.new_height,
        )?
    };

    let canvas = paste_centered(
        &scaled,
        layout.new_width,
        layout.new_height,
        target_width,
        target_height,
        layout.offset_x,
        layout.offset_y,
    );

    RgbImage::from_raw(target_width, target_height, canvas).ok_or(ItemError::Canvas {
        width: target_width,
        height: target_height,
    })
}

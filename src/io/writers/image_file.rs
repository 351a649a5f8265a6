use std::path::Path;

use image::RgbImage;
use tracing::debug;

use crate::error::ItemError;
use crate::io::writers::jpeg::{JPEG_QUALITY, write_rgb_jpeg};
use crate::types::ImageFormat;

/// Encode `img` at `output` in `format`.
pub fn save_rgb_image(img: &RgbImage, output: &Path, format: ImageFormat) -> Result<(), ItemError> {
    let (cols, rows) = img.dimensions();
    match format {
        ImageFormat::Jpeg => {
            if cols > u16::MAX as u32 || rows > u16::MAX as u32 {
                return Err(ItemError::JpegTooLarge { width: cols, height: rows });
            }
            write_rgb_jpeg(output, cols, rows, img.as_raw(), JPEG_QUALITY)?;
        }
        ImageFormat::Png => img.save_with_format(output, image::ImageFormat::Png)?,
        ImageFormat::Webp => img.save_with_format(output, image::ImageFormat::WebP)?,
    }
    debug!("Saved {} image {}x{} to {:?}", format, cols, rows, output);
    Ok(())
}

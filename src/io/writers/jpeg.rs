use jpeg_encoder::{ColorType, Encoder};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::ItemError;

/// Quality used for every JPEG the pipeline writes.
pub const JPEG_QUALITY: u8 = 95;

pub fn write_rgb_jpeg(
    output: &Path,
    cols: u32,
    rows: u32,
    rgb_data: &[u8],
    quality: u8,
) -> Result<(), ItemError> {
    let file = File::create(output)?;
    let mut writer = BufWriter::new(file);
    let encoder = Encoder::new(&mut writer, quality);
    encoder.encode(rgb_data, cols as u16, rows as u16, ColorType::Rgb)?;
    writer.flush()?;
    Ok(())
}

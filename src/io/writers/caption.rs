use std::fs;
use std::path::Path;

use crate::error::ItemError;

/// Write the caption verbatim as UTF-8, with no trailing newline.
pub fn write_caption(output: &Path, caption: &str) -> Result<(), ItemError> {
    fs::write(output, caption.as_bytes())?;
    Ok(())
}

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, trace};

use crate::types::ImageFormat;

/// One input image and where its outputs go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageItem {
    pub source_path: PathBuf,
    /// File name with its final extension stripped, for display. Lossy for non-UTF-8 names;
    /// the output paths keep the original bytes.
    pub base_name: String,
    pub output_image_path: PathBuf,
    pub output_caption_path: PathBuf,
    pub format: ImageFormat,
}

impl ImageItem {
    /// Derive output paths from a source file. Returns `None` for unsupported names.
    pub fn from_source(source_path: &Path, output_dir: &Path) -> Option<Self> {
        let file_name = source_path.file_name()?;
        let format = ImageFormat::from_file_name(&file_name.to_string_lossy())?;
        let stem = source_path.file_stem()?;
        let mut caption_name = stem.to_os_string();
        caption_name.push(".txt");

        Some(Self {
            source_path: source_path.to_path_buf(),
            output_image_path: output_dir.join(file_name),
            output_caption_path: output_dir.join(caption_name),
            base_name: stem.to_string_lossy().into_owned(),
            format,
        })
    }

    pub fn file_name(&self) -> String {
        self.source_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// List regular files in `input_dir` whose names end in a supported image suffix.
///
/// Order is whatever the directory listing yields; callers must not rely on sorting.
pub fn scan_images(input_dir: &Path, output_dir: &Path) -> std::io::Result<Vec<ImageItem>> {
    let mut items = Vec::new();
    for entry in fs::read_dir(input_dir)? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() {
            trace!("Skipping non-file: {:?}", path);
            continue;
        }
        match ImageItem::from_source(&path, output_dir) {
            Some(item) => items.push(item),
            None => debug!("Skipping non-image file: {:?}", path),
        }
    }
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn derives_output_paths_from_file_name() {
        let item = ImageItem::from_source(Path::new("/in/holiday.photo.JPEG"), Path::new("/out"))
            .unwrap();
        assert_eq!(item.base_name, "holiday.photo");
        assert_eq!(item.output_image_path, Path::new("/out/holiday.photo.JPEG"));
        assert_eq!(item.output_caption_path, Path::new("/out/holiday.photo.txt"));
        assert_eq!(item.format, ImageFormat::Jpeg);
        assert_eq!(item.file_name(), "holiday.photo.JPEG");
    }

    #[test]
    fn scan_filters_by_suffix_and_skips_directories() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["a.png", "b.JPG", "c.jpeg", "d.WebP", "notes.txt", "e.gif", "noext"] {
            fs::write(dir.path().join(name), b"x").unwrap();
        }
        fs::create_dir(dir.path().join("folder.png")).unwrap();

        let items = scan_images(dir.path(), Path::new("/out")).unwrap();
        let names: HashSet<String> = items.iter().map(|i| i.file_name()).collect();
        let expected: HashSet<String> = ["a.png", "b.JPG", "c.jpeg", "d.WebP"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(names, expected);
    }

    #[test]
    fn scan_of_missing_directory_is_an_error() {
        assert!(scan_images(Path::new("/definitely/not/here"), Path::new("/out")).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn non_utf8_stem_is_kept_byte_for_byte() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let source = Path::new("/in").join(OsStr::from_bytes(b"caf\xe9.png"));
        let item = ImageItem::from_source(&source, Path::new("/out")).unwrap();
        assert_eq!(
            item.output_caption_path,
            Path::new("/out").join(OsStr::from_bytes(b"caf\xe9.txt"))
        );
        assert_eq!(
            item.output_image_path,
            Path::new("/out").join(OsStr::from_bytes(b"caf\xe9.png"))
        );
        assert_eq!(item.base_name, "caf\u{FFFD}");
    }
}

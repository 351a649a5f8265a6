use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::caption::CaptionConfig;
use crate::error::{Error, Result};

/// Default canvas edge, matching the values the original form was pre-filled with.
pub const DEFAULT_TARGET_SIZE: u32 = 512;

/// One batch run: where to read, where to write, and the canvas size.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessingRequest {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub target_width: u32,
    pub target_height: u32,
}

impl ProcessingRequest {
    pub fn new(
        input_dir: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
        target_width: u32,
        target_height: u32,
    ) -> Self {
        Self {
            input_dir: input_dir.into(),
            output_dir: output_dir.into(),
            target_width,
            target_height,
        }
    }

    /// Check required fields without touching the output directory or listing anything.
    pub fn validate(&self) -> Result<()> {
        if self.input_dir.as_os_str().is_empty() {
            return Err(Error::validation("input_dir", "must not be empty"));
        }
        if self.output_dir.as_os_str().is_empty() {
            return Err(Error::validation("output_dir", "must not be empty"));
        }
        if self.target_width == 0 {
            return Err(Error::validation("target_width", "must be greater than 0"));
        }
        if self.target_height == 0 {
            return Err(Error::validation("target_height", "must be greater than 0"));
        }
        if !self.input_dir.is_dir() {
            return Err(Error::validation(
                "input_dir",
                format!("{:?} is not an existing directory", self.input_dir),
            ));
        }
        Ok(())
    }
}

/// Reusable settings. Input/output paths are deliberately not part of a preset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preset {
    pub target_width: u32,
    pub target_height: u32,
    #[serde(default)]
    pub caption: CaptionConfig,
}

impl Default for Preset {
    fn default() -> Self {
        Self {
            target_width: DEFAULT_TARGET_SIZE,
            target_height: DEFAULT_TARGET_SIZE,
            caption: CaptionConfig::default(),
        }
    }
}

impl Preset {
    pub fn to_file_contents(&self) -> Result<String> {
        let mut content = String::new();
        content.push_str("// ==========================================\n");
        content.push_str("// loraprep Configuration Preset\n");
        content.push_str("// ==========================================\n");
        content.push_str(&format!("// Version: {}\n", env!("CARGO_PKG_VERSION")));
        content.push_str(&format!("// Generated: {}\n", chrono::Utc::now().to_rfc3339()));
        content.push_str("// Note: Input/Output paths are not included in presets\n");
        content.push_str("// ==========================================\n\n");

        let json = serde_json::to_string_pretty(self).map_err(|e| Error::Preset(e.to_string()))?;
        content.push_str(&json);
        content.push('\n');
        Ok(content)
    }

    /// Parse preset text, skipping the comment header up to the first `{`.
    pub fn from_file_contents(content: &str) -> Result<Self> {
        let json_start = content
            .find('{')
            .ok_or_else(|| Error::Preset("no JSON content found".to_string()))?;
        serde_json::from_str(&content[json_start..]).map_err(|e| Error::Preset(e.to_string()))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        fs::write(path, self.to_file_contents()?)?;
        info!("Preset saved to: {:?}", path);
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let preset = Self::from_file_contents(&content)?;
        info!("Preset loaded from: {:?}", path);
        Ok(preset)
    }
}

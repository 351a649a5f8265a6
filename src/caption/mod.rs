//! Caption generation: a lazily loaded, memoized wrapper around an
//! image-to-text model.
//!
//! The wrapper owns a loader closure and an `Option` holding the model once
//! loaded. `load` is idempotent; the model survives across runs so a second
//! batch does not pay the load cost again. The default model is BLIP
//! (feature `blip`); anything implementing [`CaptionModel`] can be plugged in.
use image::RgbImage;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Error, ItemError, Result};

#[cfg(feature = "blip")]
pub mod blip;
#[cfg(feature = "blip")]
pub use blip::BlipCaptioner;

/// Upper bound on generated tokens per caption.
pub const DEFAULT_MAX_NEW_TOKENS: usize = 50;

/// Where to fetch the captioning model from and how to run it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptionConfig {
    /// Hugging Face repository holding `model.safetensors`
    pub model_repo: String,
    pub model_revision: String,
    /// Repository holding `tokenizer.json`
    pub tokenizer_repo: String,
    pub max_new_tokens: usize,
    /// Force CPU even when an accelerator is available
    pub cpu: bool,
}

impl Default for CaptionConfig {
    fn default() -> Self {
        Self {
            model_repo: "Salesforce/blip-image-captioning-large".to_string(),
            model_revision: "refs/pr/18".to_string(),
            tokenizer_repo: "Salesforce/blip-image-captioning-large".to_string(),
            max_new_tokens: DEFAULT_MAX_NEW_TOKENS,
            cpu: false,
        }
    }
}

/// An image-to-text model that has already been loaded.
pub trait CaptionModel: Send {
    /// Produce a short natural-language description of `image`.
    fn caption(&mut self, image: &RgbImage) -> std::result::Result<String, ItemError>;
}

type ModelLoader = Box<dyn FnMut() -> Result<Box<dyn CaptionModel>> + Send>;

pub struct CaptionGenerator {
    loader: ModelLoader,
    model: Option<Box<dyn CaptionModel>>,
}

impl CaptionGenerator {
    /// Wrap a loader that is only invoked on the first `load`.
    pub fn new<F, M>(mut loader: F) -> Self
    where
        F: FnMut() -> Result<M> + Send + 'static,
        M: CaptionModel + 'static,
    {
        Self {
            loader: Box::new(move || loader().map(|m| Box::new(m) as Box<dyn CaptionModel>)),
            model: None,
        }
    }

    /// Use an already constructed model; `load` becomes a no-op.
    pub fn from_model<M: CaptionModel + 'static>(model: M) -> Self {
        Self {
            loader: Box::new(|| {
                Err(Error::ModelLoad(
                    "pre-loaded caption model cannot be reloaded".to_string(),
                ))
            }),
            model: Some(Box::new(model)),
        }
    }

    /// BLIP captioner fetched from the Hugging Face hub on first use.
    #[cfg(feature = "blip")]
    pub fn blip(config: CaptionConfig) -> Self {
        Self::new(move || BlipCaptioner::load(&config))
    }

    pub fn is_loaded(&self) -> bool {
        self.model.is_some()
    }

    /// Load the model if it is not loaded yet. Returns `true` when this call did the loading.
    pub fn load(&mut self) -> Result<bool> {
        if self.model.is_some() {
            debug!("Captioning model already loaded");
            return Ok(false);
        }
        let model = (self.loader)()?;
        self.model = Some(model);
        info!("Captioning model loaded");
        Ok(true)
    }

    /// Caption `image`, loading the model first if needed.
    pub fn generate(&mut self, image: &RgbImage) -> std::result::Result<String, ItemError> {
        if self.model.is_none() {
            self.load()
                .map_err(|e| ItemError::Caption(format!("model unavailable: {}", e)))?;
        }
        let model = self
            .model
            .as_mut()
            .ok_or_else(|| ItemError::Caption("model unavailable".to_string()))?;

        let caption = model.caption(image)?;
        let caption = caption.trim();
        if caption.is_empty() {
            return Err(ItemError::Caption("model returned an empty caption".to_string()));
        }
        Ok(caption.to_string())
    }
}

impl std::fmt::Debug for CaptionGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptionGenerator")
            .field("loaded", &self.is_loaded())
            .finish()
    }
}

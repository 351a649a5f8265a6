//! BLIP image captioning on candle.
use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::generation::LogitsProcessor;
use candle_transformers::models::blip;
use hf_hub::api::sync::Api;
use hf_hub::{Repo, RepoType};
use image::imageops::FilterType;
use image::{DynamicImage, RgbImage};
use tokenizers::Tokenizer;
use tracing::{debug, info};

use super::{CaptionConfig, CaptionModel};
use crate::error::{Error, ItemError, Result};

const IMAGE_SIZE: u32 = 384;
const BOS_TOKEN_ID: u32 = 30522;
const SEP_TOKEN_ID: u32 = 102;
// Unused with greedy decoding but required by the processor.
const SAMPLING_SEED: u64 = 1337;

const PIXEL_MEAN: [f32; 3] = [0.481_454_66, 0.457_827_5, 0.408_210_73];
const PIXEL_STD: [f32; 3] = [0.268_629_54, 0.261_302_6, 0.275_777_1];

/// Resize-to-fill 384x384, scale to [0, 1] and normalize per channel. Shape (3, H, W).
fn preprocess(image: &RgbImage, device: &Device) -> candle_core::Result<Tensor> {
    let img = DynamicImage::ImageRgb8(image.clone())
        .resize_to_fill(IMAGE_SIZE, IMAGE_SIZE, FilterType::Triangle)
        .to_rgb8();
    let side = IMAGE_SIZE as usize;
    let data =
        Tensor::from_vec(img.into_raw(), (side, side, 3), &Device::Cpu)?.permute((2, 0, 1))?;
    let mean = Tensor::new(&PIXEL_MEAN, &Device::Cpu)?.reshape((3, 1, 1))?;
    let std = Tensor::new(&PIXEL_STD, &Device::Cpu)?.reshape((3, 1, 1))?;
    (data.to_dtype(DType::F32)? / 255.)?
        .broadcast_sub(&mean)?
        .broadcast_div(&std)?
        .to_device(device)
}

pub struct BlipCaptioner {
    model: blip::BlipForConditionalGeneration,
    tokenizer: Tokenizer,
    device: Device,
    max_new_tokens: usize,
}

impl BlipCaptioner {
    /// Download (or reuse the cached) weights and tokenizer, then build the model.
    pub fn load(config: &CaptionConfig) -> Result<Self> {
        info!(
            "Loading captioning model {} ({})",
            config.model_repo, config.model_revision
        );
        let device = if config.cpu {
            Device::Cpu
        } else {
            Device::cuda_if_available(0).map_err(Error::model_load)?
        };
        debug!("Captioning device: {:?}", device);

        let api = Api::new().map_err(Error::model_load)?;
        let model_file = api
            .repo(Repo::with_revision(
                config.model_repo.clone(),
                RepoType::Model,
                config.model_revision.clone(),
            ))
            .get("model.safetensors")
            .map_err(Error::model_load)?;
        let tokenizer_file = api
            .model(config.tokenizer_repo.clone())
            .get("tokenizer.json")
            .map_err(Error::model_load)?;

        let tokenizer = Tokenizer::from_file(tokenizer_file).map_err(Error::model_load)?;

        // SAFETY: the hub cache file is not modified while mapped.
        let vb = unsafe { VarBuilder::from_mmaped_safetensors(&[model_file], DType::F32, &device) }
            .map_err(Error::model_load)?;
        let blip_config = blip::Config::image_captioning_large();
        let model =
            blip::BlipForConditionalGeneration::new(&blip_config, vb).map_err(Error::model_load)?;

        Ok(Self {
            model,
            tokenizer,
            device,
            max_new_tokens: config.max_new_tokens,
        })
    }

    /// Greedy decode, stopping at `[SEP]` or after `max_new_tokens`.
    fn generate_tokens(&mut self, image: &RgbImage) -> candle_core::Result<Vec<u32>> {
        let pixels = preprocess(image, &self.device)?;
        self.model.reset_kv_cache();
        let image_embeds = pixels.unsqueeze(0)?.apply(self.model.vision_model())?;

        let mut logits_processor = LogitsProcessor::new(SAMPLING_SEED, None, None);
        let mut token_ids = vec![BOS_TOKEN_ID];
        for index in 0..self.max_new_tokens {
            let context_size = if index > 0 { 1 } else { token_ids.len() };
            let start_pos = token_ids.len().saturating_sub(context_size);
            let input_ids = Tensor::new(&token_ids[start_pos..], &self.device)?.unsqueeze(0)?;
            let logits = self
                .model
                .text_decoder()
                .forward(&input_ids, &image_embeds)?;
            let logits = logits.squeeze(0)?;
            let logits = logits.get(logits.dim(0)? - 1)?;
            let token = logits_processor.sample(&logits)?;
            if token == SEP_TOKEN_ID {
                break;
            }
            token_ids.push(token);
        }
        Ok(token_ids.split_off(1))
    }
}

impl CaptionModel for BlipCaptioner {
    fn caption(&mut self, image: &RgbImage) -> std::result::Result<String, ItemError> {
        let tokens = self
            .generate_tokens(image)
            .map_err(|e| ItemError::Caption(e.to_string()))?;
        debug!("Generated {} caption tokens", tokens.len());
        self.tokenizer
            .decode(&tokens, true)
            .map_err(|e| ItemError::Caption(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn preprocess_fills_square_and_normalizes() {
        let black = RgbImage::new(40, 10);
        let pixels = preprocess(&black, &Device::Cpu).unwrap();
        assert_eq!(pixels.dims(), &[3, 384, 384]);
        assert_eq!(pixels.dtype(), DType::F32);

        let values = pixels.to_vec3::<f32>().unwrap();
        for channel in 0..3 {
            let expected = -PIXEL_MEAN[channel] / PIXEL_STD[channel];
            for (y, x) in [(0, 0), (191, 200), (383, 383)] {
                let got = values[channel][y][x];
                assert!((got - expected).abs() < 1e-5, "c{} ({}, {}): {}", channel, y, x, got);
            }
        }
    }

    #[test]
    fn preprocess_keeps_channel_order() {
        let red = RgbImage::from_pixel(16, 16, Rgb([255, 0, 0]));
        let values = preprocess(&red, &Device::Cpu).unwrap().to_vec3::<f32>().unwrap();
        let expected_red = (1.0 - PIXEL_MEAN[0]) / PIXEL_STD[0];
        let expected_green = -PIXEL_MEAN[1] / PIXEL_STD[1];
        assert!((values[0][100][100] - expected_red).abs() < 1e-5);
        assert!((values[1][100][100] - expected_green).abs() < 1e-5);
    }

    #[test]
    #[ignore = "downloads BLIP weights from the Hugging Face hub"]
    fn hub_model_captions_an_image() {
        let config = CaptionConfig {
            cpu: true,
            ..CaptionConfig::default()
        };
        let mut captioner = BlipCaptioner::load(&config).unwrap();
        let img = RgbImage::from_fn(64, 64, |x, y| Rgb([(x * 4) as u8, (y * 4) as u8, 128]));
        let caption = captioner.caption(&img).unwrap();
        assert!(!caption.trim().is_empty());
    }
}

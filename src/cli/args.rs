use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "loraprep", version, about = "Letterbox and caption a directory of images")]
pub struct CliArgs {
    /// Input directory containing .png/.jpg/.jpeg/.webp images
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Output directory (created if missing)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Canvas width in pixels [default: 512, or the preset's value]
    #[arg(long)]
    pub width: Option<u32>,

    /// Canvas height in pixels [default: 512, or the preset's value]
    #[arg(long)]
    pub height: Option<u32>,

    /// Hugging Face repository with the BLIP weights
    #[arg(long)]
    pub model_repo: Option<String>,

    /// Revision of the weights repository
    #[arg(long)]
    pub model_revision: Option<String>,

    /// Hugging Face repository with tokenizer.json
    #[arg(long)]
    pub tokenizer_repo: Option<String>,

    /// Maximum number of tokens per caption
    #[arg(long)]
    pub max_new_tokens: Option<usize>,

    /// Run the model on CPU even if a GPU is available
    #[arg(long, default_value_t = false)]
    pub cpu: bool,

    /// Load canvas size and model settings from a preset file
    #[arg(long)]
    pub preset: Option<PathBuf>,

    /// Write the effective settings to a preset file and exit
    #[arg(long)]
    pub save_preset: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, default_value_t = false)]
    pub log: bool,
}

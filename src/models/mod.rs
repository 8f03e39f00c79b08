//! Whisper model management.

pub mod catalog;
pub mod download;

pub use catalog::{ModelInfo, ModelSize};
pub use download::{default_models_dir, ensure_model, model_path};

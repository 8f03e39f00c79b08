//! Whisper model metadata catalog.
//!
//! One entry per selectable model size, pointing at the ggml conversions
//! published in the `ggerganov/whisper.cpp` HuggingFace repository.

use crate::error::{Result, ScriptifyError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const HF_BASE_URL: &str = "https://huggingface.co/ggerganov/whisper.cpp/resolve/main";

/// Model size selectable on the command line.
///
/// Larger models are slower and more accurate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum ModelSize {
    Tiny,
    #[default]
    Base,
    Small,
    Medium,
    Large,
}

impl ModelSize {
    pub const ALL: [ModelSize; 5] = [
        ModelSize::Tiny,
        ModelSize::Base,
        ModelSize::Small,
        ModelSize::Medium,
        ModelSize::Large,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ModelSize::Tiny => "tiny",
            ModelSize::Base => "base",
            ModelSize::Small => "small",
            ModelSize::Medium => "medium",
            ModelSize::Large => "large",
        }
    }

    /// Catalog entry for this size.
    pub fn info(self) -> &'static ModelInfo {
        // MODELS is indexed in ALL order
        &MODELS[self as usize]
    }
}

impl fmt::Display for ModelSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelSize {
    type Err = ScriptifyError;

    fn from_str(s: &str) -> Result<Self> {
        ModelSize::ALL
            .into_iter()
            .find(|size| size.as_str() == s.trim())
            .ok_or_else(|| {
                ScriptifyError::config(
                    "transcription.model_size",
                    format!("unknown model size '{s}' (expected tiny, base, small, medium or large)"),
                )
            })
    }
}

/// Metadata for a Whisper model file.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelInfo {
    pub size: ModelSize,
    /// File name in the HuggingFace repo and in the local cache
    pub file_name: &'static str,
    /// Approximate download size in megabytes
    pub size_mb: u32,
    /// SHA-1 of the file as published upstream (empty = skip verification)
    pub sha1: &'static str,
}

impl ModelInfo {
    pub fn url(&self) -> String {
        format!("{}/{}", HF_BASE_URL, self.file_name)
    }
}

/// Catalog of available models, in [`ModelSize::ALL`] order.
pub const MODELS: &[ModelInfo] = &[
    ModelInfo {
        size: ModelSize::Tiny,
        file_name: "ggml-tiny.bin",
        size_mb: 75,
        sha1: "bd577a113a864445d4c299885e0cb97d4ba92b5f",
    },
    ModelInfo {
        size: ModelSize::Base,
        file_name: "ggml-base.bin",
        size_mb: 142,
        sha1: "465707469ff3a37a2b9b8d8f89f2f99de7299dac",
    },
    ModelInfo {
        size: ModelSize::Small,
        file_name: "ggml-small.bin",
        size_mb: 466,
        sha1: "55356645c2b361a969dfd0ef2c5a50d530afd8d5",
    },
    ModelInfo {
        size: ModelSize::Medium,
        file_name: "ggml-medium.bin",
        size_mb: 1533,
        sha1: "fd9727b6e1217c2f614f9b698455c4ffd82463b4",
    },
    ModelInfo {
        size: ModelSize::Large,
        file_name: "ggml-large-v3.bin",
        size_mb: 3095,
        sha1: "ad82bf6a9043ceed055076d0fd39f5f186ff8062",
    },
];

/// Get all available models.
pub fn list_models() -> &'static [ModelInfo] {
    MODELS
}

//! Error types for scriptify.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScriptifyError {
    // Precondition errors
    #[error("Audio file not found: {path}")]
    AudioNotFound { path: String },

    // Configuration errors
    #[error("Invalid configuration value for {key}: {message}")]
    Configuration { key: String, message: String },

    #[error("Failed to parse configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),

    // Audio conversion / decode errors
    #[error("Audio conversion tool not found: {tool}")]
    ConversionToolNotFound { tool: String },

    #[error("Audio conversion failed: {message}")]
    ConversionFailed { message: String },

    #[error("Failed to decode audio: {message}")]
    AudioDecode { message: String },

    // Model / inference errors
    #[error("Whisper model not found at {path}")]
    ModelNotFound { path: String },

    #[error("Model download failed: {message}")]
    ModelDownload { message: String },

    #[error("Transcription inference failed: {message}")]
    InferenceFailed { message: String },

    // General I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ScriptifyError {
    /// Shorthand for a [`ScriptifyError::Configuration`] error.
    pub fn config(key: &str, message: impl Into<String>) -> Self {
        Self::Configuration {
            key: key.to_string(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ScriptifyError>;

use crate::defaults;
use crate::device::DevicePreference;
use crate::error::{Result, ScriptifyError};
use crate::models::{ModelSize, default_models_dir};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub transcription: TranscriptionConfig,
    pub models: ModelsConfig,
    pub compute: ComputeConfig,
    pub audio: AudioConfig,
}

/// Transcription defaults
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TranscriptionConfig {
    pub model_size: ModelSize,
    pub language: String,
    pub chunk_length_secs: f64,
}

/// Model cache configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ModelsConfig {
    /// Overrides `~/.cache/scriptify/models`
    pub dir: Option<PathBuf>,
    pub auto_download: bool,
}

/// Inference hardware configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct ComputeConfig {
    pub device: DevicePreference,
    pub threads: Option<usize>,
}

/// External audio tooling
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AudioConfig {
    pub ffmpeg: String,
}

impl Default for TranscriptionConfig {
    fn default() -> Self {
        Self {
            model_size: ModelSize::default(),
            language: defaults::DEFAULT_LANGUAGE.to_string(),
            chunk_length_secs: defaults::CHUNK_LENGTH_SECS,
        }
    }
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            dir: None,
            auto_download: true,
        }
    }
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            ffmpeg: defaults::FFMPEG.to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Returns an error if the file can't be read or contains invalid TOML.
    /// Missing fields will use default values.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from a file or return defaults if file doesn't exist
    ///
    /// Only returns defaults if the file is missing.
    /// Returns errors for invalid TOML.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        match Self::load(path) {
            Err(ScriptifyError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                Ok(Self::default())
            }
            other => other,
        }
    }

    /// Resolve the effective configuration.
    ///
    /// An explicit path must exist. Otherwise the default location is used
    /// when present. Environment overrides are applied last and the result
    /// is validated.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        let config = match explicit {
            Some(path) => {
                tracing::debug!(path = %path.display(), "loading config");
                Self::load(path).map_err(|e| match e {
                    ScriptifyError::Io(io) => ScriptifyError::config(
                        "config",
                        format!("cannot read {}: {io}", path.display()),
                    ),
                    other => other,
                })?
            }
            None => match Self::default_path() {
                Some(path) => Self::load_or_default(&path)?,
                None => Self::default(),
            },
        };

        let config = config.with_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Apply environment variable overrides
    ///
    /// Supported environment variables:
    /// - SCRIPTIFY_MODEL_SIZE → transcription.model_size
    /// - SCRIPTIFY_LANGUAGE → transcription.language
    /// - SCRIPTIFY_CHUNK_LENGTH → transcription.chunk_length_secs
    /// - SCRIPTIFY_DEVICE → compute.device
    /// - SCRIPTIFY_FFMPEG → audio.ffmpeg
    /// - SCRIPTIFY_MODELS_DIR → models.dir
    pub fn with_env_overrides(mut self) -> Result<Self> {
        if let Some(size) = env_value("SCRIPTIFY_MODEL_SIZE") {
            self.transcription.model_size = size.parse()?;
        }

        if let Some(language) = env_value("SCRIPTIFY_LANGUAGE") {
            self.transcription.language = language;
        }

        if let Some(length) = env_value("SCRIPTIFY_CHUNK_LENGTH") {
            self.transcription.chunk_length_secs = length.trim().parse().map_err(|_| {
                ScriptifyError::config(
                    "transcription.chunk_length_secs",
                    format!("SCRIPTIFY_CHUNK_LENGTH is not a number: '{length}'"),
                )
            })?;
        }

        if let Some(device) = env_value("SCRIPTIFY_DEVICE") {
            self.compute.device = device.parse()?;
        }

        if let Some(ffmpeg) = env_value("SCRIPTIFY_FFMPEG") {
            self.audio.ffmpeg = ffmpeg;
        }

        if let Some(dir) = env_value("SCRIPTIFY_MODELS_DIR") {
            self.models.dir = Some(PathBuf::from(dir));
        }

        Ok(self)
    }

    /// Reject values no run could succeed with.
    pub fn validate(&self) -> Result<()> {
        let length = self.transcription.chunk_length_secs;
        if !length.is_finite() || length <= 0.0 {
            return Err(ScriptifyError::config(
                "transcription.chunk_length_secs",
                format!("must be a positive number of seconds, got {length}"),
            ));
        }

        if self.compute.threads == Some(0) {
            return Err(ScriptifyError::config(
                "compute.threads",
                "must be at least 1",
            ));
        }

        if self.audio.ffmpeg.trim().is_empty() {
            return Err(ScriptifyError::config("audio.ffmpeg", "must not be empty"));
        }

        Ok(())
    }

    /// Directory holding downloaded models, with `~/` expanded.
    pub fn models_dir(&self) -> PathBuf {
        match &self.models.dir {
            Some(dir) => expand_home(dir),
            None => default_models_dir(),
        }
    }

    /// Get the default configuration file path
    ///
    /// Returns ~/.config/scriptify/config.toml on Linux
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("scriptify").join("config.toml"))
    }
}

fn env_value(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.is_empty())
}

fn expand_home(path: &Path) -> PathBuf {
    if let Ok(rest) = path.strip_prefix("~")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(rest);
    }
    path.to_path_buf()
}

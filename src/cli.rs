//! Command-line interface for scriptify
//!
//! Provides argument parsing using clap derive macros.

use crate::config::Config;
use crate::device::DevicePreference;
use crate::models::ModelSize;
use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// Transcribe an audio file and print the result as one JSON line
#[derive(Parser, Debug)]
#[command(
    name = "scriptify",
    version,
    about = "Transcribe an audio file with Whisper and print the result as JSON",
    subcommand_negates_reqs = true
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Audio file to transcribe (WAV is read directly, anything else goes through ffmpeg)
    #[arg(long, value_name = "PATH", required = true)]
    pub audio_path: Option<PathBuf>,

    /// Language code for transcription (default: auto-detect). Examples: auto, en, de, fr
    #[arg(long, value_name = "LANG")]
    pub language: Option<String>,

    /// Whisper model size (default: base)
    #[arg(long, value_name = "SIZE", value_enum)]
    pub model_size: Option<ModelSize>,

    /// Chunk length in seconds (default: 30)
    #[arg(long, value_name = "SECONDS")]
    pub chunk_length: Option<f64>,

    /// Compute device (default: auto)
    #[arg(long, value_name = "DEVICE", value_enum)]
    pub device: Option<DevicePreference>,

    /// Number of CPU threads for inference (default: whisper.cpp's choice)
    #[arg(long, short = 't', value_name = "THREADS")]
    pub threads: Option<usize>,

    /// Use this ggml model file instead of the model cache
    #[arg(long, value_name = "PATH")]
    pub model_path: Option<PathBuf>,

    /// Prevent automatic model download if the model is missing
    #[arg(long)]
    pub no_download: bool,

    /// Path to configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Suppress progress output (quiet mode)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose output (-v: debug, -vv: trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Layer command-line flags over the loaded configuration.
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(language) = &self.language {
            config.transcription.language = language.clone();
        }
        if let Some(size) = self.model_size {
            config.transcription.model_size = size;
        }
        if let Some(length) = self.chunk_length {
            config.transcription.chunk_length_secs = length;
        }
        if let Some(device) = self.device {
            config.compute.device = device;
        }
        if let Some(threads) = self.threads {
            config.compute.threads = Some(threads);
        }
        if self.no_download {
            config.models.auto_download = false;
        }
    }
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage Whisper models
    Models {
        /// Action to perform
        #[command(subcommand)]
        action: ModelsAction,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

/// Model management actions
#[derive(Subcommand, Debug)]
pub enum ModelsAction {
    /// List available models
    List,
    /// Download and install a model
    Install {
        /// Model size (tiny, base, small, medium, large)
        #[arg(value_enum)]
        size: ModelSize,
    },
}

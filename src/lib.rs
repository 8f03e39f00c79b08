//! scriptify - Transcribe audio files with Whisper
//!
//! Offline speech-to-text for a single file: normalize, chunk, transcribe,
//! stitch, and print one JSON document.

#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::let_underscore_must_use)]

pub mod app;
pub mod audio;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod defaults;
pub mod device;
pub mod error;
pub mod logging;
pub mod models;
pub mod output;
pub mod pipeline;
pub mod stt;

// Core traits
pub use audio::AudioConverter;
pub use pipeline::ProgressObserver;
pub use stt::transcriber::Transcriber;

// Pipeline
pub use pipeline::{TranscriptionRequest, TranscriptionResult, transcribe_file};

// Error handling
pub use error::{Result, ScriptifyError};

// Config
pub use config::Config;

/// Build version string with optional git commit hash.
///
/// Returns `"0.1.0+abc1234"` when git hash is available, `"0.1.0"` otherwise.
pub fn version_string() -> String {
    let version = env!("CARGO_PKG_VERSION");
    match option_env!("GIT_HASH") {
        Some(hash) if !hash.is_empty() => format!("{}+{}", version, hash),
        _ => version.to_string(),
    }
}

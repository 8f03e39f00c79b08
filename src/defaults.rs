//! Default configuration constants for scriptify.
//!
//! Shared by the config layer, the CLI and the pipeline so every entry point
//! agrees on the same baseline values.

/// Canonical sample rate in Hz for everything past the normalizer.
///
/// 16kHz mono is what Whisper models are trained on.
pub const SAMPLE_RATE: u32 = 16000;

/// Canonical channel count.
pub const CHANNELS: u16 = 1;

/// Default chunk length in seconds.
///
/// Matches Whisper's 30s context window, so a full chunk is exactly one
/// decoder pass.
pub const CHUNK_LENGTH_SECS: f64 = 30.0;

/// Default model size.
pub const DEFAULT_MODEL_SIZE: &str = "base";

/// Default language hint.
pub const DEFAULT_LANGUAGE: &str = "auto";

/// Language value that lets Whisper detect the spoken language.
pub const AUTO_LANGUAGE: &str = "auto";

/// Confidence reported on every successful transcription.
///
/// A fixed placeholder: the inference backend exposes no calibrated score.
pub const PLACEHOLDER_CONFIDENCE: f64 = 0.9;

/// Default audio conversion program.
pub const FFMPEG: &str = "ffmpeg";

/// File extension of the container that is decoded without conversion.
pub const CANONICAL_EXTENSION: &str = "wav";

/// Report the GPU backend compiled into this build.
///
/// Only one GPU backend can be active at a time; if none is enabled, returns "CPU".
pub fn gpu_backend() -> &'static str {
    if cfg!(feature = "cuda") {
        "CUDA"
    } else if cfg!(feature = "vulkan") {
        "Vulkan"
    } else if cfg!(feature = "hipblas") {
        "HipBLAS (AMD)"
    } else if cfg!(feature = "metal") {
        "Metal"
    } else {
        "CPU"
    }
}

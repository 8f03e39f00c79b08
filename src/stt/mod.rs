//! Speech-to-text backends.

pub mod transcriber;
pub mod whisper;

pub use transcriber::{MockTranscriber, RawTranscript, Segment, Transcriber};
pub use whisper::{WhisperConfig, WhisperTranscriber};

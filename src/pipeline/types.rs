//! Data types flowing through the transcription pipeline.

use crate::defaults::{AUTO_LANGUAGE, PLACEHOLDER_CONFIDENCE};
use serde::Serialize;

pub use crate::stt::transcriber::Segment;

/// Transcription of one chunk after trimming and time-offsetting.
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkTranscript {
    /// Zero-based chunk index.
    pub index: usize,
    /// Trimmed chunk text.
    pub text: String,
    /// Segments with timestamps relative to the start of the file.
    pub segments: Vec<Segment>,
}

/// The single document written to the result channel.
///
/// Field order is the serialized key order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TranscriptionResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    text: String,
    confidence: f64,
    language: String,
    segments: Vec<Segment>,
}

impl TranscriptionResult {
    /// Successful result with the fixed placeholder confidence.
    pub fn success(text: String, language: String, segments: Vec<Segment>) -> Self {
        Self {
            error: None,
            text,
            confidence: PLACEHOLDER_CONFIDENCE,
            language,
            segments,
        }
    }

    /// Error-shaped result: empty text, zero confidence, no segments.
    pub fn failure(error: impl Into<String>, language: String) -> Self {
        Self {
            error: Some(error.into()),
            text: String::new(),
            confidence: 0.0,
            language,
            segments: Vec::new(),
        }
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }
}

/// Language reported in the result: the hint if given, else `auto`.
pub fn response_language(hint: &str) -> String {
    let hint = hint.trim();
    if hint.is_empty() {
        AUTO_LANGUAGE.to_string()
    } else {
        hint.to_string()
    }
}

/// Language passed to the inference backend; `None` requests auto-detection.
pub fn inference_language(hint: &str) -> Option<&str> {
    let hint = hint.trim();
    if hint.is_empty() || hint.eq_ignore_ascii_case(AUTO_LANGUAGE) {
        None
    } else {
        Some(hint)
    }
}

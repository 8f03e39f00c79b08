//! Stitching per-chunk transcripts into the final result.

use crate::pipeline::types::{ChunkTranscript, TranscriptionResult, response_language};

/// Join chunk texts with single spaces and concatenate segments in order.
pub fn aggregate(chunks: Vec<ChunkTranscript>, language_hint: &str) -> TranscriptionResult {
    let mut texts = Vec::with_capacity(chunks.len());
    let mut segments = Vec::new();

    for chunk in chunks {
        texts.push(chunk.text);
        segments.extend(chunk.segments);
    }

    TranscriptionResult::success(
        texts.join(" ").trim().to_string(),
        response_language(language_hint),
        segments,
    )
}

//! Per-chunk inference.
//!
//! Each chunk is written to its own temporary WAV file, handed to the
//! transcriber, and its timestamps shifted to file time.

use crate::audio::wav;
use crate::error::Result;
use crate::pipeline::chunker::Chunk;
use crate::pipeline::progress::{ProgressObserver, Stage};
use crate::pipeline::types::{ChunkTranscript, Segment};
use crate::stt::Transcriber;

/// Runs the transcriber over chunks, strictly in order.
pub struct TranscriptionDriver<T: Transcriber> {
    transcriber: T,
}

impl<T: Transcriber> TranscriptionDriver<T> {
    pub fn new(transcriber: T) -> Self {
        Self { transcriber }
    }

    /// Transcribe every chunk.
    ///
    /// `language` of `None` requests auto-detection. The first failing chunk
    /// aborts the run and no partial transcripts are returned.
    pub fn run<'a, I, P>(
        &self,
        chunks: I,
        total: usize,
        language: Option<&str>,
        progress: &P,
    ) -> Result<Vec<ChunkTranscript>>
    where
        I: IntoIterator<Item = Chunk<'a>>,
        P: ProgressObserver + ?Sized,
    {
        let mut transcripts = Vec::with_capacity(total);

        for chunk in chunks {
            let transcript = self.transcribe_chunk(&chunk, language)?;
            transcripts.push(transcript);
            progress.report(Stage::TranscribeChunks, chunk.index + 1, total);
        }

        Ok(transcripts)
    }

    fn transcribe_chunk(&self, chunk: &Chunk<'_>, language: Option<&str>) -> Result<ChunkTranscript> {
        let temp = tempfile::Builder::new()
            .prefix(&format!("scriptify-chunk-{}-", chunk.index))
            .suffix(".wav")
            .tempfile()?;
        wav::write_file(temp.path(), chunk.samples, chunk.sample_rate)?;

        tracing::debug!(
            chunk = chunk.index,
            offset_secs = chunk.offset_secs,
            duration_secs = chunk.duration_secs(),
            "transcribing chunk"
        );

        // temp is dropped (and deleted) on every return path below
        let raw = self.transcriber.transcribe(temp.path(), language)?;

        let segments = raw
            .segments
            .unwrap_or_default()
            .into_iter()
            .map(|segment| offset_segment(segment, chunk.offset_secs))
            .collect();

        Ok(ChunkTranscript {
            index: chunk.index,
            text: raw.text.trim().to_string(),
            segments,
        })
    }
}

/// Shift a chunk-local segment to file time and trim its text.
pub fn offset_segment(segment: Segment, offset_secs: f64) -> Segment {
    Segment {
        start: segment.start + offset_secs,
        end: segment.end + offset_secs,
        text: segment.text.trim().to_string(),
    }
}

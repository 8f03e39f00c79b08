//! Fixed-length chunking of a normalized audio buffer.
//!
//! Chunks are contiguous, non-overlapping and cover the buffer exactly once.
//! Only the last chunk may be shorter than the configured length.

use crate::audio::AudioBuffer;
use crate::error::{Result, ScriptifyError};

/// Splits audio into windows of a fixed duration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Chunker {
    chunk_length_secs: f64,
    chunk_samples: usize,
}

impl Chunker {
    /// Creates a chunker for audio sampled at `sample_rate`.
    ///
    /// # Errors
    /// Returns a configuration error if `chunk_length_secs` is not a positive
    /// finite number or would yield an empty window.
    pub fn new(chunk_length_secs: f64, sample_rate: u32) -> Result<Self> {
        if !chunk_length_secs.is_finite() || chunk_length_secs <= 0.0 {
            return Err(ScriptifyError::config(
                "transcription.chunk_length_secs",
                format!("must be a positive number of seconds, got {chunk_length_secs}"),
            ));
        }
        if sample_rate == 0 {
            return Err(ScriptifyError::config(
                "audio.sample_rate",
                "sample rate must be greater than zero",
            ));
        }

        let chunk_samples = (chunk_length_secs * sample_rate as f64).ceil();
        if chunk_samples < 1.0 || chunk_samples > usize::MAX as f64 {
            return Err(ScriptifyError::config(
                "transcription.chunk_length_secs",
                format!("{chunk_length_secs}s does not fit in a chunk at {sample_rate} Hz"),
            ));
        }

        Ok(Self {
            chunk_length_secs,
            chunk_samples: chunk_samples as usize,
        })
    }

    /// Samples per full chunk.
    pub fn chunk_samples(&self) -> usize {
        self.chunk_samples
    }

    /// Number of chunks `total_samples` splits into (zero for empty audio).
    pub fn chunk_count(&self, total_samples: usize) -> usize {
        total_samples.div_ceil(self.chunk_samples)
    }

    /// Lazily iterate over the chunks of `audio`.
    ///
    /// Calling this again restarts from the first chunk.
    pub fn chunks<'a>(&self, audio: &'a AudioBuffer) -> Chunks<'a> {
        Chunks {
            samples: audio.samples(),
            sample_rate: audio.sample_rate(),
            chunk_samples: self.chunk_samples,
            chunk_length_secs: self.chunk_length_secs,
            next_index: 0,
            count: self.chunk_count(audio.len()),
        }
    }
}

/// A read-only window into the normalized audio.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Chunk<'a> {
    /// Zero-based position in the file.
    pub index: usize,
    pub start_sample: usize,
    /// Exclusive.
    pub end_sample: usize,
    pub samples: &'a [i16],
    pub sample_rate: u32,
    /// Start time of this chunk in the file, `index × chunk_length_secs`.
    pub offset_secs: f64,
}

impl Chunk<'_> {
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate as f64
    }
}

/// Iterator returned by [`Chunker::chunks`].
#[derive(Debug, Clone)]
pub struct Chunks<'a> {
    samples: &'a [i16],
    sample_rate: u32,
    chunk_samples: usize,
    chunk_length_secs: f64,
    next_index: usize,
    count: usize,
}

impl<'a> Iterator for Chunks<'a> {
    type Item = Chunk<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next_index >= self.count {
            return None;
        }

        let index = self.next_index;
        self.next_index += 1;

        let start_sample = index * self.chunk_samples;
        let end_sample = (start_sample + self.chunk_samples).min(self.samples.len());

        Some(Chunk {
            index,
            start_sample,
            end_sample,
            samples: &self.samples[start_sample..end_sample],
            sample_rate: self.sample_rate,
            offset_secs: index as f64 * self.chunk_length_secs,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.count - self.next_index;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Chunks<'_> {}

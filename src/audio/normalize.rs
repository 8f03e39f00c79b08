//! Audio normalization to the canonical 16kHz mono layout.

use crate::audio::convert::AudioConverter;
use crate::audio::wav::{self, AudioBuffer};
use crate::defaults;
use crate::error::Result;
use std::path::Path;

/// Turns an input file into a canonical [`AudioBuffer`].
pub struct AudioNormalizer<C: AudioConverter> {
    converter: C,
}

impl<C: AudioConverter> AudioNormalizer<C> {
    pub fn new(converter: C) -> Self {
        Self { converter }
    }

    /// Decode `path`, converting it first if it is not a WAV container.
    ///
    /// The intermediate file lives in the system temp dir and is removed
    /// before this returns, whether conversion succeeded or not.
    pub fn normalize(&self, path: &Path) -> Result<AudioBuffer> {
        if is_canonical_container(path) {
            tracing::debug!(path = %path.display(), "decoding WAV input directly");
            return wav::read_file(path);
        }

        let converted = tempfile::Builder::new()
            .prefix("scriptify-")
            .suffix(".wav")
            .tempfile()?;

        self.converter.convert(path, converted.path())?;
        let buffer = wav::read_file(converted.path())?;

        tracing::debug!(
            path = %path.display(),
            seconds = buffer.duration_secs(),
            "converted input to canonical WAV"
        );
        Ok(buffer)
    }
}

/// Whether the file can be decoded without running the converter.
pub fn is_canonical_container(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(defaults::CANONICAL_EXTENSION))
}

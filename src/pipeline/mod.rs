//! File transcription pipeline.
//!
//! Stages run strictly in order on the calling thread:
//! load model, normalize audio, chunk, transcribe each chunk, aggregate.
//! Any stage failure becomes an error-shaped [`TranscriptionResult`].

pub mod aggregate;
pub mod chunker;
pub mod driver;
pub mod progress;
pub mod types;

pub use aggregate::aggregate;
pub use chunker::{Chunk, Chunker, Chunks};
pub use driver::TranscriptionDriver;
pub use progress::{BarProgress, LogProgress, ProgressObserver, SilentProgress, Stage};
pub use types::{ChunkTranscript, Segment, TranscriptionResult, response_language};

use crate::audio::{AudioConverter, AudioNormalizer};
use crate::defaults;
use crate::error::{Result, ScriptifyError};
use crate::stt::Transcriber;
use std::path::{Path, PathBuf};

/// What to transcribe and how.
#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptionRequest {
    pub audio_path: PathBuf,
    /// Language code, or `auto` (or empty) to detect.
    pub language: String,
    pub chunk_length_secs: f64,
}

impl TranscriptionRequest {
    pub fn new(audio_path: impl Into<PathBuf>) -> Self {
        Self {
            audio_path: audio_path.into(),
            language: defaults::DEFAULT_LANGUAGE.to_string(),
            chunk_length_secs: defaults::CHUNK_LENGTH_SECS,
        }
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn with_chunk_length(mut self, chunk_length_secs: f64) -> Self {
        self.chunk_length_secs = chunk_length_secs;
        self
    }
}

/// Fail with `AudioNotFound` unless `path` is an existing file.
pub fn check_input(path: &Path) -> Result<()> {
    if path.is_file() {
        Ok(())
    } else {
        Err(ScriptifyError::AudioNotFound {
            path: path.display().to_string(),
        })
    }
}

/// Transcribe one file end to end.
///
/// `load_model` runs once, as the first stage. Errors never escape: they are
/// reported in the returned result's `error` field.
pub fn transcribe_file<T, L, C, P>(
    request: &TranscriptionRequest,
    load_model: L,
    converter: C,
    progress: &P,
) -> TranscriptionResult
where
    T: Transcriber,
    L: FnOnce() -> Result<T>,
    C: AudioConverter,
    P: ProgressObserver + ?Sized,
{
    match run_stages(request, load_model, converter, progress) {
        Ok(result) => result,
        Err(e) => {
            tracing::error!("{e}");
            TranscriptionResult::failure(e.to_string(), response_language(&request.language))
        }
    }
}

fn run_stages<T, L, C, P>(
    request: &TranscriptionRequest,
    load_model: L,
    converter: C,
    progress: &P,
) -> Result<TranscriptionResult>
where
    T: Transcriber,
    L: FnOnce() -> Result<T>,
    C: AudioConverter,
    P: ProgressObserver + ?Sized,
{
    check_input(&request.audio_path)?;
    // Validate before the expensive stages
    let chunk_length = request.chunk_length_secs;
    Chunker::new(chunk_length, defaults::SAMPLE_RATE)?;

    progress.stage_started(Stage::LoadModel);
    let transcriber = load_model()?;
    tracing::info!(model = transcriber.model_name(), "model ready");

    progress.stage_started(Stage::PrepareAudio);
    let audio = AudioNormalizer::new(converter).normalize(&request.audio_path)?;
    tracing::info!(
        duration_secs = audio.duration_secs(),
        samples = audio.len(),
        "audio prepared"
    );

    progress.stage_started(Stage::ChunkAudio);
    let chunker = Chunker::new(chunk_length, audio.sample_rate())?;
    let chunks = chunker.chunks(&audio);
    let total = chunks.len();
    progress.report(Stage::ChunkAudio, total, total);
    tracing::info!(chunks = total, chunk_length_secs = chunk_length, "audio chunked");

    progress.stage_started(Stage::TranscribeChunks);
    let language = types::inference_language(&request.language);
    let transcripts = TranscriptionDriver::new(transcriber).run(chunks, total, language, progress)?;

    progress.stage_started(Stage::FormatResult);
    let result = aggregate(transcripts, &request.language);
    progress.report(Stage::FormatResult, 1, 1);

    Ok(result)
}

use crate::audio::wav;
use crate::error::{Result, ScriptifyError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// A timestamped span of transcribed speech, in seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub start: f64,
    pub end: f64,
    pub text: String,
}

impl Segment {
    pub fn new(start: f64, end: f64, text: impl Into<String>) -> Self {
        Self {
            start,
            end,
            text: text.into(),
        }
    }
}

/// What the model reports for one audio file.
///
/// Segment timestamps are relative to the start of that file.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawTranscript {
    pub text: String,
    /// `None` when the backend reports no segment breakdown.
    pub segments: Option<Vec<Segment>>,
}

impl RawTranscript {
    pub fn text_only(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            segments: None,
        }
    }

    pub fn with_segments(text: impl Into<String>, segments: Vec<Segment>) -> Self {
        Self {
            text: text.into(),
            segments: Some(segments),
        }
    }
}

/// Trait for speech-to-text transcription.
///
/// This trait allows swapping implementations (real Whisper vs mock).
pub trait Transcriber: Send + Sync {
    /// Transcribe a 16kHz mono WAV file.
    ///
    /// # Arguments
    /// * `audio_path` - WAV file to transcribe
    /// * `language` - Language code to force, or `None` to auto-detect
    fn transcribe(&self, audio_path: &Path, language: Option<&str>) -> Result<RawTranscript>;

    /// Get the name of the loaded model
    fn model_name(&self) -> &str;
}

impl<T: Transcriber + ?Sized> Transcriber for Arc<T> {
    fn transcribe(&self, audio_path: &Path, language: Option<&str>) -> Result<RawTranscript> {
        (**self).transcribe(audio_path, language)
    }

    fn model_name(&self) -> &str {
        (**self).model_name()
    }
}

impl<T: Transcriber + ?Sized> Transcriber for &T {
    fn transcribe(&self, audio_path: &Path, language: Option<&str>) -> Result<RawTranscript> {
        (**self).transcribe(audio_path, language)
    }

    fn model_name(&self) -> &str {
        (**self).model_name()
    }
}

impl<T: Transcriber + ?Sized> Transcriber for Box<T> {
    fn transcribe(&self, audio_path: &Path, language: Option<&str>) -> Result<RawTranscript> {
        (**self).transcribe(audio_path, language)
    }

    fn model_name(&self) -> &str {
        (**self).model_name()
    }
}

/// One recorded call to [`MockTranscriber::transcribe`].
#[derive(Debug, Clone, PartialEq)]
pub struct MockCall {
    pub audio_path: PathBuf,
    pub language: Option<String>,
    /// Samples found in the file at call time.
    pub samples: usize,
}

/// When a [`MockTranscriber`] fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MockFailure {
    Never,
    Always,
    OnCall(usize),
}

/// Mock transcriber for testing.
///
/// Reads the WAV it is given (so tests see exactly what reached the model)
/// and replies from a script: one response per call, repeating the last.
#[derive(Debug)]
pub struct MockTranscriber {
    model_name: String,
    responses: Vec<RawTranscript>,
    failure: MockFailure,
    echo_language: bool,
    calls: Mutex<Vec<MockCall>>,
}

impl MockTranscriber {
    /// Create a new mock transcriber with default settings
    pub fn new(model_name: &str) -> Self {
        Self {
            model_name: model_name.to_string(),
            responses: vec![RawTranscript::text_only("mock transcription")],
            failure: MockFailure::Never,
            echo_language: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Reply with the same text for every call
    pub fn with_response(mut self, text: &str) -> Self {
        self.responses = vec![RawTranscript::text_only(text)];
        self
    }

    /// Reply with `responses[n]` on the n-th call (last one repeats)
    pub fn with_responses(mut self, responses: Vec<RawTranscript>) -> Self {
        self.responses = responses;
        self
    }

    /// Fail on the given zero-based call
    pub fn with_failure_on_call(mut self, call: usize) -> Self {
        self.failure = MockFailure::OnCall(call);
        self
    }

    /// Configure the mock to fail on every call
    pub fn with_failure(mut self) -> Self {
        self.failure = MockFailure::Always;
        self
    }

    /// Reply with the language the call received (`"auto"` when none)
    pub fn with_language_echo(mut self) -> Self {
        self.echo_language = true;
        self
    }

    /// Calls made so far, in order.
    pub fn calls(&self) -> Vec<MockCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

impl Transcriber for MockTranscriber {
    fn transcribe(&self, audio_path: &Path, language: Option<&str>) -> Result<RawTranscript> {
        let buffer = wav::read_file(audio_path)?;

        let mut calls = self
            .calls
            .lock()
            .map_err(|_| ScriptifyError::InferenceFailed {
                message: "mock call log poisoned".to_string(),
            })?;
        let call_index = calls.len();
        calls.push(MockCall {
            audio_path: audio_path.to_path_buf(),
            language: language.map(str::to_string),
            samples: buffer.len(),
        });

        let fails = match self.failure {
            MockFailure::Never => false,
            MockFailure::Always => true,
            MockFailure::OnCall(n) => call_index == n,
        };
        if fails {
            return Err(ScriptifyError::InferenceFailed {
                message: "mock transcription failure".to_string(),
            });
        }

        if self.echo_language {
            return Ok(RawTranscript::text_only(language.unwrap_or("auto")));
        }

        let response = self
            .responses
            .get(call_index)
            .or_else(|| self.responses.last())
            .cloned()
            .unwrap_or_default();
        Ok(response)
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wav_fixture(samples: usize) -> tempfile::NamedTempFile {
        let file = tempfile::Builder::new().suffix(".wav").tempfile().unwrap();
        wav::write_file(file.path(), &vec![0i16; samples], 16000).unwrap();
        file
    }

    #[test]
    fn test_mock_transcriber_returns_response() {
        let audio = wav_fixture(1000);
        let transcriber = MockTranscriber::new("test-model").with_response("Hello, this is a test");

        let result = transcriber.transcribe(audio.path(), None).unwrap();

        assert_eq!(result.text, "Hello, this is a test");
        assert_eq!(result.segments, None);
    }

    #[test]
    fn test_mock_transcriber_scripted_responses_repeat_last() {
        let audio = wav_fixture(10);
        let transcriber = MockTranscriber::new("m").with_responses(vec![
            RawTranscript::text_only("one"),
            RawTranscript::with_segments("two", vec![Segment::new(0.0, 1.0, "two")]),
        ]);

        let texts: Vec<String> = (0..3)
            .map(|_| transcriber.transcribe(audio.path(), None).unwrap().text)
            .collect();
        assert_eq!(texts, vec!["one", "two", "two"]);
    }

    #[test]
    fn test_mock_transcriber_fails_on_configured_call() {
        let audio = wav_fixture(10);
        let transcriber = MockTranscriber::new("m").with_failure_on_call(1);

        assert!(transcriber.transcribe(audio.path(), None).is_ok());
        match transcriber.transcribe(audio.path(), None) {
            Err(ScriptifyError::InferenceFailed { message }) => {
                assert_eq!(message, "mock transcription failure");
            }
            other => panic!("Expected InferenceFailed, got {:?}", other),
        }
        assert!(transcriber.transcribe(audio.path(), None).is_ok());
    }

    #[test]
    fn test_mock_transcriber_with_failure_fails_every_call() {
        let audio = wav_fixture(10);
        let transcriber = MockTranscriber::new("m").with_failure();

        assert!(transcriber.transcribe(audio.path(), None).is_err());
        assert!(transcriber.transcribe(audio.path(), None).is_err());
    }

    #[test]
    fn test_mock_transcriber_records_calls() {
        let audio = wav_fixture(1600);
        let transcriber = MockTranscriber::new("m");

        transcriber.transcribe(audio.path(), Some("fr")).unwrap();
        transcriber.transcribe(audio.path(), None).unwrap();

        let calls = transcriber.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].language.as_deref(), Some("fr"));
        assert_eq!(calls[0].samples, 1600);
        assert_eq!(calls[1].language, None);
    }

    #[test]
    fn test_mock_transcriber_echoes_language() {
        let audio = wav_fixture(10);
        let transcriber = MockTranscriber::new("m").with_language_echo();

        assert_eq!(transcriber.transcribe(audio.path(), Some("de")).unwrap().text, "de");
        assert_eq!(transcriber.transcribe(audio.path(), None).unwrap().text, "auto");
    }

    #[test]
    fn test_mock_transcriber_rejects_missing_file() {
        let transcriber = MockTranscriber::new("m");
        let result = transcriber.transcribe(Path::new("/nonexistent/chunk.wav"), None);
        assert!(matches!(result, Err(ScriptifyError::AudioDecode { .. })));
        assert!(transcriber.calls().is_empty());
    }

    #[test]
    fn test_transcriber_trait_is_object_safe() {
        let audio = wav_fixture(100);
        let transcriber: Box<dyn Transcriber> =
            Box::new(MockTranscriber::new("test-model").with_response("boxed test"));

        assert_eq!(transcriber.model_name(), "test-model");
        assert_eq!(
            transcriber.transcribe(audio.path(), None).unwrap().text,
            "boxed test"
        );
    }

    #[test]
    fn test_arc_transcriber_delegates() {
        let audio = wav_fixture(100);
        let shared = Arc::new(MockTranscriber::new("shared"));

        shared.transcribe(audio.path(), None).unwrap();
        assert_eq!(Transcriber::model_name(&shared), "shared");
        assert_eq!(shared.calls().len(), 1);
    }
}

//! End-to-end pipeline behavior with a scripted transcriber.

use scriptify::ScriptifyError;
use scriptify::audio::{AudioConverter, wav};
use scriptify::defaults::SAMPLE_RATE;
use scriptify::output::emit_result;
use scriptify::pipeline::progress::{ProgressEvent, RecordingProgress};
use scriptify::pipeline::{
    Segment, SilentProgress, Stage, TranscriptionRequest, TranscriptionResult, transcribe_file,
};
use scriptify::stt::{MockTranscriber, RawTranscript};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Converter standing in for ffmpeg: writes `secs` seconds of 16 kHz audio.
struct FakeFfmpeg {
    secs: usize,
}

impl AudioConverter for FakeFfmpeg {
    fn convert(&self, _input: &Path, output: &Path) -> scriptify::Result<()> {
        wav::write_file(output, &vec![250i16; self.secs * SAMPLE_RATE as usize], SAMPLE_RATE)
    }
}

/// Converter that must not be reached.
struct UnusedConverter;

impl AudioConverter for UnusedConverter {
    fn convert(&self, input: &Path, _output: &Path) -> scriptify::Result<()> {
        Err(ScriptifyError::ConversionFailed {
            message: format!("unexpected conversion of {}", input.display()),
        })
    }
}

fn write_wav(dir: &Path, name: &str, secs: usize, sample_rate: u32) -> PathBuf {
    let path = dir.join(name);
    wav::write_file(&path, &vec![300i16; secs * sample_rate as usize], sample_rate).unwrap();
    path
}

fn run(
    request: &TranscriptionRequest,
    mock: &Arc<MockTranscriber>,
    converter: impl AudioConverter,
) -> TranscriptionResult {
    transcribe_file(request, || Ok(mock.clone()), converter, &SilentProgress)
}

#[test]
fn test_segments_shifted_by_chunk_offset() {
    let dir = tempfile::tempdir().unwrap();
    let audio = write_wav(dir.path(), "long.wav", 75, SAMPLE_RATE);
    let mock = Arc::new(MockTranscriber::new("mock").with_responses(vec![
        RawTranscript::with_segments("first", vec![Segment::new(0.0, 4.0, "first")]),
        RawTranscript::with_segments("second", vec![Segment::new(1.0, 3.0, "second")]),
        RawTranscript::with_segments("third", vec![Segment::new(2.0, 5.0, "third")]),
    ]));

    let result = run(&TranscriptionRequest::new(audio), &mock, UnusedConverter);

    assert!(result.is_success(), "{:?}", result.error());
    assert_eq!(result.text(), "first second third");
    assert_eq!(
        result.segments(),
        &[
            Segment::new(0.0, 4.0, "first"),
            Segment::new(31.0, 33.0, "second"),
            Segment::new(62.0, 65.0, "third"),
        ]
    );
    assert_eq!(mock.calls().len(), 3);
}

#[test]
fn test_segment_starts_never_decrease() {
    let dir = tempfile::tempdir().unwrap();
    let audio = write_wav(dir.path(), "long.wav", 100, SAMPLE_RATE);
    let mock = Arc::new(MockTranscriber::new("mock").with_responses(vec![
        RawTranscript::with_segments(
            "a b",
            vec![Segment::new(0.0, 10.0, "a"), Segment::new(10.0, 29.9, "b")],
        ),
    ]));

    let result = run(
        &TranscriptionRequest::new(audio).with_chunk_length(30.0),
        &mock,
        UnusedConverter,
    );

    let starts: Vec<f64> = result.segments().iter().map(|s| s.start).collect();
    assert_eq!(starts.len(), 8);
    assert!(starts.windows(2).all(|w| w[0] <= w[1]), "{:?}", starts);
}

#[test]
fn test_short_file_is_single_chunk_with_raw_timestamps() {
    let dir = tempfile::tempdir().unwrap();
    let audio = write_wav(dir.path(), "short.wav", 10, SAMPLE_RATE);
    let mock = Arc::new(MockTranscriber::new("mock").with_responses(vec![
        RawTranscript::with_segments("hi there", vec![Segment::new(1.25, 2.5, " hi there ")]),
    ]));

    let result = run(&TranscriptionRequest::new(audio), &mock, UnusedConverter);

    assert_eq!(mock.calls().len(), 1);
    assert_eq!(mock.calls()[0].samples, 10 * SAMPLE_RATE as usize);
    assert_eq!(result.segments(), &[Segment::new(1.25, 2.5, "hi there")]);
}

#[test]
fn test_identical_runs_give_identical_output() {
    let dir = tempfile::tempdir().unwrap();
    let audio = write_wav(dir.path(), "same.wav", 45, SAMPLE_RATE);
    let request = TranscriptionRequest::new(audio).with_language("en");

    let render = || {
        let mock = Arc::new(MockTranscriber::new("mock").with_responses(vec![
            RawTranscript::with_segments("one", vec![Segment::new(0.5, 1.0, "one")]),
            RawTranscript::with_segments("two", vec![Segment::new(0.0, 2.0, "two")]),
        ]));
        let mut out = Vec::new();
        emit_result(&mut out, &run(&request, &mock, UnusedConverter)).unwrap();
        out
    };

    assert_eq!(render(), render());
}

#[test]
fn test_forced_language_reaches_transcriber_and_result() {
    let dir = tempfile::tempdir().unwrap();
    let audio = write_wav(dir.path(), "fr.wav", 2, SAMPLE_RATE);
    let mock = Arc::new(MockTranscriber::new("mock").with_language_echo());

    let result = run(
        &TranscriptionRequest::new(audio).with_language("fr"),
        &mock,
        UnusedConverter,
    );

    assert_eq!(result.language(), "fr");
    assert_eq!(result.text(), "fr");
    assert_eq!(mock.calls()[0].language.as_deref(), Some("fr"));
}

#[test]
fn test_auto_language_requests_detection() {
    let dir = tempfile::tempdir().unwrap();
    let audio = write_wav(dir.path(), "auto.wav", 2, SAMPLE_RATE);
    let mock = Arc::new(MockTranscriber::new("mock").with_language_echo());

    let result = run(&TranscriptionRequest::new(audio), &mock, UnusedConverter);

    assert_eq!(result.language(), "auto");
    assert_eq!(mock.calls()[0].language, None);
}

#[test]
fn test_non_wav_input_is_converted() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("talk.m4a");
    std::fs::write(&input, b"compressed audio").unwrap();
    let mock = Arc::new(MockTranscriber::new("mock").with_response("converted"));

    let result = run(&TranscriptionRequest::new(input), &mock, FakeFfmpeg { secs: 40 });

    assert!(result.is_success(), "{:?}", result.error());
    assert_eq!(result.text(), "converted converted");
    assert_eq!(mock.calls().len(), 2);
}

#[test]
fn test_wav_at_other_rate_is_resampled() {
    let dir = tempfile::tempdir().unwrap();
    let audio = write_wav(dir.path(), "cd.wav", 2, 44_100);
    let mock = Arc::new(MockTranscriber::new("mock"));

    let result = run(&TranscriptionRequest::new(audio), &mock, UnusedConverter);

    assert!(result.is_success(), "{:?}", result.error());
    let samples = mock.calls()[0].samples;
    assert!(
        (31_990..=32_010).contains(&samples),
        "expected ~2s at 16 kHz, got {samples} samples"
    );
}

#[test]
fn test_chunk_failure_produces_error_document() {
    let dir = tempfile::tempdir().unwrap();
    let audio = write_wav(dir.path(), "fail.wav", 90, SAMPLE_RATE);
    let mock = Arc::new(MockTranscriber::new("mock").with_failure_on_call(1));

    let result = run(
        &TranscriptionRequest::new(audio).with_language("es"),
        &mock,
        UnusedConverter,
    );

    let mut out = Vec::new();
    emit_result(&mut out, &result).unwrap();
    assert_eq!(
        String::from_utf8(out).unwrap(),
        "{\"error\":\"Transcription inference failed: mock transcription failure\",\"text\":\"\",\"confidence\":0.0,\"language\":\"es\",\"segments\":[]}\n"
    );
    assert_eq!(mock.calls().len(), 2, "run stops at the failing chunk");
}

#[test]
fn test_chunk_files_do_not_outlive_the_run() {
    let dir = tempfile::tempdir().unwrap();
    let audio = write_wav(dir.path(), "tmp.wav", 65, SAMPLE_RATE);
    let mock = Arc::new(MockTranscriber::new("mock"));

    run(&TranscriptionRequest::new(audio), &mock, UnusedConverter);

    let calls = mock.calls();
    assert_eq!(calls.len(), 3);
    for call in calls {
        assert!(!call.audio_path.exists(), "{} was left behind", call.audio_path.display());
    }
}

#[test]
fn test_text_only_responses_are_accepted() {
    let dir = tempfile::tempdir().unwrap();
    let audio = write_wav(dir.path(), "plain.wav", 31, SAMPLE_RATE);
    let mock = Arc::new(
        MockTranscriber::new("mock").with_responses(vec![RawTranscript::text_only("no timing")]),
    );

    let result = run(&TranscriptionRequest::new(audio), &mock, UnusedConverter);

    assert!(result.is_success());
    assert_eq!(result.text(), "no timing no timing");
    assert!(result.segments().is_empty());
}

#[test]
fn test_progress_covers_every_stage_and_chunk() {
    let dir = tempfile::tempdir().unwrap();
    let audio = write_wav(dir.path(), "progress.wav", 61, SAMPLE_RATE);
    let progress = RecordingProgress::new();

    transcribe_file(
        &TranscriptionRequest::new(audio),
        || Ok(MockTranscriber::new("mock")),
        UnusedConverter,
        &progress,
    );

    assert_eq!(progress.started_stages(), Stage::ALL.to_vec());
    let chunk_reports: Vec<(usize, usize)> = progress
        .events()
        .into_iter()
        .filter_map(|event| match event {
            ProgressEvent::Report {
                stage: Stage::TranscribeChunks,
                current,
                total,
            } => Some((current, total)),
            _ => None,
        })
        .collect();
    assert_eq!(chunk_reports, vec![(1, 3), (2, 3), (3, 3)]);
}

#[test]
fn test_missing_input_is_reported_in_band() {
    let mock = Arc::new(MockTranscriber::new("mock"));

    let result = run(
        &TranscriptionRequest::new("/nonexistent.wav"),
        &mock,
        UnusedConverter,
    );

    assert_eq!(result.error(), Some("Audio file not found: /nonexistent.wav"));
    assert!(mock.calls().is_empty());
}

#[test]
fn test_wav_with_zero_sample_rate_is_reported_in_band() {
    let dir = tempfile::tempdir().unwrap();
    let audio = dir.path().join("broken.wav");
    let mut header = Vec::new();
    header.extend_from_slice(b"RIFF");
    header.extend_from_slice(&40u32.to_le_bytes());
    header.extend_from_slice(b"WAVEfmt ");
    header.extend_from_slice(&16u32.to_le_bytes());
    header.extend_from_slice(&1u16.to_le_bytes());
    header.extend_from_slice(&1u16.to_le_bytes());
    header.extend_from_slice(&0u32.to_le_bytes());
    header.extend_from_slice(&0u32.to_le_bytes());
    header.extend_from_slice(&2u16.to_le_bytes());
    header.extend_from_slice(&16u16.to_le_bytes());
    header.extend_from_slice(b"data");
    header.extend_from_slice(&4u32.to_le_bytes());
    header.extend_from_slice(&[0u8; 4]);
    std::fs::write(&audio, header).unwrap();
    let mock = Arc::new(MockTranscriber::new("mock"));

    let result = run(&TranscriptionRequest::new(audio), &mock, UnusedConverter);

    assert!(!result.is_success());
    assert_eq!(
        result.error(),
        Some("Failed to decode audio: WAV header declares a zero sample rate")
    );
    assert!(mock.calls().is_empty());
}

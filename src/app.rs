//! Transcription command entry point.
//!
//! Wires the resolved configuration into the pipeline:
//! device → model (download if needed) → normalize → chunk → transcribe.

use crate::audio::FfmpegConverter;
use crate::config::Config;
use crate::device::{ComputeDevice, DevicePreference};
use crate::error::Result;
use crate::models::{ModelSize, ensure_model};
use crate::pipeline::{
    ProgressObserver, TranscriptionRequest, TranscriptionResult, response_language,
    transcribe_file,
};
use crate::stt::whisper::{WhisperConfig, WhisperTranscriber};
use std::path::PathBuf;
use tokio::runtime::Handle;

/// Everything one transcription run needs, after config and flags are merged.
#[derive(Debug, Clone, PartialEq)]
pub struct TranscribeSettings {
    pub request: TranscriptionRequest,
    pub model_size: ModelSize,
    pub models_dir: PathBuf,
    /// Explicit model file; bypasses the cache and download.
    pub model_path: Option<PathBuf>,
    pub auto_download: bool,
    pub device: DevicePreference,
    pub threads: Option<usize>,
    pub ffmpeg: String,
    /// Draw a progress bar while downloading a model.
    pub download_progress: bool,
}

impl TranscribeSettings {
    pub fn from_config(audio_path: PathBuf, config: &Config, model_path: Option<PathBuf>) -> Self {
        Self {
            request: TranscriptionRequest::new(audio_path)
                .with_language(config.transcription.language.clone())
                .with_chunk_length(config.transcription.chunk_length_secs),
            model_size: config.transcription.model_size,
            models_dir: config.models_dir(),
            model_path,
            auto_download: config.models.auto_download,
            device: config.compute.device,
            threads: config.compute.threads,
            ffmpeg: config.audio.ffmpeg.clone(),
            download_progress: false,
        }
    }

    pub fn with_download_progress(mut self, enabled: bool) -> Self {
        self.download_progress = enabled;
        self
    }
}

/// Run one transcription to completion. Never fails: errors are in-band.
///
/// Must be called from a blocking context; `handle` drives the model download.
pub fn run_transcription<P>(
    settings: &TranscribeSettings,
    progress: &P,
    handle: &Handle,
) -> TranscriptionResult
where
    P: ProgressObserver + ?Sized,
{
    let device = match ComputeDevice::resolve(settings.device) {
        Ok(device) => device,
        Err(e) => {
            tracing::error!("{e}");
            return TranscriptionResult::failure(
                e.to_string(),
                response_language(&settings.request.language),
            );
        }
    };
    tracing::info!(%device, model = %settings.model_size, "starting transcription");

    let load_model = || -> Result<WhisperTranscriber> {
        let model_path = match &settings.model_path {
            Some(path) => path.clone(),
            None => handle.block_on(ensure_model(
                &settings.models_dir,
                settings.model_size,
                settings.auto_download,
                settings.download_progress,
            ))?,
        };
        WhisperTranscriber::new(WhisperConfig {
            model_path,
            threads: settings.threads,
            use_gpu: device.is_gpu(),
        })
    };

    let converter = FfmpegConverter::new(settings.ffmpeg.clone());
    transcribe_file(&settings.request, load_model, converter, progress)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::wav;
    use crate::pipeline::SilentProgress;
    use std::path::Path;

    fn settings_for(audio: &Path, models_dir: &Path) -> TranscribeSettings {
        let mut config = Config::default();
        config.models.dir = Some(models_dir.to_path_buf());
        config.models.auto_download = false;
        config.compute.device = DevicePreference::Cpu;
        TranscribeSettings::from_config(audio.to_path_buf(), &config, None)
    }

    fn wav_fixture(dir: &Path) -> PathBuf {
        let path = dir.join("speech.wav");
        wav::write_file(&path, &vec![0i16; 16_000], 16_000).unwrap();
        path
    }

    #[test]
    fn test_settings_from_config() {
        let mut config = Config::default();
        config.transcription.language = "fr".to_string();
        config.transcription.model_size = ModelSize::Small;
        config.transcription.chunk_length_secs = 10.0;
        config.compute.threads = Some(2);
        config.audio.ffmpeg = "/opt/ffmpeg".to_string();

        let settings = TranscribeSettings::from_config(PathBuf::from("a.mp3"), &config, None);

        assert_eq!(settings.request.audio_path, PathBuf::from("a.mp3"));
        assert_eq!(settings.request.language, "fr");
        assert_eq!(settings.request.chunk_length_secs, 10.0);
        assert_eq!(settings.model_size, ModelSize::Small);
        assert_eq!(settings.threads, Some(2));
        assert_eq!(settings.ffmpeg, "/opt/ffmpeg");
        assert!(settings.auto_download);
        assert!(!settings.download_progress);
    }

    #[test]
    fn test_missing_cached_model_is_in_band_error() {
        let dir = tempfile::tempdir().unwrap();
        let audio = wav_fixture(dir.path());
        let models = dir.path().join("models");
        let settings = settings_for(&audio, &models);
        let runtime = tokio::runtime::Runtime::new().unwrap();

        let result = run_transcription(&settings, &SilentProgress, runtime.handle());

        let error = result.error().unwrap();
        assert!(error.starts_with("Whisper model not found at"), "{error}");
        assert!(error.contains("ggml-base.bin"));
        assert_eq!(result.language(), "auto");
        assert_eq!(result.confidence(), 0.0);
    }

    #[test]
    fn test_missing_explicit_model_is_in_band_error() {
        let dir = tempfile::tempdir().unwrap();
        let audio = wav_fixture(dir.path());
        let mut settings = settings_for(&audio, dir.path());
        settings.model_path = Some(dir.path().join("custom.bin"));
        let runtime = tokio::runtime::Runtime::new().unwrap();

        let result = run_transcription(&settings, &SilentProgress, runtime.handle());

        let expected = format!(
            "Whisper model not found at {}",
            dir.path().join("custom.bin").display()
        );
        assert_eq!(result.error(), Some(expected.as_str()));
    }

    #[test]
    fn test_gpu_request_on_cpu_build_is_in_band_error() {
        if crate::defaults::gpu_backend() != "CPU" {
            return;
        }
        let dir = tempfile::tempdir().unwrap();
        let audio = wav_fixture(dir.path());
        let mut settings = settings_for(&audio, dir.path());
        settings.device = DevicePreference::Gpu;
        settings.request.language = "de".to_string();
        let runtime = tokio::runtime::Runtime::new().unwrap();

        let result = run_transcription(&settings, &SilentProgress, runtime.handle());

        assert!(result.error().unwrap().contains("compute.device"));
        assert_eq!(result.language(), "de");
    }
}

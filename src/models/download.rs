//! Model download and installation management.
//!
//! Handles downloading Whisper models from HuggingFace, verifying their integrity,
//! and storing them in the user's cache directory.

use crate::error::{Result, ScriptifyError};
use crate::models::catalog::{ModelInfo, ModelSize};
use std::path::{Path, PathBuf};

#[cfg(feature = "model-download")]
use indicatif::ProgressBar;

/// Default directory where models are stored.
///
/// Uses `~/.cache/scriptify/models/` on Linux/Unix.
pub fn default_models_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from(".cache"))
        .join("scriptify")
        .join("models")
}

/// Full path of a model file inside `models_dir`.
///
/// The file may or may not exist on disk.
pub fn model_path(models_dir: &Path, size: ModelSize) -> PathBuf {
    models_dir.join(size.info().file_name)
}

/// Check if a model is installed.
pub fn is_model_installed(models_dir: &Path, size: ModelSize) -> bool {
    model_path(models_dir, size).exists()
}

/// One-line description of a catalog entry for `models list`.
pub fn format_model_info(models_dir: &Path, info: &ModelInfo) -> String {
    let status = if is_model_installed(models_dir, info.size) {
        "installed"
    } else {
        "not installed"
    };
    format!(
        "{:<8} {:>5} MB  {:<20} {}",
        info.size.as_str(),
        info.size_mb,
        info.file_name,
        status
    )
}

/// Return the path of an installed model, downloading it first if allowed.
///
/// # Errors
///
/// Returns `ModelNotFound` when the model is missing and downloading is not
/// allowed (or not compiled in), and `ModelDownload` when the download fails.
pub async fn ensure_model(
    models_dir: &Path,
    size: ModelSize,
    allow_download: bool,
    progress: bool,
) -> Result<PathBuf> {
    let path = model_path(models_dir, size);
    if path.exists() {
        return Ok(path);
    }

    if !allow_download {
        return Err(ScriptifyError::ModelNotFound {
            path: format!(
                "{} (download disabled; run `scriptify models install {}`)",
                path.display(),
                size
            ),
        });
    }

    download_model(models_dir, size, progress).await
}

/// Download a Whisper model into `models_dir`.
///
/// The file is streamed to a `.part` sibling, its SHA-1 verified, then renamed
/// into place so an interrupted download never looks installed.
#[cfg(feature = "model-download")]
pub async fn download_model(models_dir: &Path, size: ModelSize, progress: bool) -> Result<PathBuf> {
    use indicatif::ProgressStyle;
    use std::fs;

    let info = size.info();
    let output_path = model_path(models_dir, size);
    let partial_path = output_path.with_extension("bin.part");
    let download_error = |message: String| ScriptifyError::ModelDownload { message };

    fs::create_dir_all(models_dir)
        .map_err(|e| download_error(format!("Failed to create models directory: {e}")))?;

    tracing::info!(model = %size, size_mb = info.size_mb, "downloading model");

    let response = reqwest::Client::new()
        .get(info.url())
        .send()
        .await
        .map_err(|e| download_error(format!("Failed to start download: {e}")))?;

    if !response.status().is_success() {
        return Err(download_error(format!(
            "Download failed with status: {}",
            response.status()
        )));
    }

    let total_size = response.content_length().unwrap_or(0);

    let pb = if progress {
        let pb = crate::pipeline::progress::bars().add(ProgressBar::new(total_size));
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        Some(pb)
    } else {
        None
    };

    let written = write_partial(&partial_path, response.bytes_stream(), pb.as_ref()).await;

    if let Some(pb) = pb {
        pb.finish_and_clear();
        crate::pipeline::progress::bars().remove(&pb);
    }
    let calculated = written?;

    if !info.sha1.is_empty() {
        if calculated != info.sha1 {
            discard_partial(&partial_path);
            return Err(download_error(format!(
                "SHA-1 checksum mismatch. Expected: {}, got: {calculated}",
                info.sha1
            )));
        }
        tracing::debug!("checksum verified");
    }

    fs::rename(&partial_path, &output_path)
        .map_err(|e| download_error(format!("Failed to move model into place: {e}")))?;

    tracing::info!(path = %output_path.display(), "model installed");
    Ok(output_path)
}

/// Stream `chunks` into `path` and return the hex SHA-1 of the bytes written.
///
/// The partial file is removed if a chunk fails to arrive or to be written.
#[cfg(feature = "model-download")]
async fn write_partial<S, B, E>(path: &Path, chunks: S, pb: Option<&ProgressBar>) -> Result<String>
where
    S: futures_util::Stream<Item = std::result::Result<B, E>>,
    B: AsRef<[u8]>,
    E: std::fmt::Display,
{
    let written = stream_to_file(path, chunks, pb).await;
    if written.is_err() {
        discard_partial(path);
    }
    written
}

#[cfg(feature = "model-download")]
async fn stream_to_file<S, B, E>(path: &Path, chunks: S, pb: Option<&ProgressBar>) -> Result<String>
where
    S: futures_util::Stream<Item = std::result::Result<B, E>>,
    B: AsRef<[u8]>,
    E: std::fmt::Display,
{
    use futures_util::StreamExt;
    use sha1::{Digest, Sha1};
    use std::io::Write;

    let download_error = |message: String| ScriptifyError::ModelDownload { message };
    let mut chunks = std::pin::pin!(chunks);
    let mut hasher = Sha1::new();
    let mut file = std::fs::File::create(path)
        .map_err(|e| download_error(format!("Failed to create output file: {e}")))?;

    while let Some(chunk) = chunks.next().await {
        let chunk = chunk.map_err(|e| download_error(format!("Failed to read download chunk: {e}")))?;
        let bytes = chunk.as_ref();

        file.write_all(bytes)
            .map_err(|e| download_error(format!("Failed to write to file: {e}")))?;
        hasher.update(bytes);

        if let Some(pb) = pb {
            pb.inc(bytes.len() as u64);
        }
    }

    Ok(format!("{:x}", hasher.finalize()))
}

#[cfg(feature = "model-download")]
fn discard_partial(path: &Path) {
    if let Err(e) = std::fs::remove_file(path)
        && e.kind() != std::io::ErrorKind::NotFound
    {
        tracing::warn!("failed to remove partial download {}: {e}", path.display());
    }
}

#[cfg(not(feature = "model-download"))]
pub async fn download_model(models_dir: &Path, size: ModelSize, _progress: bool) -> Result<PathBuf> {
    Err(ScriptifyError::ModelNotFound {
        path: format!(
            "{} (this build cannot download models)",
            model_path(models_dir, size).display()
        ),
    })
}

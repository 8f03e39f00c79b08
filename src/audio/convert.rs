//! External audio conversion.
//!
//! Non-WAV inputs are handed to an external converter that writes a 16kHz
//! mono WAV file. The `AudioConverter` trait keeps the normalizer testable
//! without ffmpeg installed.

use crate::defaults;
use crate::error::{Result, ScriptifyError};
use std::path::Path;
use std::process::Command;

/// Converts an arbitrary audio file into a canonical WAV file.
pub trait AudioConverter: Send + Sync {
    /// Convert `input` into a 16kHz mono WAV written at `output`.
    ///
    /// `output` may already exist and must be overwritten.
    fn convert(&self, input: &Path, output: &Path) -> Result<()>;
}

/// Borrowed converters convert too, so callers can keep ownership.
impl<T: AudioConverter + ?Sized> AudioConverter for &T {
    fn convert(&self, input: &Path, output: &Path) -> Result<()> {
        (**self).convert(input, output)
    }
}

/// Converter that shells out to ffmpeg.
#[derive(Debug, Clone)]
pub struct FfmpegConverter {
    program: String,
}

impl Default for FfmpegConverter {
    fn default() -> Self {
        Self::new(defaults::FFMPEG)
    }
}

impl FfmpegConverter {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Arguments passed to ffmpeg for a conversion.
    pub fn args(input: &Path, output: &Path) -> Vec<String> {
        vec![
            "-y".to_string(),
            "-i".to_string(),
            input.to_string_lossy().to_string(),
            "-ar".to_string(),
            defaults::SAMPLE_RATE.to_string(),
            "-ac".to_string(),
            defaults::CHANNELS.to_string(),
            output.to_string_lossy().to_string(),
        ]
    }
}

impl AudioConverter for FfmpegConverter {
    fn convert(&self, input: &Path, output: &Path) -> Result<()> {
        tracing::debug!(program = %self.program, input = %input.display(), "converting audio");

        // Output is captured so nothing leaks onto the result channel.
        let result = Command::new(&self.program)
            .args(Self::args(input, output))
            .output()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    ScriptifyError::ConversionToolNotFound {
                        tool: self.program.clone(),
                    }
                } else {
                    ScriptifyError::ConversionFailed {
                        message: format!("Failed to execute {}: {}", self.program, e),
                    }
                }
            })?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            return Err(ScriptifyError::ConversionFailed {
                message: format!(
                    "{} exited with {}: {}",
                    self.program,
                    result.status,
                    stderr_tail(&stderr)
                ),
            });
        }

        Ok(())
    }
}

/// Last non-empty line of a tool's stderr, which is where ffmpeg puts the
/// actual failure after its banner.
fn stderr_tail(stderr: &str) -> &str {
    stderr
        .lines()
        .rev()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or("no error output")
}

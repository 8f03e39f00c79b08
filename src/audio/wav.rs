//! WAV decoding and encoding.
//!
//! Decoding accepts any channel count, integer or float PCM and any sample
//! rate, and always yields 16kHz mono 16-bit samples.

use crate::defaults::{CHANNELS, SAMPLE_RATE};
use crate::error::{Result, ScriptifyError};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Decoded PCM audio.
///
/// Never mutated after decoding; chunks borrow read-only slices of it.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    samples: Vec<i16>,
    sample_rate: u32,
}

impl AudioBuffer {
    pub fn new(samples: Vec<i16>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    pub fn samples(&self) -> &[i16] {
        &self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Duration in seconds (`samples / sample_rate`).
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate as f64
    }
}

/// Decode WAV data from any reader into a canonical 16kHz mono buffer.
pub fn decode<R: Read>(reader: R) -> Result<AudioBuffer> {
    let mut wav_reader = hound::WavReader::new(reader).map_err(|e| ScriptifyError::AudioDecode {
        message: format!("Failed to parse WAV file: {}", e),
    })?;

    let spec = wav_reader.spec();
    if spec.channels == 0 {
        return Err(ScriptifyError::AudioDecode {
            message: "WAV header declares zero channels".to_string(),
        });
    }
    if spec.sample_rate == 0 {
        return Err(ScriptifyError::AudioDecode {
            message: "WAV header declares a zero sample rate".to_string(),
        });
    }

    let interleaved: Vec<i16> = match spec.sample_format {
        hound::SampleFormat::Float => wav_reader
            .samples::<f32>()
            .map(|s| s.map(float_to_i16))
            .collect::<std::result::Result<Vec<_>, _>>(),
        hound::SampleFormat::Int => {
            let bits = spec.bits_per_sample;
            wav_reader
                .samples::<i32>()
                .map(|s| s.map(|v| int_to_i16(v, bits)))
                .collect::<std::result::Result<Vec<_>, _>>()
        }
    }
    .map_err(|e| ScriptifyError::AudioDecode {
        message: format!("Failed to read WAV samples: {}", e),
    })?;

    let mono = downmix(interleaved, spec.channels);
    let samples = resample(&mono, spec.sample_rate, SAMPLE_RATE);

    Ok(AudioBuffer::new(samples, SAMPLE_RATE))
}

/// Decode a WAV file from disk.
pub fn read_file(path: &Path) -> Result<AudioBuffer> {
    let file = File::open(path).map_err(|e| ScriptifyError::AudioDecode {
        message: format!("Failed to open {}: {}", path.display(), e),
    })?;
    decode(BufReader::new(file))
}

/// Write 16-bit mono samples as a WAV file.
pub fn write_file(path: &Path, samples: &[i16], sample_rate: u32) -> Result<()> {
    let spec = hound::WavSpec {
        channels: CHANNELS,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let to_error = |e: hound::Error| ScriptifyError::AudioDecode {
        message: format!("Failed to write WAV file {}: {}", path.display(), e),
    };

    let mut writer = hound::WavWriter::create(path, spec).map_err(to_error)?;
    for &sample in samples {
        writer.write_sample(sample).map_err(to_error)?;
    }
    writer.finalize().map_err(to_error)
}

fn float_to_i16(sample: f32) -> i16 {
    (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16
}

fn int_to_i16(sample: i32, bits: u16) -> i16 {
    match bits {
        0..=15 => (sample << (16 - bits)) as i16,
        16 => sample as i16,
        _ => (sample >> (bits - 16)) as i16,
    }
}

/// Average interleaved frames down to a single channel.
fn downmix(samples: Vec<i16>, channels: u16) -> Vec<i16> {
    if channels <= 1 {
        return samples;
    }

    let channels = channels as usize;
    samples
        .chunks_exact(channels)
        .map(|frame| {
            let sum: i32 = frame.iter().map(|&s| s as i32).sum();
            (sum / channels as i32) as i16
        })
        .collect()
}

/// Simple linear interpolation resampling.
fn resample(samples: &[i16], from_rate: u32, to_rate: u32) -> Vec<i16> {
    if from_rate == to_rate || samples.is_empty() {
        return samples.to_vec();
    }

    let ratio = from_rate as f64 / to_rate as f64;
    let output_len = (samples.len() as f64 / ratio).ceil() as usize;

    (0..output_len)
        .map(|i| {
            let source_pos = i as f64 * ratio;
            let source_idx = source_pos.floor() as usize;
            let fraction = source_pos - source_idx as f64;

            if source_idx + 1 >= samples.len() {
                samples[samples.len() - 1]
            } else {
                let left = samples[source_idx] as f64;
                let right = samples[source_idx + 1] as f64;
                (left + (right - left) * fraction) as i16
            }
        })
        .collect()
}

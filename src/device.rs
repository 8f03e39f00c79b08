//! Compute device selection.
//!
//! The device is resolved once at startup from the user's preference and the
//! GPU backend compiled into the binary, then handed explicitly to the
//! transcriber.

use crate::defaults;
use crate::error::{Result, ScriptifyError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// What the user asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum DevicePreference {
    /// GPU if this build has a GPU backend, CPU otherwise.
    #[default]
    Auto,
    Cpu,
    Gpu,
}

impl FromStr for DevicePreference {
    type Err = ScriptifyError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "cpu" => Ok(Self::Cpu),
            "gpu" => Ok(Self::Gpu),
            other => Err(ScriptifyError::config(
                "compute.device",
                format!("unknown device '{other}' (expected auto, cpu or gpu)"),
            )),
        }
    }
}

/// The device inference will actually run on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComputeDevice {
    Cpu,
    Gpu { backend: &'static str },
}

impl ComputeDevice {
    /// Resolve a preference against the given compiled backend name.
    ///
    /// `backend` is whatever [`defaults::gpu_backend`] reports; `"CPU"` means
    /// no GPU support was compiled in.
    pub fn resolve_with(preference: DevicePreference, backend: &'static str) -> Result<Self> {
        let has_gpu = backend != "CPU";
        match preference {
            DevicePreference::Cpu => Ok(Self::Cpu),
            DevicePreference::Auto if has_gpu => Ok(Self::Gpu { backend }),
            DevicePreference::Auto => Ok(Self::Cpu),
            DevicePreference::Gpu if has_gpu => Ok(Self::Gpu { backend }),
            DevicePreference::Gpu => Err(ScriptifyError::config(
                "compute.device",
                "gpu requested but this build has no GPU backend (rebuild with --features cuda, vulkan, hipblas or metal)",
            )),
        }
    }

    /// Resolve a preference against this build.
    pub fn resolve(preference: DevicePreference) -> Result<Self> {
        Self::resolve_with(preference, defaults::gpu_backend())
    }

    pub fn is_gpu(&self) -> bool {
        matches!(self, Self::Gpu { .. })
    }
}

impl fmt::Display for ComputeDevice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cpu => write!(f, "CPU"),
            Self::Gpu { backend } => write!(f, "GPU ({backend})"),
        }
    }
}

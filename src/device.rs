//! Compute device selection
//!
//! Picks the best accelerator the host offers, in the preference order
//! Apple GPU (MPS) > NVIDIA GPU (CUDA) > CPU. The answer is only a hint
//! forwarded to the training backend as its `device` parameter.

use std::fmt;
use std::path::Path;
use std::process::{Command, Stdio};

use serde::{Deserialize, Serialize};

/// Compute device understood by the training backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Device {
    /// Host CPU (always available)
    Cpu,
    /// Apple Metal Performance Shaders
    Mps,
    /// NVIDIA CUDA
    Cuda,
}

impl Device {
    /// Identifier passed to the backend.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cpu => "cpu",
            Self::Mps => "mps",
            Self::Cuda => "cuda",
        }
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Source of accelerator availability.
pub trait DeviceProbe {
    /// Whether an Apple GPU is usable through MPS.
    fn mps_available(&self) -> bool;

    /// Whether an NVIDIA GPU is usable through CUDA.
    fn cuda_available(&self) -> bool;
}

/// Probe that inspects the running host.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemProbe;

impl DeviceProbe for SystemProbe {
    fn mps_available(&self) -> bool {
        cfg!(all(target_os = "macos", target_arch = "aarch64"))
    }

    fn cuda_available(&self) -> bool {
        if Path::new("/proc/driver/nvidia/version").exists() {
            return true;
        }
        Command::new("nvidia-smi")
            .arg("-L")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .is_ok_and(|status| status.success())
    }
}

/// Select the preferred device reported by `probe`.
#[must_use]
pub fn select_device(probe: &impl DeviceProbe) -> Device {
    if probe.mps_available() {
        Device::Mps
    } else if probe.cuda_available() {
        Device::Cuda
    } else {
        Device::Cpu
    }
}

/// Select the preferred device of the current host.
#[must_use]
pub fn get_device() -> Device {
    select_device(&SystemProbe)
}

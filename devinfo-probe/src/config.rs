//! Probe configuration.
//!
//! Defaults reproduce the standard probe run: default device, pointer
//! convention, continuous-mode written 1 then 0, sample rate written
//! 44100 then 22050.

use crate::device::{ConventionKind, ProbeError};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Which device-info backend the probe drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// In-memory sound input driver
    Simulated,

    /// The platform's capture endpoints (Windows only)
    System,
}

/// `System` on Windows, `Simulated` elsewhere.
///
/// The Windows endpoint backend is read-only: its set calls always fail
/// with `UNKNOWN_INFO_TYPE` whatever the convention.
impl Default for BackendKind {
    fn default() -> Self {
        if cfg!(windows) {
            BackendKind::System
        } else {
            BackendKind::Simulated
        }
    }
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "simulated" | "sim" => Ok(BackendKind::Simulated),
            "system" => Ok(BackendKind::System),
            other => Err(format!("unknown backend {other:?} (expected simulated or system)")),
        }
    }
}

/// Configuration for one probe run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    /// Device to open; empty selects the default input device
    pub device_name: String,

    /// How set values are handed to the driver
    pub convention: ConventionKind,

    pub backend: BackendKind,

    /// Values written to continuous-mode, in order
    pub continuous_writes: [i16; 2],

    /// Sample rates written, in order, in Hz
    pub sample_rate_writes: [u16; 2],
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            device_name: String::new(),
            convention: ConventionKind::default(),
            backend: BackendKind::default(),
            continuous_writes: [1, 0],
            sample_rate_writes: [44100, 22050],
        }
    }
}

impl ProbeConfig {
    pub const ENV_DEVICE: &'static str = "SIPROBE_DEVICE";
    pub const ENV_CONVENTION: &'static str = "SIPROBE_CONVENTION";
    pub const ENV_BACKEND: &'static str = "SIPROBE_BACKEND";

    /// Parse a JSON document; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ProbeError> {
        serde_json::from_str(json).map_err(|e| ProbeError::InvalidConfig(e.to_string()))
    }

    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ProbeError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ProbeError> {
        let mut config = Self::default();

        if let Some(name) = lookup(Self::ENV_DEVICE) {
            config.device_name = name;
        }
        if let Some(value) = lookup(Self::ENV_CONVENTION) {
            config.convention = value.parse().map_err(ProbeError::InvalidConfig)?;
        }
        if let Some(value) = lookup(Self::ENV_BACKEND) {
            config.backend = value.parse().map_err(ProbeError::InvalidConfig)?;
        }

        Ok(config)
    }
}

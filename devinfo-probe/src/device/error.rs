//! Status codes and probe error types.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Status word returned by the sound input driver. Zero means success.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatusCode(pub i16);

impl StatusCode {
    pub const OK: StatusCode = StatusCode(0);
    pub const NOT_OPEN: StatusCode = StatusCode(-28);
    pub const PARAM: StatusCode = StatusCode(-50);
    pub const PERMISSION: StatusCode = StatusCode(-54);
    pub const BAD_DEVICE: StatusCode = StatusCode(-221);
    pub const DEVICE_BUSY: StatusCode = StatusCode(-227);
    pub const INVALID_SAMPLE_RATE: StatusCode = StatusCode(-229);
    pub const INVALID_SAMPLE_SIZE: StatusCode = StatusCode(-230);
    pub const UNKNOWN_INFO_TYPE: StatusCode = StatusCode(-231);

    pub fn is_ok(self) -> bool {
        self.0 == 0
    }

    /// Convert a raw status into a `Result`.
    pub fn ok(self) -> Result<(), StatusCode> {
        if self.is_ok() {
            Ok(())
        } else {
            Err(self)
        }
    }

    /// Symbolic name, if the code is one the probe knows.
    pub fn name(self) -> Option<&'static str> {
        Some(match self {
            StatusCode::OK => "noErr",
            StatusCode::NOT_OPEN => "notOpenErr",
            StatusCode::PARAM => "paramErr",
            StatusCode::PERMISSION => "permErr",
            StatusCode::BAD_DEVICE => "siBadSoundInDevice",
            StatusCode::DEVICE_BUSY => "siDeviceBusyErr",
            StatusCode::INVALID_SAMPLE_RATE => "siInvalidSampleRate",
            StatusCode::INVALID_SAMPLE_SIZE => "siInvalidSampleSize",
            StatusCode::UNKNOWN_INFO_TYPE => "siUnknownInfoType",
            _ => return None,
        })
    }
}

impl std::fmt::Display for StatusCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{} ({})", self.0, name),
            None => write!(f, "{}", self.0),
        }
    }
}

/// Probe error types.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("Could not open device {device:?}: {status}")]
    OpenFailed { device: String, status: StatusCode },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[cfg(windows)]
    #[error("Windows API error: {0}")]
    WindowsError(#[source] windows::core::Error),
}

impl ProbeError {
    /// Driver status carried by the error, if any.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ProbeError::OpenFailed { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_ok() {
        assert!(StatusCode::OK.ok().is_ok());
        assert_eq!(StatusCode::PARAM.ok(), Err(StatusCode::PARAM));
    }

    #[test]
    fn test_status_display() {
        assert_eq!(StatusCode::PARAM.to_string(), "-50 (paramErr)");
        assert_eq!(StatusCode(-1).to_string(), "-1");
    }

    #[test]
    fn test_error_status() {
        let err = ProbeError::OpenFailed {
            device: "USB Mic".to_string(),
            status: StatusCode::DEVICE_BUSY,
        };
        assert_eq!(err.status(), Some(StatusCode::DEVICE_BUSY));
        assert_eq!(
            err.to_string(),
            "Could not open device \"USB Mic\": -227 (siDeviceBusyErr)"
        );
        assert_eq!(ProbeError::InvalidConfig("x".into()).status(), None);
    }
}

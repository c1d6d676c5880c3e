//! Sound input device-info probe - Library
//!
//! Empirically checks how a sound input driver expects small values to be
//! handed to its "set device info" call: by reference (pointer to the value)
//! or inline (value packed into the pointer-sized argument).
//!
//! ## Features
//!
//! - Query every device-info selector in a fixed order
//! - Write-and-verify continuous-mode and sample-rate
//! - Interchangeable set conventions chosen at configuration time
//! - Device handle closed on every exit path
//! - Simulated driver on every platform, capture endpoints on Windows

pub mod config;
pub mod device;
pub mod probe;

pub use config::{BackendKind, ProbeConfig};
pub use device::{
    ConventionKind, DeviceHandle, DeviceInfoBackend, InfoParam, Permission, ProbeError,
    PropertySelector, PropertyValue, SimulatedSoundInput, StatusCode,
};
pub use probe::{DeviceInfoProbe, ProbeReport, StepOutcome};

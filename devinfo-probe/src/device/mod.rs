//! Device-info access for sound input devices.
//!
//! This module defines the backend boundary the probe drives, the values
//! and selectors exchanged across it, and the backends that implement it.

pub mod backend;
pub mod convention;
pub mod error;
pub mod handle;
pub mod selector;
pub mod simulated;
pub mod value;
#[cfg(windows)]
pub mod wasapi;

#[cfg(test)]
pub(crate) mod fake;

pub use backend::{DeviceHandle, DeviceInfoBackend, InfoParam, Permission};
pub use convention::{ByReference, ConventionKind, Inline, SetConvention};
pub use error::{ProbeError, StatusCode};
pub use handle::OpenDevice;
pub use selector::{PropertySelector, ValueWidth};
pub use simulated::{SimulatedDevice, SimulatedSoundInput};
pub use value::{PropertyValue, UnsignedFixed};
#[cfg(windows)]
pub use wasapi::WasapiBackend;

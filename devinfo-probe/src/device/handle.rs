//! Scoped ownership of an open device handle.

use super::backend::{DeviceHandle, DeviceInfoBackend, InfoParam, Permission};
use super::error::StatusCode;
use super::selector::PropertySelector;
use super::value::PropertyValue;

/// An open device that is closed when dropped.
///
/// The guard borrows the backend mutably for its whole life, so nothing
/// else can touch the handle between open and close.
pub struct OpenDevice<'b, B: DeviceInfoBackend + ?Sized> {
    backend: &'b mut B,
    handle: DeviceHandle,
}

impl<'b, B: DeviceInfoBackend + ?Sized> OpenDevice<'b, B> {
    /// Open `device_name` on `backend`.
    pub fn open(backend: &'b mut B, device_name: &str, permission: Permission) -> Result<Self, StatusCode> {
        let handle = backend.open(device_name, permission)?;
        tracing::debug!(device = device_name, handle = handle.0, "device opened");
        Ok(Self { backend, handle })
    }

    pub fn handle(&self) -> DeviceHandle {
        self.handle
    }

    pub fn get(&mut self, selector: PropertySelector) -> Result<PropertyValue, StatusCode> {
        self.backend.get(self.handle, selector)
    }

    pub fn set(&mut self, selector: PropertySelector, param: InfoParam) -> Result<(), StatusCode> {
        self.backend.set(self.handle, selector, param)
    }
}

impl<B: DeviceInfoBackend + ?Sized> Drop for OpenDevice<'_, B> {
    fn drop(&mut self) {
        if self.handle.is_open() {
            self.backend.close(self.handle);
            tracing::debug!(handle = self.handle.0, "device closed");
            self.handle = DeviceHandle::NONE;
        }
    }
}

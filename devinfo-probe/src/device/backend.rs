//! The device-info boundary.
//!
//! A backend is the external collaborator the probe talks to: it opens a
//! named sound input device, answers queries on selectors, accepts set
//! calls and releases handles.

use super::error::StatusCode;
use super::selector::PropertySelector;
use super::value::PropertyValue;
use serde::{Deserialize, Serialize};

/// Reference number of an open device. Zero is never a valid handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceHandle(pub i32);

impl DeviceHandle {
    pub const NONE: DeviceHandle = DeviceHandle(0);

    pub fn is_open(self) -> bool {
        self.0 != 0
    }
}

/// Access requested when opening a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(i16)]
pub enum Permission {
    Read = 0,
    #[default]
    Write = 1,
}

/// The argument actually handed to a set call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InfoParam {
    /// Pointer to the value; the driver reads the value through it
    Indirect(PropertyValue),

    /// Value packed into the pointer-sized argument word
    Direct(u32),
}

/// Device-info operations of a sound input driver.
pub trait DeviceInfoBackend {
    /// Open a device by name. The empty name selects the default device.
    fn open(&mut self, device_name: &str, permission: Permission) -> Result<DeviceHandle, StatusCode>;

    /// Read the current value of a selector.
    fn get(&mut self, handle: DeviceHandle, selector: PropertySelector) -> Result<PropertyValue, StatusCode>;

    /// Write a selector.
    fn set(
        &mut self,
        handle: DeviceHandle,
        selector: PropertySelector,
        param: InfoParam,
    ) -> Result<(), StatusCode>;

    /// Release a handle returned by `open`.
    fn close(&mut self, handle: DeviceHandle);
}

impl<B: DeviceInfoBackend + ?Sized> DeviceInfoBackend for &mut B {
    fn open(&mut self, device_name: &str, permission: Permission) -> Result<DeviceHandle, StatusCode> {
        (**self).open(device_name, permission)
    }

    fn get(&mut self, handle: DeviceHandle, selector: PropertySelector) -> Result<PropertyValue, StatusCode> {
        (**self).get(handle, selector)
    }

    fn set(
        &mut self,
        handle: DeviceHandle,
        selector: PropertySelector,
        param: InfoParam,
    ) -> Result<(), StatusCode> {
        (**self).set(handle, selector, param)
    }

    fn close(&mut self, handle: DeviceHandle) {
        (**self).close(handle)
    }
}

impl<B: DeviceInfoBackend + ?Sized> DeviceInfoBackend for Box<B> {
    fn open(&mut self, device_name: &str, permission: Permission) -> Result<DeviceHandle, StatusCode> {
        (**self).open(device_name, permission)
    }

    fn get(&mut self, handle: DeviceHandle, selector: PropertySelector) -> Result<PropertyValue, StatusCode> {
        (**self).get(handle, selector)
    }

    fn set(
        &mut self,
        handle: DeviceHandle,
        selector: PropertySelector,
        param: InfoParam,
    ) -> Result<(), StatusCode> {
        (**self).set(handle, selector, param)
    }

    fn close(&mut self, handle: DeviceHandle) {
        (**self).close(handle)
    }
}

//! Scriptable backend that records every call, for tests.

use super::backend::{DeviceHandle, DeviceInfoBackend, InfoParam, Permission};
use super::error::StatusCode;
use super::selector::PropertySelector;
use super::value::PropertyValue;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Open(String, Permission),
    Get(PropertySelector),
    Set(PropertySelector, InfoParam),
    Close(DeviceHandle),
}

/// Stores written values and hands them back on the next read.
#[derive(Debug, Default)]
pub struct RecordingBackend {
    pub calls: Vec<Call>,
    pub fail_open: Option<StatusCode>,
    pub fail_get: HashMap<PropertySelector, StatusCode>,
    pub fail_set: HashMap<PropertySelector, StatusCode>,
    pub values: HashMap<PropertySelector, PropertyValue>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn gets(&self) -> Vec<PropertySelector> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                Call::Get(s) => Some(*s),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls.iter().filter(|c| pred(*c)).count()
    }
}

impl DeviceInfoBackend for RecordingBackend {
    fn open(&mut self, device_name: &str, permission: Permission) -> Result<DeviceHandle, StatusCode> {
        self.calls.push(Call::Open(device_name.to_string(), permission));
        match self.fail_open {
            Some(status) => Err(status),
            None => Ok(DeviceHandle(7)),
        }
    }

    fn get(&mut self, _handle: DeviceHandle, selector: PropertySelector) -> Result<PropertyValue, StatusCode> {
        self.calls.push(Call::Get(selector));
        if let Some(status) = self.fail_get.get(&selector) {
            return Err(*status);
        }
        Ok(self
            .values
            .get(&selector)
            .copied()
            .unwrap_or_else(|| PropertyValue::from_raw(selector.width(), 0)))
    }

    fn set(
        &mut self,
        _handle: DeviceHandle,
        selector: PropertySelector,
        param: InfoParam,
    ) -> Result<(), StatusCode> {
        self.calls.push(Call::Set(selector, param));
        if let Some(status) = self.fail_set.get(&selector) {
            return Err(*status);
        }
        let value = match param {
            InfoParam::Indirect(value) => value,
            InfoParam::Direct(bits) => PropertyValue::from_raw(selector.width(), bits),
        };
        self.values.insert(selector, value);
        Ok(())
    }

    fn close(&mut self, handle: DeviceHandle) {
        self.calls.push(Call::Close(handle));
    }
}

//! In-memory sound input driver.
//!
//! Models the device-info behavior of a sound input driver closely enough
//! to exercise the probe end to end on any platform: named devices,
//! read/write permission, busy devices, read-only selectors, range checks
//! and the driver's parameter-passing convention.

use super::backend::{DeviceHandle, DeviceInfoBackend, InfoParam, Permission};
use super::convention::ConventionKind;
use super::error::StatusCode;
use super::selector::{PropertySelector, ValueWidth};
use super::value::{PropertyValue, UnsignedFixed};
use std::collections::HashMap;

/// Sample rates the simulated hardware can run at, in Hz.
pub const SUPPORTED_SAMPLE_RATES: [u16; 4] = [11025, 22050, 44100, 48000];

/// One simulated input device and its current settings.
#[derive(Debug, Clone)]
pub struct SimulatedDevice {
    pub name: String,
    pub continuous: i16,
    pub async_supported: bool,
    pub channels: i16,
    pub channels_available: i16,
    pub sample_size: i16,
    pub sample_rate: UnsignedFixed,
    pub active_channels: i32,
    pub buffer_size: i32,
}

impl SimulatedDevice {
    /// A mono 16-bit 22.05kHz device.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            continuous: 0,
            async_supported: true,
            channels: 1,
            channels_available: 2,
            sample_size: 16,
            sample_rate: UnsignedFixed::from_hz(22050),
            active_channels: 0b1,
            buffer_size: 8192,
        }
    }

    fn read(&self, selector: PropertySelector) -> PropertyValue {
        match selector {
            PropertySelector::ContinuousMode => PropertyValue::Short(self.continuous),
            PropertySelector::AsyncMode => PropertyValue::Short(i16::from(self.async_supported)),
            PropertySelector::ChannelCount => PropertyValue::Short(self.channels),
            PropertySelector::SampleSize => PropertyValue::Short(self.sample_size),
            PropertySelector::SampleRate => PropertyValue::Rate(self.sample_rate),
            PropertySelector::ChannelAvailability => PropertyValue::Short(self.channels_available),
            PropertySelector::ActiveChannels => PropertyValue::Long(self.active_channels),
            PropertySelector::BufferInfo => PropertyValue::Long(self.buffer_size),
        }
    }

    fn write(&mut self, selector: PropertySelector, value: PropertyValue) -> Result<(), StatusCode> {
        match (selector, value) {
            (PropertySelector::ContinuousMode, PropertyValue::Short(v)) => {
                self.continuous = i16::from(v != 0);
            }
            (PropertySelector::ChannelCount, PropertyValue::Short(v)) => {
                if !(1..=self.channels_available).contains(&v) {
                    return Err(StatusCode::PARAM);
                }
                self.channels = v;
            }
            (PropertySelector::SampleSize, PropertyValue::Short(v)) => {
                if v != 8 && v != 16 {
                    return Err(StatusCode::INVALID_SAMPLE_SIZE);
                }
                self.sample_size = v;
            }
            (PropertySelector::SampleRate, PropertyValue::Rate(rate)) => {
                let whole = rate.0 & 0xFFFF == 0;
                if !whole || !SUPPORTED_SAMPLE_RATES.contains(&rate.integer_part()) {
                    return Err(StatusCode::INVALID_SAMPLE_RATE);
                }
                self.sample_rate = rate;
            }
            (PropertySelector::ActiveChannels, PropertyValue::Long(mask)) => {
                let all = channel_mask(self.channels_available);
                if mask == 0 || (mask as u32) & !all != 0 {
                    return Err(StatusCode::PARAM);
                }
                self.active_channels = mask;
            }
            (
                PropertySelector::AsyncMode
                | PropertySelector::ChannelAvailability
                | PropertySelector::BufferInfo,
                _,
            ) => return Err(StatusCode::UNKNOWN_INFO_TYPE),
            _ => return Err(StatusCode::PARAM),
        }
        Ok(())
    }
}

/// Bitmask with one bit per available channel, saturating at 32 channels.
fn channel_mask(available: i16) -> u32 {
    match u32::try_from(available) {
        Ok(n) => 1u32.checked_shl(n).map_or(u32::MAX, |bit| bit - 1),
        Err(_) => 0,
    }
}

#[derive(Debug, Clone, Copy)]
struct OpenEntry {
    device: usize,
    permission: Permission,
}

/// Simulated sound input driver.
#[derive(Debug)]
pub struct SimulatedSoundInput {
    devices: Vec<SimulatedDevice>,
    open: HashMap<DeviceHandle, OpenEntry>,
    next_handle: i32,
    expects: ConventionKind,
}

impl Default for SimulatedSoundInput {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedSoundInput {
    /// A driver with a single built-in input that reads set values by reference.
    pub fn new() -> Self {
        Self::with_devices(vec![SimulatedDevice::new("Built-in Input")])
    }

    /// A driver exposing `devices`; the first one is the default device.
    pub fn with_devices(devices: Vec<SimulatedDevice>) -> Self {
        Self {
            devices,
            open: HashMap::new(),
            next_handle: 1,
            expects: ConventionKind::Pointer,
        }
    }

    /// Make the driver take set arguments with the given convention.
    pub fn expecting(mut self, convention: ConventionKind) -> Self {
        self.expects = convention;
        self
    }

    pub fn device(&self, name: &str) -> Option<&SimulatedDevice> {
        self.devices.iter().find(|d| d.name == name)
    }

    /// Number of handles currently open.
    pub fn open_handles(&self) -> usize {
        self.open.len()
    }

    fn entry(&self, handle: DeviceHandle) -> Result<OpenEntry, StatusCode> {
        self.open.get(&handle).copied().ok_or(StatusCode::NOT_OPEN)
    }

    fn decode(&self, selector: PropertySelector, param: InfoParam) -> Result<PropertyValue, StatusCode> {
        if !self.expects.matches(&param) {
            return Err(StatusCode::PARAM);
        }

        let width = selector.width();
        match param {
            InfoParam::Indirect(value) if value.width() == width => Ok(value),
            InfoParam::Indirect(_) => Err(StatusCode::PARAM),
            InfoParam::Direct(bits) if width == ValueWidth::Short && bits > 0xFFFF => Err(StatusCode::PARAM),
            InfoParam::Direct(bits) => Ok(PropertyValue::from_raw(width, bits)),
        }
    }
}

impl DeviceInfoBackend for SimulatedSoundInput {
    fn open(&mut self, device_name: &str, permission: Permission) -> Result<DeviceHandle, StatusCode> {
        let device = if device_name.is_empty() {
            if self.devices.is_empty() {
                return Err(StatusCode::BAD_DEVICE);
            }
            0
        } else {
            self.devices
                .iter()
                .position(|d| d.name == device_name)
                .ok_or(StatusCode::BAD_DEVICE)?
        };

        if permission == Permission::Write
            && self
                .open
                .values()
                .any(|e| e.device == device && e.permission == Permission::Write)
        {
            return Err(StatusCode::DEVICE_BUSY);
        }

        let handle = DeviceHandle(self.next_handle);
        self.next_handle += 1;
        self.open.insert(handle, OpenEntry { device, permission });
        Ok(handle)
    }

    fn get(&mut self, handle: DeviceHandle, selector: PropertySelector) -> Result<PropertyValue, StatusCode> {
        let entry = self.entry(handle)?;
        Ok(self.devices[entry.device].read(selector))
    }

    fn set(
        &mut self,
        handle: DeviceHandle,
        selector: PropertySelector,
        param: InfoParam,
    ) -> Result<(), StatusCode> {
        let entry = self.entry(handle)?;
        if entry.permission != Permission::Write {
            return Err(StatusCode::PERMISSION);
        }
        let value = self.decode(selector, param)?;
        self.devices[entry.device].write(selector, value)
    }

    fn close(&mut self, handle: DeviceHandle) {
        self.open.remove(&handle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rate(hz: u16) -> InfoParam {
        InfoParam::Indirect(PropertyValue::Rate(UnsignedFixed::from_hz(hz)))
    }

    #[test]
    fn test_empty_name_opens_default_device() {
        let mut driver = SimulatedSoundInput::new();
        let handle = driver.open("", Permission::Write).unwrap();
        assert!(handle.is_open());
        assert_eq!(driver.open_handles(), 1);
        driver.close(handle);
        assert_eq!(driver.open_handles(), 0);
    }

    #[test]
    fn test_unknown_device() {
        let mut driver = SimulatedSoundInput::new();
        assert_eq!(driver.open("Nope", Permission::Read), Err(StatusCode::BAD_DEVICE));
        let mut empty = SimulatedSoundInput::with_devices(Vec::new());
        assert_eq!(empty.open("", Permission::Read), Err(StatusCode::BAD_DEVICE));
    }

    #[test]
    fn test_second_writer_is_busy() {
        let mut driver = SimulatedSoundInput::new();
        let first = driver.open("", Permission::Write).unwrap();
        assert_eq!(driver.open("", Permission::Write), Err(StatusCode::DEVICE_BUSY));
        assert!(driver.open("", Permission::Read).is_ok());
        driver.close(first);
        assert!(driver.open("", Permission::Write).is_ok());
    }

    #[test]
    fn test_closed_handle_not_open() {
        let mut driver = SimulatedSoundInput::new();
        let handle = driver.open("", Permission::Write).unwrap();
        driver.close(handle);
        assert_eq!(
            driver.get(handle, PropertySelector::SampleRate),
            Err(StatusCode::NOT_OPEN)
        );
    }

    #[test]
    fn test_read_permission_rejects_set() {
        let mut driver = SimulatedSoundInput::new();
        let handle = driver.open("", Permission::Read).unwrap();
        assert_eq!(
            driver.set(handle, PropertySelector::SampleRate, rate(44100)),
            Err(StatusCode::PERMISSION)
        );
    }

    #[test]
    fn test_sample_rate_round_trip() {
        let mut driver = SimulatedSoundInput::new();
        let handle = driver.open("", Permission::Write).unwrap();
        driver.set(handle, PropertySelector::SampleRate, rate(44100)).unwrap();
        assert_eq!(
            driver.get(handle, PropertySelector::SampleRate),
            Ok(PropertyValue::Rate(UnsignedFixed::from_hz(44100)))
        );
        assert_eq!(
            driver.set(handle, PropertySelector::SampleRate, rate(12345)),
            Err(StatusCode::INVALID_SAMPLE_RATE)
        );
    }

    #[test]
    fn test_pointer_driver_rejects_direct() {
        let mut driver = SimulatedSoundInput::new();
        let handle = driver.open("", Permission::Write).unwrap();
        assert_eq!(
            driver.set(handle, PropertySelector::ContinuousMode, InfoParam::Direct(1)),
            Err(StatusCode::PARAM)
        );
        assert_eq!(
            driver.get(handle, PropertySelector::ContinuousMode),
            Ok(PropertyValue::Short(0))
        );
    }

    #[test]
    fn test_direct_driver_accepts_direct() {
        let mut driver = SimulatedSoundInput::new().expecting(ConventionKind::Direct);
        let handle = driver.open("", Permission::Write).unwrap();
        driver
            .set(handle, PropertySelector::ContinuousMode, InfoParam::Direct(1))
            .unwrap();
        assert_eq!(
            driver.get(handle, PropertySelector::ContinuousMode),
            Ok(PropertyValue::Short(1))
        );
        assert_eq!(
            driver.set(handle, PropertySelector::ContinuousMode, InfoParam::Direct(0x1_0000)),
            Err(StatusCode::PARAM)
        );
        assert_eq!(
            driver.set(handle, PropertySelector::SampleRate, rate(44100)),
            Err(StatusCode::PARAM)
        );
    }

    #[test]
    fn test_read_only_selectors() {
        let mut driver = SimulatedSoundInput::new();
        let handle = driver.open("", Permission::Write).unwrap();
        for selector in [
            PropertySelector::AsyncMode,
            PropertySelector::ChannelAvailability,
        ] {
            assert_eq!(
                driver.set(handle, selector, InfoParam::Indirect(PropertyValue::Short(1))),
                Err(StatusCode::UNKNOWN_INFO_TYPE)
            );
        }
        assert_eq!(
            driver.set(handle, PropertySelector::BufferInfo, InfoParam::Indirect(PropertyValue::Long(1))),
            Err(StatusCode::UNKNOWN_INFO_TYPE)
        );
    }

    #[test]
    fn test_width_mismatch() {
        let mut driver = SimulatedSoundInput::new();
        let handle = driver.open("", Permission::Write).unwrap();
        assert_eq!(
            driver.set(handle, PropertySelector::SampleRate, InfoParam::Indirect(PropertyValue::Short(1))),
            Err(StatusCode::PARAM)
        );
    }

    #[test]
    fn test_range_checks() {
        let mut driver = SimulatedSoundInput::new();
        let handle = driver.open("", Permission::Write).unwrap();
        let short = |v| InfoParam::Indirect(PropertyValue::Short(v));
        assert_eq!(
            driver.set(handle, PropertySelector::SampleSize, short(12)),
            Err(StatusCode::INVALID_SAMPLE_SIZE)
        );
        assert_eq!(driver.set(handle, PropertySelector::ChannelCount, short(3)), Err(StatusCode::PARAM));
        driver.set(handle, PropertySelector::ChannelCount, short(2)).unwrap();
        assert_eq!(
            driver.set(handle, PropertySelector::ActiveChannels, InfoParam::Indirect(PropertyValue::Long(0b100))),
            Err(StatusCode::PARAM)
        );
        driver
            .set(handle, PropertySelector::ActiveChannels, InfoParam::Indirect(PropertyValue::Long(0b11)))
            .unwrap();
        driver.set(handle, PropertySelector::ContinuousMode, short(5)).unwrap();
        assert_eq!(
            driver.device("Built-in Input").map(|d| (d.continuous, d.channels, d.active_channels)),
            Some((1, 2, 0b11))
        );
    }

    fn wide_driver(available: i16) -> (SimulatedSoundInput, DeviceHandle) {
        let mut device = SimulatedDevice::new("Interface");
        device.channels_available = available;
        let mut driver = SimulatedSoundInput::with_devices(vec![device]);
        let handle = driver.open("", Permission::Write).unwrap();
        (driver, handle)
    }

    #[test]
    fn test_active_channels_on_32_channel_device() {
        let (mut driver, handle) = wide_driver(32);
        let long = |v| InfoParam::Indirect(PropertyValue::Long(v));
        driver.set(handle, PropertySelector::ActiveChannels, long(1)).unwrap();
        driver.set(handle, PropertySelector::ActiveChannels, long(-1)).unwrap();
        assert_eq!(
            driver.get(handle, PropertySelector::ActiveChannels),
            Ok(PropertyValue::Long(-1))
        );
    }

    #[test]
    fn test_active_channels_on_31_channel_device() {
        let (mut driver, handle) = wide_driver(31);
        let long = |v| InfoParam::Indirect(PropertyValue::Long(v));
        driver.set(handle, PropertySelector::ActiveChannels, long(1)).unwrap();
        driver.set(handle, PropertySelector::ActiveChannels, long(i32::MAX)).unwrap();
        assert_eq!(
            driver.set(handle, PropertySelector::ActiveChannels, long(-1)),
            Err(StatusCode::PARAM)
        );
    }

    #[test]
    fn test_active_channels_without_channels() {
        for available in [0, -3] {
            let (mut driver, handle) = wide_driver(available);
            assert_eq!(
                driver.set(handle, PropertySelector::ActiveChannels, InfoParam::Indirect(PropertyValue::Long(1))),
                Err(StatusCode::PARAM)
            );
        }
    }

    #[test]
    fn test_channel_mask() {
        assert_eq!(channel_mask(2), 0b11);
        assert_eq!(channel_mask(31), 0x7FFF_FFFF);
        assert_eq!(channel_mask(32), u32::MAX);
        assert_eq!(channel_mask(-1), 0);
    }
}

//! System capture endpoints via the Windows MMDevice API.
//!
//! Shared-mode endpoints expose their format read-only, so this backend
//! answers the format selectors from the endpoint mix format and refuses
//! every set call.
//!
//! This is the default backend on Windows, so a plain run reports the real
//! default capture endpoint's channel count, sample size and sample rate.
//! Set calls fail with `UNKNOWN_INFO_TYPE` before the argument is looked
//! at, so the configured set convention has no effect here. Comparing
//! conventions needs `SIPROBE_BACKEND=simulated`.

use super::backend::{DeviceHandle, DeviceInfoBackend, InfoParam, Permission};
use super::error::{ProbeError, StatusCode};
use super::selector::PropertySelector;
use super::value::{PropertyValue, UnsignedFixed};
use std::collections::HashMap;
use windows::Win32::Devices::Properties::DEVPKEY_Device_FriendlyName;
use windows::Win32::Media::Audio::{
    eCapture, eConsole, IAudioClient, IMMDevice, IMMDeviceEnumerator, MMDeviceEnumerator,
    DEVICE_STATE_ACTIVE, WAVEFORMATEX,
};
use windows::Win32::System::Com::{
    CoCreateInstance, CoInitializeEx, CoTaskMemFree, CoUninitialize, CLSCTX_ALL,
    COINIT_APARTMENTTHREADED, STGM,
};
use windows::Win32::UI::Shell::PropertiesSystem::PROPERTYKEY;

/// COM initialization guard that uninitializes COM on drop.
pub struct ComGuard {
    initialized: bool,
}

impl ComGuard {
    /// Initialize COM for the current thread.
    pub fn new() -> Result<Self, ProbeError> {
        unsafe {
            CoInitializeEx(None, COINIT_APARTMENTTHREADED)
                .ok()
                .map_err(ProbeError::WindowsError)?;
        }
        Ok(Self { initialized: true })
    }
}

impl Drop for ComGuard {
    fn drop(&mut self) {
        if self.initialized {
            unsafe {
                CoUninitialize();
            }
        }
    }
}

/// Mix format fields the probe can report.
#[derive(Debug, Clone, Copy)]
struct MixFormat {
    sample_rate: u32,
    bit_depth: u16,
    channels: u16,
}

/// Capture endpoint backend.
pub struct WasapiBackend {
    // Dropped before the COM guard.
    devices: HashMap<DeviceHandle, IMMDevice>,
    enumerator: IMMDeviceEnumerator,
    next_handle: i32,
    _com: ComGuard,
}

impl WasapiBackend {
    pub fn new() -> Result<Self, ProbeError> {
        let com = ComGuard::new()?;
        let enumerator: IMMDeviceEnumerator = unsafe {
            CoCreateInstance(&MMDeviceEnumerator, None, CLSCTX_ALL).map_err(ProbeError::WindowsError)?
        };

        Ok(Self {
            devices: HashMap::new(),
            enumerator,
            next_handle: 1,
            _com: com,
        })
    }

    /// Resolve a device name to an active capture endpoint.
    fn find_device(&self, device_name: &str) -> Option<IMMDevice> {
        unsafe {
            if device_name.is_empty() {
                return self.enumerator.GetDefaultAudioEndpoint(eCapture, eConsole).ok();
            }

            let collection = self
                .enumerator
                .EnumAudioEndpoints(eCapture, DEVICE_STATE_ACTIVE)
                .ok()?;
            let count = collection.GetCount().ok()?;

            (0..count)
                .filter_map(|i| collection.Item(i).ok())
                .find(|device| Self::friendly_name(device).as_deref() == Some(device_name))
        }
    }

    fn friendly_name(device: &IMMDevice) -> Option<String> {
        unsafe {
            let props = device.OpenPropertyStore(STGM(0)).ok()?;
            let key = PROPERTYKEY {
                fmtid: DEVPKEY_Device_FriendlyName.fmtid,
                pid: DEVPKEY_Device_FriendlyName.pid,
            };
            let prop = props.GetValue(&key).ok()?;

            let s = prop.to_string();
            if s.is_empty() {
                None
            } else {
                Some(s)
            }
        }
    }

    fn mix_format(device: &IMMDevice) -> Option<MixFormat> {
        unsafe {
            let audio_client: IAudioClient = device.Activate(CLSCTX_ALL, None).ok()?;
            let format_ptr = audio_client.GetMixFormat().ok()?;
            if format_ptr.is_null() {
                return None;
            }

            let format: &WAVEFORMATEX = &*format_ptr;
            let mix = MixFormat {
                sample_rate: format.nSamplesPerSec,
                bit_depth: format.wBitsPerSample,
                channels: format.nChannels,
            };

            CoTaskMemFree(Some(format_ptr as *const _));

            Some(mix)
        }
    }
}

impl DeviceInfoBackend for WasapiBackend {
    fn open(&mut self, device_name: &str, _permission: Permission) -> Result<DeviceHandle, StatusCode> {
        let device = self.find_device(device_name).ok_or(StatusCode::BAD_DEVICE)?;
        let handle = DeviceHandle(self.next_handle);
        self.next_handle += 1;
        self.devices.insert(handle, device);
        Ok(handle)
    }

    fn get(&mut self, handle: DeviceHandle, selector: PropertySelector) -> Result<PropertyValue, StatusCode> {
        let device = self.devices.get(&handle).ok_or(StatusCode::NOT_OPEN)?;

        match selector {
            PropertySelector::ChannelCount
            | PropertySelector::SampleSize
            | PropertySelector::SampleRate => {}
            _ => return Err(StatusCode::UNKNOWN_INFO_TYPE),
        }

        let mix = Self::mix_format(device).ok_or(StatusCode::BAD_DEVICE)?;
        Ok(match selector {
            PropertySelector::ChannelCount => PropertyValue::Short(mix.channels as i16),
            PropertySelector::SampleSize => PropertyValue::Short(mix.bit_depth as i16),
            _ => {
                let hz = u16::try_from(mix.sample_rate).map_err(|_| StatusCode::INVALID_SAMPLE_RATE)?;
                PropertyValue::Rate(UnsignedFixed::from_hz(hz))
            }
        })
    }

    fn set(
        &mut self,
        handle: DeviceHandle,
        selector: PropertySelector,
        _param: InfoParam,
    ) -> Result<(), StatusCode> {
        if !self.devices.contains_key(&handle) {
            return Err(StatusCode::NOT_OPEN);
        }
        tracing::debug!(%selector, "shared-mode endpoint settings are read-only");
        Err(StatusCode::UNKNOWN_INFO_TYPE)
    }

    fn close(&mut self, handle: DeviceHandle) {
        self.devices.remove(&handle);
    }
}

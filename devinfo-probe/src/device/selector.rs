//! Device-info selectors.
//!
//! Each selector names one queryable attribute of a sound input device and
//! fixes the width of the value exchanged for it.

use serde::{Deserialize, Serialize};

/// Width of the value a selector exchanges with the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ValueWidth {
    /// 16-bit signed integer
    Short,

    /// 32-bit signed integer
    Long,

    /// 32-bit unsigned 16.16 fixed-point
    Fixed,
}

/// Device-info key identifying one attribute of a sound input device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PropertySelector {
    /// Whether the device records continuously
    ContinuousMode,

    /// Whether the driver supports asynchronous recording
    AsyncMode,

    /// Number of channels recorded
    ChannelCount,

    /// Bits per sample
    SampleSize,

    /// Sample rate as 16.16 fixed-point Hz
    SampleRate,

    /// Number of channels the hardware can provide
    ChannelAvailability,

    /// Bitmask of the channels currently in use
    ActiveChannels,

    /// Size of the driver's internal buffer
    BufferInfo,
}

impl PropertySelector {
    /// Selectors in the order the probe queries them.
    pub const QUERY_ORDER: [PropertySelector; 8] = [
        PropertySelector::ContinuousMode,
        PropertySelector::AsyncMode,
        PropertySelector::ChannelCount,
        PropertySelector::SampleSize,
        PropertySelector::SampleRate,
        PropertySelector::ChannelAvailability,
        PropertySelector::ActiveChannels,
        PropertySelector::BufferInfo,
    ];

    /// Four-character code used by the driver to identify the selector.
    pub fn code(self) -> &'static str {
        match self {
            PropertySelector::ContinuousMode => "cont",
            PropertySelector::AsyncMode => "asyn",
            PropertySelector::ChannelCount => "chan",
            PropertySelector::SampleSize => "ssiz",
            PropertySelector::SampleRate => "srat",
            PropertySelector::ChannelAvailability => "chav",
            PropertySelector::ActiveChannels => "chac",
            PropertySelector::BufferInfo => "dbin",
        }
    }

    pub fn width(self) -> ValueWidth {
        match self {
            PropertySelector::SampleRate => ValueWidth::Fixed,
            PropertySelector::ActiveChannels | PropertySelector::BufferInfo => ValueWidth::Long,
            _ => ValueWidth::Short,
        }
    }

    /// Human-readable name used in the probe transcript.
    pub fn name(self) -> &'static str {
        match self {
            PropertySelector::ContinuousMode => "continuous-mode",
            PropertySelector::AsyncMode => "async-mode",
            PropertySelector::ChannelCount => "channel-count",
            PropertySelector::SampleSize => "sample-size",
            PropertySelector::SampleRate => "sample-rate",
            PropertySelector::ChannelAvailability => "channel-availability",
            PropertySelector::ActiveChannels => "active-channels",
            PropertySelector::BufferInfo => "buffer-info",
        }
    }
}

impl std::fmt::Display for PropertySelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

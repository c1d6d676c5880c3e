//! Device-info values.

use super::selector::ValueWidth;
use serde::{Deserialize, Serialize};

/// Unsigned 16.16 fixed-point number, used for sample rates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnsignedFixed(pub u32);

impl UnsignedFixed {
    /// Fixed-point value with a whole number of Hz and no fraction.
    pub fn from_hz(hz: u16) -> Self {
        Self(u32::from(hz) << 16)
    }

    /// Integer part (upper 16 bits).
    pub fn integer_part(self) -> u16 {
        (self.0 >> 16) as u16
    }

    pub fn to_f64(self) -> f64 {
        f64::from(self.0) / 65536.0
    }
}

impl std::fmt::Display for UnsignedFixed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.0 & 0xFFFF == 0 {
            write!(f, "{}", self.integer_part())
        } else {
            write!(f, "{:.4}", self.to_f64())
        }
    }
}

/// A value read from or written to a device-info selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "width", content = "value", rename_all = "kebab-case")]
pub enum PropertyValue {
    Short(i16),
    Long(i32),
    Rate(UnsignedFixed),
}

impl PropertyValue {
    pub fn width(&self) -> ValueWidth {
        match self {
            PropertyValue::Short(_) => ValueWidth::Short,
            PropertyValue::Long(_) => ValueWidth::Long,
            PropertyValue::Rate(_) => ValueWidth::Fixed,
        }
    }

    /// The value's bit pattern, zero-extended to 32 bits.
    pub fn raw_bits(&self) -> u32 {
        match *self {
            PropertyValue::Short(v) => u32::from(v as u16),
            PropertyValue::Long(v) => v as u32,
            PropertyValue::Rate(v) => v.0,
        }
    }

    /// Rebuild a value of the given width from a 32-bit word.
    ///
    /// Short values keep only the low 16 bits.
    pub fn from_raw(width: ValueWidth, bits: u32) -> Self {
        match width {
            ValueWidth::Short => PropertyValue::Short(bits as u16 as i16),
            ValueWidth::Long => PropertyValue::Long(bits as i32),
            ValueWidth::Fixed => PropertyValue::Rate(UnsignedFixed(bits)),
        }
    }
}

impl std::fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PropertyValue::Short(v) => write!(f, "{v}"),
            PropertyValue::Long(v) => write!(f, "{v}"),
            PropertyValue::Rate(v) => write!(f, "{v}"),
        }
    }
}

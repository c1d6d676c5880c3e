//! Parameter-passing conventions for set calls.
//!
//! The set primitive takes a pointer-sized argument. A driver either reads
//! the value through it (`ByReference`) or takes the argument word itself
//! as the value (`Inline`). Which one the driver really implements for
//! values of 4 bytes or less is what the probe measures.

use super::backend::InfoParam;
use super::value::PropertyValue;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Strategy for handing a value to the set call.
pub trait SetConvention {
    /// Name used in the probe transcript.
    fn name(&self) -> &'static str;

    fn encode(&self, value: &PropertyValue) -> InfoParam;
}

/// Pass a pointer to the value.
#[derive(Debug, Clone, Copy, Default)]
pub struct ByReference;

impl SetConvention for ByReference {
    fn name(&self) -> &'static str {
        "pointer"
    }

    fn encode(&self, value: &PropertyValue) -> InfoParam {
        InfoParam::Indirect(*value)
    }
}

/// Pass the value itself in the argument word.
#[derive(Debug, Clone, Copy, Default)]
pub struct Inline;

impl SetConvention for Inline {
    fn name(&self) -> &'static str {
        "direct"
    }

    fn encode(&self, value: &PropertyValue) -> InfoParam {
        InfoParam::Direct(value.raw_bits())
    }
}

/// Configuration-time choice of convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConventionKind {
    #[default]
    Pointer,
    Direct,
}

impl ConventionKind {
    pub fn strategy(self) -> &'static dyn SetConvention {
        match self {
            ConventionKind::Pointer => &ByReference,
            ConventionKind::Direct => &Inline,
        }
    }

    /// Whether a parameter was encoded with this convention.
    pub fn matches(self, param: &InfoParam) -> bool {
        matches!(
            (self, param),
            (ConventionKind::Pointer, InfoParam::Indirect(_)) | (ConventionKind::Direct, InfoParam::Direct(_))
        )
    }
}

impl FromStr for ConventionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pointer" | "indirect" => Ok(ConventionKind::Pointer),
            "direct" | "inline" => Ok(ConventionKind::Direct),
            other => Err(format!("unknown set convention {other:?} (expected pointer or direct)")),
        }
    }
}

//! Overlay identifiers.
//!
//! Positionable content is addressed by an auto-incremented number, while
//! externally keyed audio uses an `audio-<key>` string so repeated imports of
//! the same source stay addressable. The timeline widget may hand back either
//! shape as text, so [`OverlayId::parse`] is the single place that turns UI
//! input into an id.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Prefix carried by every keyed audio id.
pub const AUDIO_ID_PREFIX: &str = "audio-";

/// Unique identifier of an overlay.
///
/// Deserialization goes through [`OverlayId::parse`], so `"12"` and `12`
/// read back as the same id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(untagged)]
pub enum OverlayId {
    Numeric(u64),
    Keyed(String),
}

impl OverlayId {
    /// Interpret an id as received from the timeline UI.
    ///
    /// Integral numeric text (`"12"`, `" 12 "`, `"12.0"`) becomes
    /// [`OverlayId::Numeric`]; anything else is kept verbatim as a key.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if let Ok(n) = trimmed.parse::<u64>() {
            return Self::Numeric(n);
        }
        if let Ok(f) = trimmed.parse::<f64>() {
            if f.is_finite() && f >= 0.0 && f.fract() == 0.0 && f <= u64::MAX as f64 {
                return Self::Numeric(f as u64);
            }
        }
        Self::Keyed(raw.to_string())
    }

    /// Keyed audio id for a source key, adding the prefix only once.
    pub fn audio(key: &str) -> Self {
        if key.starts_with(AUDIO_ID_PREFIX) {
            Self::Keyed(key.to_string())
        } else {
            Self::Keyed(format!("{AUDIO_ID_PREFIX}{key}"))
        }
    }

    pub fn as_numeric(&self) -> Option<u64> {
        match self {
            Self::Numeric(n) => Some(*n),
            Self::Keyed(_) => None,
        }
    }

    pub fn is_keyed(&self) -> bool {
        matches!(self, Self::Keyed(_))
    }

    /// The form this id takes after a trip through [`OverlayId::parse`].
    pub fn canonical(&self) -> Self {
        match self {
            Self::Numeric(n) => Self::Numeric(*n),
            Self::Keyed(key) => Self::parse(key),
        }
    }

    /// Whether two ids name the same overlay once canonicalized.
    pub fn same_as(&self, other: &Self) -> bool {
        self == other || self.canonical() == other.canonical()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Number(u64),
    Float(f64),
    Text(String),
}

impl<'de> Deserialize<'de> for OverlayId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match RawId::deserialize(deserializer)? {
            RawId::Number(n) => Self::Numeric(n),
            RawId::Float(f) => Self::parse(&f.to_string()),
            RawId::Text(text) => Self::parse(&text),
        })
    }
}

impl From<u64> for OverlayId {
    fn from(n: u64) -> Self {
        Self::Numeric(n)
    }
}

impl From<&str> for OverlayId {
    fn from(raw: &str) -> Self {
        Self::parse(raw)
    }
}

impl fmt::Display for OverlayId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numeric(n) => write!(f, "{n}"),
            Self::Keyed(key) => f.write_str(key),
        }
    }
}

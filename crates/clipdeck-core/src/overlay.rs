//! The overlay entity: one timed, positioned item of timeline content.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::geometry::Rect;
use crate::id::OverlayId;
use crate::time::FrameSpan;

/// Kind of overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OverlayKind {
    Video,
    Image,
    Text,
    Shape,
    Sound,
    Caption,
    Sticker,
    Template,
    LocalDir,
    Settings,
}

impl OverlayKind {
    /// Whether the overlay occupies canvas space and takes part in
    /// spatial layout, alignment and canvas selection.
    pub fn is_visual(self) -> bool {
        !matches!(self, Self::Sound | Self::LocalDir | Self::Settings)
    }

    /// Wire name, as used in the host's JSON.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Video => "video",
            Self::Image => "image",
            Self::Text => "text",
            Self::Shape => "shape",
            Self::Sound => "sound",
            Self::Caption => "caption",
            Self::Sticker => "sticker",
            Self::Template => "template",
            Self::LocalDir => "local-dir",
            Self::Settings => "settings",
        }
    }
}

/// Stacking class of a video overlay, decided once when it is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layer {
    /// Full-canvas base video, drawn beneath everything else.
    Background,
    /// Any other video, drawn above the base.
    Foreground,
}

impl Layer {
    pub fn z_index(self) -> i64 {
        match self {
            Self::Background => 100,
            Self::Foreground => 200,
        }
    }

    pub fn object_fit(self) -> &'static str {
        match self {
            Self::Background => "cover",
            Self::Foreground => "contain",
        }
    }
}

/// Style keys the engine reads. Everything else in [`Styles`] is opaque.
pub mod style_keys {
    pub const Z_INDEX: &str = "zIndex";
    pub const OBJECT_FIT: &str = "objectFit";
    pub const VOLUME: &str = "volume";
    pub const FADE_IN: &str = "fadeIn";
    pub const FADE_OUT: &str = "fadeOut";
}

/// Type-specific rendering parameters.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Styles(pub Map<String, Value>);

impl Styles {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.0.get(key).and_then(Value::as_f64)
    }

    pub fn set(&mut self, key: &str, value: impl Into<Value>) {
        self.0.insert(key.to_string(), value.into());
    }

    /// Shallow merge: keys in `patch` replace existing ones.
    pub fn merge(&mut self, patch: Map<String, Value>) {
        for (key, value) in patch {
            self.0.insert(key, value);
        }
    }

    pub fn z_index(&self) -> Option<i64> {
        self.0.get(style_keys::Z_INDEX).and_then(Value::as_i64)
    }

    pub fn object_fit(&self) -> Option<&str> {
        self.0.get(style_keys::OBJECT_FIT).and_then(Value::as_str)
    }

    pub fn volume(&self) -> Option<f64> {
        self.get_f64(style_keys::VOLUME)
    }

    pub fn fade_in(&self) -> f64 {
        self.get_f64(style_keys::FADE_IN).unwrap_or(0.0)
    }

    pub fn fade_out(&self) -> f64 {
        self.get_f64(style_keys::FADE_OUT).unwrap_or(0.0)
    }
}

/// Highest track lane an overlay may occupy.
pub const MAX_ROW: u32 = 1023;

/// A single timed, positioned item of timeline content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Overlay {
    pub id: OverlayId,
    #[serde(rename = "type")]
    pub kind: OverlayKind,
    /// First frame (inclusive).
    pub from: u64,
    pub duration_in_frames: u64,
    /// Track lane; lower rows render on top.
    pub row: u32,
    #[serde(default)]
    pub left: f32,
    #[serde(default)]
    pub top: f32,
    #[serde(default)]
    pub width: f32,
    #[serde(default)]
    pub height: f32,
    /// Degrees.
    #[serde(default)]
    pub rotation: f32,
    /// Set only while a pointer gesture is in progress. Accepted on input so
    /// stale state can be cleared, never written out.
    #[serde(default, skip_serializing)]
    pub is_dragging: bool,
    #[serde(default)]
    pub styles: Styles,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layer: Option<Layer>,
    /// Offset into the source media where playback of this overlay starts.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub source_offset_frames: u64,
    /// Type-specific payload (`src`, `content`, `captions`, ...).
    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

fn is_zero(v: &u64) -> bool {
    *v == 0
}

impl Overlay {
    /// Create an overlay with empty geometry and styles.
    pub fn new(id: impl Into<OverlayId>, kind: OverlayKind, span: FrameSpan, row: u32) -> Self {
        Self {
            id: id.into(),
            kind,
            from: span.from,
            duration_in_frames: span.duration.max(1),
            row,
            left: 0.0,
            top: 0.0,
            width: 0.0,
            height: 0.0,
            rotation: 0.0,
            is_dragging: false,
            styles: Styles::new(),
            layer: None,
            source_offset_frames: 0,
            payload: Map::new(),
        }
    }

    /// Builder-style geometry setter.
    pub fn with_rect(mut self, rect: Rect) -> Self {
        self.set_rect(rect);
        self
    }

    pub fn span(&self) -> FrameSpan {
        FrameSpan::new(self.from, self.duration_in_frames)
    }

    /// Set timing, keeping the duration at one frame or more.
    pub fn set_span(&mut self, span: FrameSpan) {
        self.from = span.from;
        self.duration_in_frames = span.duration.max(1);
    }

    pub fn end_frame(&self) -> u64 {
        self.from + self.duration_in_frames
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.left, self.top, self.width, self.height)
    }

    pub fn set_rect(&mut self, rect: Rect) {
        self.left = rect.x;
        self.top = rect.y;
        self.width = rect.width;
        self.height = rect.height;
    }

    pub fn is_visual(&self) -> bool {
        self.kind.is_visual()
    }

    /// Payload string field such as `src` or `content`.
    pub fn payload_str(&self, key: &str) -> Option<&str> {
        self.payload.get(key).and_then(Value::as_str)
    }

    /// Duration of the underlying media in seconds, when the payload
    /// records it.
    pub fn media_src_duration(&self) -> Option<f64> {
        self.payload
            .get("mediaSrcDuration")
            .and_then(Value::as_f64)
            .filter(|d| d.is_finite() && *d >= 0.0)
    }
}

//! Collaborators the editor consumes from the host: media probing, URL
//! resolution, canvas size and the session media catalog.

use std::future::Future;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use clipdeck_core::{ClipDeckError, OverlayKind, Result, Size};

/// Timing reported by a media probe.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProbeResult {
    pub duration_in_frames: u64,
    pub duration_in_seconds: f64,
}

/// Reads the duration of a media file. May be slow and may fail.
pub trait MediaProbe {
    fn probe(&self, url: &str) -> impl Future<Output = Result<ProbeResult>> + Send;
}

/// Probe used when the host has none; every probe fails so callers fall
/// back to default durations.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProbe;

impl MediaProbe for NoProbe {
    async fn probe(&self, url: &str) -> Result<ProbeResult> {
        Err(ClipDeckError::Probe(format!("no probe available for {url}")))
    }
}

/// Current canvas size.
pub trait CanvasProvider {
    fn canvas_dimensions(&self) -> Size;
}

impl CanvasProvider for Size {
    fn canvas_dimensions(&self) -> Size {
        *self
    }
}

/// Turns a media item into a playable URL. An empty string means the item
/// cannot be placed.
pub trait UrlResolver {
    fn resolve(&self, item: &MediaItem) -> String;
}

impl<F> UrlResolver for F
where
    F: Fn(&MediaItem) -> String,
{
    fn resolve(&self, item: &MediaItem) -> String {
        self(item)
    }
}

/// Media known to the current session, looked up by id.
pub trait MediaCatalog {
    fn lookup(&self, id: &str) -> Option<MediaItem>;
}

impl MediaCatalog for Vec<MediaItem> {
    fn lookup(&self, id: &str) -> Option<MediaItem> {
        self.iter().find(|item| item.id == id).cloned()
    }
}

/// Media kinds that can be dragged onto the timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DropKind {
    Video,
    Image,
    Audio,
    Text,
}

impl DropKind {
    pub fn overlay_kind(self) -> OverlayKind {
        match self {
            Self::Video => OverlayKind::Video,
            Self::Image => OverlayKind::Image,
            Self::Audio => OverlayKind::Sound,
            Self::Text => OverlayKind::Text,
        }
    }

    /// Whether the drop needs a media URL to be placed.
    pub fn needs_url(self) -> bool {
        !matches!(self, Self::Text)
    }
}

/// A media item as carried by a drag from the media panel.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MediaItem {
    pub id: String,
    pub name: String,
    /// Stable source key, used for keyed audio ids.
    pub key: Option<String>,
    /// Local (already downloaded) URL, preferred over resolution.
    pub local_url: Option<String>,
    pub width: Option<f32>,
    pub height: Option<f32>,
    /// Duration from drag metadata.
    pub duration_secs: Option<f64>,
    /// Extra payload copied onto the overlay (`content` for text, ...).
    pub payload: Map<String, Value>,
}

impl MediaItem {
    /// Natural size, when both dimensions are known and usable.
    pub fn natural_size(&self) -> Option<Size> {
        match (self.width, self.height) {
            (Some(w), Some(h)) => Some(Size::new(w, h)).filter(|s| s.aspect_ratio().is_some()),
            _ => None,
        }
    }

    /// Usable duration from metadata.
    pub fn known_duration(&self) -> Option<f64> {
        self.duration_secs.filter(|d| d.is_finite() && *d > 0.0)
    }

    /// Fill fields missing on the dragged item from the catalog entry.
    pub fn merged_with(mut self, catalog: MediaItem) -> Self {
        if self.name.is_empty() {
            self.name = catalog.name;
        }
        self.key = self.key.or(catalog.key);
        self.local_url = self
            .local_url
            .filter(|u| !u.is_empty())
            .or(catalog.local_url);
        self.width = self.width.or(catalog.width);
        self.height = self.height.or(catalog.height);
        self.duration_secs = self.known_duration().or(catalog.duration_secs);
        for (key, value) in catalog.payload {
            self.payload.entry(key).or_insert(value);
        }
        self
    }
}

/// A drop of a media item onto a timeline row.
#[derive(Debug, Clone, PartialEq)]
pub struct DropRequest {
    pub kind: DropKind,
    pub item: MediaItem,
    pub row: u32,
    /// Drop position on the timeline, in seconds.
    pub start_secs: f64,
}

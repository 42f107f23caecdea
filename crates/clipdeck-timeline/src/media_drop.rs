//! Creating overlays from media dropped onto the timeline.
//!
//! Dropping happens in two phases. [`prepare_drop`] does the slow, fallible
//! work (URL resolution, probing) without touching the store; then
//! [`TimelineEditor::commit_drop`] inserts the overlay in one step. An
//! unresolvable asset aborts in the first phase, so nothing is mutated.

use std::time::Duration;

use serde_json::Value;

use clipdeck_core::{
    style_keys, ClipDeckError, EngineConfig, FrameSpan, Overlay, OverlayId, OverlayKind, Result,
    Styles,
};

use crate::edit::OverlayEdit;
use crate::editor::TimelineEditor;
use crate::events::TimelineEvent;
use crate::media::{DropKind, DropRequest, MediaCatalog, MediaItem, MediaProbe, UrlResolver};

/// Host services used while preparing a drop.
pub struct DropServices<'a, P: MediaProbe> {
    pub probe: &'a P,
    pub resolver: &'a (dyn UrlResolver + Sync),
    pub catalog: Option<&'a (dyn MediaCatalog + Sync)>,
}

/// A drop whose asset has been resolved and timed.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedDrop {
    pub kind: DropKind,
    pub item: MediaItem,
    pub url: Option<String>,
    pub row: u32,
    pub from: u64,
    pub duration_in_frames: u64,
    /// Media length in seconds, when metadata or a probe reported it.
    pub media_duration_secs: Option<f64>,
}

/// Resolve, time and validate a drop.
///
/// The URL comes from the item's local URL, else from the resolver; an empty
/// result aborts with [`ClipDeckError::AssetUnresolved`]. The duration comes
/// from drag metadata, else from a probe bounded by the configured timeout,
/// else from the configured default for the kind.
pub async fn prepare_drop<P: MediaProbe>(
    request: DropRequest,
    config: &EngineConfig,
    services: &DropServices<'_, P>,
) -> Result<PreparedDrop> {
    let DropRequest {
        kind,
        item,
        row,
        start_secs,
    } = request;

    let item = match services.catalog.and_then(|c| c.lookup(&item.id)) {
        Some(entry) => item.merged_with(entry),
        None => item,
    };

    let url = if kind.needs_url() {
        let url = item
            .local_url
            .clone()
            .filter(|u| !u.trim().is_empty())
            .unwrap_or_else(|| services.resolver.resolve(&item));
        if url.trim().is_empty() {
            tracing::warn!(item = %item.id, "dropped media has no usable URL");
            return Err(ClipDeckError::AssetUnresolved(if item.name.is_empty() {
                item.id.clone()
            } else {
                item.name.clone()
            }));
        }
        Some(url)
    } else {
        None
    };

    let fps = config.frame_rate;
    let overlay_kind = kind.overlay_kind();
    let mut media_duration_secs = item.known_duration();

    let duration_in_frames = match (media_duration_secs, &url) {
        (Some(secs), _) => fps.seconds_to_frame_offset(secs).max(1),
        (None, Some(url)) if matches!(kind, DropKind::Video | DropKind::Audio) => {
            match probe_duration(services.probe, url, config).await {
                Some((frames, secs)) => {
                    media_duration_secs = Some(secs);
                    frames
                }
                None => config.default_duration_frames(overlay_kind),
            }
        }
        _ => config.default_duration_frames(overlay_kind),
    };

    Ok(PreparedDrop {
        kind,
        item,
        url,
        row,
        from: fps.seconds_to_frame_offset(start_secs),
        duration_in_frames,
        media_duration_secs,
    })
}

/// Probe with a timeout. `None` means fall back to a default.
async fn probe_duration<P: MediaProbe>(
    probe: &P,
    url: &str,
    config: &EngineConfig,
) -> Option<(u64, f64)> {
    let fps = config.frame_rate;
    let limit = Duration::from_millis(config.probe_timeout_ms);
    match tokio::time::timeout(limit, probe.probe(url)).await {
        Ok(Ok(result)) if result.duration_in_frames > 0 => {
            Some((result.duration_in_frames, result.duration_in_seconds))
        }
        Ok(Ok(result))
            if result.duration_in_seconds.is_finite() && result.duration_in_seconds > 0.0 =>
        {
            let frames = fps.seconds_to_frame_offset(result.duration_in_seconds).max(1);
            Some((frames, result.duration_in_seconds))
        }
        Ok(Ok(_)) => {
            tracing::warn!(%url, "probe reported no duration, using default");
            None
        }
        Ok(Err(e)) => {
            tracing::warn!(%url, error = %e, "media probe failed, using default duration");
            None
        }
        Err(_) => {
            tracing::warn!(
                %url,
                timeout_ms = config.probe_timeout_ms,
                "media probe timed out, using default duration"
            );
            None
        }
    }
}

impl TimelineEditor {
    /// Insert a prepared drop: allocate an id, size it on the canvas,
    /// append it, select it and ask the host to focus the matching panel.
    pub fn commit_drop(&mut self, prepared: PreparedDrop) -> Result<OverlayId> {
        let PreparedDrop {
            kind,
            item,
            url,
            row,
            from,
            duration_in_frames,
            media_duration_secs,
        } = prepared;
        let overlay_kind = kind.overlay_kind();

        let mut styles = Styles::new();
        let (rect, layer) = self.spatial_layout(overlay_kind, item.natural_size(), &mut styles);
        if overlay_kind == OverlayKind::Sound {
            styles.set(style_keys::VOLUME, 1.0);
        }

        let existing = self.store.overlays();
        let id = match overlay_kind {
            OverlayKind::Sound => self.ids.audio_id(item.key.as_deref(), &item.name, existing),
            _ => self.ids.next_id(existing),
        };
        let index = existing.len();

        let mut overlay = Overlay::new(
            id.clone(),
            overlay_kind,
            FrameSpan::new(from, duration_in_frames),
            row,
        )
        .with_rect(rect);
        overlay.layer = layer;
        overlay.styles = styles;
        overlay.payload = item.payload;
        if let Some(url) = url {
            overlay.payload.insert("src".into(), Value::String(url));
        }
        if let Some(secs) = media_duration_secs {
            overlay
                .payload
                .entry("mediaSrcDuration")
                .or_insert_with(|| Value::from(secs));
        }
        if overlay_kind == OverlayKind::Text && !item.name.is_empty() {
            overlay
                .payload
                .entry("content")
                .or_insert_with(|| Value::String(item.name.clone()));
        }

        self.commit(OverlayEdit::Insert { index, overlay })?;
        self.set_selection(vec![id.clone()]);
        self.events
            .emit(TimelineEvent::PanelFocusRequested(overlay_kind));
        tracing::debug!(%id, ?kind, row, from, duration_in_frames, "created overlay from drop");
        Ok(id)
    }

    /// Prepare and commit a drop on an exclusively owned editor.
    pub async fn drop_to_create<P: MediaProbe>(
        &mut self,
        request: DropRequest,
        services: &DropServices<'_, P>,
    ) -> Result<OverlayId> {
        let prepared = prepare_drop(request, &self.config, services).await?;
        self.commit_drop(prepared)
    }
}

//! Conversion between the overlay collection and the timeline widget's
//! track/item model.
//!
//! Overlays are the source of truth. Tracks are a projection grouped by row,
//! timed in seconds; the reverse transform carries only identity and timing,
//! and the editor merges it back into the full overlays.

use serde::{Deserialize, Serialize};

use clipdeck_core::{FrameRate, FrameSpan, Overlay, OverlayId, OverlayKind, MAX_ROW};

const TRACK_ID_PREFIX: &str = "track-";

/// One lane of the timeline widget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineTrack {
    pub id: String,
    pub name: String,
    pub items: Vec<TimelineItem>,
}

/// One block on a lane, timed in seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineItem {
    pub id: OverlayId,
    pub track_id: String,
    pub start: f64,
    pub end: f64,
    #[serde(rename = "type")]
    pub kind: OverlayKind,
    #[serde(default)]
    pub label: String,
}

/// Identity and timing recovered from the widget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlayTiming {
    pub id: OverlayId,
    pub kind: OverlayKind,
    pub span: FrameSpan,
    pub row: u32,
}

/// Track id for a row.
pub fn track_id_for_row(row: u32) -> String {
    format!("{TRACK_ID_PREFIX}{row}")
}

/// Row index from a row identifier such as `"track-3"` or `"3"`.
pub fn parse_row_ident(ident: &str) -> Option<u32> {
    let ident = ident.trim();
    ident
        .strip_prefix(TRACK_ID_PREFIX)
        .unwrap_or(ident)
        .parse()
        .ok()
        .filter(|row| *row <= MAX_ROW)
}

fn item_label(overlay: &Overlay) -> String {
    overlay
        .payload_str("content")
        .or_else(|| {
            overlay
                .payload_str("src")
                .map(|src| src.rsplit('/').next().unwrap_or(src))
        })
        .unwrap_or(overlay.kind.as_str())
        .to_string()
}

/// Group overlays by row into tracks, ordered by row and, within a row, by
/// start frame.
///
/// Rows without overlays still get an (empty) track so track indices keep
/// matching rows.
pub fn overlays_to_tracks(overlays: &[Overlay], fps: FrameRate) -> Vec<TimelineTrack> {
    let track_count = overlays
        .iter()
        .filter(|o| o.row <= MAX_ROW)
        .map(|o| o.row as usize + 1)
        .max()
        .unwrap_or(0);

    let mut tracks: Vec<TimelineTrack> = (0..track_count as u32)
        .map(|row| TimelineTrack {
            id: track_id_for_row(row),
            name: format!("Track {}", row + 1),
            items: Vec::new(),
        })
        .collect();

    let mut ordered: Vec<&Overlay> = overlays.iter().collect();
    ordered.sort_by_key(|o| (o.row, o.from));

    for overlay in ordered {
        let Some(track) = tracks.get_mut(overlay.row as usize) else {
            tracing::warn!(id = %overlay.id, row = overlay.row, "overlay row out of range, not projected");
            continue;
        };
        track.items.push(TimelineItem {
            id: overlay.id.clone(),
            track_id: track.id.clone(),
            start: fps.frames_to_seconds(overlay.from),
            end: fps.frames_to_seconds(overlay.end_frame()),
            kind: overlay.kind,
            label: item_label(overlay),
        });
    }
    tracks
}

/// Recover overlay timing from tracks.
///
/// The row is the track's index. Negative starts clamp to frame 0 and
/// durations to at least one frame.
pub fn tracks_to_overlays(tracks: &[TimelineTrack], fps: FrameRate) -> Vec<OverlayTiming> {
    tracks
        .iter()
        .enumerate()
        .flat_map(|(index, track)| {
            track.items.iter().map(move |item| {
                let from = fps.seconds_to_frame_offset(item.start);
                let duration = fps.seconds_to_frames(item.end - item.start).max(1) as u64;
                OverlayTiming {
                    id: item.id.clone(),
                    kind: item.kind,
                    span: FrameSpan::new(from, duration),
                    row: index as u32,
                }
            })
        })
        .collect()
}

//! Row and start-frame selection for overlays inserted at the playhead.

use clipdeck_core::{Layer, Overlay, OverlayKind};

/// Which end of the row stack a new overlay goes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreferredEdge {
    /// Row 0, pushing every existing overlay down one row.
    Top,
    /// One row below the last used row.
    Bottom,
}

impl PreferredEdge {
    /// Edge used when inserting an overlay of `kind`.
    ///
    /// Audio and the base video sit at the bottom; everything drawn on top of
    /// the base goes to the top row.
    pub fn for_kind(kind: OverlayKind, layer: Option<Layer>) -> Self {
        match (kind, layer) {
            (OverlayKind::Sound, _) | (_, Some(Layer::Background)) => Self::Bottom,
            _ => Self::Top,
        }
    }
}

/// Where the new overlay goes, plus the existing overlays as they must look
/// after the insertion.
#[derive(Debug, Clone, PartialEq)]
pub struct Placement {
    pub from: u64,
    pub row: u32,
    pub updated_overlays: Vec<Overlay>,
}

/// Place a new overlay at `current_frame`.
///
/// Timing is never adjusted to avoid overlaps; several overlays may share a
/// row and a time range.
pub fn add_at_playhead(current_frame: u64, overlays: &[Overlay], edge: PreferredEdge) -> Placement {
    match edge {
        PreferredEdge::Top => Placement {
            from: current_frame,
            row: 0,
            updated_overlays: overlays
                .iter()
                .cloned()
                .map(|mut o| {
                    o.row = o.row.saturating_add(1);
                    o
                })
                .collect(),
        },
        PreferredEdge::Bottom => Placement {
            from: current_frame,
            row: overlays
                .iter()
                .map(|o| o.row.saturating_add(1))
                .max()
                .unwrap_or(0),
            updated_overlays: overlays.to_vec(),
        },
    }
}

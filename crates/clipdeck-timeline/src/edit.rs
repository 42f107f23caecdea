//! Overlay mutations.
//!
//! Every change to the overlay collection is an `OverlayEdit`. Handlers build
//! edits and the store applies them, so there is one place where overlays are
//! written and one place where invariants are enforced.

use clipdeck_core::{ClipDeckError, FrameSpan, Overlay, OverlayId, Rect, Result, MAX_ROW};
use serde_json::{Map, Value};

// ── Edit commands ───────────────────────────────────────────────

/// A single mutation of the overlay collection.
#[derive(Debug, Clone, PartialEq)]
pub enum OverlayEdit {
    /// Insert an overlay at position `index` (clamped to the end).
    Insert { index: usize, overlay: Overlay },
    /// Remove an overlay.
    Remove { id: OverlayId },
    /// Replace an overlay wholesale, keeping its id.
    Replace { overlay: Overlay },
    /// Set timing, and optionally the row, in one step.
    SetTiming {
        id: OverlayId,
        span: FrameSpan,
        row: Option<u32>,
    },
    /// Move an overlay to another row.
    SetRow { id: OverlayId, row: u32 },
    /// Set canvas geometry.
    SetRect { id: OverlayId, rect: Rect },
    /// Set rotation in degrees.
    SetRotation { id: OverlayId, degrees: f32 },
    /// Mark or clear the transient drag flag.
    SetDragging { id: OverlayId, dragging: bool },
    /// Shallow-merge a patch into the overlay's styles.
    MergeStyles {
        id: OverlayId,
        patch: Map<String, Value>,
    },
    /// Advance the source media offset.
    SetSourceOffset { id: OverlayId, frames: u64 },
    /// A batch of edits applied atomically.
    Batch(Vec<OverlayEdit>),
}

impl OverlayEdit {
    /// The overlay this edit targets, if it targets exactly one.
    pub fn target(&self) -> Option<&OverlayId> {
        match self {
            Self::Insert { overlay, .. } | Self::Replace { overlay } => Some(&overlay.id),
            Self::Remove { id }
            | Self::SetTiming { id, .. }
            | Self::SetRow { id, .. }
            | Self::SetRect { id, .. }
            | Self::SetRotation { id, .. }
            | Self::SetDragging { id, .. }
            | Self::MergeStyles { id, .. }
            | Self::SetSourceOffset { id, .. } => Some(id),
            Self::Batch(_) => None,
        }
    }

    /// Apply this edit to the collection.
    ///
    /// On error the collection is left unchanged; a batch is applied to a
    /// scratch copy and only committed once every edit has succeeded.
    pub fn apply(&self, overlays: &mut Vec<Overlay>) -> Result<()> {
        match self {
            Self::Insert { index, overlay } => {
                if overlays.iter().any(|o| o.id.same_as(&overlay.id)) {
                    return Err(ClipDeckError::DuplicateId(overlay.id.clone()));
                }
                check_row(&overlay.id, overlay.row)?;
                let mut overlay = overlay.clone();
                overlay.duration_in_frames = overlay.duration_in_frames.max(1);
                let index = (*index).min(overlays.len());
                overlays.insert(index, overlay);
            }
            Self::Remove { id } => {
                let index = position(overlays, id)?;
                overlays.remove(index);
            }
            Self::Replace { overlay } => {
                let index = position(overlays, &overlay.id)?;
                check_row(&overlay.id, overlay.row)?;
                let mut overlay = overlay.clone();
                overlay.duration_in_frames = overlay.duration_in_frames.max(1);
                overlays[index] = overlay;
            }
            Self::SetTiming { id, span, row } => {
                if let Some(row) = row {
                    check_row(id, *row)?;
                }
                let target = find_mut(overlays, id)?;
                target.set_span(*span);
                if let Some(row) = row {
                    target.row = *row;
                }
            }
            Self::SetRow { id, row } => {
                check_row(id, *row)?;
                find_mut(overlays, id)?.row = *row;
            }
            Self::SetRect { id, rect } => find_mut(overlays, id)?.set_rect(*rect),
            Self::SetRotation { id, degrees } => find_mut(overlays, id)?.rotation = *degrees,
            Self::SetDragging { id, dragging } => find_mut(overlays, id)?.is_dragging = *dragging,
            Self::MergeStyles { id, patch } => find_mut(overlays, id)?.styles.merge(patch.clone()),
            Self::SetSourceOffset { id, frames } => {
                find_mut(overlays, id)?.source_offset_frames = *frames;
            }
            Self::Batch(edits) => {
                let mut scratch = overlays.clone();
                for edit in edits {
                    edit.apply(&mut scratch)?;
                }
                *overlays = scratch;
            }
        }
        Ok(())
    }

    /// Number of leaf edits, counting through nested batches.
    pub fn len(&self) -> usize {
        match self {
            Self::Batch(edits) => edits.iter().map(Self::len).sum(),
            _ => 1,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ── Helpers ──────────────────────────────────────────────────────

/// Reject rows past [`MAX_ROW`]; the track projection allocates one track per row.
pub(crate) fn check_row(id: &OverlayId, row: u32) -> Result<()> {
    if row > MAX_ROW {
        return Err(ClipDeckError::InvalidParameter(format!(
            "overlay {id}: row {row} exceeds {MAX_ROW}"
        )));
    }
    Ok(())
}

fn position(overlays: &[Overlay], id: &OverlayId) -> Result<usize> {
    overlays
        .iter()
        .position(|o| o.id.same_as(id))
        .ok_or_else(|| ClipDeckError::NotFound(id.clone()))
}

fn find_mut<'a>(overlays: &'a mut [Overlay], id: &OverlayId) -> Result<&'a mut Overlay> {
    overlays
        .iter_mut()
        .find(|o| o.id.same_as(id))
        .ok_or_else(|| ClipDeckError::NotFound(id.clone()))
}

// ── Tests ───────────────────────────────────────────────────────

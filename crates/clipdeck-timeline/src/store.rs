//! The overlay store: the single source of truth for timeline content.
//!
//! Reads are public; writes go through [`OverlayEdit`] and are only issued by
//! the editor's handlers and the placement path.

use std::collections::HashSet;

use clipdeck_core::{ClipDeckError, Overlay, OverlayId, Result};

use crate::edit::{check_row, OverlayEdit};

/// Ordered overlay collection with selection and playhead.
#[derive(Debug, Clone, Default)]
pub struct OverlayStore {
    overlays: Vec<Overlay>,
    selected: Vec<OverlayId>,
    playhead: u64,
}

impl OverlayStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from an existing collection.
    pub fn from_overlays(overlays: Vec<Overlay>) -> Result<Self> {
        let mut store = Self::new();
        store.replace(overlays)?;
        Ok(store)
    }

    pub fn overlays(&self) -> &[Overlay] {
        &self.overlays
    }

    pub fn len(&self) -> usize {
        self.overlays.len()
    }

    pub fn is_empty(&self) -> bool {
        self.overlays.is_empty()
    }

    /// Resolve an id to its position in the collection.
    ///
    /// Every handler goes through this, so an id means the same thing no
    /// matter which surface it came from.
    pub fn resolve(&self, id: &OverlayId) -> Option<usize> {
        self.overlays
            .iter()
            .position(|o| &o.id == id)
            .or_else(|| self.overlays.iter().position(|o| o.id.same_as(id)))
    }

    /// Resolve an id as handed back by the timeline widget.
    pub fn resolve_raw(&self, raw: &str) -> Option<usize> {
        self.resolve(&OverlayId::parse(raw))
    }

    pub fn get(&self, id: &OverlayId) -> Option<&Overlay> {
        self.resolve(id).map(|i| &self.overlays[i])
    }

    pub fn contains(&self, id: &OverlayId) -> bool {
        self.resolve(id).is_some()
    }

    pub fn selected_ids(&self) -> &[OverlayId] {
        &self.selected
    }

    /// First selected overlay, for single-selection surfaces.
    pub fn selected(&self) -> Option<&Overlay> {
        self.selected.first().and_then(|id| self.get(id))
    }

    pub fn playhead(&self) -> u64 {
        self.playhead
    }

    pub fn set_playhead(&mut self, frame: u64) {
        self.playhead = frame;
    }

    /// Number of track lanes: `max(row) + 1`, never less than one.
    pub fn track_count(&self) -> u32 {
        self.overlays
            .iter()
            .map(|o| o.row.saturating_add(1))
            .max()
            .unwrap_or(1)
            .max(1)
    }

    /// Frame at which the last overlay ends, never less than one.
    pub fn composition_duration(&self) -> u64 {
        self.overlays
            .iter()
            .map(Overlay::end_frame)
            .max()
            .unwrap_or(1)
            .max(1)
    }

    /// Check every at-rest invariant of the collection.
    pub fn validate_at_rest(&self) -> Result<()> {
        validate_ids(&self.overlays)?;
        for overlay in &self.overlays {
            check_row(&overlay.id, overlay.row)?;
            if overlay.duration_in_frames == 0 {
                return Err(ClipDeckError::InvalidParameter(format!(
                    "overlay {} has zero duration",
                    overlay.id
                )));
            }
            if overlay.is_dragging {
                return Err(ClipDeckError::InvalidParameter(format!(
                    "overlay {} is still marked as dragging",
                    overlay.id
                )));
            }
            if let Some(media) = overlay.media_src_duration() {
                let fades = overlay.styles.fade_in() + overlay.styles.fade_out();
                if fades > media + 1e-9 {
                    return Err(ClipDeckError::InvalidParameter(format!(
                        "overlay {}: fades {fades}s exceed media duration {media}s",
                        overlay.id
                    )));
                }
            }
        }
        Ok(())
    }

    // ── Writes (crate-internal) ─────────────────────────────────

    pub(crate) fn apply(&mut self, edit: &OverlayEdit) -> Result<()> {
        edit.apply(&mut self.overlays)?;
        self.prune_selection();
        tracing::debug!(edits = edit.len(), target = ?edit.target(), "applied overlay edit");
        Ok(())
    }

    /// Swap in a whole new collection.
    ///
    /// Ids must be unique; stale drag flags are cleared.
    pub(crate) fn replace(&mut self, mut overlays: Vec<Overlay>) -> Result<()> {
        validate_ids(&overlays)?;
        for overlay in &overlays {
            check_row(&overlay.id, overlay.row)?;
        }
        for overlay in &mut overlays {
            overlay.is_dragging = false;
            overlay.duration_in_frames = overlay.duration_in_frames.max(1);
        }
        self.overlays = overlays;
        self.prune_selection();
        Ok(())
    }

    pub(crate) fn set_selection(&mut self, ids: Vec<OverlayId>) {
        self.selected = ids;
        self.prune_selection();
    }

    fn prune_selection(&mut self) {
        let overlays = &self.overlays;
        self.selected.retain(|id| overlays.iter().any(|o| o.id.same_as(id)));
    }
}

fn validate_ids(overlays: &[Overlay]) -> Result<()> {
    let mut seen = HashSet::with_capacity(overlays.len());
    for overlay in overlays {
        if !seen.insert(overlay.id.canonical()) {
            return Err(ClipDeckError::DuplicateId(overlay.id.clone()));
        }
    }
    Ok(())
}

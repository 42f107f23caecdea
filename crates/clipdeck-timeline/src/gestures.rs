//! Canvas pointer gestures on the editor: drag with snapping, resize and
//! rotate.

use clipdeck_canvas::{Gesture, GestureKind};
use clipdeck_core::{ClipDeckError, OverlayId, Rect, Result, Vec2};

use crate::edit::OverlayEdit;
use crate::editor::TimelineEditor;
use crate::events::TimelineEvent;

/// The gesture currently driven by the pointer.
#[derive(Debug, Clone)]
pub(crate) struct ActiveGesture {
    pub id: OverlayId,
    pub gesture: Gesture,
}

impl TimelineEditor {
    /// Pointer-down on a visual overlay.
    ///
    /// Marks the overlay as dragging and selects it. A gesture still open
    /// from a lost pointer-up is finished first.
    pub fn begin_gesture(&mut self, id: &OverlayId, kind: GestureKind, pointer: Vec2) -> Result<()> {
        if self.gesture.is_some() {
            self.pointer_up();
        }
        let overlay = self
            .store
            .get(id)
            .ok_or_else(|| ClipDeckError::NotFound(id.clone()))?;
        if !overlay.is_visual() {
            return Err(ClipDeckError::InvalidParameter(format!(
                "{} overlay {id} has no canvas geometry",
                overlay.kind.as_str()
            )));
        }
        let gesture = Gesture::begin(kind, overlay, pointer);
        let id = overlay.id.clone();

        self.store.apply(&OverlayEdit::SetDragging {
            id: id.clone(),
            dragging: true,
        })?;
        self.set_selection(vec![id.clone()]);
        self.gesture = Some(ActiveGesture { id, gesture });
        Ok(())
    }

    /// Pointer moved during a gesture. Returns the overlay's new geometry,
    /// or `None` when no gesture is active.
    ///
    /// Geometry is derived from the gesture origin, so replaying a pointer
    /// position gives the same result.
    pub fn pointer_move(&mut self, pointer: Vec2) -> Result<Option<Rect>> {
        let Some(active) = self.gesture.clone() else {
            return Ok(None);
        };
        let Some(mut candidate) = self.store.get(&active.id).cloned() else {
            tracing::warn!(id = %active.id, "gesture target disappeared");
            self.gesture = None;
            self.alignment.clear();
            return Ok(None);
        };
        let canvas = self.canvas;
        let gesture = active.gesture;

        let edit = match gesture.kind {
            GestureKind::Move => {
                candidate.set_rect(gesture.moved_rect(pointer));
                candidate.is_dragging = true;
                let overlays = self.store.overlays();
                if self.alignment.update_guides(&candidate, overlays, canvas) {
                    self.events
                        .emit(TimelineEvent::GuidesChanged(self.alignment.guides().to_vec()));
                }
                let (left, top) = self
                    .alignment
                    .calculate_snap_position(&candidate, overlays, canvas);
                let rect = Rect::new(left, top, candidate.width, candidate.height);
                OverlayEdit::SetRect {
                    id: active.id.clone(),
                    rect: rect.clamp_within(canvas),
                }
            }
            GestureKind::Resize(handle) => OverlayEdit::SetRect {
                id: active.id.clone(),
                rect: gesture.resized_rect(handle, pointer, canvas, self.config.min_overlay_size),
            },
            GestureKind::Rotate => OverlayEdit::SetRotation {
                id: active.id.clone(),
                degrees: gesture.rotation(pointer),
            },
        };

        self.store.apply(&edit)?;
        Ok(self.store.get(&active.id).map(|o| o.rect()))
    }

    /// Pointer released: the only way a gesture ends.
    ///
    /// Always clears drag flags, guides and the update gate, even when the
    /// pointer never moved.
    pub fn pointer_up(&mut self) {
        let active = self.gesture.take();

        let dragging: Vec<OverlayEdit> = self
            .store
            .overlays()
            .iter()
            .filter(|o| o.is_dragging)
            .map(|o| OverlayEdit::SetDragging {
                id: o.id.clone(),
                dragging: false,
            })
            .collect();
        if !dragging.is_empty() {
            if let Err(e) = self.store.apply(&OverlayEdit::Batch(dragging)) {
                tracing::warn!("failed to clear drag state: {}", e);
            }
        }

        if !self.alignment.guides().is_empty() {
            self.alignment.clear();
            self.events.emit(TimelineEvent::GuidesChanged(Vec::new()));
        }
        if self.gate.release() {
            tracing::debug!("pointer-up released the update gate");
        }
        if let Some(active) = active {
            tracing::debug!(id = %active.id, kind = ?active.gesture.kind, "gesture finished");
            self.refresh_tracks();
            self.events.emit(TimelineEvent::OverlaysChanged);
        }
    }
}

//! The timeline editor: owns the overlay store and turns user intent from
//! the timeline widget, the canvas and the host panels into overlay edits.

use std::collections::HashSet;

use crossbeam_channel::Receiver;
use serde_json::{Map, Value};

use clipdeck_canvas::{
    apply_layer_styles, compute_placement, layout_video, AlignmentEngine, AlignmentGuide,
};
use clipdeck_core::{
    style_keys, ClipDeckError, EngineConfig, FrameRate, FrameSpan, Layer, Overlay, OverlayId,
    OverlayKind, Rect, Result, Size, Styles, AUDIO_ID_PREFIX,
};

use crate::allocator::{Clock, IdAllocator};
use crate::edit::OverlayEdit;
use crate::events::{EventBus, TimelineEvent};
use crate::fades::{clamp_fade, FadeEdge, Fades};
use crate::gate::{BatchGuard, UpdateSourceGate};
use crate::gestures::ActiveGesture;
use crate::media::CanvasProvider;
use crate::placement::{add_at_playhead, PreferredEdge};
use crate::projection::{overlays_to_tracks, parse_row_ident, tracks_to_overlays, TimelineTrack};
use crate::store::OverlayStore;

// ── Results ─────────────────────────────────────────────────────

/// What a multi-id handler did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EditReport {
    /// Existing overlays that were changed or removed.
    pub applied: Vec<OverlayId>,
    /// Overlays the handler created.
    pub created: Vec<OverlayId>,
    /// Ids that did not resolve; skipped.
    pub unresolved: Vec<OverlayId>,
    /// A track batch was dropped unapplied because pointer-up released the
    /// update gate before it ran.
    pub superseded: bool,
}

impl EditReport {
    pub fn is_clean(&self) -> bool {
        self.unresolved.is_empty() && !self.superseded
    }
}

/// Outcome of a single-overlay timing edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    Applied,
    /// Dropped because a batch reconciliation held the update gate.
    Suppressed,
    /// The id did not resolve; nothing changed.
    Unresolved,
}

/// An overlay to create from a host panel.
#[derive(Debug, Clone, PartialEq)]
pub struct NewOverlay {
    pub kind: OverlayKind,
    /// Natural size of the asset, for visual kinds.
    pub asset_size: Option<Size>,
    /// Length in frames; the configured default for the kind when absent.
    pub duration_in_frames: Option<u64>,
    /// Source key and name for keyed audio ids.
    pub source_key: Option<String>,
    pub source_name: Option<String>,
    pub styles: Styles,
    pub payload: Map<String, Value>,
}

impl NewOverlay {
    pub fn new(kind: OverlayKind) -> Self {
        Self {
            kind,
            asset_size: None,
            duration_in_frames: None,
            source_key: None,
            source_name: None,
            styles: Styles::new(),
            payload: Map::new(),
        }
    }
}

// ── Editor ──────────────────────────────────────────────────────

/// Editing engine for one timeline instance.
#[derive(Debug)]
pub struct TimelineEditor {
    pub(crate) store: OverlayStore,
    pub(crate) config: EngineConfig,
    pub(crate) canvas: Size,
    pub(crate) gate: UpdateSourceGate,
    pub(crate) ids: IdAllocator,
    pub(crate) alignment: AlignmentEngine,
    pub(crate) gesture: Option<ActiveGesture>,
    pub(crate) events: EventBus,
    tracks: Vec<TimelineTrack>,
}

impl TimelineEditor {
    pub fn new(config: EngineConfig, canvas: Size) -> Self {
        let alignment = AlignmentEngine::new(config.snap_threshold_ratio);
        Self {
            store: OverlayStore::new(),
            config,
            canvas,
            gate: UpdateSourceGate::new(),
            ids: IdAllocator::default(),
            alignment,
            gesture: None,
            events: EventBus::new(),
            tracks: Vec::new(),
        }
    }

    /// Editor over an existing overlay collection.
    pub fn with_overlays(config: EngineConfig, canvas: Size, overlays: Vec<Overlay>) -> Result<Self> {
        let mut editor = Self::new(config, canvas);
        editor.store.replace(overlays)?;
        editor.refresh_tracks();
        Ok(editor)
    }

    /// Use a custom clock for timestamp ids.
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.ids = IdAllocator::new(clock);
        self
    }

    // ── Reads ───────────────────────────────────────────────────

    pub fn store(&self) -> &OverlayStore {
        &self.store
    }

    pub fn overlays(&self) -> &[Overlay] {
        self.store.overlays()
    }

    pub fn selected_ids(&self) -> &[OverlayId] {
        self.store.selected_ids()
    }

    pub fn playhead(&self) -> u64 {
        self.store.playhead()
    }

    pub fn fps(&self) -> FrameRate {
        self.config.frame_rate
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn canvas(&self) -> Size {
        self.canvas
    }

    pub fn gate(&self) -> &UpdateSourceGate {
        &self.gate
    }

    pub fn guides(&self) -> &[AlignmentGuide] {
        self.alignment.guides()
    }

    /// Last track projection handed to the timeline widget.
    pub fn tracks(&self) -> &[TimelineTrack] {
        &self.tracks
    }

    pub fn subscribe(&self) -> Receiver<TimelineEvent> {
        self.events.subscribe()
    }

    pub fn drain_events(&self) -> Vec<TimelineEvent> {
        self.events.drain()
    }

    pub fn set_canvas(&mut self, provider: &impl CanvasProvider) {
        self.canvas = provider.canvas_dimensions();
    }

    pub fn set_playhead(&mut self, frame: u64) {
        self.store.set_playhead(frame);
    }

    // ── Internal plumbing ───────────────────────────────────────

    /// Apply an edit, reproject and notify.
    pub(crate) fn commit(&mut self, edit: OverlayEdit) -> Result<()> {
        self.store.apply(&edit)?;
        self.refresh_tracks();
        self.events.emit(TimelineEvent::OverlaysChanged);
        Ok(())
    }

    /// Recompute the forward projection unless a batch from the widget is
    /// being applied, in which case the widget already shows the result.
    pub(crate) fn refresh_tracks(&mut self) {
        if self.gate.is_idle() {
            self.tracks = overlays_to_tracks(self.store.overlays(), self.config.frame_rate);
        } else {
            tracing::debug!("skipping track projection while a batch is applied");
        }
    }

    pub(crate) fn set_selection(&mut self, ids: Vec<OverlayId>) {
        self.store.set_selection(ids);
        self.events.emit(TimelineEvent::SelectionChanged(
            self.store.selected_ids().to_vec(),
        ));
    }

    /// Split ids into those present in the store, as the store spells them,
    /// and those that are not.
    fn partition_ids(&self, ids: &[OverlayId]) -> (Vec<OverlayId>, Vec<OverlayId>) {
        let mut found = Vec::new();
        let mut unresolved = Vec::new();
        for id in ids {
            if let Some(overlay) = self.store.get(id) {
                if !found.contains(&overlay.id) {
                    found.push(overlay.id.clone());
                }
            } else {
                tracing::warn!(%id, "overlay id did not resolve");
                unresolved.push(id.clone());
            }
        }
        (found, unresolved)
    }

    /// A fresh id shaped like `original`'s: keyed audio stays keyed.
    fn fresh_id_like(&self, original: &Overlay, existing: &[Overlay]) -> OverlayId {
        match &original.id {
            OverlayId::Keyed(key) => {
                let stem = key.strip_prefix(AUDIO_ID_PREFIX).unwrap_or(key);
                self.ids.audio_id(None, stem, existing)
            }
            OverlayId::Numeric(_) => self.ids.next_id(existing),
        }
    }

    fn span_from_seconds(&self, start_secs: f64, end_secs: f64) -> FrameSpan {
        let fps = self.config.frame_rate;
        let from = fps.seconds_to_frame_offset(start_secs);
        let duration = fps.seconds_to_frames(end_secs - start_secs).max(1) as u64;
        FrameSpan::new(from, duration)
    }

    /// Canvas rect and layer for a new overlay, writing layer styles.
    pub(crate) fn spatial_layout(
        &self,
        kind: OverlayKind,
        asset: Option<Size>,
        styles: &mut Styles,
    ) -> (Rect, Option<Layer>) {
        let tolerance = self.config.aspect_tolerance;
        match kind {
            OverlayKind::Video => {
                let layout = layout_video(asset, self.canvas, self.store.overlays(), tolerance);
                apply_layer_styles(styles, layout.layer);
                (layout.placement.rect, Some(layout.layer))
            }
            kind if kind.is_visual() => {
                (compute_placement(asset, self.canvas, tolerance).rect, None)
            }
            _ => (Rect::default(), None),
        }
    }

    // ── Selection ───────────────────────────────────────────────

    /// Select a single overlay. Returns false when the id does not resolve.
    pub fn select(&mut self, id: &OverlayId) -> bool {
        if !self.store.contains(id) {
            tracing::warn!(%id, "cannot select unknown overlay");
            return false;
        }
        self.set_selection(vec![id.clone()]);
        true
    }

    pub fn select_many(&mut self, ids: &[OverlayId]) -> EditReport {
        let (found, unresolved) = self.partition_ids(ids);
        self.set_selection(found.clone());
        EditReport {
            applied: found,
            unresolved,
            ..Default::default()
        }
    }

    pub fn clear_selection(&mut self) {
        self.set_selection(Vec::new());
    }

    // ── Timeline handlers ───────────────────────────────────────

    /// Remove overlays. Unknown ids are reported and skipped.
    pub fn delete(&mut self, ids: &[OverlayId]) -> Result<EditReport> {
        let (found, unresolved) = self.partition_ids(ids);
        if !found.is_empty() {
            let edits = found
                .iter()
                .map(|id| OverlayEdit::Remove { id: id.clone() })
                .collect();
            self.commit(OverlayEdit::Batch(edits))?;
            tracing::debug!(count = found.len(), "deleted overlays");
        }
        Ok(EditReport {
            applied: found,
            unresolved,
            ..Default::default()
        })
    }

    /// Remove every overlay on `row`.
    pub fn delete_row(&mut self, row: u32) -> Result<EditReport> {
        let ids: Vec<OverlayId> = self
            .store
            .overlays()
            .iter()
            .filter(|o| o.row == row)
            .map(|o| o.id.clone())
            .collect();
        self.delete(&ids)
    }

    /// Clone overlays onto the original's row, starting where the original
    /// ends, each with a freshly allocated id.
    pub fn duplicate(&mut self, ids: &[OverlayId]) -> Result<EditReport> {
        let (found, unresolved) = self.partition_ids(ids);
        let mut scratch = self.store.overlays().to_vec();
        let mut edits = Vec::with_capacity(found.len());
        let mut created = Vec::with_capacity(found.len());

        for id in &found {
            let Some(index) = scratch.iter().position(|o| &o.id == id) else {
                continue;
            };
            let original = &scratch[index];
            let mut copy = original.clone();
            copy.id = self.fresh_id_like(original, &scratch);
            copy.from = original.end_frame();
            copy.is_dragging = false;

            created.push(copy.id.clone());
            scratch.insert(index + 1, copy.clone());
            edits.push(OverlayEdit::Insert {
                index: index + 1,
                overlay: copy,
            });
        }

        if !edits.is_empty() {
            self.commit(OverlayEdit::Batch(edits))?;
        }
        Ok(EditReport {
            created,
            unresolved,
            ..Default::default()
        })
    }

    /// Split an overlay at `split_time_secs` (timeline time).
    ///
    /// The original keeps its id and becomes the left half; the right half
    /// gets a new id and starts where the left ends, with its source offset
    /// advanced so playback continues seamlessly. Returns the right half's id.
    pub fn split(&mut self, id: &OverlayId, split_time_secs: f64) -> Result<OverlayId> {
        let Some(index) = self.store.resolve(id) else {
            tracing::warn!(%id, "cannot split unknown overlay");
            return Err(ClipDeckError::NotFound(id.clone()));
        };
        let original = &self.store.overlays()[index];
        let split_frame = self.config.frame_rate.seconds_to_frames(split_time_secs);

        let (left, right) = u64::try_from(split_frame)
            .ok()
            .and_then(|frame| original.span().split_at(frame))
            .ok_or_else(|| {
                ClipDeckError::InvalidSplit(format!(
                    "frame {split_frame} is not inside overlay {id} ({}..{})",
                    original.from,
                    original.end_frame()
                ))
            })?;

        let mut right_half = original.clone();
        right_half.id = self.fresh_id_like(original, self.store.overlays());
        right_half.set_span(right);
        right_half.source_offset_frames = original.source_offset_frames + left.duration;
        right_half.is_dragging = false;
        let right_id = right_half.id.clone();

        self.commit(OverlayEdit::Batch(vec![
            OverlayEdit::SetTiming {
                id: id.clone(),
                span: left,
                row: None,
            },
            OverlayEdit::Insert {
                index: index + 1,
                overlay: right_half,
            },
        ]))?;
        tracing::debug!(%id, %right_id, split_frame, "split overlay");
        Ok(right_id)
    }

    fn suppressed(&self, id: &OverlayId, what: &str) -> Option<EditOutcome> {
        if self.gate.is_idle() {
            return None;
        }
        tracing::warn!(%id, "{what} suppressed while a batch track edit is applied");
        self.events.emit(TimelineEvent::EditSuppressed(id.clone()));
        Some(EditOutcome::Suppressed)
    }

    /// Move an item to new times and a new row.
    ///
    /// `row_ident` is the widget's row identifier (`"track-2"` or `"2"`).
    pub fn move_item(
        &mut self,
        id: &OverlayId,
        start_secs: f64,
        end_secs: f64,
        row_ident: &str,
    ) -> Result<EditOutcome> {
        if let Some(outcome) = self.suppressed(id, "move") {
            return Ok(outcome);
        }
        let row = parse_row_ident(row_ident).ok_or_else(|| {
            ClipDeckError::InvalidParameter(format!("unknown row identifier {row_ident:?}"))
        })?;
        if !self.store.contains(id) {
            tracing::warn!(%id, "cannot move unknown overlay");
            return Ok(EditOutcome::Unresolved);
        }
        let span = self.span_from_seconds(start_secs, end_secs);
        self.commit(OverlayEdit::SetTiming {
            id: id.clone(),
            span,
            row: Some(row),
        })?;
        Ok(EditOutcome::Applied)
    }

    /// Change an item's times, keeping its row.
    pub fn resize_item(
        &mut self,
        id: &OverlayId,
        start_secs: f64,
        end_secs: f64,
    ) -> Result<EditOutcome> {
        if let Some(outcome) = self.suppressed(id, "resize") {
            return Ok(outcome);
        }
        if !self.store.contains(id) {
            tracing::warn!(%id, "cannot resize unknown overlay");
            return Ok(EditOutcome::Unresolved);
        }
        let span = self.span_from_seconds(start_secs, end_secs);
        self.commit(OverlayEdit::SetTiming {
            id: id.clone(),
            span,
            row: None,
        })?;
        Ok(EditOutcome::Applied)
    }

    /// Reconcile a full track list coming back from the timeline widget.
    ///
    /// The gate is held for the whole reconciliation and released on every
    /// exit path.
    pub fn apply_track_changes(&mut self, tracks: &[TimelineTrack]) -> Result<EditReport> {
        let guard = self.gate.begin_batch()?;
        let result = self.reconcile_tracks(tracks, &guard);
        drop(guard);
        self.refresh_tracks();
        result
    }

    /// Merge widget timing into the store. Requires the gate to be held.
    ///
    /// Items carry timing and identity only; everything else on the overlay
    /// is kept. Overlays the widget no longer lists are removed. A guard that
    /// pointer-up has already released leaves the store untouched.
    pub(crate) fn reconcile_tracks(
        &mut self,
        tracks: &[TimelineTrack],
        guard: &BatchGuard,
    ) -> Result<EditReport> {
        if !guard.is_current() {
            tracing::warn!("update gate was released before the track batch ran; dropping it");
            return Ok(EditReport {
                superseded: true,
                ..Default::default()
            });
        }
        let timings = tracks_to_overlays(tracks, self.config.frame_rate);
        let mut report = EditReport::default();
        let mut edits = Vec::new();
        let mut listed = HashSet::with_capacity(timings.len());

        for timing in &timings {
            match self.store.get(&timing.id) {
                Some(overlay) => {
                    listed.insert(overlay.id.clone());
                    if overlay.span() != timing.span || overlay.row != timing.row {
                        edits.push(OverlayEdit::SetTiming {
                            id: overlay.id.clone(),
                            span: timing.span,
                            row: Some(timing.row),
                        });
                        report.applied.push(overlay.id.clone());
                    }
                }
                None => {
                    tracing::warn!(id = %timing.id, "track item has no overlay");
                    report.unresolved.push(timing.id.clone());
                }
            }
        }

        for overlay in self.store.overlays() {
            if !listed.contains(&overlay.id) {
                edits.push(OverlayEdit::Remove {
                    id: overlay.id.clone(),
                });
                report.applied.push(overlay.id.clone());
            }
        }

        if !edits.is_empty() {
            self.store.apply(&OverlayEdit::Batch(edits))?;
            self.events.emit(TimelineEvent::OverlaysChanged);
        }
        tracing::debug!(
            changed = report.applied.len(),
            unresolved = report.unresolved.len(),
            "reconciled track changes"
        );
        Ok(report)
    }

    // ── Store maintenance ───────────────────────────────────────

    /// Replace the whole collection. Any gesture in progress is abandoned.
    pub fn replace_overlays(&mut self, overlays: Vec<Overlay>) -> Result<()> {
        self.store.replace(overlays)?;
        self.gesture = None;
        self.alignment.clear();
        self.refresh_tracks();
        self.events.emit(TimelineEvent::OverlaysChanged);
        Ok(())
    }

    /// Shallow-merge opaque style values into one overlay.
    pub fn update_styles(&mut self, id: &OverlayId, patch: Map<String, Value>) -> Result<()> {
        if !self.store.contains(id) {
            return Err(ClipDeckError::NotFound(id.clone()));
        }
        self.commit(OverlayEdit::MergeStyles {
            id: id.clone(),
            patch,
        })
    }

    /// Update one overlay through a closure. The id may not change.
    pub fn change_overlay(&mut self, id: &OverlayId, change: impl FnOnce(&mut Overlay)) -> Result<()> {
        let mut overlay = self
            .store
            .get(id)
            .cloned()
            .ok_or_else(|| ClipDeckError::NotFound(id.clone()))?;
        change(&mut overlay);
        if !overlay.id.same_as(id) {
            return Err(ClipDeckError::InvalidParameter(format!(
                "overlay {id} cannot be renamed to {}",
                overlay.id
            )));
        }
        self.commit(OverlayEdit::Replace { overlay })
    }

    /// Set a fade, clamped so both fades fit in the media duration.
    ///
    /// The media duration is the payload's `mediaSrcDuration`, or the
    /// overlay's own length when the payload does not record one.
    pub fn set_fade(&mut self, id: &OverlayId, edge: FadeEdge, seconds: f64) -> Result<Fades> {
        let overlay = self
            .store
            .get(id)
            .ok_or_else(|| ClipDeckError::NotFound(id.clone()))?;
        let media = overlay.media_src_duration().unwrap_or_else(|| {
            self.config
                .frame_rate
                .frames_to_seconds(overlay.duration_in_frames)
        });
        let current = Fades {
            fade_in: overlay.styles.fade_in(),
            fade_out: overlay.styles.fade_out(),
        };
        let fades = clamp_fade(current, edge, seconds, media);
        if fades != current {
            tracing::debug!(%id, ?edge, requested = seconds, ?fades, "fade updated");
        }

        let mut patch = Map::new();
        patch.insert(style_keys::FADE_IN.into(), Value::from(fades.fade_in));
        patch.insert(style_keys::FADE_OUT.into(), Value::from(fades.fade_out));
        self.commit(OverlayEdit::MergeStyles {
            id: id.clone(),
            patch,
        })?;
        Ok(fades)
    }

    // ── Host-panel creation ─────────────────────────────────────

    /// Create an overlay at the playhead.
    ///
    /// Visual overlays are sized against the canvas; videos get a layer.
    /// Sound and the background video go below every row, everything else
    /// takes row 0 and pushes the existing rows down.
    pub fn insert_at_playhead(&mut self, new: NewOverlay) -> Result<OverlayId> {
        let NewOverlay {
            kind,
            asset_size,
            duration_in_frames,
            source_key,
            source_name,
            mut styles,
            payload,
        } = new;

        let (rect, layer) = self.spatial_layout(kind, asset_size, &mut styles);
        if kind == OverlayKind::Sound && styles.volume().is_none() {
            styles.set(style_keys::VOLUME, 1.0);
        }

        let existing = self.store.overlays();
        let placement = add_at_playhead(
            self.store.playhead(),
            existing,
            PreferredEdge::for_kind(kind, layer),
        );
        let id = match kind {
            OverlayKind::Sound => self.ids.audio_id(
                source_key.as_deref(),
                source_name.as_deref().unwrap_or_default(),
                existing,
            ),
            _ => self.ids.next_id(existing),
        };
        let duration = duration_in_frames
            .filter(|d| *d > 0)
            .unwrap_or_else(|| self.config.default_duration_frames(kind));

        let mut overlay = Overlay::new(
            id.clone(),
            kind,
            FrameSpan::new(placement.from, duration),
            placement.row,
        )
        .with_rect(rect);
        overlay.layer = layer;
        overlay.styles = styles;
        overlay.payload = payload;

        let mut edits: Vec<OverlayEdit> = placement
            .updated_overlays
            .iter()
            .zip(existing)
            .filter(|(updated, current)| updated.row != current.row)
            .map(|(updated, _)| OverlayEdit::SetRow {
                id: updated.id.clone(),
                row: updated.row,
            })
            .collect();
        edits.push(OverlayEdit::Insert {
            index: existing.len(),
            overlay,
        });

        self.commit(OverlayEdit::Batch(edits))?;
        self.set_selection(vec![id.clone()]);
        self.events.emit(TimelineEvent::PanelFocusRequested(kind));
        tracing::debug!(%id, ?kind, row = placement.row, from = placement.from, "inserted overlay");
        Ok(id)
    }
}

//! End-to-end scenarios across canvas sizing, placement, splitting and
//! snapping.

use clipdeck_canvas::{compute_placement, AlignmentEngine, GestureKind, GuideKind};
use clipdeck_core::{
    EngineConfig, FrameRate, FrameSpan, Overlay, OverlayId, OverlayKind, Rect, Size, Vec2,
};
use clipdeck_timeline::{
    add_at_playhead, overlays_to_tracks, NewOverlay, PreferredEdge, TimelineEditor,
};

// ── Helpers ────────────────────────────────────────────────────

const PORTRAIT: Size = Size::new(1080.0, 1920.0);
const SQUARE: Size = Size::new(1000.0, 1000.0);

fn editor(canvas: Size, overlays: Vec<Overlay>) -> TimelineEditor {
    TimelineEditor::with_overlays(EngineConfig::default(), canvas, overlays)
        .unwrap()
        .with_clock(|| 1_700_000_000_000u64)
}

// ── Spatial sizing ─────────────────────────────────────────────

#[test]
fn landscape_asset_on_portrait_canvas_takes_fit_path() {
    let placement = compute_placement(Some(Size::new(1920.0, 1080.0)), PORTRAIT, 0.01);

    assert!(!placement.fills_canvas);
    let r = placement.rect;
    assert!(((r.width / r.height) - 16.0 / 9.0).abs() < 0.01);
    assert!(r.is_within(PORTRAIT));
    assert_eq!(r.x, 0.0);
    assert_eq!(r.y, ((PORTRAIT.height - r.height) / 2.0).round());
}

#[test]
fn matching_asset_fills_canvas() {
    let placement = compute_placement(Some(Size::new(540.0, 960.0)), PORTRAIT, 0.01);
    assert!(placement.fills_canvas);
    assert_eq!(placement.rect, Rect::from_size(PORTRAIT));
}

// ── Placement at the playhead ──────────────────────────────────

#[test]
fn bottom_then_top_insert_shifts_rows() {
    let first = add_at_playhead(0, &[], PreferredEdge::Bottom);
    assert_eq!((first.from, first.row), (0, 0));

    let existing = vec![Overlay::new(
        1u64,
        OverlayKind::Sound,
        FrameSpan::new(first.from, 150),
        first.row,
    )];
    let second = add_at_playhead(0, &existing, PreferredEdge::Top);
    assert_eq!(second.row, 0);
    assert_eq!(second.updated_overlays[0].row, 1);
}

#[test]
fn editor_insert_follows_the_same_rows() {
    let mut editor = editor(PORTRAIT, vec![]);
    let sound = editor
        .insert_at_playhead(NewOverlay::new(OverlayKind::Sound))
        .unwrap();
    let text = editor
        .insert_at_playhead(NewOverlay::new(OverlayKind::Text))
        .unwrap();

    assert_eq!(editor.store().get(&sound).unwrap().row, 1);
    assert_eq!(editor.store().get(&text).unwrap().row, 0);
    assert_eq!(editor.store().track_count(), 2);
    assert!(sound.is_keyed());
    assert_eq!(text, OverlayId::Numeric(1_700_000_000_000));
}

// ── Split ──────────────────────────────────────────────────────

#[test]
fn split_ninety_frames_at_one_and_a_half_seconds() {
    let mut editor = editor(
        SQUARE,
        vec![Overlay::new(1u64, OverlayKind::Video, FrameSpan::new(0, 90), 0)],
    );
    let right = editor.split(&1u64.into(), 1.5).unwrap();

    let left = editor.store().get(&1u64.into()).unwrap();
    let right = editor.store().get(&right).unwrap();
    assert_eq!((left.from, left.duration_in_frames), (0, 45));
    assert_eq!((right.from, right.duration_in_frames), (45, 45));
    assert_ne!(left.id, right.id);
    assert_eq!(right.row, left.row);

    let tracks = overlays_to_tracks(editor.overlays(), FrameRate::FPS_30);
    assert_eq!(tracks[0].items.len(), 2);
    assert_eq!(tracks[0].items[0].end, tracks[0].items[1].start);
}

// ── Snapping ───────────────────────────────────────────────────

#[test]
fn drag_near_center_snaps_with_guide() {
    let mut candidate = Overlay::new(1u64, OverlayKind::Image, FrameSpan::new(0, 30), 0)
        .with_rect(Rect::new(345.0, 200.0, 300.0, 100.0));
    candidate.is_dragging = true;

    let mut engine = AlignmentEngine::default();
    assert!((engine.threshold(SQUARE) - 10.0).abs() < 1e-4);
    assert!(engine.update_guides(&candidate, &[], SQUARE));

    let (left, _) = engine.calculate_snap_position(&candidate, &[], SQUARE);
    assert_eq!(left, 350.0);
    assert_eq!(engine.guides().len(), 1);
    assert_eq!(engine.guides()[0].kind, GuideKind::CanvasCenterX);
    assert_eq!(engine.guides()[0].x, Some(500.0));
}

#[test]
fn drag_through_editor_snaps_and_cleans_up() {
    let image = Overlay::new(1u64, OverlayKind::Image, FrameSpan::new(0, 30), 0)
        .with_rect(Rect::new(0.0, 200.0, 300.0, 100.0));
    let mut editor = editor(SQUARE, vec![image]);

    editor
        .begin_gesture(&1u64.into(), GestureKind::Move, Vec2::new(100.0, 250.0))
        .unwrap();
    let rect = editor
        .pointer_move(Vec2::new(445.0, 250.0))
        .unwrap()
        .unwrap();
    assert_eq!(rect.x, 350.0);
    assert_eq!(editor.guides()[0].kind, GuideKind::CanvasCenterX);

    editor.pointer_up();
    assert!(editor.guides().is_empty());
    assert!(editor.overlays().iter().all(|o| !o.is_dragging));
    editor.store().validate_at_rest().unwrap();
}

//! Property tests for the engine's invariants.

use std::collections::HashSet;

use clipdeck_canvas::compute_placement;
use clipdeck_core::{EngineConfig, FrameRate, FrameSpan, Overlay, OverlayId, OverlayKind, Size};
use clipdeck_timeline::{
    overlays_to_tracks, tracks_to_overlays, FadeEdge, IdAllocator, NewOverlay, TimelineEditor,
    TimelineTrack,
};
use proptest::prelude::*;
use serde_json::Value;

// ── Strategies ─────────────────────────────────────────────────

const RATES: [FrameRate; 8] = [
    FrameRate::FPS_23_976,
    FrameRate::FPS_24,
    FrameRate::FPS_25,
    FrameRate::FPS_29_97,
    FrameRate::FPS_30,
    FrameRate::FPS_50,
    FrameRate::FPS_59_94,
    FrameRate::FPS_60,
];

fn frame_rate() -> impl Strategy<Value = FrameRate> {
    proptest::sample::select(RATES.to_vec())
}

fn overlay_id() -> impl Strategy<Value = OverlayId> {
    prop_oneof![
        (0u64..10_000).prop_map(OverlayId::Numeric),
        "[a-z0-9]{1,8}".prop_map(|key| OverlayId::audio(&key)),
    ]
}

fn kind() -> impl Strategy<Value = OverlayKind> {
    proptest::sample::select(vec![
        OverlayKind::Video,
        OverlayKind::Image,
        OverlayKind::Text,
        OverlayKind::Sound,
        OverlayKind::Caption,
    ])
}

/// At-rest overlays with unique ids.
fn overlays() -> impl Strategy<Value = Vec<Overlay>> {
    proptest::collection::vec(
        (overlay_id(), kind(), 0u64..1_000_000, 1u64..100_000, 0u32..8),
        0..24,
    )
    .prop_map(|items| {
        let mut seen = HashSet::new();
        items
            .into_iter()
            .filter(|(id, ..)| seen.insert(id.clone()))
            .map(|(id, kind, from, duration, row)| {
                Overlay::new(id, kind, FrameSpan::new(from, duration), row)
            })
            .collect()
    })
}

fn config() -> EngineConfig {
    EngineConfig::default()
}

// ── Properties ─────────────────────────────────────────────────

proptest! {
    #[test]
    fn allocated_ids_are_never_in_use(existing in overlays(), stamp in 0u64..20_000, key in "[a-z]{0,4}") {
        let ids = IdAllocator::new(move || stamp);
        let next = ids.next_id(&existing);
        prop_assert!(existing.iter().all(|o| o.id != next));

        let key = if key.is_empty() { None } else { Some(key.as_str()) };
        let audio = ids.audio_id(key, "voice", &existing);
        prop_assert!(existing.iter().all(|o| o.id != audio));
        prop_assert!(audio.to_string().starts_with("audio-"));
    }

    #[test]
    fn projection_round_trip_preserves_timing(overlays in overlays(), fps in frame_rate()) {
        let timings = tracks_to_overlays(&overlays_to_tracks(&overlays, fps), fps);
        prop_assert_eq!(timings.len(), overlays.len());
        for overlay in &overlays {
            let timing = timings.iter().find(|t| t.id == overlay.id).unwrap();
            prop_assert_eq!(timing.kind, overlay.kind);
            prop_assert_eq!(timing.row, overlay.row);
            prop_assert_eq!(timing.span, overlay.span());
        }
    }

    #[test]
    fn widget_text_ids_resolve_to_the_same_overlays(overlays in overlays(), fps in frame_rate()) {
        let mut json = serde_json::to_value(overlays_to_tracks(&overlays, fps)).unwrap();
        for track in json.as_array_mut().unwrap() {
            for item in track["items"].as_array_mut().unwrap() {
                let text = match &item["id"] {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                item["id"] = Value::String(text);
            }
        }
        let tracks: Vec<TimelineTrack> = serde_json::from_value(json).unwrap();
        let timings = tracks_to_overlays(&tracks, fps);
        prop_assert_eq!(timings.len(), overlays.len());
        for overlay in &overlays {
            prop_assert!(timings.iter().any(|t| t.id == overlay.id && t.span == overlay.span()));
        }

        let mut editor = TimelineEditor::with_overlays(config(), Size::new(1920.0, 1080.0), overlays.clone()).unwrap();
        let report = editor.apply_track_changes(&tracks).unwrap();
        prop_assert!(report.is_clean());
        prop_assert_eq!(editor.overlays().len(), overlays.len());
    }

    #[test]
    fn split_conserves_the_interval(from in 0u64..100_000, duration in 2u64..10_000, at in 0.0f64..1.0) {
        let split_frame = from + 1 + ((duration - 2) as f64 * at) as u64;
        let original = Overlay::new(1u64, OverlayKind::Video, FrameSpan::new(from, duration), 0);
        let mut editor = TimelineEditor::with_overlays(config(), Size::new(1920.0, 1080.0), vec![original]).unwrap();

        let secs = FrameRate::FPS_30.frames_to_seconds(split_frame);
        let right = editor.split(&1u64.into(), secs).unwrap();
        let left = editor.store().get(&1u64.into()).unwrap();
        let right = editor.store().get(&right).unwrap();

        prop_assert_eq!(left.from, from);
        prop_assert_eq!(left.end_frame(), right.from);
        prop_assert_eq!(right.end_frame(), from + duration);
        prop_assert_eq!(left.duration_in_frames + right.duration_in_frames, duration);
        prop_assert!(left.duration_in_frames >= 1 && right.duration_in_frames >= 1);
    }

    #[test]
    fn placement_stays_inside_canvas(
        aw in 1u32..8_000, ah in 1u32..8_000,
        cw in 1u32..4_000, ch in 1u32..4_000,
    ) {
        let canvas = Size::new(cw as f32, ch as f32);
        let placement = compute_placement(Some(Size::new(aw as f32, ah as f32)), canvas, 0.01);
        prop_assert!(placement.rect.is_within(canvas), "{:?} escapes {:?}", placement.rect, canvas);
        prop_assert!(placement.rect.width >= 0.0 && placement.rect.height >= 0.0);
    }

    #[test]
    fn fades_fit_in_media(
        media in 0.0f64..30.0,
        edits in proptest::collection::vec((any::<bool>(), -5.0f64..40.0), 1..12),
    ) {
        let mut sound = Overlay::new("audio-p", OverlayKind::Sound, FrameSpan::new(0, 900), 0);
        sound.payload.insert("mediaSrcDuration".into(), Value::from(media));
        let mut editor = TimelineEditor::with_overlays(config(), Size::new(1920.0, 1080.0), vec![sound]).unwrap();
        let id = OverlayId::audio("p");

        for (fade_in, seconds) in edits {
            let edge = if fade_in { FadeEdge::In } else { FadeEdge::Out };
            editor.set_fade(&id, edge, seconds).unwrap();
            let styles = &editor.store().get(&id).unwrap().styles;
            prop_assert!(styles.fade_in() >= 0.0 && styles.fade_out() >= 0.0);
            prop_assert!(styles.fade_in() + styles.fade_out() <= media + 1e-9);
        }
        prop_assert!(editor.store().validate_at_rest().is_ok());
    }

    #[test]
    fn ids_stay_unique_through_edits(
        start in overlays(),
        ops in proptest::collection::vec((0u8..3, any::<proptest::sample::Index>()), 1..16),
    ) {
        let mut editor = TimelineEditor::with_overlays(config(), Size::new(1280.0, 720.0), start).unwrap();
        for (op, pick) in ops {
            let target = if editor.overlays().is_empty() {
                None
            } else {
                Some(editor.overlays()[pick.index(editor.overlays().len())].clone())
            };
            match (op, target) {
                (0, Some(overlay)) => {
                    editor.duplicate(&[overlay.id]).unwrap();
                }
                (1, Some(overlay)) => {
                    let mid = overlay.from + overlay.duration_in_frames / 2;
                    let secs = editor.fps().frames_to_seconds(mid);
                    // One-frame overlays cannot be split.
                    let _ = editor.split(&overlay.id, secs);
                }
                _ => {
                    editor.insert_at_playhead(NewOverlay::new(OverlayKind::Text)).unwrap();
                }
            }
            let mut seen = HashSet::new();
            prop_assert!(editor.overlays().iter().all(|o| seen.insert(o.id.clone())));
        }
        prop_assert!(editor.store().validate_at_rest().is_ok());
    }
}

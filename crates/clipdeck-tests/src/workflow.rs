//! Editing sessions driven the way a host UI drives the engine: shared
//! editor, async batches and drops, pointer gestures and the event stream.

use std::time::Duration;

use parking_lot::Mutex;
use serde_json::{json, Value};

use clipdeck_canvas::GestureKind;
use clipdeck_core::{
    ClipDeckError, EngineConfig, FrameSpan, Overlay, OverlayId, OverlayKind, Rect, Result, Size,
    Vec2,
};
use clipdeck_timeline::{
    apply_track_changes_deferred, drop_to_create_shared, shared, DropKind, DropRequest,
    DropServices, EditOutcome, MediaItem, MediaProbe, ProbeResult, SharedEditor, TimelineEditor,
    TimelineEvent,
};

// ── Helpers ────────────────────────────────────────────────────

const CANVAS: Size = Size::new(1920.0, 1080.0);

/// Probe that records every URL and answers after a delay.
struct RecordingProbe {
    delay: Duration,
    seconds: f64,
    calls: Mutex<Vec<String>>,
}

impl RecordingProbe {
    fn new(delay: Duration, seconds: f64) -> Self {
        Self {
            delay,
            seconds,
            calls: Mutex::new(Vec::new()),
        }
    }
}

impl MediaProbe for RecordingProbe {
    async fn probe(&self, url: &str) -> Result<ProbeResult> {
        self.calls.lock().push(url.to_string());
        tokio::time::sleep(self.delay).await;
        if url.ends_with(".broken") {
            return Err(ClipDeckError::Probe(format!("cannot read {url}")));
        }
        Ok(ProbeResult {
            duration_in_frames: 0,
            duration_in_seconds: self.seconds,
        })
    }
}

fn cdn_url(item: &MediaItem) -> String {
    if item.name.is_empty() {
        String::new()
    } else {
        format!("https://media.test/{}", item.name)
    }
}

fn session() -> SharedEditor {
    let title = Overlay::new(1u64, OverlayKind::Text, FrameSpan::new(0, 90), 0)
        .with_rect(Rect::new(100.0, 100.0, 400.0, 120.0));
    let clip = Overlay::new(2u64, OverlayKind::Video, FrameSpan::new(0, 300), 1)
        .with_rect(Rect::from_size(CANVAS));
    let music = Overlay::new("audio-theme", OverlayKind::Sound, FrameSpan::new(0, 300), 2);
    let overlays = vec![title, clip, music];
    let editor = TimelineEditor::with_overlays(EngineConfig::default(), CANVAS, overlays)
        .unwrap()
        .with_clock(|| 5_000u64);
    shared(editor)
}

// ── Deferred track batches ─────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn deferred_batch_suppresses_moves_and_reports_them() {
    let editor = session();
    let events = editor.lock().subscribe();

    let mut tracks = editor.lock().tracks().to_vec();
    // Widget moved the title one second right and dropped the music.
    tracks[0].items[0].start = 1.0;
    tracks[0].items[0].end = 4.0;
    tracks[2].items.clear();

    let task = {
        let editor = editor.clone();
        tokio::spawn(async move { apply_track_changes_deferred(&editor, tracks).await })
    };
    tokio::task::yield_now().await;

    let outcome = editor
        .lock()
        .resize_item(&2u64.into(), 0.0, 5.0)
        .unwrap();
    assert_eq!(outcome, EditOutcome::Suppressed);
    assert!(events
        .try_iter()
        .any(|e| e == TimelineEvent::EditSuppressed(OverlayId::Numeric(2))));

    let report = task.await.unwrap().unwrap();
    assert!(report.is_clean());
    assert_eq!(report.applied.len(), 2);

    let editor = editor.lock();
    assert!(editor.gate().is_idle());
    assert_eq!(editor.overlays().len(), 2);
    assert_eq!(editor.store().get(&1u64.into()).unwrap().span(), FrameSpan::new(30, 90));
    assert_eq!(editor.store().get(&2u64.into()).unwrap().duration_in_frames, 300);
    // Projection caught up once the gate opened; the dropped row is gone.
    assert_eq!(editor.tracks().len(), 2);
    assert_eq!(editor.tracks()[0].items[0].start, 1.0);
}

#[tokio::test(start_paused = true)]
async fn pointer_up_retires_pending_batch_without_disturbing_the_next() {
    let editor = session();
    let window = Duration::from_millis(editor.lock().config().deferred_apply_ms);
    let stale = editor.lock().tracks().to_vec();

    editor
        .lock()
        .begin_gesture(&1u64.into(), GestureKind::Move, Vec2::new(150.0, 150.0))
        .unwrap();
    let first = {
        let editor = editor.clone();
        tokio::spawn(async move { apply_track_changes_deferred(&editor, stale).await })
    };
    tokio::task::yield_now().await;
    assert!(!editor.lock().gate().is_idle());

    // Pointer-up frees the gate; the user's next move must stick.
    editor.lock().pointer_up();
    assert!(editor.lock().gate().is_idle());
    assert_eq!(
        editor.lock().move_item(&1u64.into(), 5.0, 6.0, "track-0").unwrap(),
        EditOutcome::Applied
    );
    assert_eq!(editor.lock().store().get(&1u64.into()).unwrap().from, 150);

    tokio::time::sleep(window / 2).await;
    let mut fresh = editor.lock().tracks().to_vec();
    fresh[1].items[0].start = 1.0;
    fresh[1].items[0].end = 11.0;
    let second = {
        let editor = editor.clone();
        tokio::spawn(async move { apply_track_changes_deferred(&editor, fresh).await })
    };
    tokio::task::yield_now().await;

    let report = first.await.unwrap().unwrap();
    assert!(report.superseded);
    assert!(report.applied.is_empty());
    {
        let mut editor = editor.lock();
        assert_eq!(editor.store().get(&1u64.into()).unwrap().from, 150);
        // The second batch still owns the gate.
        assert!(!editor.gate().is_idle());
        assert_eq!(
            editor.resize_item(&1u64.into(), 5.0, 8.0).unwrap(),
            EditOutcome::Suppressed
        );
    }

    let report = second.await.unwrap().unwrap();
    assert!(report.is_clean());
    assert_eq!(report.applied, vec![OverlayId::Numeric(2)]);

    let editor = editor.lock();
    assert!(editor.gate().is_idle());
    let title = editor.store().get(&1u64.into()).unwrap();
    assert_eq!(title.span(), FrameSpan::new(150, 30));
    assert_eq!(editor.store().get(&2u64.into()).unwrap().from, 30);
    editor.store().validate_at_rest().unwrap();
}

#[tokio::test(start_paused = true)]
async fn widget_text_ids_reconcile_against_numeric_overlays() {
    let editor = session();
    let tracks = serde_json::to_value(editor.lock().tracks()).unwrap();
    let mut tracks = tracks.to_string();
    for n in [1, 2] {
        tracks = tracks.replace(&format!(r#""id":{n}"#), &format!(r#""id":"{n}""#));
    }
    assert!(tracks.contains(r#""id":"1""#));
    let tracks: Vec<clipdeck_timeline::TimelineTrack> = serde_json::from_str(&tracks).unwrap();

    let report = apply_track_changes_deferred(&editor, tracks).await.unwrap();
    assert!(report.is_clean());
    assert!(report.applied.is_empty());

    let mut editor = editor.lock();
    assert_eq!(editor.overlays().len(), 3);
    let from_widget: OverlayId = serde_json::from_value(json!("2")).unwrap();
    assert_eq!(
        editor.move_item(&from_widget, 2.0, 12.0, "track-1").unwrap(),
        EditOutcome::Applied
    );
    assert_eq!(editor.store().get(&2u64.into()).unwrap().from, 60);
}

#[tokio::test(start_paused = true)]
async fn synchronous_batch_is_refused_while_deferred_one_pending() {
    let editor = session();
    let tracks = editor.lock().tracks().to_vec();
    let task = {
        let editor = editor.clone();
        let tracks = tracks.clone();
        tokio::spawn(async move { apply_track_changes_deferred(&editor, tracks).await })
    };
    tokio::task::yield_now().await;

    let err = editor.lock().apply_track_changes(&tracks).unwrap_err();
    assert!(matches!(err, ClipDeckError::BatchInProgress));

    task.await.unwrap().unwrap();
    assert!(editor.lock().apply_track_changes(&tracks).unwrap().applied.is_empty());
}

// ── Drops on a shared editor ───────────────────────────────────

#[tokio::test(start_paused = true)]
async fn shared_drop_probes_without_holding_the_editor() {
    let editor = session();
    let probe = RecordingProbe::new(Duration::from_millis(200), 6.0);
    let catalog = vec![MediaItem {
        id: "lib-1".into(),
        name: "interview.mp4".into(),
        width: Some(1080.0),
        height: Some(1920.0),
        ..Default::default()
    }];
    let services = DropServices {
        probe: &probe,
        resolver: &cdn_url,
        catalog: Some(&catalog),
    };
    let request = DropRequest {
        kind: DropKind::Video,
        item: MediaItem {
            id: "lib-1".into(),
            ..Default::default()
        },
        row: 3,
        start_secs: 2.0,
    };

    let dropped = drop_to_create_shared(&editor, request, &services);
    let poke = async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        // The editor stays usable while the probe is in flight.
        editor.lock().select(&1u64.into())
    };
    let (id, selected) = tokio::join!(dropped, poke);
    assert!(selected);
    let id = id.unwrap();

    assert_eq!(*probe.calls.lock(), vec!["https://media.test/interview.mp4".to_string()]);
    let editor = editor.lock();
    let overlay = editor.store().get(&id).unwrap();
    assert_eq!(id, OverlayId::Numeric(3));
    assert_eq!((overlay.from, overlay.duration_in_frames, overlay.row), (60, 180, 3));
    assert_eq!(overlay.media_src_duration(), Some(6.0));
    // Portrait asset on a landscape canvas is fitted and centered.
    assert_eq!(overlay.height, 1080.0);
    assert!(overlay.rect().is_within(CANVAS));
    assert_eq!(editor.selected_ids(), &[id.clone()]);
}

#[tokio::test(start_paused = true)]
async fn failed_probe_falls_back_and_unresolved_drop_changes_nothing() {
    let editor = session();
    let probe = RecordingProbe::new(Duration::from_millis(10), 6.0);
    let services = DropServices {
        probe: &probe,
        resolver: &cdn_url,
        catalog: None,
    };

    let broken = DropRequest {
        kind: DropKind::Audio,
        item: MediaItem {
            id: "x".into(),
            name: "voice.broken".into(),
            key: Some("voice".into()),
            ..Default::default()
        },
        row: 0,
        start_secs: 0.0,
    };
    let id = drop_to_create_shared(&editor, broken, &services).await.unwrap();
    assert_eq!(id, OverlayId::audio("voice"));
    assert_eq!(editor.lock().store().get(&id).unwrap().duration_in_frames, 150);

    let before = editor.lock().overlays().to_vec();
    let unnamed = DropRequest {
        kind: DropKind::Image,
        item: MediaItem::default(),
        row: 0,
        start_secs: 0.0,
    };
    let err = drop_to_create_shared(&editor, unnamed, &services)
        .await
        .unwrap_err();
    assert!(matches!(err, ClipDeckError::AssetUnresolved(_)));
    assert_eq!(editor.lock().overlays(), before.as_slice());
}

// ── Host-facing data shapes ────────────────────────────────────

#[test]
fn overlays_and_tracks_serialize_for_the_host() {
    let editor = session();
    let editor = editor.lock();

    let tracks = serde_json::to_value(editor.tracks()).unwrap();
    assert_eq!(tracks[0]["id"], "track-0");
    assert_eq!(tracks[0]["name"], "Track 1");
    assert_eq!(
        tracks[2]["items"][0],
        json!({
            "id": "audio-theme",
            "trackId": "track-2",
            "start": 0.0,
            "end": 10.0,
            "type": "sound",
            "label": "sound",
        })
    );

    let overlays = serde_json::to_value(editor.overlays()).unwrap();
    let title = &overlays[0];
    assert_eq!(title["id"], 1);
    assert_eq!(title["type"], "text");
    assert_eq!(title["durationInFrames"], 90);
    assert!(title.get("isDragging").is_none());

    let back: Vec<Overlay> = serde_json::from_value(overlays.clone()).unwrap();
    assert_eq!(back.as_slice(), editor.overlays());
    assert!(matches!(overlays, Value::Array(ref a) if a.len() == 3));
}

#[test]
fn gesture_session_emits_events_in_order() {
    let editor = session();
    let mut editor = editor.lock();
    let events = editor.subscribe();

    editor
        .begin_gesture(&1u64.into(), GestureKind::Move, Vec2::new(150.0, 150.0))
        .unwrap();
    editor.pointer_move(Vec2::new(250.0, 180.0)).unwrap();
    editor.pointer_up();

    let seen: Vec<TimelineEvent> = events.try_iter().collect();
    assert_eq!(
        seen.first(),
        Some(&TimelineEvent::SelectionChanged(vec![OverlayId::Numeric(1)]))
    );
    assert_eq!(seen.last(), Some(&TimelineEvent::OverlaysChanged));
    assert_eq!(editor.overlays()[0].left, 200.0);
    assert!(!editor.overlays()[0].is_dragging);
}

//! Async operations on an editor shared with the host UI.
//!
//! The editor lock is never held across an await; the update gate is what
//! keeps per-item edits out while a deferred batch is pending.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use clipdeck_core::{OverlayId, Result};

use crate::editor::{EditReport, TimelineEditor};
use crate::media::{DropRequest, MediaProbe};
use crate::media_drop::{prepare_drop, DropServices};
use crate::projection::TimelineTrack;

/// Editor handle shared between the UI thread and async tasks.
pub type SharedEditor = Arc<Mutex<TimelineEditor>>;

pub fn shared(editor: TimelineEditor) -> SharedEditor {
    Arc::new(Mutex::new(editor))
}

/// Apply a batch of track changes after the configured window.
///
/// The gate is taken immediately, so moves and resizes arriving during the
/// window are suppressed, and released when the batch has been applied (or
/// the task is dropped).
pub async fn apply_track_changes_deferred(
    editor: &SharedEditor,
    tracks: Vec<TimelineTrack>,
) -> Result<EditReport> {
    let (guard, window) = {
        let editor = editor.lock();
        let guard = editor.gate().begin_batch()?;
        (guard, Duration::from_millis(editor.config().deferred_apply_ms))
    };

    tokio::time::sleep(window).await;

    let result = editor.lock().reconcile_tracks(&tracks, &guard);
    drop(guard);
    editor.lock().refresh_tracks();
    result
}

/// Drop-to-create on a shared editor: the probe runs without the lock.
pub async fn drop_to_create_shared<P: MediaProbe>(
    editor: &SharedEditor,
    request: DropRequest,
    services: &DropServices<'_, P>,
) -> Result<OverlayId> {
    let config = editor.lock().config().clone();
    let prepared = prepare_drop(request, &config, services).await?;
    editor.lock().commit_drop(prepared)
}

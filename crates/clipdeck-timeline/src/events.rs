//! Notifications from the editor to the host UI.

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};

use clipdeck_canvas::AlignmentGuide;
use clipdeck_core::{OverlayId, OverlayKind};

/// Something the host may want to react to.
#[derive(Debug, Clone, PartialEq)]
pub enum TimelineEvent {
    /// The overlay collection changed.
    OverlaysChanged,
    SelectionChanged(Vec<OverlayId>),
    /// Open the side panel for a newly created overlay's kind.
    PanelFocusRequested(OverlayKind),
    GuidesChanged(Vec<AlignmentGuide>),
    /// A move or resize was dropped because a batch reconciliation held the
    /// update gate.
    EditSuppressed(OverlayId),
}

/// Events queued before the oldest ones are dropped.
pub const EVENT_CAPACITY: usize = 1024;

/// Bounded event channel owned by the editor.
///
/// A host that never drains costs at most [`EVENT_CAPACITY`] events; past
/// that the oldest queued event is discarded to make room.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: Sender<TimelineEvent>,
    rx: Receiver<TimelineEvent>,
}

impl Default for EventBus {
    fn default() -> Self {
        let (tx, rx) = bounded(EVENT_CAPACITY);
        Self { tx, rx }
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&self, mut event: TimelineEvent) {
        // The bus keeps its own receiver, so the channel never disconnects.
        while let Err(TrySendError::Full(rejected)) = self.tx.try_send(event) {
            if self.rx.try_recv().is_ok() {
                tracing::warn!("event queue full, dropped the oldest event");
            }
            event = rejected;
        }
    }

    /// A receiver for the host. Receivers share one queue.
    pub fn subscribe(&self) -> Receiver<TimelineEvent> {
        self.rx.clone()
    }

    /// Drain everything queued so far.
    pub fn drain(&self) -> Vec<TimelineEvent> {
        self.rx.try_iter().collect()
    }
}

//! ClipDeck Timeline - overlay store and editing
//!
//! Keeps the overlay collection in sync with the timeline widget and the
//! canvas:
//! - Overlay store and atomic edit commands
//! - Id allocation and playhead placement
//! - Overlay/track projection for the timeline widget
//! - Edit handlers (select, delete, duplicate, split, move, resize)
//! - Drop-to-create and canvas gestures
//! - Update-source gate for batch reconciliation

pub mod allocator;
pub mod edit;
pub mod editor;
pub mod events;
pub mod fades;
pub mod gate;
mod gestures;
pub mod media;
pub mod media_drop;
pub mod placement;
pub mod projection;
pub mod shared;
pub mod store;

pub use allocator::{Clock, IdAllocator, SystemClock};
pub use edit::OverlayEdit;
pub use editor::{EditOutcome, EditReport, NewOverlay, TimelineEditor};
pub use events::{EventBus, TimelineEvent, EVENT_CAPACITY};
pub use fades::{clamp_fade, FadeEdge, Fades};
pub use gate::{BatchGuard, GateState, UpdateSourceGate};
pub use media::{
    CanvasProvider, DropKind, DropRequest, MediaCatalog, MediaItem, MediaProbe, NoProbe,
    ProbeResult, UrlResolver,
};
pub use media_drop::{prepare_drop, DropServices, PreparedDrop};
pub use placement::{add_at_playhead, Placement, PreferredEdge};
pub use projection::{
    overlays_to_tracks, parse_row_ident, track_id_for_row, tracks_to_overlays, OverlayTiming,
    TimelineItem, TimelineTrack,
};
pub use shared::{apply_track_changes_deferred, drop_to_create_shared, shared, SharedEditor};
pub use store::OverlayStore;

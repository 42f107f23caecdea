//! ClipDeck Canvas - spatial layout for overlays
//!
//! - Sizing and layer policy for newly placed overlays
//! - Alignment guides and snapping while dragging
//! - Pointer gesture math (move, resize, rotate)

pub mod alignment;
pub mod gesture;
pub mod sizing;

pub use alignment::{AlignmentEngine, AlignmentGuide, GuideKind, SnapResult};
pub use gesture::{Gesture, GestureKind, ResizeHandle};
pub use sizing::{
    apply_layer_styles, classify_video_layer, compute_placement, fit_within, layout_video,
    SpatialPlacement, VideoLayout,
};

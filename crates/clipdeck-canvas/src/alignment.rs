//! Alignment guides and snapping for overlays dragged on the canvas.
//!
//! Each axis is resolved on its own. Within the snap threshold, canvas edges
//! win over the canvas center, which wins over other overlays; among targets
//! of equal priority the closest one wins.

use clipdeck_core::{Overlay, OverlayId, Rect, Size};
use serde::Serialize;
use smallvec::SmallVec;

/// Kind of alignment guide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum GuideKind {
    CanvasCenterX,
    CanvasCenterY,
    CanvasEdgeLeft,
    CanvasEdgeRight,
    CanvasEdgeTop,
    CanvasEdgeBottom,
    ElementEdgeLeft,
    ElementEdgeRight,
    ElementEdgeTop,
    ElementEdgeBottom,
    ElementCenterX,
    ElementCenterY,
}

impl GuideKind {
    /// Lower wins.
    fn priority(self) -> u8 {
        match self {
            Self::CanvasEdgeLeft
            | Self::CanvasEdgeRight
            | Self::CanvasEdgeTop
            | Self::CanvasEdgeBottom => 0,
            Self::CanvasCenterX | Self::CanvasCenterY => 1,
            _ => 2,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::CanvasCenterX => "canvas-center-x",
            Self::CanvasCenterY => "canvas-center-y",
            Self::CanvasEdgeLeft => "canvas-edge-left",
            Self::CanvasEdgeRight => "canvas-edge-right",
            Self::CanvasEdgeTop => "canvas-edge-top",
            Self::CanvasEdgeBottom => "canvas-edge-bottom",
            Self::ElementEdgeLeft => "element-edge-left",
            Self::ElementEdgeRight => "element-edge-right",
            Self::ElementEdgeTop => "element-edge-top",
            Self::ElementEdgeBottom => "element-edge-bottom",
            Self::ElementCenterX => "element-center-x",
            Self::ElementCenterY => "element-center-y",
        }
    }
}

/// An alignment line shown while a gesture is active.
///
/// Vertical guides carry `x`, horizontal guides carry `y`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlignmentGuide {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: GuideKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<f32>,
}

/// Which part of the dragged overlay lines up with a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Anchor {
    Start,
    Center,
    End,
}

impl Anchor {
    fn offset(self, extent: f32) -> f32 {
        match self {
            Self::Start => 0.0,
            Self::Center => extent * 0.5,
            Self::End => extent,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    X,
    Y,
}

/// A line the dragged overlay may snap to.
#[derive(Debug, Clone)]
struct SnapTarget<'a> {
    kind: GuideKind,
    line: f32,
    anchor: Anchor,
    source: Option<&'a OverlayId>,
}

impl SnapTarget<'_> {
    fn guide(&self, axis: Axis) -> AlignmentGuide {
        let id = match self.source {
            Some(source) => format!("{}-{}", self.kind.as_str(), source),
            None => self.kind.as_str().to_string(),
        };
        let (x, y) = match axis {
            Axis::X => (Some(self.line), None),
            Axis::Y => (None, Some(self.line)),
        };
        AlignmentGuide {
            id,
            kind: self.kind,
            x,
            y,
        }
    }
}

/// Outcome of snapping one pointer position.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapResult {
    pub left: f32,
    pub top: f32,
    pub guides: SmallVec<[AlignmentGuide; 2]>,
}

/// Engine for computing alignment guides and snapped positions.
#[derive(Debug, Clone)]
pub struct AlignmentEngine {
    pub enabled: bool,
    /// Snap distance as a fraction of the smaller canvas dimension.
    pub threshold_ratio: f32,
    guides: SmallVec<[AlignmentGuide; 2]>,
}

impl AlignmentEngine {
    pub fn new(threshold_ratio: f32) -> Self {
        Self {
            enabled: true,
            threshold_ratio,
            guides: SmallVec::new(),
        }
    }

    /// Snap distance in canvas pixels.
    pub fn threshold(&self, canvas: Size) -> f32 {
        self.threshold_ratio * canvas.min_dimension()
    }

    /// Guides for the current gesture; empty when nothing is being dragged.
    pub fn guides(&self) -> &[AlignmentGuide] {
        &self.guides
    }

    /// Drop all guides (pointer released or gesture cancelled).
    pub fn clear(&mut self) {
        self.guides.clear();
    }

    /// Recompute the guide set for the candidate's current position.
    ///
    /// Returns true when the visible guides changed.
    pub fn update_guides(&mut self, candidate: &Overlay, all: &[Overlay], canvas: Size) -> bool {
        let next = if candidate.is_dragging && self.enabled {
            self.snap(candidate.rect(), &candidate.id, all, canvas).guides
        } else {
            SmallVec::new()
        };
        let changed = next != self.guides;
        self.guides = next;
        changed
    }

    /// Position the candidate should take, `(left, top)`.
    ///
    /// Only dragging overlays snap; anything else keeps its position.
    pub fn calculate_snap_position(
        &self,
        candidate: &Overlay,
        all: &[Overlay],
        canvas: Size,
    ) -> (f32, f32) {
        if !candidate.is_dragging || !self.enabled {
            return (candidate.left, candidate.top);
        }
        let result = self.snap(candidate.rect(), &candidate.id, all, canvas);
        (result.left, result.top)
    }

    /// Snap `rect` (the raw pointer-derived geometry of `id`) against the
    /// canvas and the other visual overlays.
    pub fn snap(&self, rect: Rect, id: &OverlayId, all: &[Overlay], canvas: Size) -> SnapResult {
        let threshold = self.threshold(canvas);
        let others: Vec<&Overlay> = all
            .iter()
            .filter(|o| o.is_visual() && !o.id.same_as(id))
            .collect();

        let mut guides = SmallVec::new();

        let x_targets = collect_targets(Axis::X, canvas, &others);
        let left = match best_match(rect.x, rect.width, &x_targets, threshold) {
            Some(target) => {
                guides.push(target.guide(Axis::X));
                target.line - target.anchor.offset(rect.width)
            }
            None => rect.x,
        };

        let y_targets = collect_targets(Axis::Y, canvas, &others);
        let top = match best_match(rect.y, rect.height, &y_targets, threshold) {
            Some(target) => {
                guides.push(target.guide(Axis::Y));
                target.line - target.anchor.offset(rect.height)
            }
            None => rect.y,
        };

        SnapResult { left, top, guides }
    }
}

impl Default for AlignmentEngine {
    fn default() -> Self {
        Self::new(0.01)
    }
}

/// Collect all snap targets along one axis.
fn collect_targets<'a>(axis: Axis, canvas: Size, others: &[&'a Overlay]) -> Vec<SnapTarget<'a>> {
    let (extent, start_kind, end_kind, center_kind) = match axis {
        Axis::X => (
            canvas.width,
            GuideKind::CanvasEdgeLeft,
            GuideKind::CanvasEdgeRight,
            GuideKind::CanvasCenterX,
        ),
        Axis::Y => (
            canvas.height,
            GuideKind::CanvasEdgeTop,
            GuideKind::CanvasEdgeBottom,
            GuideKind::CanvasCenterY,
        ),
    };

    let mut targets = vec![
        SnapTarget {
            kind: start_kind,
            line: 0.0,
            anchor: Anchor::Start,
            source: None,
        },
        SnapTarget {
            kind: end_kind,
            line: extent,
            anchor: Anchor::End,
            source: None,
        },
        SnapTarget {
            kind: center_kind,
            line: extent * 0.5,
            anchor: Anchor::Center,
            source: None,
        },
    ];

    for &other in others {
        let r = other.rect();
        let (start, end, center, kinds) = match axis {
            Axis::X => (
                r.x,
                r.right(),
                r.center().x,
                (
                    GuideKind::ElementEdgeLeft,
                    GuideKind::ElementEdgeRight,
                    GuideKind::ElementCenterX,
                ),
            ),
            Axis::Y => (
                r.y,
                r.bottom(),
                r.center().y,
                (
                    GuideKind::ElementEdgeTop,
                    GuideKind::ElementEdgeBottom,
                    GuideKind::ElementCenterY,
                ),
            ),
        };
        // Either edge of the dragged overlay may meet either edge of another.
        for (kind, line) in [(kinds.0, start), (kinds.1, end)] {
            for anchor in [Anchor::Start, Anchor::End] {
                targets.push(SnapTarget {
                    kind,
                    line,
                    anchor,
                    source: Some(&other.id),
                });
            }
        }
        targets.push(SnapTarget {
            kind: kinds.2,
            line: center,
            anchor: Anchor::Center,
            source: Some(&other.id),
        });
    }

    targets
}

/// Best target within `threshold`: lowest priority first, then closest.
fn best_match<'t, 'a>(
    origin: f32,
    extent: f32,
    targets: &'t [SnapTarget<'a>],
    threshold: f32,
) -> Option<&'t SnapTarget<'a>> {
    let mut best: Option<(&SnapTarget, u8, f32)> = None;

    for target in targets {
        let dist = (origin + target.anchor.offset(extent) - target.line).abs();
        if dist > threshold {
            continue;
        }
        let priority = target.kind.priority();
        let better = match best {
            None => true,
            Some((_, p, d)) => priority < p || (priority == p && dist < d),
        };
        if better {
            best = Some((target, priority, dist));
        }
    }

    best.map(|(target, _, _)| target)
}

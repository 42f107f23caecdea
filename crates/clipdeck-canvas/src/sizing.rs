//! Spatial sizing for newly placed visual overlays.
//!
//! An asset whose aspect ratio matches the canvas fills it; anything else is
//! scaled to fit inside the canvas and centered. The result is always clamped
//! to the canvas so rounding can never leave an overlay partly off-screen.

use clipdeck_core::{style_keys, Layer, Overlay, OverlayKind, Rect, Size, Styles};

/// Where a new overlay lands on the canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpatialPlacement {
    pub rect: Rect,
    pub fills_canvas: bool,
}

impl SpatialPlacement {
    pub fn full_canvas(canvas: Size) -> Self {
        Self {
            rect: Rect::from_size(canvas),
            fills_canvas: true,
        }
    }
}

/// Compute the placement of an asset on the canvas.
///
/// `asset` is the natural size of the media; `None` (or a degenerate size)
/// means it is unknown and the overlay fills the canvas. `aspect_tolerance`
/// is the largest absolute aspect-ratio difference still treated as a match.
pub fn compute_placement(
    asset: Option<Size>,
    canvas: Size,
    aspect_tolerance: f32,
) -> SpatialPlacement {
    let canvas_aspect = canvas.aspect_ratio();
    let asset_aspect = asset.and_then(Size::aspect_ratio);

    let placement = match (asset, asset_aspect, canvas_aspect) {
        (Some(asset), Some(a), Some(c)) if (a - c).abs() >= aspect_tolerance => {
            let size = fit_within(asset, canvas);
            SpatialPlacement {
                rect: Rect::new(
                    ((canvas.width - size.width) / 2.0).round(),
                    ((canvas.height - size.height) / 2.0).round(),
                    size.width,
                    size.height,
                ),
                fills_canvas: false,
            }
        }
        _ => SpatialPlacement::full_canvas(canvas),
    };

    SpatialPlacement {
        rect: placement.rect.clamp_within(canvas),
        ..placement
    }
}

/// Largest whole-pixel size with the asset's aspect ratio that fits inside
/// the canvas.
pub fn fit_within(asset: Size, canvas: Size) -> Size {
    let scale = (canvas.width / asset.width).min(canvas.height / asset.height);
    let width = (asset.width * scale).round().clamp(1.0, canvas.width.max(1.0));
    let height = (asset.height * scale).round().clamp(1.0, canvas.height.max(1.0));
    Size::new(width, height)
}

/// Whether an existing overlay already acts as the full-canvas base video.
fn is_background_video(overlay: &Overlay, canvas: Size) -> bool {
    if overlay.kind != OverlayKind::Video {
        return false;
    }
    match overlay.layer {
        Some(layer) => layer == Layer::Background,
        // Overlays created before layers were recorded: infer from geometry.
        None => {
            overlay.left == 0.0
                && overlay.top == 0.0
                && overlay.width == canvas.width
                && overlay.height == canvas.height
        }
    }
}

/// Decide the layer of a video about to be inserted.
///
/// Only a canvas-filling video becomes the background, and only while no
/// other background video exists.
pub fn classify_video_layer(fills_canvas: bool, existing: &[Overlay], canvas: Size) -> Layer {
    if fills_canvas && !existing.iter().any(|o| is_background_video(o, canvas)) {
        Layer::Background
    } else {
        Layer::Foreground
    }
}

/// Placement and layer of a video overlay.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VideoLayout {
    pub layer: Layer,
    pub placement: SpatialPlacement,
}

/// Lay out a new video against the current overlays.
pub fn layout_video(
    asset: Option<Size>,
    canvas: Size,
    existing: &[Overlay],
    aspect_tolerance: f32,
) -> VideoLayout {
    let placement = compute_placement(asset, canvas, aspect_tolerance);
    let layer = classify_video_layer(placement.fills_canvas, existing, canvas);
    let placement = match layer {
        Layer::Background => SpatialPlacement::full_canvas(canvas),
        Layer::Foreground => placement,
    };
    tracing::debug!(?layer, rect = ?placement.rect, "video layout");
    VideoLayout { layer, placement }
}

/// Write the stacking styles that belong to a layer.
pub fn apply_layer_styles(styles: &mut Styles, layer: Layer) {
    styles.set(style_keys::Z_INDEX, layer.z_index());
    styles.set(style_keys::OBJECT_FIT, layer.object_fit());
}

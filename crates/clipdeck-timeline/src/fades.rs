//! Audio fade limits.
//!
//! A fade may never push `fadeIn + fadeOut` past the media duration; the
//! edge being edited gives way, the other edge is kept.

/// Which fade is being edited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FadeEdge {
    In,
    Out,
}

/// Resulting fade pair, in seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fades {
    pub fade_in: f64,
    pub fade_out: f64,
}

impl Fades {
    pub fn total(self) -> f64 {
        self.fade_in + self.fade_out
    }
}

/// Clamp a requested fade against the current pair and the media duration.
pub fn clamp_fade(current: Fades, edge: FadeEdge, requested: f64, media_duration: f64) -> Fades {
    let media = if media_duration.is_finite() {
        media_duration.max(0.0)
    } else {
        0.0
    };
    let requested = if requested.is_finite() {
        requested.max(0.0)
    } else {
        0.0
    };

    match edge {
        FadeEdge::In => {
            let other = current.fade_out.clamp(0.0, media);
            Fades {
                fade_in: requested.min(media - other),
                fade_out: other,
            }
        }
        FadeEdge::Out => {
            let other = current.fade_in.clamp(0.0, media);
            Fades {
                fade_in: other,
                fade_out: requested.min(media - other),
            }
        }
    }
}

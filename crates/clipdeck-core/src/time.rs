//! Frame-based time representation.
//!
//! Overlay timing is stored in whole frames. The timeline widget works in
//! seconds, so conversions go through the project frame rate, which is kept
//! as a rational number to avoid drift at NTSC rates.

use num_rational::Rational64;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Frame rate as a rational number (e.g., 30000/1001 for 29.97 fps).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FrameRate {
    /// Numerator (e.g., 30000)
    pub numerator: u32,
    /// Denominator (e.g., 1001)
    pub denominator: u32,
}

impl FrameRate {
    /// Create a new frame rate.
    #[inline]
    pub const fn new(numerator: u32, denominator: u32) -> Self {
        Self {
            numerator,
            denominator,
        }
    }

    /// Convert to frames per second as f64.
    #[inline]
    pub fn to_fps_f64(self) -> f64 {
        self.numerator as f64 / self.denominator as f64
    }

    /// Exact rational frames-per-second value.
    #[inline]
    pub fn as_rational(self) -> Rational64 {
        Rational64::new(self.numerator as i64, self.denominator.max(1) as i64)
    }

    /// A frame rate is usable when both terms are non-zero.
    pub fn is_valid(self) -> bool {
        self.numerator > 0 && self.denominator > 0
    }

    /// Seconds at which `frames` begins.
    pub fn frames_to_seconds(self, frames: u64) -> f64 {
        let secs = Rational64::from_integer(frames as i64) / self.as_rational();
        *secs.numer() as f64 / *secs.denom() as f64
    }

    /// Nearest whole frame for a time in seconds.
    ///
    /// Returns a signed value so callers can detect negative input; `NaN`
    /// and infinities map to 0.
    pub fn seconds_to_frames(self, seconds: f64) -> i64 {
        let frames = (seconds * self.to_fps_f64()).round();
        if frames.is_finite() {
            frames as i64
        } else {
            0
        }
    }

    /// Nearest non-negative whole frame for a time in seconds.
    pub fn seconds_to_frame_offset(self, seconds: f64) -> u64 {
        self.seconds_to_frames(seconds).max(0) as u64
    }

    /// Common frame rates
    pub const FPS_23_976: Self = Self::new(24000, 1001);
    pub const FPS_24: Self = Self::new(24, 1);
    pub const FPS_25: Self = Self::new(25, 1);
    pub const FPS_29_97: Self = Self::new(30000, 1001);
    pub const FPS_30: Self = Self::new(30, 1);
    pub const FPS_50: Self = Self::new(50, 1);
    pub const FPS_59_94: Self = Self::new(60000, 1001);
    pub const FPS_60: Self = Self::new(60, 1);
}

impl Default for FrameRate {
    fn default() -> Self {
        Self::FPS_30
    }
}

impl fmt::Display for FrameRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fps = self.to_fps_f64();
        if (fps - fps.round()).abs() < 0.001 {
            write!(f, "{} fps", fps.round() as u32)
        } else {
            write!(f, "{:.3} fps", fps)
        }
    }
}

/// A half-open frame interval `[from, from + duration)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct FrameSpan {
    pub from: u64,
    pub duration: u64,
}

impl FrameSpan {
    #[inline]
    pub const fn new(from: u64, duration: u64) -> Self {
        Self { from, duration }
    }

    /// Span from start and end frames. An inverted range yields zero length.
    pub fn from_start_end(start: u64, end: u64) -> Self {
        Self {
            from: start,
            duration: end.saturating_sub(start),
        }
    }

    /// End frame (exclusive).
    #[inline]
    pub fn end(self) -> u64 {
        self.from + self.duration
    }

    /// Split into `[from, frame)` and `[frame, end)`.
    ///
    /// Both halves must be non-empty, so `frame` has to lie strictly inside.
    pub fn split_at(self, frame: u64) -> Option<(Self, Self)> {
        if frame <= self.from || frame >= self.end() {
            return None;
        }
        Some((
            Self::from_start_end(self.from, frame),
            Self::from_start_end(frame, self.end()),
        ))
    }
}

//! ClipDeck Core - Foundation types for overlay editing
//!
//! This crate provides the types shared by the canvas and timeline crates:
//! - Frame-based time (FrameRate, FrameSpan)
//! - Overlay ids and the overlay entity
//! - Canvas geometry
//! - Errors, configuration and logging setup

pub mod config;
pub mod error;
pub mod geometry;
pub mod id;
pub mod logging;
pub mod overlay;
pub mod time;

pub use config::{DefaultDurations, EngineConfig, LoggingConfig};
pub use error::{ClipDeckError, Result};
pub use geometry::{Rect, Size, Vec2};
pub use id::{OverlayId, AUDIO_ID_PREFIX};
pub use logging::init_logging;
pub use overlay::{style_keys, Layer, Overlay, OverlayKind, Styles, MAX_ROW};
pub use time::{FrameRate, FrameSpan};

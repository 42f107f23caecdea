//! Engine configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{ClipDeckError, Result};
use crate::overlay::OverlayKind;
use crate::time::FrameRate;

/// Tunables for the editing engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Project frame rate.
    pub frame_rate: FrameRate,

    /// Default durations for newly created overlays.
    pub durations: DefaultDurations,

    /// Absolute difference between asset and canvas aspect ratios
    /// (`|asset - canvas|`, width over height) under which an asset is
    /// treated as filling the canvas.
    pub aspect_tolerance: f32,

    /// Snap distance as a fraction of the smaller canvas dimension.
    pub snap_threshold_ratio: f32,

    /// Smallest width/height a canvas resize gesture may produce (pixels).
    pub min_overlay_size: f32,

    /// Delay before a batch track change is applied to the store (ms).
    pub deferred_apply_ms: u64,

    /// Upper bound for a media probe before falling back to defaults (ms).
    pub probe_timeout_ms: u64,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Duration, in seconds, used when an overlay's length is not known.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultDurations {
    pub video_secs: f64,
    pub image_secs: f64,
    pub audio_secs: f64,
    pub text_secs: f64,
    /// Everything else (shapes, stickers, captions, ...).
    pub other_secs: f64,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "clipdeck_timeline=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            frame_rate: FrameRate::FPS_30,
            durations: DefaultDurations::default(),
            aspect_tolerance: 0.01,
            snap_threshold_ratio: 0.01,
            min_overlay_size: 20.0,
            deferred_apply_ms: 500,
            probe_timeout_ms: 5_000,
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for DefaultDurations {
    fn default() -> Self {
        Self {
            video_secs: 10.0,
            image_secs: 10.0,
            audio_secs: 5.0,
            text_secs: 3.0,
            other_secs: 5.0,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl DefaultDurations {
    /// Fallback duration for a kind, in seconds.
    pub fn for_kind(&self, kind: OverlayKind) -> f64 {
        match kind {
            OverlayKind::Video => self.video_secs,
            OverlayKind::Image => self.image_secs,
            OverlayKind::Sound => self.audio_secs,
            OverlayKind::Text => self.text_secs,
            _ => self.other_secs,
        }
    }
}

impl EngineConfig {
    /// Fallback duration for a kind, in frames (at least one).
    pub fn default_duration_frames(&self, kind: OverlayKind) -> u64 {
        self.frame_rate
            .seconds_to_frame_offset(self.durations.for_kind(kind))
            .max(1)
    }

    /// Check values that would break the engine's arithmetic.
    pub fn validate(&self) -> Result<()> {
        if !self.frame_rate.is_valid() {
            return Err(ClipDeckError::Config(format!(
                "frame rate {}/{} is not usable",
                self.frame_rate.numerator, self.frame_rate.denominator
            )));
        }
        if !(0.0..1.0).contains(&self.snap_threshold_ratio) {
            return Err(ClipDeckError::Config(format!(
                "snap_threshold_ratio {} must be in [0, 1)",
                self.snap_threshold_ratio
            )));
        }
        if self.aspect_tolerance < 0.0 || self.min_overlay_size < 0.0 {
            return Err(ClipDeckError::Config(
                "tolerances and sizes must be non-negative".to_string(),
            ));
        }
        Ok(())
    }

    /// Load config from the standard location, falling back to defaults.
    pub fn load() -> Self {
        match config_file_path() {
            Some(path) if path.exists() => Self::load_from(&path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config at {:?}: {}", path, e);
                Self::default()
            }),
            _ => Self::default(),
        }
    }

    /// Load and validate config from an explicit path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save config to the standard location.
    pub fn save(&self) -> Result<()> {
        let path = config_file_path()
            .ok_or_else(|| ClipDeckError::Config("no config directory available".into()))?;
        self.save_to(&path)
    }

    /// Save config to an explicit path, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

/// Standard config file location.
pub fn config_file_path() -> Option<PathBuf> {
    dirs::config_dir().map(|base| base.join("clipdeck").join("config.json"))
}

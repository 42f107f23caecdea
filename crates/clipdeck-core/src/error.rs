//! Error types for ClipDeck.

use thiserror::Error;

use crate::id::OverlayId;

/// Main error type for ClipDeck operations.
#[derive(Error, Debug)]
pub enum ClipDeckError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Overlay not found: {0}")]
    NotFound(OverlayId),

    #[error("Duplicate overlay id: {0}")]
    DuplicateId(OverlayId),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Invalid split: {0}")]
    InvalidSplit(String),

    #[error("Asset could not be resolved: {0}")]
    AssetUnresolved(String),

    #[error("Media probe failed: {0}")]
    Probe(String),

    #[error("Track reconciliation already in progress")]
    BatchInProgress,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Timeline error: {0}")]
    Timeline(String),
}

/// Result type alias for ClipDeck operations.
pub type Result<T> = std::result::Result<T, ClipDeckError>;

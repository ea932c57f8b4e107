//! Error types for the canvas engine.
//!
//! Most editing edge cases (locked items, undersized resizes, probe failures)
//! are resolved by policy and never surface here. These errors cover the
//! boundaries where outside data enters the engine.

use thiserror::Error;

/// Canvas errors.
#[derive(Debug, Error)]
pub enum CanvasError {
    #[error("Invalid configuration: {0}")]
    Config(#[source] serde_json::Error),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Snapshot error: {0}")]
    Snapshot(#[source] serde_json::Error),
    #[error("Malformed drop payload: {0}")]
    MalformedDrop(String),
    #[error("Arrangement failed: {0}")]
    Arrangement(String),
    #[error("Invalid artboard: {0}")]
    InvalidArtboard(String),
}

/// Result type for canvas operations.
pub type CanvasResult<T> = Result<T, CanvasError>;

//! Error taxonomy for the engine.
//!
//! Configuration errors are returned at construction time.  Missing targets
//! surface from [`Surface::apply`](super::surface::Surface::apply) and are
//! swallowed by the write batch, so nothing here ever stops the frame loop.

use thiserror::Error;

use super::surface::ElementId;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error("element {0:?} no longer exists")]
    MissingTarget(ElementId),

    #[error("progress range must be non-empty and finite (start {start}, end {end})")]
    InvalidProgressRange { start: f64, end: f64 },

    #[error("scrub factor must be a positive finite number, got {0}")]
    InvalidScrub(f64),

    #[error("half-life must be a positive finite number, got {0}")]
    InvalidHalfLife(f64),

    #[error("invalid intro timeline: {0}")]
    InvalidTimeline(String),
}

/// Failure of the persisted key-value store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

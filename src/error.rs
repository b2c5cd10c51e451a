use thiserror::Error;

/// Failures surfaced at the engine's API boundaries.
///
/// Recognition declines (no candidate close enough, warping path diverged)
/// are deliberate non-events inside the recognizer, not errors; persistence
/// failures are reported to callers of the facade as a boolean and logged.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("parameter out of range: {0}")]
    InvalidParameter(&'static str),

    #[error("frame buffer size mismatch: got {got}, expected {expected}")]
    DimensionMismatch { got: usize, expected: usize },

    #[error("gesture library io failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("gesture library format invalid: {0}")]
    Format(#[from] serde_json::Error),
}

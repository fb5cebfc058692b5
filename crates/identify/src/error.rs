use thiserror::Error;

/// A point event the engine refuses before doing anything.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum IdentifyError {
    #[error("point coordinate is not finite: ({x}, {y})")]
    NonFiniteCoordinate { x: f64, y: f64 },
    #[error("view resolution must be positive and finite, got {0}")]
    InvalidResolution(f64),
    #[error("zoom level is not finite: {0}")]
    InvalidZoom(f64),
}

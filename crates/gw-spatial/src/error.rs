//! Spatial-subsystem error type.

use thiserror::Error;

use gw_core::JunctionId;

/// Errors produced by `gw-spatial`.
///
/// The routing variants carry the failing indices so run reports can name
/// them.  `Unreachable` is recoverable — callers fall back to a direct
/// two-junction route where that makes sense; the spawn/destination variants
/// mean the graph is disconnected from every candidate and the run cannot
/// proceed.
#[derive(Debug, Error)]
pub enum SpatialError {
    #[error("no route from {from} to {to}")]
    Unreachable { from: JunctionId, to: JunctionId },

    #[error("no spawn candidate reachable from {reference}")]
    NoSpawnCandidate { reference: JunctionId },

    #[error("no destination reachable from {start}")]
    NoReachableDestination { start: JunctionId },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("destination file error: {0}")]
    Csv(#[from] csv::Error),
}

pub type SpatialResult<T> = Result<T, SpatialError>;

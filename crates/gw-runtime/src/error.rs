use thiserror::Error;

use gw_spatial::SpatialError;

#[derive(Debug, Error)]
pub enum RunError {
    #[error("session configuration error: {0}")]
    Config(String),

    #[error("{what} junction count {got} does not match graph junction count {expected}")]
    JunctionCountMismatch {
        expected: usize,
        got: usize,
        what: &'static str,
    },

    #[error(transparent)]
    Spatial(#[from] SpatialError),
}

pub type RunResult<T> = Result<T, RunError>;

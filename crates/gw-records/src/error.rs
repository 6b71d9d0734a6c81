//! Record-codec error type.

use thiserror::Error;

/// Errors produced by `gw-records`.
///
/// Malformed tokens are *not* errors — the reader skips and counts them
/// (see [`RecordScan::skipped`][crate::RecordScan]).
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type RecordResult<T> = Result<T, RecordError>;

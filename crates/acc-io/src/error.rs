//! Error types for acc-io.

use thiserror::Error;

use acc_core::CoreError;
use acc_spatial::SpatialError;

/// Errors raised while reading inputs or writing results.
#[derive(Debug, Error)]
pub enum IoError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("parse error: {0}")]
    Parse(String),

    #[error(transparent)]
    Spatial(#[from] SpatialError),

    #[error(transparent)]
    Core(#[from] CoreError),
}

/// Alias for `Result<T, IoError>`.
pub type IoResult<T> = Result<T, IoError>;

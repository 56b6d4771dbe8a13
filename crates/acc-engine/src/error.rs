use acc_spatial::SpatialError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AccessError {
    #[error("invalid cutoff {0} s: must be >= 0 and not NaN")]
    InvalidCutoff(f64),

    #[error(transparent)]
    Spatial(#[from] SpatialError),
}

pub type AccessResult<T> = Result<T, AccessError>;

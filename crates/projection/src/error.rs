//! Error types for projection setup and coordinate lookup.

use thiserror::Error;

pub type ProjectionResult<T> = Result<T, ProjectionError>;

#[derive(Debug, Error, PartialEq)]
pub enum ProjectionError {
    /// Only MAP_PROJ = 1 (Lambert Conformal) is understood
    #[error("expecting Lambert Conformal projection (MAP_PROJ = 1), found MAP_PROJ = {0}")]
    UnsupportedProjection(i32),

    #[error("invalid projection parameter: {0}")]
    InvalidParameter(String),

    #[error("location {lat:.4}N {lon:.4}E lies outside the grid")]
    OutsideGrid { lat: f64, lon: f64 },
}

//! Map projection for WRF model grids.
//!
//! Only the Lambert Conformal Conic projection (`MAP_PROJ = 1`) is
//! supported; the math is implemented directly rather than through PROJ.

pub mod error;
pub mod lambert;

pub use error::{ProjectionError, ProjectionResult};
pub use lambert::{center_longitude, GridCell, LambertConformal, LambertParams, EARTH_RADIUS_M};

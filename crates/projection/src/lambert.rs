//! Lambert Conformal Conic projection for WRF grids.
//!
//! WRF describes its grid through the global attributes `MAP_PROJ`,
//! `STAND_LON`, `TRUELAT1`, `TRUELAT2`, `DX` and `DY`; the position of the
//! grid on the cone is pinned by the south-west corner node (the first
//! element of `XLAT`/`XLONG`).
//!
//! The math follows the `llij_lc`/`ijll_lc` routines used by WRF itself:
//! - Cone constant from the two true latitudes (tangent cone when equal).
//! - Hemisphere sign taken from TRUELAT1 and multiplied through every
//!   angular term, so the southern hemisphere needs no separate formulas.
//! - Grid positions are measured in units of `DX` from the cone's pole point.
//!
//! Grid cells are zero-indexed `(i, j)` with `i` along `south_north` and `j`
//! along `west_east`, matching the storage order of WRF fields.

use serde::Serialize;

use crate::error::{ProjectionError, ProjectionResult};

/// Mean earth radius used by WRF (meters).
pub const EARTH_RADIUS_M: f64 = 6_370_000.0;

/// WRF `MAP_PROJ` code for Lambert Conformal.
const MAP_PROJ_LAMBERT: i32 = 1;

/// Normalize a longitude (or longitude difference) into [-180, 180).
pub fn center_longitude(lon: f64) -> f64 {
    (lon + 180.0).rem_euclid(360.0) - 180.0
}

/// Zero-indexed grid node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct GridCell {
    /// Row, along `south_north`
    pub i: usize,
    /// Column, along `west_east`
    pub j: usize,
}

impl GridCell {
    pub fn new(i: usize, j: usize) -> Self {
        Self { i, j }
    }

    /// One-based indices, as used in file names and on the command line.
    pub fn one_based(&self) -> (usize, usize) {
        (self.i + 1, self.j + 1)
    }
}

/// Raw projection attributes of a WRF dataset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LambertParams {
    pub map_proj: i32,
    pub stand_lon: f64,
    pub truelat1: f64,
    pub truelat2: f64,
    pub dx: f64,
    pub dy: f64,
    /// Latitude of grid node (0, 0)
    pub corner_lat: f64,
    /// Longitude of grid node (0, 0)
    pub corner_lon: f64,
}

/// Lambert Conformal projection of one WRF grid.
#[derive(Debug, Clone)]
pub struct LambertConformal {
    /// Central meridian in degrees, normalized
    pub stand_lon: f64,
    /// First true latitude in degrees
    pub truelat1: f64,
    /// Second true latitude in degrees
    pub truelat2: f64,
    /// Grid spacing in X direction (meters)
    pub dx: f64,
    /// Grid spacing in Y direction (meters)
    pub dy: f64,
    /// South-west corner latitude in degrees
    pub corner_lat: f64,
    /// South-west corner longitude in degrees
    pub corner_lon: f64,
    /// Earth radius (meters)
    pub earth_radius: f64,
    /// +1 for northern, -1 for southern hemisphere grids
    hemi: f64,
    /// Cone constant (n)
    cone: f64,
    /// Earth radius in grid units
    rebydx: f64,
    /// Pole point in one-based grid units
    pole_x: f64,
    pole_y: f64,
}

impl LambertConformal {
    /// Build the projection, rejecting anything that is not Lambert Conformal.
    pub fn new(params: LambertParams) -> ProjectionResult<Self> {
        if params.map_proj != MAP_PROJ_LAMBERT {
            return Err(ProjectionError::UnsupportedProjection(params.map_proj));
        }
        if !(params.dx > 0.0) {
            return Err(ProjectionError::InvalidParameter(format!(
                "DX must be positive, got {}",
                params.dx
            )));
        }
        for truelat in [params.truelat1, params.truelat2] {
            if truelat == 0.0 || truelat.abs() >= 90.0 {
                return Err(ProjectionError::InvalidParameter(format!(
                    "true latitude {} outside (0, 90) degrees",
                    truelat
                )));
            }
        }

        let stand_lon = center_longitude(params.stand_lon);
        let truelat1 = params.truelat1;
        let truelat2 = params.truelat2;
        let hemi = if truelat1 < 0.0 { -1.0 } else { 1.0 };

        let cone = if (truelat1 - truelat2).abs() < 1e-10 {
            // Tangent cone
            truelat1.abs().to_radians().sin()
        } else {
            // Secant cone
            let ln_cos = truelat1.to_radians().cos().ln() - truelat2.to_radians().cos().ln();
            let ln_tan = ((90.0 - truelat1.abs()).to_radians() * 0.5).tan().ln()
                - ((90.0 - truelat2.abs()).to_radians() * 0.5).tan().ln();
            ln_cos / ln_tan
        };
        if !cone.is_finite() || cone == 0.0 {
            return Err(ProjectionError::InvalidParameter(format!(
                "degenerate cone constant {} for true latitudes {} and {}",
                cone, truelat1, truelat2
            )));
        }

        let earth_radius = EARTH_RADIUS_M;
        let rebydx = earth_radius / params.dx;

        let mut proj = Self {
            stand_lon,
            truelat1,
            truelat2,
            dx: params.dx,
            dy: params.dy,
            corner_lat: params.corner_lat,
            corner_lon: params.corner_lon,
            earth_radius,
            hemi,
            cone,
            rebydx,
            pole_x: 0.0,
            pole_y: 0.0,
        };

        // Radius to the south-west corner, which sits at one-based (1, 1)
        let dlon1 = center_longitude(params.corner_lon - stand_lon);
        let rsw = proj.radius(params.corner_lat);
        let theta1 = (cone * dlon1).to_radians();
        proj.pole_x = hemi * 1.0 - hemi * rsw * theta1.sin();
        proj.pole_y = hemi * 1.0 + rsw * theta1.cos();

        Ok(proj)
    }

    /// Cone constant.
    pub fn cone(&self) -> f64 {
        self.cone
    }

    /// Hemisphere sign derived from TRUELAT1.
    pub fn hemisphere(&self) -> f64 {
        self.hemi
    }

    /// Distance from the pole point to a latitude circle, in grid units.
    fn radius(&self, lat: f64) -> f64 {
        let hemi = self.hemi;
        self.rebydx * self.truelat1.to_radians().cos() / self.cone
            * (((90.0 * hemi - lat).to_radians() * 0.5).tan()
                / ((90.0 * hemi - self.truelat1).to_radians() * 0.5).tan())
            .powf(self.cone)
    }

    /// Unrounded zero-based `(i, j)` position of a geographic point.
    pub fn inverse_fractional(&self, lat: f64, lon: f64) -> (f64, f64) {
        let rm = self.radius(lat);
        let theta = (self.cone * center_longitude(lon - self.stand_lon)).to_radians();

        let x = self.pole_x + self.hemi * rm * theta.sin();
        let y = self.pole_y - rm * theta.cos();

        (self.hemi * y - 1.0, self.hemi * x - 1.0)
    }

    /// Grid node nearest to a geographic point.
    pub fn inverse(&self, lat: f64, lon: f64) -> ProjectionResult<GridCell> {
        let (fi, fj) = self.inverse_fractional(lat, lon);
        let i = fi.round_ties_even();
        let j = fj.round_ties_even();
        if !(i >= 0.0 && j >= 0.0) {
            return Err(ProjectionError::OutsideGrid { lat, lon });
        }
        Ok(GridCell::new(i as usize, j as usize))
    }

    /// Geographic `(lat, lon)` of a fractional zero-based grid position.
    pub fn forward_fractional(&self, i: f64, j: f64) -> (f64, f64) {
        let hemi = self.hemi;
        let chi1 = (90.0 - hemi * self.truelat1).to_radians();

        let xx = hemi * (j + 1.0) - self.pole_x;
        let yy = self.pole_y - hemi * (i + 1.0);
        let r2 = xx * xx + yy * yy;

        if r2 == 0.0 {
            return (hemi * 90.0, self.stand_lon);
        }

        let r = r2.sqrt() / self.rebydx;
        let lon = self.stand_lon + (hemi * xx).atan2(yy).to_degrees() / self.cone;
        let chi = 2.0
            * ((r * self.cone / chi1.sin()).powf(1.0 / self.cone) * (chi1 * 0.5).tan()).atan();
        let lat = (90.0 - chi.to_degrees()) * hemi;

        (lat, center_longitude(lon))
    }

    /// Geographic `(lat, lon)` of a grid node.
    pub fn forward(&self, cell: GridCell) -> (f64, f64) {
        self.forward_fractional(cell.i as f64, cell.j as f64)
    }

    /// Angle (degrees) between grid-aligned and geographic axes at a point.
    pub fn rotation_angle(&self, lat: f64, lon: f64) -> f64 {
        sign(lat) * center_longitude(lon - self.stand_lon) * self.cone
    }

    /// Rotate a grid-aligned vector onto geographic east/north components.
    pub fn rotate(&self, u: f64, v: f64, lat: f64, lon: f64) -> (f64, f64) {
        let alpha = self.rotation_angle(lat, lon).to_radians();
        let (sin_alpha, cos_alpha) = alpha.sin_cos();
        (v * sin_alpha + u * cos_alpha, v * cos_alpha - u * sin_alpha)
    }
}

/// Sign with zero mapping to zero.
fn sign(x: f64) -> f64 {
    if x > 0.0 {
        1.0
    } else if x < 0.0 {
        -1.0
    } else {
        0.0
    }
}

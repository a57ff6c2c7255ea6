//! Common test fixtures for WRF post-processing tests.

use chrono::{NaiveDate, NaiveDateTime};
use projection::{LambertConformal, LambertParams};

/// Domain name used by fixtures.
pub const DOMAIN: &str = "kansas";

/// A WRF grid: projection attributes plus mass-point dimensions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WrfGrid {
    pub params: LambertParams,
    /// Length of `south_north`
    pub south_north: usize,
    /// Length of `west_east`
    pub west_east: usize,
}

impl WrfGrid {
    pub fn projection(&self) -> LambertConformal {
        LambertConformal::new(self.params).expect("fixture grid parameters are valid")
    }

    /// `XLAT` and `XLONG` at every mass point, row-major.
    pub fn coordinates(&self) -> (Vec<f64>, Vec<f64>) {
        let proj = self.projection();
        let n = self.south_north * self.west_east;
        let mut lats = Vec::with_capacity(n);
        let mut lons = Vec::with_capacity(n);
        for i in 0..self.south_north {
            for j in 0..self.west_east {
                let (lat, lon) = proj.forward_fractional(i as f64, j as f64);
                lats.push(lat);
                lons.push(lon);
            }
        }
        (lats, lons)
    }

    pub fn size(&self) -> usize {
        self.south_north * self.west_east
    }
}

/// Common grid definitions.
pub mod grid {
    use super::*;

    /// Small 3 km grid over eastern Kansas, tangent cone at 38.5N.
    pub const KANSAS_3KM: WrfGrid = WrfGrid {
        params: LambertParams {
            map_proj: 1,
            stand_lon: -97.5,
            truelat1: 38.5,
            truelat2: 38.5,
            dx: 3000.0,
            dy: 3000.0,
            corner_lat: 38.0,
            corner_lon: -97.0,
        },
        south_north: 8,
        west_east: 10,
    };

    /// Secant cone in the southern hemisphere.
    pub const SOUTHERN_12KM: WrfGrid = WrfGrid {
        params: LambertParams {
            map_proj: 1,
            stand_lon: 147.0,
            truelat1: -30.0,
            truelat2: -60.0,
            dx: 12000.0,
            dy: 12000.0,
            corner_lat: -40.0,
            corner_lon: 144.0,
        },
        south_north: 6,
        west_east: 6,
    };
}

/// Midnight of the given date.
pub fn midnight(year: i32, month: u32, day: u32) -> NaiveDateTime {
    at(year, month, day, 0)
}

/// Top of the given hour.
pub fn at(year: i32, month: u32, day: u32, hour: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|d| d.and_hms_opt(hour, 0, 0))
        .expect("fixture date is valid")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_coordinates_start_at_corner() {
        let g = grid::KANSAS_3KM;
        let (lats, lons) = g.coordinates();
        assert_eq!(lats.len(), g.size());
        assert!((lats[0] - 38.0).abs() < 1e-6);
        assert!((lons[0] - -97.0).abs() < 1e-6);
        // Northward along rows
        assert!(lats[g.west_east] > lats[0]);
        // Eastward along columns
        assert!(lons[1] > lons[0]);
    }

    #[test]
    fn test_southern_grid_is_valid() {
        let g = grid::SOUTHERN_12KM;
        let proj = g.projection();
        assert_eq!(proj.hemisphere(), -1.0);

        let (lats, lons) = g.coordinates();
        assert!((lats[0] - -40.0).abs() < 1e-6);
        assert!((lons[0] - 144.0).abs() < 1e-6);
        assert!(lats[g.west_east] > lats[0]);
        assert!(lons[1] > lons[0]);

        // Every node maps back onto itself
        for (n, (lat, lon)) in lats.iter().zip(&lons).enumerate() {
            let cell = proj.inverse(*lat, *lon).unwrap();
            assert_eq!((cell.i, cell.j), (n / g.west_east, n % g.west_east));
        }
    }
}

//! Per-chunk metadata: simulation start, valid times and grid projection.

use chrono::{Duration, NaiveDateTime};
use ems_common::time::parse_wrf_date;
use projection::{GridCell, LambertConformal, LambertParams, ProjectionError};
use tracing::debug;

use crate::dataset::Dataset;
use crate::error::{NetCdfError, NetCdfResult};
use crate::extract::{extract, Field, Selection, Slice};

/// Metadata of one WRF output file.
#[derive(Debug, Clone)]
pub struct ChunkMetadata {
    /// `TITLE` global attribute, if present
    pub title: Option<String>,
    /// `START_DATE` global attribute
    pub start_date: NaiveDateTime,
    /// Valid time of every record, `START_DATE + XTIME`
    pub times: Vec<NaiveDateTime>,
    pub projection: LambertConformal,
}

impl ChunkMetadata {
    pub fn read<D: Dataset + ?Sized>(dataset: &D) -> NetCdfResult<Self> {
        let projection = read_projection(dataset)?;

        let title = dataset
            .attribute("TITLE")
            .and_then(|v| v.as_str().map(|s| s.trim().to_string()));

        let start = dataset.require_attribute("START_DATE")?;
        let start = start
            .as_str()
            .ok_or_else(|| NetCdfError::InvalidAttribute {
                name: "START_DATE".to_string(),
                message: "expected text".to_string(),
            })?;
        let start_date = parse_wrf_date(start)?;

        // XTIME is stored as float minutes
        let xtime = extract(dataset, "XTIME", &Selection::all())?;
        let times = xtime
            .values
            .iter()
            .map(|&minutes| valid_time(start_date, minutes))
            .collect::<NetCdfResult<Vec<_>>>()?;

        debug!(
            start = %start_date,
            records = times.len(),
            "Read chunk metadata"
        );

        Ok(Self {
            title,
            start_date,
            times,
            projection,
        })
    }
}

/// `start + minutes`, rounded to the nearest whole minute.
///
/// Fill values and offsets outside the calendar are rejected.
fn valid_time(start: NaiveDateTime, minutes: f64) -> NetCdfResult<NaiveDateTime> {
    let invalid =
        || NetCdfError::InvalidFormat(format!("XTIME value {} is not a valid offset", minutes));
    if !minutes.is_finite() {
        return Err(invalid());
    }
    Duration::try_minutes(minutes.round_ties_even() as i64)
        .and_then(|offset| start.checked_add_signed(offset))
        .ok_or_else(invalid)
}

/// Build the grid projection from global attributes and the corner node.
pub fn read_projection<D: Dataset + ?Sized>(dataset: &D) -> NetCdfResult<LambertConformal> {
    let raw = dataset.require_f64("MAP_PROJ")?;
    if !raw.is_finite() || raw.fract() != 0.0 || raw.abs() > i32::MAX as f64 {
        return Err(NetCdfError::InvalidAttribute {
            name: "MAP_PROJ".to_string(),
            message: format!("expected an integer, got {}", raw),
        });
    }
    let map_proj = raw as i32;
    if map_proj != 1 {
        return Err(ProjectionError::UnsupportedProjection(map_proj).into());
    }

    let corner = Selection::at_cell(GridCell::new(0, 0)).with_time(Slice::Index(0));
    let corner_lat = extract(dataset, "XLAT", &corner)?;
    let corner_lon = extract(dataset, "XLONG", &corner)?;
    let corner_value = |field: &Field| {
        field.scalar().ok_or_else(|| NetCdfError::InvalidFormat(format!(
            "{} does not reduce to a single corner value",
            field.name
        )))
    };

    let params = LambertParams {
        map_proj,
        stand_lon: dataset.require_f64("STAND_LON")?,
        truelat1: dataset.require_f64("TRUELAT1")?,
        truelat2: dataset.require_f64("TRUELAT2")?,
        dx: dataset.require_f64("DX")?,
        dy: dataset.require_f64("DY")?,
        corner_lat: corner_value(&corner_lat)?,
        corner_lon: corner_value(&corner_lon)?,
    };
    Ok(LambertConformal::new(params)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::MemoryDataset;
    use chrono::NaiveDate;

    fn chunk(map_proj: i64) -> MemoryDataset {
        let grid = [("Time", 3), ("south_north", 2), ("west_east", 2)];
        MemoryDataset::new()
            .with_attribute("TITLE", " OUTPUT FROM WRF V3.7 MODEL")
            .with_attribute("START_DATE", "2015-02-26_12:00:00")
            .with_attribute("MAP_PROJ", map_proj)
            .with_attribute("STAND_LON", -97.5)
            .with_attribute("TRUELAT1", 38.5)
            .with_attribute("TRUELAT2", 38.5)
            .with_attribute("DX", 3000.0)
            .with_attribute("DY", 3000.0)
            .with_variable(
                "XTIME",
                &[("Time", 3)],
                Some("minutes since 2015-02-26 12:00:00"),
                vec![0.0, 59.99, 120.0],
            )
            .with_variable("XLAT", &grid, Some("degree_north"), vec![21.138; 12])
            .with_variable("XLONG", &grid, Some("degree_east"), vec![-122.72; 12])
    }

    #[test]
    fn test_read_metadata() {
        let meta = ChunkMetadata::read(&chunk(1)).unwrap();
        let start = NaiveDate::from_ymd_opt(2015, 2, 26)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();

        assert_eq!(meta.title.as_deref(), Some("OUTPUT FROM WRF V3.7 MODEL"));
        assert_eq!(meta.start_date, start);
        assert_eq!(
            meta.times,
            vec![start, start + Duration::hours(1), start + Duration::hours(2)]
        );
        assert!((meta.projection.corner_lat - 21.138).abs() < 1e-9);
    }

    #[test]
    fn test_rejects_other_projections() {
        let err = read_projection(&chunk(3)).unwrap_err();
        assert!(matches!(
            err,
            NetCdfError::Projection(ProjectionError::UnsupportedProjection(3))
        ));
    }

    #[test]
    fn test_malformed_start_date() {
        let ds = chunk(1).with_attribute("START_DATE", "26/02/2015");
        assert!(matches!(
            ChunkMetadata::read(&ds),
            Err(NetCdfError::Time(_))
        ));
    }

    #[test]
    fn test_missing_projection_attribute() {
        let ds = MemoryDataset::new().with_attribute("START_DATE", "2015-02-26_12:00:00");
        assert!(matches!(
            ChunkMetadata::read(&ds),
            Err(NetCdfError::MissingAttribute(ref name)) if name == "MAP_PROJ"
        ));
    }

    #[test]
    fn test_fill_valued_xtime_is_an_error() {
        for bad in [9.969209968386869e36, f64::NAN, f64::INFINITY, -1.0e18] {
            let ds = chunk(1).with_variable(
                "XTIME",
                &[("Time", 3)],
                Some("minutes since 2015-02-26 12:00:00"),
                vec![0.0, bad, 120.0],
            );
            assert!(
                matches!(ChunkMetadata::read(&ds), Err(NetCdfError::InvalidFormat(_))),
                "XTIME {} was accepted",
                bad
            );
        }
    }

    #[test]
    fn test_fractional_map_proj_is_not_truncated() {
        for raw in [1.9, 1.5, f64::NAN, 1.0e12] {
            let ds = chunk(1).with_attribute("MAP_PROJ", raw);
            assert!(
                matches!(
                    read_projection(&ds),
                    Err(NetCdfError::InvalidAttribute { ref name, .. }) if name == "MAP_PROJ"
                ),
                "MAP_PROJ {} was accepted",
                raw
            );
        }
        // Integral values stored as floats are still accepted
        let ds = chunk(1).with_attribute("MAP_PROJ", 1.0);
        assert!(read_projection(&ds).is_ok());
    }
}

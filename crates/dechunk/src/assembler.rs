//! Joins chunk outputs into one continuous hourly series at a site.
//!
//! Each chunk re-runs the model from `START_DATE`; its first
//! `spinup_hours` are discarded and the rest is appended after the rows of
//! the previous chunk. Transforms run over the whole chunk series before
//! the spin-up is dropped, so the first kept accumulation is differenced
//! against the last spin-up record of the same run.

use chrono::{Duration, NaiveDateTime};
use ems_common::HourEnding;
use netcdf_parser::{extract, ChunkMetadata, Dataset, NetCdfError, Selection, Slice};
use projection::{GridCell, LambertConformal};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::Location;
use crate::error::{DechunkError, DechunkResult};
use crate::fields::{wind_direction, wind_speed, FieldSpec, Transform};

/// One output record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeSeriesRow {
    pub valid_time: NaiveDateTime,
    /// One value per field, in field-table order
    pub values: Vec<f64>,
}

impl TimeSeriesRow {
    pub fn label(&self) -> HourEnding {
        HourEnding::from_valid_time(self.valid_time)
    }
}

/// The grid node a series is taken from, as written in the file header.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Site {
    pub cell: GridCell,
    /// `XLAT` at the node
    pub lat: f64,
    /// `XLONG` at the node
    pub lon: f64,
    /// `HGT` at the node (m)
    pub hgt: f64,
}

/// Appends chunk datasets, in chronological order, into one series.
pub struct TimeSeriesAssembler {
    location: Location,
    spinup: Duration,
    fields: Vec<FieldSpec>,
    site: Option<Site>,
    last_time: Option<NaiveDateTime>,
}

impl TimeSeriesAssembler {
    pub fn new(location: Location, spinup_hours: i64, fields: Vec<FieldSpec>) -> Self {
        Self {
            location,
            spinup: Duration::hours(spinup_hours),
            fields,
            site: None,
            last_time: None,
        }
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Site fixed by the first chunk.
    pub fn site(&self) -> Option<&Site> {
        self.site.as_ref()
    }

    /// Valid time of the last row returned.
    pub fn last_time(&self) -> Option<NaiveDateTime> {
        self.last_time
    }

    /// Read one chunk and return its rows that extend the series.
    ///
    /// `run` names the chunk in log records and errors.
    pub fn push_chunk<D: Dataset + ?Sized>(
        &mut self,
        dataset: &D,
        run: &str,
    ) -> DechunkResult<Vec<TimeSeriesRow>> {
        let meta = ChunkMetadata::read(dataset)?;
        let proj = &meta.projection;

        let cell = match self.location {
            Location::Cell(cell) => cell,
            Location::LatLon { lat, lon } => proj.inverse(lat, lon)?,
        };
        match &self.site {
            Some(site) if site.cell != cell => {
                return Err(DechunkError::CellMismatch {
                    run: run.to_string(),
                    expected: site.cell,
                    found: cell,
                });
            }
            Some(_) => {}
            None => {
                let site = read_site(dataset, cell)?;
                info!(
                    i = cell.i,
                    j = cell.j,
                    lat = site.lat,
                    lon = site.lon,
                    hgt = site.hgt,
                    "Resolved site"
                );
                self.site = Some(site);
            }
        }

        // Rotation is evaluated at the node, not the requested point
        let (lat, lon) = proj.forward(cell);

        let records = meta.times.len();
        let mut columns = Vec::with_capacity(self.fields.len());
        for field in &self.fields {
            columns.push(field_series(dataset, field, cell, proj, lat, lon, records)?);
        }

        let valid_from = meta.start_date + self.spinup;
        let interval = record_interval(&meta.times);
        let mut rows = Vec::new();
        let mut overlapping = 0usize;

        for (record, valid_time) in meta.times.iter().enumerate() {
            if *valid_time <= valid_from {
                continue;
            }
            if let Some(last) = self.last_time {
                if *valid_time <= last {
                    overlapping += 1;
                    continue;
                }
                if rows.is_empty() && *valid_time - last > interval {
                    warn!(
                        run,
                        after = %last,
                        resumes = %valid_time,
                        "Gap in series between chunks"
                    );
                }
            }
            rows.push(TimeSeriesRow {
                valid_time: *valid_time,
                values: columns.iter().map(|column| column[record]).collect(),
            });
        }

        if overlapping > 0 {
            warn!(
                run,
                rows = overlapping,
                "Dropped rows already covered by an earlier chunk"
            );
        }
        if let Some(last) = rows.last() {
            self.last_time = Some(last.valid_time);
        }

        debug!(
            run,
            records,
            kept = rows.len(),
            valid_from = %valid_from,
            "Assembled chunk"
        );
        Ok(rows)
    }
}

/// Latitude, longitude and elevation of a node at the first record.
fn read_site<D: Dataset + ?Sized>(dataset: &D, cell: GridCell) -> DechunkResult<Site> {
    let selection = Selection::at_cell(cell).with_time(Slice::Index(0));
    let value = |name: &str| -> DechunkResult<f64> {
        let field = extract(dataset, name, &selection)?;
        field.scalar().ok_or_else(|| {
            NetCdfError::InvalidFormat(format!("{} is not a surface field", name)).into()
        })
    };
    Ok(Site {
        cell,
        lat: value("XLAT")?,
        lon: value("XLONG")?,
        hgt: value("HGT")?,
    })
}

/// The full chunk series of one output column, transformed and rounded.
fn field_series<D: Dataset + ?Sized>(
    dataset: &D,
    field: &FieldSpec,
    cell: GridCell,
    proj: &LambertConformal,
    lat: f64,
    lon: f64,
    records: usize,
) -> DechunkResult<Vec<f64>> {
    let series = |name: &str| -> DechunkResult<Vec<f64>> {
        let values = extract(dataset, name, &Selection::at_cell(cell))?.values;
        if values.len() != records {
            return Err(DechunkError::SeriesLength {
                variable: name.to_string(),
                expected: records,
                found: values.len(),
            });
        }
        Ok(values)
    };

    let transformed = match &field.transform {
        Transform::WindSpeed { v_variable } | Transform::WindDirection { v_variable } => {
            let u = series(&field.variable)?;
            let v = series(v_variable)?;
            let speed = matches!(field.transform, Transform::WindSpeed { .. });
            u.iter()
                .zip(&v)
                .map(|(u, v)| {
                    let (east, north) = proj.rotate(*u, *v, lat, lon);
                    if speed {
                        wind_speed(east, north)
                    } else {
                        wind_direction(east, north)
                    }
                })
                .collect::<Vec<_>>()
        }
        transform => transform.apply(&series(&field.variable)?),
    };

    Ok(transformed.into_iter().map(|v| field.finish(v)).collect())
}

/// Spacing of output records, one hour when it cannot be inferred.
fn record_interval(times: &[NaiveDateTime]) -> Duration {
    match times {
        [first, second, ..] if second > first => *second - *first,
        _ => Duration::hours(1),
    }
}

//! Synthetic WRF chunk output.
//!
//! [`ChunkFixture`] builds an in-memory dataset shaped like a `wrfout` file:
//! projection attributes, `START_DATE`, `XTIME`, `XLAT`/`XLONG`/`HGT` and any
//! number of surface fields. Field values come from closures of the valid
//! time and grid node, so two overlapping chunks agree wherever they share
//! a valid time (accumulations excepted, which restart with each run).

use chrono::{Duration, NaiveDateTime};
use netcdf_parser::MemoryDataset;
use projection::GridCell;

use crate::fixtures::WrfGrid;

/// Where and when a generated value is sampled.
#[derive(Debug, Clone, Copy)]
pub struct Sample {
    pub valid_time: NaiveDateTime,
    /// Hours since `START_DATE`
    pub elapsed_hours: f64,
    pub cell: GridCell,
}

impl Sample {
    /// Hours since 2000-01-01, for time-of-day patterns shared across chunks.
    pub fn absolute_hours(&self) -> f64 {
        let epoch = crate::fixtures::midnight(2000, 1, 1);
        (self.valid_time - epoch).num_minutes() as f64 / 60.0
    }
}

type Generator = Box<dyn Fn(&Sample) -> f64>;

struct FieldGenerator {
    name: String,
    units: String,
    generate: Generator,
}

/// Builder for a synthetic chunk dataset.
pub struct ChunkFixture {
    grid: WrfGrid,
    start: NaiveDateTime,
    records: usize,
    interval_minutes: i64,
    fields: Vec<FieldGenerator>,
    omit: Vec<String>,
}

impl ChunkFixture {
    /// `records` hourly outputs starting at `start` (the simulation start).
    pub fn new(grid: WrfGrid, start: NaiveDateTime, records: usize) -> Self {
        Self {
            grid,
            start,
            records,
            interval_minutes: 60,
            fields: Vec::new(),
            omit: Vec::new(),
        }
    }

    /// Add a `(Time, south_north, west_east)` field.
    pub fn field(
        mut self,
        name: &str,
        units: &str,
        generate: impl Fn(&Sample) -> f64 + 'static,
    ) -> Self {
        self.fields.retain(|f| f.name != name);
        self.fields.push(FieldGenerator {
            name: name.to_string(),
            units: units.to_string(),
            generate: Box::new(generate),
        });
        self
    }

    /// Leave a variable out of the built dataset.
    pub fn without(mut self, name: &str) -> Self {
        self.omit.push(name.to_string());
        self
    }

    /// The fields a dechunk run reads, with smooth diurnal cycles.
    pub fn with_standard_fields(self) -> Self {
        use std::f64::consts::PI;

        self.field("T2", "K", |s| {
            let phase = 2.0 * PI * (s.absolute_hours() % 24.0) / 24.0;
            285.0 - 8.0 * phase.cos() + 0.1 * s.cell.i as f64 + 0.01 * s.cell.j as f64
        })
        .field("Q2", "kg kg-1", |s| 0.006 + 0.0001 * s.cell.i as f64)
        .field("RH02", "fraction", |s| {
            let phase = 2.0 * PI * (s.absolute_hours() % 24.0) / 24.0;
            0.6 + 0.2 * phase.cos()
        })
        .field("PSFC", "Pa", |s| 97_000.0 - 10.0 * s.cell.i as f64)
        .field("U10", "m s-1", |_| 3.0)
        .field("V10", "m s-1", |_| 4.0)
        .field("SWDOWN", "W m-2", |s| {
            let phase = 2.0 * PI * ((s.absolute_hours() - 6.0) % 24.0) / 24.0;
            (900.0 * phase.sin()).max(0.0)
        })
        .field("TACC_PRECIP", "mm", |s| 0.25 * s.elapsed_hours)
        .field("TACC_SNOW", "mm", |s| 0.05 * s.elapsed_hours)
    }

    /// Valid times of the generated records.
    pub fn times(&self) -> Vec<NaiveDateTime> {
        (0..self.records)
            .map(|r| self.start + Duration::minutes(r as i64 * self.interval_minutes))
            .collect()
    }

    pub fn build(self) -> MemoryDataset {
        let g = self.grid;
        let p = g.params;
        let nt = self.records;
        let grid_dims = [
            ("Time", nt),
            ("south_north", g.south_north),
            ("west_east", g.west_east),
        ];

        let xtime: Vec<f64> = (0..nt)
            .map(|r| (r as i64 * self.interval_minutes) as f64)
            .collect();
        let (lats, lons) = g.coordinates();
        let repeat = |plane: &[f64]| -> Vec<f64> {
            std::iter::repeat(plane).take(nt).flatten().copied().collect()
        };
        let hgt: Vec<f64> = (0..g.size()).map(|n| 300.0 + n as f64).collect();

        let mut ds = MemoryDataset::new()
            .with_attribute("TITLE", " OUTPUT FROM WRF V3.7.1 MODEL")
            .with_attribute(
                "START_DATE",
                self.start.format("%Y-%m-%d_%H:%M:%S").to_string().as_str(),
            )
            .with_attribute("MAP_PROJ", p.map_proj as i64)
            .with_attribute("STAND_LON", p.stand_lon)
            .with_attribute("TRUELAT1", p.truelat1)
            .with_attribute("TRUELAT2", p.truelat2)
            .with_attribute("DX", p.dx)
            .with_attribute("DY", p.dy)
            .with_variable(
                "XTIME",
                &[("Time", nt)],
                Some("minutes since simulation start"),
                xtime,
            )
            .with_variable("XLAT", &grid_dims, Some("degree_north"), repeat(&lats))
            .with_variable("XLONG", &grid_dims, Some("degree_east"), repeat(&lons))
            .with_variable("HGT", &grid_dims, Some("m"), repeat(&hgt))
            .with_variable(
                "Times",
                &[("Time", nt), ("DateStrLen", 19)],
                None,
                vec![0.0; nt * 19],
            );

        let times = self.times();
        for field in &self.fields {
            let mut values = Vec::with_capacity(nt * g.size());
            for (r, valid_time) in times.iter().enumerate() {
                for i in 0..g.south_north {
                    for j in 0..g.west_east {
                        let sample = Sample {
                            valid_time: *valid_time,
                            elapsed_hours: (r as i64 * self.interval_minutes) as f64 / 60.0,
                            cell: GridCell::new(i, j),
                        };
                        values.push((field.generate)(&sample));
                    }
                }
            }
            ds.insert_variable(&field.name, &grid_dims, Some(&field.units), values);
        }

        for name in &self.omit {
            ds.remove_variable(name);
        }
        ds
    }
}

//! `dechunk::run` over chunk runs written as real netCDF files.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use dechunk::{DechunkConfig, Location};
use ems_common::ChunkConfig;
use netcdf_parser::{AttrValue, Dataset, MemoryDataset};
use projection::GridCell;
use test_utils::{grid, ChunkFixture, RunTree, DOMAIN};

const GLOBAL_ATTRIBUTES: [&str; 8] = [
    "TITLE",
    "START_DATE",
    "MAP_PROJ",
    "STAND_LON",
    "TRUELAT1",
    "TRUELAT2",
    "DX",
    "DY",
];

/// Write every variable and the WRF global attributes of `dataset` to `path`.
fn write_netcdf(dataset: &MemoryDataset, path: &Path) -> Result<(), netcdf::Error> {
    let mut file = netcdf::create(path)?;

    let mut dims = BTreeSet::new();
    for name in dataset.variable_names() {
        for dim in dataset.variable_info(&name).unwrap().dimensions {
            if dims.insert(dim.name.clone()) {
                file.add_dimension(&dim.name, dim.len)?;
            }
        }
    }

    for name in GLOBAL_ATTRIBUTES {
        match dataset.attribute(name) {
            Some(AttrValue::Int(v)) => file.add_attribute(name, v as i32)?,
            Some(AttrValue::Float(v)) => file.add_attribute(name, v)?,
            Some(AttrValue::Text(v)) => file.add_attribute(name, v.as_str())?,
            None => continue,
        };
    }

    for name in dataset.variable_names() {
        let info = dataset.variable_info(&name).unwrap();
        let values = dataset.read_values(&name).unwrap();
        let mut var = file.add_variable::<f64>(&name, &info.dimension_names())?;
        if let Some(units) = &info.units {
            var.put_attribute("units", units.as_str())?;
        }
        var.put_values(&values, ..)?;
    }
    Ok(())
}

#[test]
fn test_run_reads_netcdf_chunks() {
    let tree = RunTree::create(DOMAIN, 1);
    let specs: Vec<_> = ChunkConfig::new(3, 12)
        .unwrap()
        .schedule(
            NaiveDate::from_ymd_opt(2015, 2, 21).unwrap(),
            NaiveDate::from_ymd_opt(2015, 2, 27).unwrap(),
        )
        .unwrap()
        .collect();
    assert_eq!(specs.len(), 2);

    for spec in &specs {
        let file = format!(
            "wrfout_d01_{}",
            spec.spinup_start.format("%Y-%m-%d_%H:%M:%S")
        );
        let run_dir = tree.add_run(&spec.chunk_start.format("%Y%m%d").to_string(), &[file.as_str()]);
        let dataset = ChunkFixture::new(grid::KANSAS_3KM, spec.spinup_start, spec.hours as usize + 1)
            .with_standard_fields()
            .build();
        write_netcdf(&dataset, &run_dir.join("wrfprd").join(&file)).unwrap();
    }

    let config = DechunkConfig::new(tree.path(), DOMAIN, Location::Cell(GridCell::new(2, 3)));
    let summary = dechunk::run(&config).unwrap();

    let expected_rows = (specs[1].chunk_end - specs[0].chunk_start).num_hours() as usize;
    assert_eq!(summary.chunks_read, 2);
    assert_eq!(summary.chunks_skipped, 0);
    assert_eq!(summary.rows, expected_rows);
    assert_eq!(summary.path, tree.path().join("kansas_i03_j04.csv"));

    let csv = fs::read_to_string(&summary.path).unwrap();
    assert_eq!(csv.lines().count(), 3 + expected_rows);
}

//! Reading a small `wrfout` file written through libnetcdf.

use std::path::Path;

use chrono::NaiveDate;
use netcdf_parser::{extract, ChunkMetadata, Dataset, DimensionSignature, Selection, Slice, WrfOutFile};
use projection::GridCell;

const NT: usize = 3;
const NY: usize = 2;
const NX: usize = 4;

fn write_wrfout(path: &Path) -> Result<(), netcdf::Error> {
    let mut file = netcdf::create(path)?;
    file.add_dimension("Time", NT)?;
    file.add_dimension("south_north", NY)?;
    file.add_dimension("west_east", NX)?;
    file.add_dimension("soil_layers_stag", 2)?;

    file.add_attribute("TITLE", " OUTPUT FROM WRF V3.7.1 MODEL")?;
    file.add_attribute("START_DATE", "2015-02-26_12:00:00")?;
    file.add_attribute("MAP_PROJ", 1i32)?;
    file.add_attribute("STAND_LON", -97.5f32)?;
    file.add_attribute("TRUELAT1", 38.5f32)?;
    file.add_attribute("TRUELAT2", 38.5f32)?;
    file.add_attribute("DX", 3000f32)?;
    file.add_attribute("DY", 3000f32)?;

    let grid = ["Time", "south_north", "west_east"];
    let plane = NY * NX;

    let mut xtime = file.add_variable::<f32>("XTIME", &["Time"])?;
    xtime.put_attribute("units", "minutes since 2015-02-26 12:00:00")?;
    xtime.put_values(&[0.0f32, 60.0, 120.0], ..)?;

    let mut xlat = file.add_variable::<f32>("XLAT", &grid)?;
    xlat.put_values(&vec![38.0f32; NT * plane], ..)?;
    let mut xlong = file.add_variable::<f32>("XLONG", &grid)?;
    xlong.put_values(&vec![-97.0f32; NT * plane], ..)?;

    let t2: Vec<f32> = (0..NT * plane).map(|n| 270.0 + n as f32).collect();
    let mut var = file.add_variable::<f32>("T2", &grid)?;
    var.put_attribute("units", "K")?;
    var.put_attribute("description", "TEMP at 2 M")?;
    var.put_values(&t2, ..)?;

    let soil: Vec<f32> = (0..NT * 2 * plane).map(|n| n as f32).collect();
    let mut var = file.add_variable::<f32>(
        "SMOIS",
        &["Time", "soil_layers_stag", "south_north", "west_east"],
    )?;
    var.put_attribute("units", "m3 m-3")?;
    var.put_values(&soil, ..)?;

    Ok(())
}

fn open_fixture() -> (tempfile::TempDir, WrfOutFile) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("wrfout_d01_2015-02-26_12:00:00");
    write_wrfout(&path).unwrap();
    let file = WrfOutFile::open(&path).unwrap();
    (dir, file)
}

#[test]
fn test_global_attributes() {
    let (_dir, file) = open_fixture();
    assert_eq!(file.require_f64("MAP_PROJ").unwrap(), 1.0);
    assert_eq!(file.require_f64("TRUELAT1").unwrap(), 38.5);
    assert!(file.attribute("NOT_THERE").is_none());
}

#[test]
fn test_chunk_metadata() {
    let (_dir, file) = open_fixture();
    let meta = ChunkMetadata::read(&file).unwrap();
    assert_eq!(meta.title.as_deref(), Some("OUTPUT FROM WRF V3.7.1 MODEL"));

    let start = NaiveDate::from_ymd_opt(2015, 2, 26)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap();
    assert_eq!(meta.start_date, start);
    assert_eq!(meta.times.len(), NT);
    assert_eq!(meta.times[2], start + chrono::Duration::hours(2));
    assert_eq!(meta.projection.stand_lon, -97.5);
}

#[test]
fn test_surface_series_at_node() {
    let (_dir, file) = open_fixture();
    let info = file.variable_info("T2").unwrap();
    assert_eq!(info.units.as_deref(), Some("K"));
    assert_eq!(info.description.as_deref(), Some("TEMP at 2 M"));

    let field = extract(&file, "T2", &Selection::at_cell(GridCell::new(1, 2))).unwrap();
    assert_eq!(field.signature, DimensionSignature::Surface);
    // Flat index of (1, 2) is 6 within each 8-value plane
    assert_eq!(field.values, vec![276.0, 284.0, 292.0]);
}

#[test]
fn test_soil_layer_selection() {
    let (_dir, file) = open_fixture();
    let selection = Selection::at_cell(GridCell::new(0, 1))
        .with_time(Slice::Index(1))
        .with_soil(Slice::Index(1));
    let field = extract(&file, "SMOIS", &selection).unwrap();
    // Record 1, layer 1, node (0, 1): 1 * 16 + 1 * 8 + 1
    assert_eq!(field.scalar(), Some(25.0));
}

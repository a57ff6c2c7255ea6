//! Assembly from a real `wrfout` sample, when one is available locally.

use dechunk::{default_fields, Location, TimeSeriesAssembler};
use netcdf_parser::{ChunkMetadata, WrfOutFile};
use projection::GridCell;
use test_utils::require_test_file;

#[test]
fn test_sample_chunk_assembles() {
    let path = require_test_file!("wrfout_d01_sample.nc");
    let file = WrfOutFile::open(&path).unwrap();
    let meta = ChunkMetadata::read(&file).unwrap();

    let mut assembler = TimeSeriesAssembler::new(Location::Cell(GridCell::new(0, 0)), 0, default_fields());
    let rows = assembler.push_chunk(&file, "sample").unwrap();

    // Everything after START_DATE is kept without spin-up
    assert_eq!(rows.len(), meta.times.len() - 1);
    for row in &rows {
        assert_eq!(row.values.len(), default_fields().len());
        assert!(row.values.iter().all(|v| v.is_finite()));
        // Temperature in Celsius
        assert!((-90.0..60.0).contains(&row.values[0]));
    }
}

//! De-chunking of WRF EMS runs.
//!
//! A long simulation is run as a sequence of short chunks, each in its own
//! `<domain>_YYYYMMDD` directory and each starting with a spin-up period.
//! This crate walks those chunks in order and writes one continuous hourly
//! CSV series for a single site.
//!
//! ```ignore
//! use dechunk::{DechunkConfig, Location};
//!
//! let config = DechunkConfig::new("/data/ems/runs", "kansas", Location::LatLon {
//!     lat: 39.0997,
//!     lon: -94.5786,
//! });
//! let summary = dechunk::run(&config)?;
//! println!("wrote {}", summary.path.display());
//! ```

pub mod assembler;
pub mod config;
pub mod discovery;
pub mod error;
pub mod fields;
pub mod writer;

use std::path::{Path, PathBuf};

use netcdf_parser::{Dataset, NetCdfResult};
use projection::GridCell;
use serde::Serialize;
use tracing::{info, warn};

pub use assembler::{Site, TimeSeriesAssembler, TimeSeriesRow};
pub use config::{DechunkConfig, Location, DEFAULT_SPINUP_HOURS};
pub use discovery::{chunk_run_dirs, count_nests, find_chunk_output, resolve_nest, ChunkOutput};
pub use error::{DechunkError, DechunkResult};
pub use fields::{default_fields, load_field_table, FieldSpec, Transform};
pub use writer::{format_g6, output_file_name, SeriesWriter};

/// Outcome of a de-chunk run.
#[derive(Debug, Clone, Serialize)]
pub struct DechunkSummary {
    /// Written CSV file
    pub path: PathBuf,
    pub cell: GridCell,
    pub nest: u32,
    pub rows: usize,
    /// Chunks that contributed output
    pub chunks_read: usize,
    /// Chunks without an output file
    pub chunks_skipped: usize,
}

/// De-chunk real `wrfout` files.
pub fn run(config: &DechunkConfig) -> DechunkResult<DechunkSummary> {
    dechunk_with(config, netcdf_parser::WrfOutFile::open)
}

/// De-chunk with a caller-supplied dataset opener.
///
/// Each dataset is dropped before the next chunk is opened.
pub fn dechunk_with<D, F>(config: &DechunkConfig, mut open: F) -> DechunkResult<DechunkSummary>
where
    D: Dataset,
    F: FnMut(&Path) -> NetCdfResult<D>,
{
    config.validate()?;

    let nests = count_nests(&config.domain_dir())?;
    let nest = resolve_nest(config.nest, nests)?;
    let run_dirs = chunk_run_dirs(&config.run_root, &config.domain)?;
    info!(
        domain = %config.domain,
        nest,
        nests,
        chunks = run_dirs.len(),
        "Starting de-chunk"
    );

    let mut assembler =
        TimeSeriesAssembler::new(config.location, config.spinup_hours, config.fields.clone());
    let mut writer: Option<SeriesWriter> = None;
    let mut chunks_read = 0;
    let mut chunks_skipped = 0;

    for run_dir in &run_dirs {
        let run = run_dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        info!(run = %run, "De-chunking");

        let path = match find_chunk_output(run_dir, nest)? {
            ChunkOutput::Single(path) => path,
            ChunkOutput::Missing => {
                warn!(run = %run, nest, "No output files; skipping chunk");
                chunks_skipped += 1;
                continue;
            }
            ChunkOutput::Ambiguous(files) => {
                return Err(DechunkError::AmbiguousOutput {
                    run_dir: run_dir.clone(),
                    files,
                });
            }
        };

        info!(file = %path.display(), "Extracting");
        let dataset = open(&path)?;
        let rows = assembler.push_chunk(&dataset, &run)?;
        drop(dataset);
        chunks_read += 1;

        if writer.is_none() {
            if let Some(site) = assembler.site() {
                writer = Some(SeriesWriter::create(
                    &config.run_root,
                    &config.domain,
                    site,
                    assembler.fields(),
                )?);
            }
        }
        if let Some(writer) = writer.as_mut() {
            writer.write_rows(&rows)?;
        }
    }

    let (writer, site) = match (writer, assembler.site()) {
        (Some(writer), Some(site)) if writer.rows() > 0 => (writer, *site),
        _ => return Err(DechunkError::NoOutput(config.domain.clone())),
    };
    let rows = writer.rows();
    let path = writer.finish()?;

    Ok(DechunkSummary {
        path,
        cell: site.cell,
        nest,
        rows,
        chunks_read,
        chunks_skipped,
    })
}

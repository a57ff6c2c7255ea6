//! Error types for de-chunking.

use std::path::PathBuf;

use netcdf_parser::NetCdfError;
use projection::{GridCell, ProjectionError};
use thiserror::Error;

pub type DechunkResult<T> = Result<T, DechunkError>;

/// Errors that stop a de-chunk run.
///
/// A chunk without any output file is not an error; it is logged and
/// skipped.
#[derive(Error, Debug)]
pub enum DechunkError {
    /// Invalid run configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// The domain directory does not exist under the run root.
    #[error("domain directory {} not found", .0.display())]
    MissingDomain(PathBuf),

    /// The requested nest is finer than any the domain defines.
    #[error("requested nest {requested} not available; domain has {available}")]
    NestUnavailable { requested: u32, available: u32 },

    /// A chunk holds more than one output file for the nest.
    #[error(
        "entire chunked simulation should reside in a single file; found {} in {}",
        files.len(),
        run_dir.display()
    )]
    AmbiguousOutput { run_dir: PathBuf, files: Vec<PathBuf> },

    /// A later chunk resolved the location to a different grid node.
    #[error("{run}: location resolves to {found:?}, earlier chunks used {expected:?}")]
    CellMismatch {
        run: String,
        expected: GridCell,
        found: GridCell,
    },

    /// A field series does not have one value per record.
    #[error("{variable}: expected {expected} records, found {found}")]
    SeriesLength {
        variable: String,
        expected: usize,
        found: usize,
    },

    /// Invalid field table.
    #[error("field table error: {0}")]
    FieldTable(String),

    /// No chunk contributed a single row.
    #[error("no chunk of domain {0} produced output")]
    NoOutput(String),

    #[error(transparent)]
    NetCdf(#[from] NetCdfError),

    #[error(transparent)]
    Projection(#[from] ProjectionError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl DechunkError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn field_table(msg: impl Into<String>) -> Self {
        Self::FieldTable(msg.into())
    }
}

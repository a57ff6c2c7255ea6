//! Error types for WRF output access and field extraction.

use projection::ProjectionError;
use thiserror::Error;

/// Result type for NetCDF parser operations.
pub type NetCdfResult<T> = Result<T, NetCdfError>;

/// Error types for NetCDF parsing.
///
/// Every variant is fatal for the extraction that raised it.
#[derive(Error, Debug)]
pub enum NetCdfError {
    /// File I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// The file could not be opened or read by libnetcdf
    #[error("Invalid data format: {0}")]
    InvalidFormat(String),

    /// Variable is not present in the dataset
    #[error("{name} not found in dataset; available variables: {available}")]
    VariableNotFound { name: String, available: String },

    /// Missing required global attribute
    #[error("Missing required attribute: {0}")]
    MissingAttribute(String),

    /// Attribute present but of an unusable type or value
    #[error("Invalid attribute {name}: {message}")]
    InvalidAttribute { name: String, message: String },

    /// Variable has no units, so it is not a physical field
    #[error("{0} does not have units")]
    MissingUnits(String),

    /// Storage layout outside the known set of WRF layouts
    #[error("Do not understand dimensions ({}) of {variable}", dimensions.join(", "))]
    UnknownDimensions {
        variable: String,
        dimensions: Vec<String>,
    },

    /// Requested index or range does not fit the axis
    #[error("{variable}: {axis} selection {selection} outside axis of length {len}")]
    IndexOutOfBounds {
        variable: String,
        axis: &'static str,
        selection: String,
        len: usize,
    },

    /// Number of stored values disagrees with the dimension lengths
    #[error("{variable}: expected {expected} values from its dimensions, found {found}")]
    ShapeMismatch {
        variable: String,
        expected: usize,
        found: usize,
    },

    #[error(transparent)]
    Projection(#[from] ProjectionError),

    #[error(transparent)]
    Time(#[from] ems_common::TimeParseError),
}

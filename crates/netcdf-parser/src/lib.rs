//! Field extraction from WRF model output.
//!
//! WRF writes every field with one of a fixed set of dimension layouts
//! (mass points, staggered points, soil layers, profiles, ...). This crate
//! recognizes those layouts and slices fields by logical axis so callers
//! never deal with staggering or storage order directly.
//!
//! # Dataset access
//!
//! Extraction works against the [`Dataset`] trait. [`WrfOutFile`] reads
//! `wrfout` files through libnetcdf (requires libhdf5-dev and
//! libnetcdf-dev); [`MemoryDataset`] holds fields built in memory.

pub mod dataset;
pub mod dims;
pub mod error;
pub mod extract;
pub mod metadata;
pub mod native;

pub use dataset::{AttrValue, Dataset, Dimension, MemoryDataset, VariableInfo};
pub use dims::{Axis, DimensionSignature};
pub use error::{NetCdfError, NetCdfResult};
pub use extract::{extract, Field, Selection, Slice};
pub use metadata::{read_projection, ChunkMetadata};
pub use native::{silence_hdf5_errors, WrfOutFile};

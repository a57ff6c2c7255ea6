//! Common types shared across the chunked WRF EMS tooling.
//!
//! The centrepiece is [`ChunkConfig`], which partitions a calendar into
//! fixed-length simulation chunks with a prepended spin-up window.

pub mod chunk;
pub mod error;
pub mod time;

pub use chunk::{ChunkConfig, ChunkSchedule, ChunkSpec};
pub use error::{ChunkError, ChunkResult};
pub use time::{HourEnding, TimeParseError};

//! Configuration for a de-chunk run.

use std::path::PathBuf;

use projection::GridCell;
use serde::Serialize;

use crate::error::{DechunkError, DechunkResult};
use crate::fields::{default_fields, validate_fields, FieldSpec};

/// Spin-up hours discarded at the start of every chunk by default.
pub const DEFAULT_SPINUP_HOURS: i64 = 12;

/// Site whose time series is extracted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum Location {
    /// Geographic point, resolved to the nearest grid node of each chunk.
    LatLon { lat: f64, lon: f64 },
    /// Zero-indexed grid node.
    Cell(GridCell),
}

/// Configuration for one de-chunk run.
#[derive(Debug, Clone, Serialize)]
pub struct DechunkConfig {
    /// Directory holding the domain and its chunk run directories.
    pub run_root: PathBuf,

    /// Domain name; chunk runs are `<domain>_YYYYMMDD`.
    pub domain: String,

    /// Nest to read; the finest available when unset.
    pub nest: Option<u32>,

    pub location: Location,

    /// Hours after `START_DATE` that are discarded.
    pub spinup_hours: i64,

    /// Output columns, in order.
    pub fields: Vec<FieldSpec>,
}

impl DechunkConfig {
    pub fn new(run_root: impl Into<PathBuf>, domain: &str, location: Location) -> Self {
        Self {
            run_root: run_root.into(),
            domain: domain.to_string(),
            nest: None,
            location,
            spinup_hours: DEFAULT_SPINUP_HOURS,
            fields: default_fields(),
        }
    }

    pub fn with_nest(mut self, nest: u32) -> Self {
        self.nest = Some(nest);
        self
    }

    pub fn with_spinup_hours(mut self, hours: i64) -> Self {
        self.spinup_hours = hours;
        self
    }

    pub fn with_fields(mut self, fields: Vec<FieldSpec>) -> Self {
        self.fields = fields;
        self
    }

    /// `<run_root>/<domain>`
    pub fn domain_dir(&self) -> PathBuf {
        self.run_root.join(&self.domain)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> DechunkResult<()> {
        if self.domain.is_empty() {
            return Err(DechunkError::config("domain must not be empty"));
        }
        if self.domain.contains(['/', '\\']) {
            return Err(DechunkError::config(format!(
                "domain {:?} must be a name, not a path",
                self.domain
            )));
        }
        if self.spinup_hours < 0 {
            return Err(DechunkError::config(format!(
                "spinup_hours must be >= 0, got {}",
                self.spinup_hours
            )));
        }
        if self.nest == Some(0) {
            return Err(DechunkError::config("nests are numbered from 1"));
        }
        if let Location::LatLon { lat, lon } = self.location {
            if !(-90.0..=90.0).contains(&lat) || !lon.is_finite() {
                return Err(DechunkError::config(format!(
                    "invalid location {}, {}",
                    lat, lon
                )));
            }
        }
        validate_fields(&self.fields)
    }
}

//! The table of output fields and their unit conversions.
//!
//! Each output column is one [`FieldSpec`]: a WRF variable, a transform
//! applied to its time series at the site, and the number of decimals kept.
//! The built-in table can be replaced by a YAML file:
//!
//! ```yaml
//! fields:
//!   - label: Drybulb Temperature
//!     variable: T2
//!     units: C
//!     transform: { kind: offset, offset: -273.15 }
//!     decimals: 1
//!   - label: Wind Speed
//!     variable: U10
//!     units: m/s
//!     transform: { kind: wind_speed, v_variable: V10 }
//!     decimals: 1
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{DechunkError, DechunkResult};

/// Most decimals a field may request.
const MAX_DECIMALS: u32 = 10;

/// Conversion from a stored series to an output column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Transform {
    /// Values as stored.
    Identity,
    /// Add a constant, e.g. Kelvin to Celsius.
    Offset { offset: f64 },
    /// Multiply by a constant, e.g. fraction to percent.
    Scale { factor: f64 },
    /// Totals since simulation start to per-interval amounts. The first
    /// record is kept as stored.
    Accumulated,
    /// Instantaneous rate to mean over the preceding interval, taken as the
    /// average of the current and previous records. The first record is
    /// kept as stored.
    HourlyMean,
    /// Speed of the earth-relative wind. `variable` is the grid-relative
    /// U component, `v_variable` the V component.
    WindSpeed { v_variable: String },
    /// Compass bearing of the earth-relative wind vector, degrees clockwise
    /// from north in [0, 360).
    WindDirection { v_variable: String },
}

impl Transform {
    /// Second variable read by wind transforms.
    pub fn v_variable(&self) -> Option<&str> {
        match self {
            Transform::WindSpeed { v_variable } | Transform::WindDirection { v_variable } => {
                Some(v_variable)
            }
            _ => None,
        }
    }

    /// Apply a single-variable transform to a chunk's series.
    ///
    /// Wind transforms need both components; they pass values through and
    /// are handled by [`wind_speed`] and [`wind_direction`].
    pub fn apply(&self, values: &[f64]) -> Vec<f64> {
        match self {
            Transform::Identity
            | Transform::WindSpeed { .. }
            | Transform::WindDirection { .. } => values.to_vec(),
            Transform::Offset { offset } => values.iter().map(|v| v + offset).collect(),
            Transform::Scale { factor } => values.iter().map(|v| v * factor).collect(),
            Transform::Accumulated => values
                .iter()
                .enumerate()
                .map(|(n, v)| if n == 0 { *v } else { v - values[n - 1] })
                .collect(),
            Transform::HourlyMean => values
                .iter()
                .enumerate()
                .map(|(n, v)| if n == 0 { *v } else { (v + values[n - 1]) / 2.0 })
                .collect(),
        }
    }
}

/// One output column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Column name in the header row
    pub label: String,
    /// WRF variable read
    pub variable: String,
    /// Units row entry
    pub units: String,
    pub transform: Transform,
    /// Decimals kept after the transform
    pub decimals: u32,
}

impl FieldSpec {
    pub fn new(label: &str, variable: &str, units: &str, transform: Transform, decimals: u32) -> Self {
        Self {
            label: label.to_string(),
            variable: variable.to_string(),
            units: units.to_string(),
            transform,
            decimals,
        }
    }

    /// Round a transformed value to this field's precision.
    pub fn finish(&self, value: f64) -> f64 {
        let rounded = round_to(value, self.decimals);
        if matches!(self.transform, Transform::WindDirection { .. }) && rounded >= 360.0 {
            rounded - 360.0
        } else {
            rounded
        }
    }

    fn validate(&self) -> DechunkResult<()> {
        if self.label.trim().is_empty() {
            return Err(DechunkError::field_table(format!(
                "field reading {} has an empty label",
                self.variable
            )));
        }
        if self.variable.trim().is_empty() {
            return Err(DechunkError::field_table(format!(
                "{} does not name a variable",
                self.label
            )));
        }
        if self.decimals > MAX_DECIMALS {
            return Err(DechunkError::field_table(format!(
                "{}: {} decimals requested, at most {} supported",
                self.label, self.decimals, MAX_DECIMALS
            )));
        }
        Ok(())
    }
}

/// The standard site weather columns.
pub fn default_fields() -> Vec<FieldSpec> {
    let v_variable = || "V10".to_string();
    vec![
        FieldSpec::new("Drybulb Temperature", "T2", "C", Transform::Offset { offset: -273.15 }, 1),
        FieldSpec::new("Humidity Ratio", "Q2", "g/kg", Transform::Scale { factor: 1000.0 }, 2),
        FieldSpec::new("Relative Humidity", "RH02", "%", Transform::Scale { factor: 100.0 }, 0),
        FieldSpec::new("Surface Pressure", "PSFC", "Pa", Transform::Identity, 2),
        FieldSpec::new(
            "Wind Speed",
            "U10",
            "m/s",
            Transform::WindSpeed { v_variable: v_variable() },
            1,
        ),
        FieldSpec::new(
            "Wind Direction",
            "U10",
            "deg",
            Transform::WindDirection { v_variable: v_variable() },
            0,
        ),
        FieldSpec::new("Global Horizontal Radiation", "SWDOWN", "Wh/m2", Transform::HourlyMean, 0),
        FieldSpec::new("Precipitation", "TACC_PRECIP", "mm", Transform::Accumulated, 3),
        FieldSpec::new("Snow", "TACC_SNOW", "mm", Transform::Accumulated, 3),
    ]
}

#[derive(Debug, Deserialize)]
struct FieldTableFile {
    fields: Vec<FieldSpec>,
}

/// Parse a YAML field table.
pub fn parse_field_table(contents: &str) -> DechunkResult<Vec<FieldSpec>> {
    let table: FieldTableFile = serde_yaml::from_str(contents)?;
    validate_fields(&table.fields)?;
    Ok(table.fields)
}

/// Load a YAML field table from disk.
pub fn load_field_table<P: AsRef<Path>>(path: P) -> DechunkResult<Vec<FieldSpec>> {
    let contents = fs::read_to_string(path.as_ref())?;
    let fields = parse_field_table(&contents)?;
    debug!(
        path = %path.as_ref().display(),
        count = fields.len(),
        "Loaded field table"
    );
    Ok(fields)
}

pub fn validate_fields(fields: &[FieldSpec]) -> DechunkResult<()> {
    if fields.is_empty() {
        return Err(DechunkError::field_table("no fields defined"));
    }
    fields.iter().try_for_each(FieldSpec::validate)
}

/// Round half to even at `decimals` places; negative zero becomes zero.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let scale = 10f64.powi(decimals as i32);
    let rounded = (value * scale).round_ties_even() / scale;
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

/// Magnitude of an earth-relative wind vector.
pub fn wind_speed(u: f64, v: f64) -> f64 {
    u.hypot(v)
}

/// Bearing of an earth-relative wind vector, degrees clockwise from north
/// in [0, 360). A vector pointing north is 0, one pointing east is 90.
pub fn wind_direction(u: f64, v: f64) -> f64 {
    let bearing = u.atan2(v).to_degrees().rem_euclid(360.0);
    // rem_euclid can return 360.0 for tiny negative angles
    if bearing >= 360.0 {
        0.0
    } else {
        bearing
    }
}

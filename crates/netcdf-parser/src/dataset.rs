//! Read-only access to a gridded model output dataset.
//!
//! [`Dataset`] is the seam between extraction logic and storage.
//! [`WrfOutFile`](crate::WrfOutFile) reads hyperslabs of real `wrfout` files
//! through libnetcdf; [`MemoryDataset`] holds everything in memory and is
//! used for fixtures and tests.

use std::collections::BTreeMap;

use crate::error::{NetCdfError, NetCdfResult};

/// A scalar attribute value.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    Int(i64),
    Float(f64),
    Text(String),
}

impl AttrValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AttrValue::Int(v) => Some(*v as f64),
            AttrValue::Float(v) => Some(*v),
            AttrValue::Text(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<i64> for AttrValue {
    fn from(v: i64) -> Self {
        AttrValue::Int(v)
    }
}

impl From<f64> for AttrValue {
    fn from(v: f64) -> Self {
        AttrValue::Float(v)
    }
}

impl From<&str> for AttrValue {
    fn from(v: &str) -> Self {
        AttrValue::Text(v.to_string())
    }
}

/// A named dimension and its length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dimension {
    pub name: String,
    pub len: usize,
}

/// Layout and descriptive attributes of a variable.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableInfo {
    pub name: String,
    pub dimensions: Vec<Dimension>,
    /// `units` attribute, absent for non-physical variables such as `Times`
    pub units: Option<String>,
    /// `description` attribute
    pub description: Option<String>,
}

impl VariableInfo {
    pub fn dimension_names(&self) -> Vec<&str> {
        self.dimensions.iter().map(|d| d.name.as_str()).collect()
    }

    pub fn shape(&self) -> Vec<usize> {
        self.dimensions.iter().map(|d| d.len).collect()
    }
}

/// Read-only gridded dataset.
pub trait Dataset {
    /// Global attribute by name.
    fn attribute(&self, name: &str) -> Option<AttrValue>;

    /// Names of all variables.
    fn variable_names(&self) -> Vec<String>;

    /// Layout of a variable, or `None` if it does not exist.
    fn variable_info(&self, name: &str) -> Option<VariableInfo>;

    /// Values inside a hyperslab, in row-major storage order.
    ///
    /// `windows` holds one `(start, count)` pair per stored dimension.
    fn read_slab(&self, name: &str, windows: &[(usize, usize)]) -> NetCdfResult<Vec<f64>>;

    /// All values of a variable in row-major storage order.
    fn read_values(&self, name: &str) -> NetCdfResult<Vec<f64>> {
        let windows: Vec<(usize, usize)> = self
            .require_variable(name)?
            .shape()
            .into_iter()
            .map(|len| (0, len))
            .collect();
        self.read_slab(name, &windows)
    }

    /// Layout of a variable that must exist.
    fn require_variable(&self, name: &str) -> NetCdfResult<VariableInfo> {
        self.variable_info(name)
            .ok_or_else(|| NetCdfError::VariableNotFound {
                name: name.to_string(),
                available: self.variable_names().join(","),
            })
    }

    /// Global attribute that must exist.
    fn require_attribute(&self, name: &str) -> NetCdfResult<AttrValue> {
        self.attribute(name)
            .ok_or_else(|| NetCdfError::MissingAttribute(name.to_string()))
    }

    /// Numeric global attribute that must exist.
    fn require_f64(&self, name: &str) -> NetCdfResult<f64> {
        self.require_attribute(name)?
            .as_f64()
            .ok_or_else(|| NetCdfError::InvalidAttribute {
                name: name.to_string(),
                message: "expected a number".to_string(),
            })
    }
}

/// In-memory dataset.
#[derive(Debug, Clone, Default)]
pub struct MemoryDataset {
    attributes: BTreeMap<String, AttrValue>,
    variables: BTreeMap<String, (VariableInfo, Vec<f64>)>,
}

impl MemoryDataset {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_attribute(mut self, name: &str, value: impl Into<AttrValue>) -> Self {
        self.attributes.insert(name.to_string(), value.into());
        self
    }

    /// Add a variable. `dimensions` are `(name, len)` pairs in storage order.
    pub fn with_variable(
        mut self,
        name: &str,
        dimensions: &[(&str, usize)],
        units: Option<&str>,
        values: Vec<f64>,
    ) -> Self {
        self.insert_variable(name, dimensions, units, values);
        self
    }

    pub fn insert_variable(
        &mut self,
        name: &str,
        dimensions: &[(&str, usize)],
        units: Option<&str>,
        values: Vec<f64>,
    ) {
        let info = VariableInfo {
            name: name.to_string(),
            dimensions: dimensions
                .iter()
                .map(|(dim, len)| Dimension {
                    name: dim.to_string(),
                    len: *len,
                })
                .collect(),
            units: units.map(str::to_string),
            description: None,
        };
        self.variables.insert(name.to_string(), (info, values));
    }

    /// Set the `description` attribute of an existing variable.
    pub fn with_description(mut self, name: &str, description: &str) -> Self {
        if let Some((info, _)) = self.variables.get_mut(name) {
            info.description = Some(description.to_string());
        }
        self
    }

    pub fn remove_variable(&mut self, name: &str) {
        self.variables.remove(name);
    }

    /// Mutable access to a variable's values.
    pub fn values_mut(&mut self, name: &str) -> Option<&mut Vec<f64>> {
        self.variables.get_mut(name).map(|(_, values)| values)
    }
}

impl Dataset for MemoryDataset {
    fn attribute(&self, name: &str) -> Option<AttrValue> {
        self.attributes.get(name).cloned()
    }

    fn variable_names(&self) -> Vec<String> {
        self.variables.keys().cloned().collect()
    }

    fn variable_info(&self, name: &str) -> Option<VariableInfo> {
        self.variables.get(name).map(|(info, _)| info.clone())
    }

    fn read_slab(&self, name: &str, windows: &[(usize, usize)]) -> NetCdfResult<Vec<f64>> {
        let (info, values) =
            self.variables
                .get(name)
                .ok_or_else(|| NetCdfError::VariableNotFound {
                    name: name.to_string(),
                    available: self.variable_names().join(","),
                })?;

        let shape = info.shape();
        let expected: usize = shape.iter().product();
        if values.len() != expected {
            return Err(NetCdfError::ShapeMismatch {
                variable: name.to_string(),
                expected,
                found: values.len(),
            });
        }
        check_windows(info, windows)?;

        Ok(gather(values, &shape, windows))
    }
}

/// Reject windows that do not match the rank of `info` or overrun an axis.
pub(crate) fn check_windows(info: &VariableInfo, windows: &[(usize, usize)]) -> NetCdfResult<()> {
    if windows.len() != info.dimensions.len() {
        return Err(NetCdfError::InvalidFormat(format!(
            "{}: {} windows for {} dimensions",
            info.name,
            windows.len(),
            info.dimensions.len()
        )));
    }
    for (dim, &(start, count)) in info.dimensions.iter().zip(windows) {
        if start.checked_add(count).map_or(true, |end| end > dim.len) {
            return Err(NetCdfError::IndexOutOfBounds {
                variable: info.name.clone(),
                axis: "storage",
                selection: format!("{}..{} of {}", start, start.saturating_add(count), dim.name),
                len: dim.len,
            });
        }
    }
    Ok(())
}

/// Copy the hyperslab described by `windows` out of row-major `values`.
fn gather(values: &[f64], shape: &[usize], windows: &[(usize, usize)]) -> Vec<f64> {
    let rank = shape.len();
    let mut strides = vec![1usize; rank];
    for axis in (0..rank.saturating_sub(1)).rev() {
        strides[axis] = strides[axis + 1] * shape[axis + 1];
    }

    let total: usize = windows.iter().map(|(_, count)| count).product();
    let mut out = Vec::with_capacity(total);
    if total == 0 {
        return out;
    }

    let mut cursor = vec![0usize; rank];
    loop {
        let offset: usize = cursor
            .iter()
            .zip(windows)
            .zip(&strides)
            .map(|((c, (start, _)), stride)| (start + c) * stride)
            .sum();
        out.push(values[offset]);

        // Odometer step, last axis fastest
        let mut axis = rank;
        loop {
            if axis == 0 {
                return out;
            }
            axis -= 1;
            cursor[axis] += 1;
            if cursor[axis] < windows[axis].1 {
                break;
            }
            cursor[axis] = 0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attribute_conversions() {
        assert_eq!(AttrValue::Int(1).as_f64(), Some(1.0));
        assert_eq!(AttrValue::Float(38.5).as_f64(), Some(38.5));
        assert_eq!(AttrValue::from("x").as_f64(), None);
        assert_eq!(AttrValue::from("x").as_str(), Some("x"));
    }

    #[test]
    fn test_memory_dataset_lookup() {
        let ds = MemoryDataset::new()
            .with_attribute("DX", 3000.0)
            .with_attribute("TITLE", "OUTPUT FROM WRF")
            .with_variable("XTIME", &[("Time", 2)], Some("minutes"), vec![0.0, 60.0])
            .with_description("XTIME", "minutes since simulation start");

        assert_eq!(ds.require_f64("DX").unwrap(), 3000.0);
        assert!(matches!(
            ds.require_f64("TITLE"),
            Err(NetCdfError::InvalidAttribute { .. })
        ));
        assert!(matches!(
            ds.require_attribute("MAP_PROJ"),
            Err(NetCdfError::MissingAttribute(_))
        ));

        let info = ds.require_variable("XTIME").unwrap();
        assert_eq!(info.dimension_names(), vec!["Time"]);
        assert_eq!(info.shape(), vec![2]);
        assert_eq!(info.description.as_deref(), Some("minutes since simulation start"));
        assert_eq!(ds.read_values("XTIME").unwrap(), vec![0.0, 60.0]);
    }

    #[test]
    fn test_missing_variable_lists_available() {
        let ds = MemoryDataset::new()
            .with_variable("T2", &[("Time", 1)], Some("K"), vec![280.0])
            .with_variable("Q2", &[("Time", 1)], Some("kg kg-1"), vec![0.004]);
        let err = ds.require_variable("PSFC").unwrap_err();
        assert_eq!(
            err.to_string(),
            "PSFC not found in dataset; available variables: Q2,T2"
        );
    }

    #[test]
    fn test_read_slab_returns_only_the_window() {
        let values: Vec<f64> = (0..24).map(|v| v as f64).collect();
        let ds = MemoryDataset::new().with_variable(
            "T2",
            &[("Time", 2), ("south_north", 3), ("west_east", 4)],
            Some("K"),
            values,
        );
        // offset = t*12 + i*4 + j
        let slab = ds.read_slab("T2", &[(0, 2), (1, 2), (3, 1)]).unwrap();
        assert_eq!(slab, vec![7.0, 11.0, 19.0, 23.0]);
        assert_eq!(ds.read_values("T2").unwrap().len(), 24);
    }

    #[test]
    fn test_read_slab_rejects_bad_windows() {
        let ds = MemoryDataset::new().with_variable(
            "T2",
            &[("Time", 2), ("west_east", 3)],
            Some("K"),
            vec![0.0; 6],
        );
        assert!(matches!(
            ds.read_slab("T2", &[(0, 2)]),
            Err(NetCdfError::InvalidFormat(_))
        ));
        assert!(matches!(
            ds.read_slab("T2", &[(0, 2), (2, 2)]),
            Err(NetCdfError::IndexOutOfBounds { len: 3, .. })
        ));
        assert!(matches!(
            ds.read_slab("T2", &[(usize::MAX, 2), (0, 1)]),
            Err(NetCdfError::IndexOutOfBounds { len: 2, .. })
        ));
    }
}

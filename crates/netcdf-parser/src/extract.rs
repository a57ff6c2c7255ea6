//! Dimension-aware extraction of WRF fields.
//!
//! A [`Selection`] names what to keep along each logical axis. The stored
//! layout of the variable decides which of those selections apply; the
//! rest are ignored. Axes selected by [`Slice::Index`] are removed from the
//! result, as is every other axis left with a single element.

use std::fmt;
use std::ops::Range;

use projection::GridCell;
use tracing::debug;

use crate::dataset::Dataset;
use crate::dims::{Axis, DimensionSignature};
use crate::error::{NetCdfError, NetCdfResult};

/// Selection along one axis.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Slice {
    #[default]
    All,
    Index(usize),
    Range(Range<usize>),
}

impl Slice {
    /// Resolve against an axis length into `(start, count, keep_axis)`.
    fn window(&self, len: usize) -> Option<(usize, usize, bool)> {
        match self {
            Slice::All => Some((0, len, true)),
            Slice::Index(n) if *n < len => Some((*n, 1, false)),
            Slice::Range(r) if r.start < r.end && r.end <= len => {
                Some((r.start, r.end - r.start, true))
            }
            _ => None,
        }
    }
}

impl fmt::Display for Slice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slice::All => write!(f, ".."),
            Slice::Index(n) => write!(f, "{}", n),
            Slice::Range(r) => write!(f, "{}..{}", r.start, r.end),
        }
    }
}

impl From<usize> for Slice {
    fn from(n: usize) -> Self {
        Slice::Index(n)
    }
}

impl From<Range<usize>> for Slice {
    fn from(r: Range<usize>) -> Self {
        Slice::Range(r)
    }
}

/// Per-axis selection for [`extract`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub time: Slice,
    /// `south_north`
    pub i: Slice,
    /// `west_east`
    pub j: Slice,
    /// vertical level
    pub k: Slice,
    pub soil: Slice,
    pub landcat: Slice,
}

impl Selection {
    /// Everything along every axis.
    pub fn all() -> Self {
        Self::default()
    }

    /// The full time series (and full vertical extent) at one grid node.
    pub fn at_cell(cell: GridCell) -> Self {
        Self {
            i: Slice::Index(cell.i),
            j: Slice::Index(cell.j),
            ..Self::default()
        }
    }

    pub fn with_time(mut self, time: impl Into<Slice>) -> Self {
        self.time = time.into();
        self
    }

    pub fn with_level(mut self, k: impl Into<Slice>) -> Self {
        self.k = k.into();
        self
    }

    pub fn with_soil(mut self, soil: impl Into<Slice>) -> Self {
        self.soil = soil.into();
        self
    }

    pub fn with_landcat(mut self, landcat: impl Into<Slice>) -> Self {
        self.landcat = landcat.into();
        self
    }

    fn for_axis(&self, axis: Axis) -> &Slice {
        match axis {
            Axis::Time => &self.time,
            Axis::Vertical => &self.k,
            Axis::Soil => &self.soil,
            Axis::LandCategory => &self.landcat,
            Axis::SouthNorth => &self.i,
            Axis::WestEast => &self.j,
        }
    }
}

/// A sliced field with its descriptive attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub units: String,
    /// `description` attribute, or the variable name when absent
    pub description: String,
    pub signature: DimensionSignature,
    /// Shape after removing indexed and single-element axes
    pub shape: Vec<usize>,
    /// Values in row-major order
    pub values: Vec<f64>,
}

impl Field {
    /// The only value of a fully reduced field.
    pub fn scalar(&self) -> Option<f64> {
        match self.values.as_slice() {
            [v] => Some(*v),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Extract `name` from `dataset`, sliced by `selection`.
pub fn extract<D: Dataset + ?Sized>(
    dataset: &D,
    name: &str,
    selection: &Selection,
) -> NetCdfResult<Field> {
    let info = dataset.require_variable(name)?;
    let dimension_names = info.dimension_names();

    let signature = DimensionSignature::lookup(dimension_names.as_slice()).ok_or_else(|| {
        NetCdfError::UnknownDimensions {
            variable: name.to_string(),
            dimensions: dimension_names.iter().map(|d| d.to_string()).collect(),
        }
    })?;

    let units = info
        .units
        .clone()
        .ok_or_else(|| NetCdfError::MissingUnits(name.to_string()))?;

    let shape = info.shape();
    let mut windows = Vec::with_capacity(shape.len());
    let mut out_shape = Vec::new();
    for (axis, len) in signature.axes().iter().zip(&shape) {
        let slice = selection.for_axis(*axis);
        let (start, count, keep) =
            slice
                .window(*len)
                .ok_or_else(|| NetCdfError::IndexOutOfBounds {
                    variable: name.to_string(),
                    axis: axis.label(),
                    selection: slice.to_string(),
                    len: *len,
                })?;
        windows.push((start, count));
        if keep && count != 1 {
            out_shape.push(count);
        }
    }

    // Only the selected hyperslab leaves storage
    let values = dataset.read_slab(name, &windows)?;
    let expected: usize = windows.iter().map(|(_, count)| count).product();
    if values.len() != expected {
        return Err(NetCdfError::ShapeMismatch {
            variable: name.to_string(),
            expected,
            found: values.len(),
        });
    }

    debug!(
        variable = name,
        signature = ?signature,
        shape = ?out_shape,
        "Extracted field"
    );

    Ok(Field {
        name: name.to_string(),
        units,
        description: info.description.unwrap_or_else(|| name.to_string()),
        signature,
        shape: out_shape,
        values,
    })
}

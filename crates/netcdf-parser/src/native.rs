//! WRF output files read through the native netcdf library.
//!
//! The netcdf crate wraps libnetcdf/HDF5. A [`WrfOutFile`] keeps the file
//! open for its lifetime; dropping it closes the handle.

use std::path::{Path, PathBuf};
use std::sync::Once;

use tracing::debug;

use crate::dataset::{check_windows, AttrValue, Dataset, Dimension, VariableInfo};
use crate::error::{NetCdfError, NetCdfResult};

/// Silence HDF5's automatic error printing to stderr.
///
/// The HDF5 C library prints diagnostics even when a missing attribute is
/// handled on the Rust side:
///
/// ```text
/// HDF5-DIAG: Error detected in HDF5 (1.10.8) thread 3:
///   #003: ../../../src/H5Adense.c line 397 in H5A__dense_open(): can't locate attribute in name index
/// ```
///
/// Only the first call has an effect. [`WrfOutFile::open`] calls it, but
/// binaries should call it before any other HDF5 use.
pub fn silence_hdf5_errors() {
    static INIT: Once = Once::new();

    INIT.call_once(|| {
        // SAFETY: H5Eset_auto2 is thread-safe and null handlers are a
        // documented way to disable error output.
        unsafe {
            hdf5_metno_sys::h5e::H5Eset_auto2(
                hdf5_metno_sys::h5e::H5E_DEFAULT,
                None,
                std::ptr::null_mut(),
            );
        }
    });
}

/// An open `wrfout` file.
pub struct WrfOutFile {
    path: PathBuf,
    file: netcdf::File,
}

impl std::fmt::Debug for WrfOutFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WrfOutFile").field("path", &self.path).finish()
    }
}

impl WrfOutFile {
    pub fn open<P: AsRef<Path>>(path: P) -> NetCdfResult<Self> {
        silence_hdf5_errors();

        let path = path.as_ref().to_path_buf();
        if !path.is_file() {
            return Err(NetCdfError::IoError(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("{} does not exist", path.display()),
            )));
        }

        let file = netcdf::open(&path).map_err(|e| {
            NetCdfError::InvalidFormat(format!("Failed to open {}: {}", path.display(), e))
        })?;
        debug!(file = %path.display(), "Opened WRF output");

        Ok(Self { path, file })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Dataset for WrfOutFile {
    fn attribute(&self, name: &str) -> Option<AttrValue> {
        // Probe by listing first; a failed lookup makes HDF5 log an error
        if !self.file.attributes().any(|attr| attr.name() == name) {
            return None;
        }
        let value = self.file.attribute(name)?.value().ok()?;
        to_attr_value(value)
    }

    fn variable_names(&self) -> Vec<String> {
        self.file.variables().map(|v| v.name()).collect()
    }

    fn variable_info(&self, name: &str) -> Option<VariableInfo> {
        let var = self.file.variable(name)?;
        let dimensions = var
            .dimensions()
            .iter()
            .map(|d| Dimension {
                name: d.name(),
                len: d.len(),
            })
            .collect();

        Some(VariableInfo {
            name: name.to_string(),
            dimensions,
            units: get_string_attr(&var, "units"),
            description: get_string_attr(&var, "description"),
        })
    }

    fn read_slab(&self, name: &str, windows: &[(usize, usize)]) -> NetCdfResult<Vec<f64>> {
        let info = self.require_variable(name)?;
        check_windows(&info, windows)?;

        let var = self
            .file
            .variable(name)
            .ok_or_else(|| NetCdfError::VariableNotFound {
                name: name.to_string(),
                available: self.variable_names().join(","),
            })?;

        let extents: Vec<netcdf::Extent> = windows
            .iter()
            .map(|&(start, count)| (start..start + count).into())
            .collect();
        var.get_values::<f64, _>(extents).map_err(|e| {
            NetCdfError::InvalidFormat(format!(
                "Failed to read {} from {}: {}",
                name,
                self.path.display(),
                e
            ))
        })
    }
}

/// Check if a variable has an attribute with the given name.
/// This avoids HDF5 error spam when checking for optional attributes.
fn has_attr(var: &netcdf::Variable, name: &str) -> bool {
    var.attributes().any(|attr| attr.name() == name)
}

fn get_string_attr(var: &netcdf::Variable, name: &str) -> Option<String> {
    if !has_attr(var, name) {
        return None;
    }
    match var.attribute_value(name)?.ok()? {
        netcdf::AttributeValue::Str(s) => Some(s),
        _ => None,
    }
}

fn to_attr_value(value: netcdf::AttributeValue) -> Option<AttrValue> {
    use netcdf::AttributeValue as V;

    match value {
        V::Str(s) => Some(AttrValue::Text(s)),
        V::Schar(v) => Some(AttrValue::Int(v.into())),
        V::Uchar(v) => Some(AttrValue::Int(v.into())),
        V::Short(v) => Some(AttrValue::Int(v.into())),
        V::Ushort(v) => Some(AttrValue::Int(v.into())),
        V::Int(v) => Some(AttrValue::Int(v.into())),
        V::Uint(v) => Some(AttrValue::Int(v.into())),
        V::Longlong(v) => Some(AttrValue::Int(v)),
        V::Float(v) => Some(AttrValue::Float(v.into())),
        V::Double(v) => Some(AttrValue::Float(v)),
        other => f64::try_from(other).ok().map(AttrValue::Float),
    }
}

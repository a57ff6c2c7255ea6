//! Shared test utilities for the ems-dechunk workspace.
//!
//! Synthetic chunk datasets on a real Lambert grid, scratch run trees laid
//! out like an EMS run root, and helpers for optional sample files.
//!
//! ```ignore
//! use test_utils::{at, grid, ChunkFixture, RunTree};
//!
//! let tree = RunTree::create("kansas", 1);
//! let chunk = ChunkFixture::new(grid::KANSAS_3KM, at(2015, 2, 26, 12), 61)
//!     .with_standard_fields()
//!     .build();
//! ```

pub mod fixtures;
pub mod generators;
pub mod paths;

pub use fixtures::*;
pub use generators::*;
pub use paths::*;

/// Return the path of a sample data file, or skip the calling test with a
/// note on stderr when it is not available.
///
/// Real `wrfout` samples are large and are not checked in.
///
/// ```ignore
/// let path = test_utils::require_test_file!("wrfout_d01_sample.nc");
/// ```
#[macro_export]
macro_rules! require_test_file {
    ($name:expr) => {{
        match $crate::find_test_file($name) {
            Some(path) => path,
            None => {
                eprintln!("skipping: sample {} not found (set TEST_DATA_DIR)", $name);
                return;
            }
        }
    }};
}

/// Assert that two numbers differ by at most `epsilon`.
///
/// ```ignore
/// test_utils::assert_approx_eq!(38.50001, 38.5, 1e-4);
/// ```
#[macro_export]
macro_rules! assert_approx_eq {
    ($left:expr, $right:expr, $epsilon:expr) => {{
        let (left, right, epsilon) = ($left as f64, $right as f64, $epsilon as f64);
        let diff = (left - right).abs();
        assert!(
            diff <= epsilon,
            "{} and {} differ by {}, more than {}",
            left,
            right,
            diff,
            epsilon
        );
    }};
}

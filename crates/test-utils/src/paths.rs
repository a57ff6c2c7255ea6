//! Path utilities for test data files and scratch run trees.

use std::fs;
use std::path::{Path, PathBuf};

/// Workspace root, two levels above this crate's manifest.
pub fn workspace_root() -> PathBuf {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    manifest_dir
        .ancestors()
        .nth(2)
        .unwrap_or(manifest_dir)
        .to_path_buf()
}

/// Locate an optional sample file.
///
/// `TEST_DATA_DIR` wins when set; otherwise `crates/netcdf-parser/testdata/`
/// and `testdata/` under the workspace root are tried.
pub fn find_test_file(name: &str) -> Option<PathBuf> {
    let root = workspace_root();
    std::env::var_os("TEST_DATA_DIR")
        .map(PathBuf::from)
        .into_iter()
        .chain([
            root.join("crates/netcdf-parser/testdata"),
            root.join("testdata"),
        ])
        .map(|dir| dir.join(name))
        .find(|path| path.exists())
}

/// Scratch directory, removed when dropped.
pub fn temp_test_dir() -> tempfile::TempDir {
    tempfile::tempdir().expect("failed to create scratch directory")
}

/// Layout of a scratch run root, built with [`RunTree::create`].
///
/// ```text
/// <root>/<domain>/static/geo_em.d01.nc ...
/// <root>/<domain>_20150226/wrfprd/wrfout_d01_2015-02-26_12:00:00
/// ```
pub struct RunTree {
    pub root: tempfile::TempDir,
    pub domain: String,
}

impl RunTree {
    /// Create a domain directory with `nests` geogrid files.
    pub fn create(domain: &str, nests: u32) -> Self {
        let root = temp_test_dir();
        let static_dir = root.path().join(domain).join("static");
        fs::create_dir_all(&static_dir).expect("failed to create static directory");
        for nest in 1..=nests {
            touch(&static_dir.join(format!("geo_em.d{:02}.nc", nest)));
        }
        Self {
            root,
            domain: domain.to_string(),
        }
    }

    pub fn path(&self) -> &Path {
        self.root.path()
    }

    /// Create a chunk run directory named `<domain>_<date>` with the given
    /// files under `wrfprd/`. Returns the run directory.
    pub fn add_run(&self, date: &str, outputs: &[&str]) -> PathBuf {
        let run_dir = self.path().join(format!("{}_{}", self.domain, date));
        let wrfprd = run_dir.join("wrfprd");
        fs::create_dir_all(&wrfprd).expect("failed to create wrfprd directory");
        for name in outputs {
            touch(&wrfprd.join(name));
        }
        run_dir
    }
}

fn touch(path: &Path) {
    fs::write(path, b"").expect("failed to create fixture file");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workspace_root_holds_members() {
        let root = workspace_root();
        assert!(root.join("Cargo.toml").exists(), "{}", root.display());
        assert!(root.join("crates/test-utils").is_dir());
    }

    #[test]
    fn test_missing_sample_is_none() {
        assert!(find_test_file("wrfout_d09_missing.nc").is_none());
    }

    #[test]
    fn test_run_tree_layout() {
        let tree = RunTree::create("kansas", 2);
        let run = tree.add_run("20150226", &["wrfout_d02_2015-02-26_12:00:00"]);

        assert!(tree.path().join("kansas/static/geo_em.d01.nc").exists());
        assert!(tree.path().join("kansas/static/geo_em.d02.nc").exists());
        assert!(run.join("wrfprd/wrfout_d02_2015-02-26_12:00:00").exists());
        assert!(run.ends_with("kansas_20150226"));
    }
}

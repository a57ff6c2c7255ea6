//! Finding nests, chunk run directories and their output files.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{DechunkError, DechunkResult};

/// Output of one chunk run for the selected nest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChunkOutput {
    /// The chunk has not been run.
    Missing,
    Single(PathBuf),
    /// More than one output file; the chunk cannot be read unambiguously.
    Ambiguous(Vec<PathBuf>),
}

/// Number of nests, counted from `static/geo*.nc` in the domain directory.
pub fn count_nests(domain_dir: &Path) -> DechunkResult<u32> {
    if !domain_dir.is_dir() {
        return Err(DechunkError::MissingDomain(domain_dir.to_path_buf()));
    }
    let static_dir = domain_dir.join("static");
    if !static_dir.is_dir() {
        return Ok(0);
    }

    let mut nests = 0;
    for entry in fs::read_dir(&static_dir)? {
        let name = entry?.file_name();
        let name = name.to_string_lossy();
        if name.starts_with("geo") && name.ends_with(".nc") {
            nests += 1;
        }
    }
    debug!(dir = %static_dir.display(), nests, "Counted nests");
    Ok(nests)
}

/// The requested nest, or the finest one when none is requested.
pub fn resolve_nest(requested: Option<u32>, available: u32) -> DechunkResult<u32> {
    match requested {
        Some(nest) if nest >= 1 && nest <= available => Ok(nest),
        Some(nest) => Err(DechunkError::NestUnavailable {
            requested: nest,
            available,
        }),
        None if available > 0 => Ok(available),
        None => Err(DechunkError::NestUnavailable {
            requested: 1,
            available,
        }),
    }
}

/// Chunk run directories `<domain>_YYYYMMDD` in chronological order.
pub fn chunk_run_dirs(run_root: &Path, domain: &str) -> DechunkResult<Vec<PathBuf>> {
    let prefix = format!("{}_", domain);
    let mut dirs = Vec::new();
    for entry in fs::read_dir(run_root)? {
        let entry = entry?;
        let name = entry.file_name();
        let name = name.to_string_lossy();
        let is_chunk = name
            .strip_prefix(&prefix)
            .is_some_and(|date| date.len() == 8 && date.bytes().all(|b| b.is_ascii_digit()));
        if is_chunk && entry.path().is_dir() {
            dirs.push(entry.path());
        }
    }
    // Fixed-width dates sort chronologically
    dirs.sort();
    Ok(dirs)
}

/// Find the `wrfprd/wrfout_dNN*` output of a chunk run.
pub fn find_chunk_output(run_dir: &Path, nest: u32) -> DechunkResult<ChunkOutput> {
    let wrfprd = run_dir.join("wrfprd");
    if !wrfprd.is_dir() {
        return Ok(ChunkOutput::Missing);
    }

    let prefix = format!("wrfout_d{:02}", nest);
    let mut files = Vec::new();
    for entry in fs::read_dir(&wrfprd)? {
        let entry = entry?;
        if entry.file_name().to_string_lossy().starts_with(&prefix) {
            files.push(entry.path());
        }
    }
    files.sort();

    Ok(match files.len() {
        0 => ChunkOutput::Missing,
        1 => ChunkOutput::Single(files.remove(0)),
        _ => ChunkOutput::Ambiguous(files),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::RunTree;

    #[test]
    fn test_count_nests() {
        let tree = RunTree::create("kansas", 3);
        fs::write(tree.path().join("kansas/static/namelist.wps"), b"").unwrap();
        assert_eq!(count_nests(&tree.path().join("kansas")).unwrap(), 3);
    }

    #[test]
    fn test_missing_domain() {
        let tree = RunTree::create("kansas", 1);
        let err = count_nests(&tree.path().join("iowa")).unwrap_err();
        assert!(matches!(err, DechunkError::MissingDomain(_)));
    }

    #[test]
    fn test_resolve_nest() {
        assert_eq!(resolve_nest(None, 3).unwrap(), 3);
        assert_eq!(resolve_nest(Some(2), 3).unwrap(), 2);
        assert!(matches!(
            resolve_nest(Some(4), 3),
            Err(DechunkError::NestUnavailable {
                requested: 4,
                available: 3
            })
        ));
        assert!(resolve_nest(None, 0).is_err());
    }

    #[test]
    fn test_chunk_run_dirs_sorted_and_filtered() {
        let tree = RunTree::create("kansas", 1);
        tree.add_run("20150302", &[]);
        tree.add_run("20150227", &[]);
        tree.add_run("2015022", &[]);
        tree.add_run("20150227x", &[]);
        fs::create_dir_all(tree.path().join("iowa_20150227")).unwrap();
        // A file, not a directory
        fs::write(tree.path().join("kansas_20150305"), b"").unwrap();

        let dirs = chunk_run_dirs(tree.path(), "kansas").unwrap();
        let names: Vec<_> = dirs
            .iter()
            .map(|d| d.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["kansas_20150227", "kansas_20150302"]);
    }

    #[test]
    fn test_find_chunk_output() {
        let tree = RunTree::create("kansas", 2);
        let empty = tree.add_run("20150224", &[]);
        let single = tree.add_run(
            "20150227",
            &["wrfout_d01_2015-02-26_12:00:00", "wrfout_d02_2015-02-26_12:00:00"],
        );
        let ambiguous = tree.add_run(
            "20150302",
            &["wrfout_d02_2015-03-01_12:00:00", "wrfout_d02_2015-03-02_12:00:00"],
        );

        assert_eq!(find_chunk_output(&empty, 2).unwrap(), ChunkOutput::Missing);
        assert_eq!(
            find_chunk_output(&single, 2).unwrap(),
            ChunkOutput::Single(single.join("wrfprd/wrfout_d02_2015-02-26_12:00:00"))
        );
        match find_chunk_output(&ambiguous, 2).unwrap() {
            ChunkOutput::Ambiguous(files) => assert_eq!(files.len(), 2),
            other => panic!("expected ambiguous output, got {:?}", other),
        }
        assert_eq!(
            find_chunk_output(&tree.path().join("nowhere"), 1).unwrap(),
            ChunkOutput::Missing
        );
    }
}

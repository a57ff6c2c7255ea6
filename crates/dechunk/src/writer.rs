//! CSV output of an assembled site series.
//!
//! The file is built in a temporary file next to its destination and only
//! renamed into place by [`SeriesWriter::finish`], so an interrupted run
//! never leaves a partial series under the final name.

use std::io::Write;
use std::path::{Path, PathBuf};

use projection::GridCell;
use tempfile::NamedTempFile;
use tracing::info;

use crate::assembler::{Site, TimeSeriesRow};
use crate::error::DechunkResult;
use crate::fields::FieldSpec;

/// `<domain>_iII_jJJ.csv`, one-based indices.
pub fn output_file_name(domain: &str, cell: GridCell) -> String {
    let (i, j) = cell.one_based();
    format!("{}_i{:02}_j{:02}.csv", domain, i, j)
}

/// Streaming writer for one site series.
pub struct SeriesWriter {
    path: PathBuf,
    csv: csv::Writer<NamedTempFile>,
    rows: usize,
}

impl SeriesWriter {
    /// Start `<dir>/<domain>_iII_jJJ.csv` with its comment and header rows.
    pub fn create(dir: &Path, domain: &str, site: &Site, fields: &[FieldSpec]) -> DechunkResult<Self> {
        let path = dir.join(output_file_name(domain, site.cell));
        let mut temp = NamedTempFile::new_in(dir)?;
        writeln!(
            temp,
            "# {} {:.4} degN {:.4} degE {:.1} m",
            domain, site.lat, site.lon, site.hgt
        )?;

        let mut csv = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(temp);
        csv.write_record(
            ["Year", "Month", "Day", "Hour"]
                .into_iter()
                .chain(fields.iter().map(|f| f.label.as_str())),
        )?;
        csv.write_record(
            ["yyyy", "mm", "dd", "hh"]
                .into_iter()
                .chain(fields.iter().map(|f| f.units.as_str())),
        )?;

        Ok(Self { path, csv, rows: 0 })
    }

    /// Final location of the file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Rows written so far.
    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn write_rows(&mut self, rows: &[TimeSeriesRow]) -> DechunkResult<()> {
        for row in rows {
            let label = row.label();
            let mut record = vec![
                label.year.to_string(),
                label.month.to_string(),
                label.day.to_string(),
                label.hour.to_string(),
            ];
            record.extend(row.values.iter().map(|v| format_g6(*v)));
            self.csv.write_record(&record)?;
        }
        self.rows += rows.len();
        Ok(())
    }

    /// Flush and move the file to its final name, replacing any older one.
    pub fn finish(self) -> DechunkResult<PathBuf> {
        let temp = self.csv.into_inner().map_err(|e| e.into_error())?;
        temp.persist(&self.path).map_err(|e| e.error)?;
        info!(path = %self.path.display(), rows = self.rows, "Wrote series");
        Ok(self.path)
    }
}

/// Format like C's `%.6g`: six significant digits, trailing zeros removed,
/// exponent notation outside [1e-4, 1e6).
pub fn format_g6(value: f64) -> String {
    const PRECISION: i32 = 6;

    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    if value == 0.0 {
        return if value.is_sign_negative() { "-0" } else { "0" }.to_string();
    }

    // Exponent after rounding to the output precision
    let sci = format!("{:.*e}", (PRECISION - 1) as usize, value);
    let (mantissa, exponent) = match sci.split_once('e') {
        Some((m, e)) => (m, e.parse::<i32>().unwrap_or(0)),
        None => (sci.as_str(), 0),
    };

    if exponent < -4 || exponent >= PRECISION {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!(
            "{}e{}{:02}",
            trim_fraction(mantissa),
            sign,
            exponent.abs()
        )
    } else {
        let decimals = (PRECISION - 1 - exponent) as usize;
        trim_fraction(&format!("{:.*}", decimals, value)).to_string()
    }
}

fn trim_fraction(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}

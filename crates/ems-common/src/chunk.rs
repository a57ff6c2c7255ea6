//! Chunk calendar arithmetic.
//!
//! A year is cut into blocks of `chunk_days` days, counted on a 366-day
//! reference year so that every year uses the same chunk boundaries. Each
//! chunk is simulated with `spinup_hours` of model time prepended, which is
//! later discarded.
//!
//! Two chunks per year are irregular:
//! - In a non-leap year the chunk that contains the reference leap day is one
//!   day short (February 29 maps onto March 1).
//! - The final chunk of a year is clamped to January 1 of the next year.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;
use tracing::debug;

use crate::error::{ChunkError, ChunkResult};

/// Days in the reference (leap) year.
const REFERENCE_YEAR_DAYS: i64 = 366;

/// Zero-based reference day of February 29.
const REFERENCE_LEAP_DAY: i64 = 59;

/// Chunk length and spin-up configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkConfig {
    chunk_days: i64,
    spinup_hours: i64,
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            chunk_days: 3,
            spinup_hours: 12,
        }
    }
}

/// One simulation chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChunkSpec {
    /// Zero-based chunk number within the year
    pub index: u32,
    /// Start of the simulation, `spinup_hours` before the chunk proper
    pub spinup_start: NaiveDateTime,
    /// First instant of the chunk proper
    pub chunk_start: NaiveDateTime,
    /// End of the chunk (exclusive), the next chunk's start
    pub chunk_end: NaiveDateTime,
    /// Total simulation length in hours, spin-up included
    pub hours: i64,
}

impl ChunkSpec {
    /// Name of the run directory for this chunk, e.g. `alps_20150227`.
    pub fn run_dir_name(&self, domain: &str) -> String {
        format!("{}_{}", domain, self.chunk_start.format("%Y%m%d"))
    }
}

impl ChunkConfig {
    /// Validate and build a configuration.
    pub fn new(chunk_days: i64, spinup_hours: i64) -> ChunkResult<Self> {
        if chunk_days <= 0 {
            return Err(ChunkError::InvalidChunkDays(chunk_days));
        }
        if spinup_hours < 0 {
            return Err(ChunkError::InvalidSpinup(spinup_hours));
        }
        Ok(Self {
            chunk_days,
            spinup_hours,
        })
    }

    pub fn chunk_days(&self) -> i64 {
        self.chunk_days
    }

    pub fn spinup_hours(&self) -> i64 {
        self.spinup_hours
    }

    /// Simulation length of a regular chunk.
    pub fn nominal_hours(&self) -> i64 {
        self.spinup_hours + self.chunk_days * 24
    }

    /// Locate the chunk containing `date`.
    pub fn index(&self, date: NaiveDate) -> ChunkSpec {
        let index = (reference_ordinal0(date) / self.chunk_days) as u32;

        let start_offset = i64::from(index) * self.chunk_days;
        let end_offset = start_offset + self.chunk_days;

        let jan_first = date - Duration::days(i64::from(date.ordinal0()));
        let chunk_start = midnight(from_reference(jan_first, start_offset));
        let chunk_end = midnight(from_reference(jan_first, end_offset));

        let spinup_start = chunk_start - Duration::hours(self.spinup_hours);
        let hours = (chunk_end - spinup_start).num_hours();

        debug!(
            index,
            start = %chunk_start,
            end = %chunk_end,
            hours,
            "Chunking"
        );

        ChunkSpec {
            index,
            spinup_start,
            chunk_start,
            chunk_end,
            hours,
        }
    }

    /// Every chunk needed to cover `start..end`.
    ///
    /// The first chunk is the one containing `start`; iteration advances to
    /// each chunk's end until that cursor reaches `end`.
    pub fn schedule(&self, start: NaiveDate, end: NaiveDate) -> ChunkResult<ChunkSchedule> {
        if start >= end {
            return Err(ChunkError::EmptyRange {
                start: start.to_string(),
                end: end.to_string(),
            });
        }
        Ok(ChunkSchedule {
            config: *self,
            cursor: start,
            end,
        })
    }
}

/// Iterator over consecutive chunks of a date range.
#[derive(Debug, Clone)]
pub struct ChunkSchedule {
    config: ChunkConfig,
    cursor: NaiveDate,
    end: NaiveDate,
}

impl Iterator for ChunkSchedule {
    type Item = ChunkSpec;

    fn next(&mut self) -> Option<ChunkSpec> {
        if self.cursor >= self.end {
            return None;
        }
        let spec = self.config.index(self.cursor);
        self.cursor = spec.chunk_end.date();
        Some(spec)
    }
}

pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// Zero-based day of `date` on the 366-day reference year.
fn reference_ordinal0(date: NaiveDate) -> i64 {
    let ordinal0 = i64::from(date.ordinal0());
    if !is_leap_year(date.year()) && ordinal0 >= REFERENCE_LEAP_DAY {
        ordinal0 + 1
    } else {
        ordinal0
    }
}

/// Map a reference-year day offset back onto the real year starting at
/// `jan_first`. Offsets past the reference year clamp to the next new year.
fn from_reference(jan_first: NaiveDate, offset: i64) -> NaiveDate {
    let leap = is_leap_year(jan_first.year());
    let year_days = if leap { 366 } else { 365 };

    if offset >= REFERENCE_YEAR_DAYS {
        return jan_first + Duration::days(year_days);
    }
    if !leap && offset > REFERENCE_LEAP_DAY {
        jan_first + Duration::days(offset - 1)
    } else {
        jan_first + Duration::days(offset)
    }
}

fn midnight(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}

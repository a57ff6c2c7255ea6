//! Time handling for WRF output and the hour-ending output convention.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Timelike};
use serde::Serialize;

/// Format of the WRF `START_DATE` global attribute.
pub const WRF_DATE_FORMAT: &str = "%Y-%m-%d_%H:%M:%S";

/// Format of dates given on the command line and in run directory names.
pub const RUN_DATE_FORMAT: &str = "%Y%m%d";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TimeParseError {
    #[error("Invalid time format: {0}")]
    InvalidFormat(String),
}

/// Parse a WRF timestamp such as `2015-02-26_12:00:00`.
pub fn parse_wrf_date(s: &str) -> Result<NaiveDateTime, TimeParseError> {
    NaiveDateTime::parse_from_str(s.trim(), WRF_DATE_FORMAT)
        .map_err(|_| TimeParseError::InvalidFormat(s.to_string()))
}

/// Parse a `YYYYMMDD` date.
pub fn parse_run_date(s: &str) -> Result<NaiveDate, TimeParseError> {
    NaiveDate::parse_from_str(s.trim(), RUN_DATE_FORMAT)
        .map_err(|_| TimeParseError::InvalidFormat(s.to_string()))
}

/// Calendar label of an hourly record, with hours counted 1..=24.
///
/// A value valid at midnight closes the previous day, so it is labelled
/// hour 24 of that day rather than hour 0 of the next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct HourEnding {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
}

impl HourEnding {
    pub fn from_valid_time(valid_time: NaiveDateTime) -> Self {
        let t = valid_time - Duration::seconds(1);
        Self {
            year: t.year(),
            month: t.month(),
            day: t.day(),
            hour: t.hour() + 1,
        }
    }
}

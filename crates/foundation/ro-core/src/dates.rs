//! Date parsing for request bounds and stored publication dates.
//!
//! Request dates come from a form and have one fixed format. Publication
//! dates were written by whatever published the record over the years, so
//! they are parsed against a list of known layouts.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::{Error, Result};

/// Layout of `Start Date` / `End Date` in search requests.
pub const REQUEST_DATE_FORMAT: &str = "%m/%d/%Y";

const DATETIME_FORMATS: &[&str] = &[
    // Jan 15, 2020 10:30:00 AM
    "%b %d, %Y %I:%M:%S %p",
    // Jan 15, 2020, 10:30:00 AM
    "%b %d, %Y, %I:%M:%S %p",
    // Wed Jan 15 10:30:00 EST 2020
    "%a %b %d %H:%M:%S %Z %Y",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %I:%M:%S %p",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
];

const DATE_FORMATS: &[&str] = &["%m/%d/%Y", "%Y-%m-%d", "%b %d, %Y"];

/// Parse a `MM/DD/YYYY` request date.
pub fn parse_request_date(input: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), REQUEST_DATE_FORMAT).map_err(|_| Error::InvalidDate {
        input: input.to_string(),
        expected: "MM/DD/YYYY",
    })
}

/// Parse a stored publication date, trying every known layout.
///
/// Date-only layouts resolve to midnight. Returns `None` when nothing fits.
pub fn parse_publication_date(input: &str) -> Option<NaiveDateTime> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Some(dt.naive_local());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(input) {
        return Some(dt.naive_local());
    }

    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(input, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(input, fmt).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

//! Key normalization: canonical ISO dates and the `"Unknown"` city sentinel.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::error::{EnrichError, EnrichResult};
use crate::records::columns::{CITY, DATE};
use crate::table::{Table, Value};

/// Sentinel for a missing city name.
pub const UNKNOWN_CITY: &str = "Unknown";

/// Canonical date format used for every join key.
pub const ISO_DATE: &str = "%Y-%m-%d";

const DATE_FORMATS: &[&str] = &[ISO_DATE, "%Y/%m/%d"];
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parses a calendar date from a plain date, a naive timestamp, or an
/// RFC 3339 timestamp. Time components are discarded.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();

    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
                .map(|dt| dt.date())
        })
}

/// Reads a date cell, reporting the table and row when it cannot be parsed.
pub fn date_cell(table: &Table, row: usize, column: usize) -> EnrichResult<NaiveDate> {
    let cell = table.value(row, column);
    cell.as_text()
        .and_then(parse_date)
        .ok_or_else(|| EnrichError::MalformedDate {
            table: table.name().to_string(),
            row,
            value: cell.to_string(),
        })
}

/// Rewrites every `date` cell as `YYYY-MM-DD`.
pub fn normalize_dates(table: &mut Table) -> EnrichResult<()> {
    let idx = table
        .column_index(DATE)
        .ok_or_else(|| EnrichError::missing_column(DATE, "date normalization"))?;

    for row in 0..table.len() {
        let date = date_cell(table, row, idx)?;
        table.set(row, idx, Value::Text(date.format(ISO_DATE).to_string()));
    }

    Ok(())
}

/// Replaces null cells of a text column with `sentinel`. Returns how many
/// cells were filled.
pub fn fill_missing_text(table: &mut Table, column: &str, sentinel: &str) -> EnrichResult<usize> {
    let idx = table
        .column_index(column)
        .ok_or_else(|| EnrichError::missing_column(column, "text fill"))?;

    let mut filled = 0;
    for row in 0..table.len() {
        if table.value(row, idx).is_null() {
            table.set(row, idx, Value::from(sentinel));
            filled += 1;
        }
    }

    Ok(filled)
}

pub fn normalize_weather(table: &mut Table) -> EnrichResult<()> {
    normalize_dates(table)?;
    fill_missing_text(table, CITY, UNKNOWN_CITY)?;
    Ok(())
}

pub fn normalize_air_quality(table: &mut Table) -> EnrichResult<()> {
    normalize_dates(table)
}

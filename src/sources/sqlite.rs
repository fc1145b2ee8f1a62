//! `air_quality` table in the local SQLite database.

use rusqlite::types::Value as SqlValue;
use rusqlite::{Connection, OptionalExtension, params};

use crate::records::AirQualityRecord;

pub const AIR_QUALITY_TABLE: &str = "air_quality";

pub fn air_quality_exists(conn: &Connection) -> rusqlite::Result<bool> {
    let found = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1",
            [AIR_QUALITY_TABLE],
            |_| Ok(()),
        )
        .optional()?;
    Ok(found.is_some())
}

/// Numeric reading of a cell. Text is parsed leniently; anything that is
/// not a number reads as `None`.
fn lenient_number(value: SqlValue) -> Option<f64> {
    match value {
        SqlValue::Integer(i) => Some(i as f64),
        SqlValue::Real(r) if !r.is_nan() => Some(r),
        SqlValue::Text(s) => s.trim().parse::<f64>().ok().filter(|n| !n.is_nan()),
        _ => None,
    }
}

fn text(value: SqlValue) -> String {
    match value {
        SqlValue::Text(s) => s,
        SqlValue::Integer(i) => i.to_string(),
        SqlValue::Real(r) => r.to_string(),
        SqlValue::Null | SqlValue::Blob(_) => String::new(),
    }
}

/// Reads every row of the `air_quality` table.
///
/// Fails if the table does not exist. Cells of any storage class are
/// accepted; `aqi` and `co2_ppm` that are not numeric read as missing.
pub fn read_air_quality(conn: &Connection) -> rusqlite::Result<Vec<AirQualityRecord>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT station_id, date, aqi, co2_ppm FROM {AIR_QUALITY_TABLE}"
    ))?;

    let records = stmt
        .query_map([], |row| {
            Ok(AirQualityRecord {
                station_id: text(row.get(0)?),
                date: text(row.get(1)?),
                aqi: lenient_number(row.get(2)?),
                co2_ppm: lenient_number(row.get(3)?),
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(records)
}

/// Replaces the `air_quality` table with `records` in one transaction.
pub fn write_air_quality(conn: &mut Connection, records: &[AirQualityRecord]) -> rusqlite::Result<()> {
    let tx = conn.transaction()?;

    tx.execute(&format!("DROP TABLE IF EXISTS {AIR_QUALITY_TABLE}"), [])?;
    tx.execute(
        &format!(
            "CREATE TABLE {AIR_QUALITY_TABLE} (
                station_id TEXT NOT NULL,
                date TEXT NOT NULL,
                aqi REAL,
                co2_ppm REAL
            )"
        ),
        [],
    )?;

    {
        let mut insert = tx.prepare(&format!(
            "INSERT INTO {AIR_QUALITY_TABLE} (station_id, date, aqi, co2_ppm) VALUES (?1, ?2, ?3, ?4)"
        ))?;
        for r in records {
            insert.execute(params![r.station_id, r.date, r.aqi, r.co2_ppm])?;
        }
    }

    tx.commit()
}

//! Order-preserving left joins over [`Table`]s.

use std::collections::HashMap;

use crate::error::{EnrichError, EnrichResult};
use crate::records::columns::{CITY, DATE, STATION_ID};
use crate::table::{Table, Value};
use crate::transform::normalize::{UNKNOWN_CITY, fill_missing_text};

/// Suffix applied to a right-hand column whose name is already taken.
pub const COLLISION_SUFFIX: &str = "_right";

fn key_indices(table: &Table, keys: &[&str]) -> EnrichResult<Vec<usize>> {
    keys.iter()
        .map(|k| {
            table
                .column_index(k)
                .ok_or_else(|| EnrichError::missing_column(k, &format!("join of '{}'", table.name())))
        })
        .collect()
}

fn row_key(row: &[Value], indices: &[usize]) -> Option<Vec<String>> {
    indices.iter().map(|&i| row[i].key()).collect()
}

/// Left-joins `right` onto `left` by exact key equality.
///
/// Every left row is kept in order. A left row with several matches is
/// emitted once per match, in right order; an unmatched left row gets null
/// right-hand cells. Rows with a null key cell never match.
pub fn left_join(left: &Table, right: &Table, keys: &[&str]) -> EnrichResult<Table> {
    let left_keys = key_indices(left, keys)?;
    let right_keys = key_indices(right, keys)?;

    let carried: Vec<usize> = (0..right.columns().len())
        .filter(|i| !right_keys.contains(i))
        .collect();

    let mut columns = left.columns().to_vec();
    for &i in &carried {
        let name = &right.columns()[i];
        if columns.contains(name) {
            columns.push(format!("{name}{COLLISION_SUFFIX}"));
        } else {
            columns.push(name.clone());
        }
    }

    let mut index: HashMap<Vec<String>, Vec<usize>> = HashMap::new();
    for (pos, row) in right.rows().iter().enumerate() {
        if let Some(key) = row_key(row, &right_keys) {
            index.entry(key).or_default().push(pos);
        }
    }

    let mut joined = Table::with_columns(left.name(), columns);
    for row in left.rows() {
        let matches = row_key(row, &left_keys).and_then(|key| index.get(&key));
        match matches {
            Some(positions) => {
                for &pos in positions {
                    let right_row = &right.rows()[pos];
                    let mut out = row.clone();
                    out.extend(carried.iter().map(|&i| right_row[i].clone()));
                    joined.push_row(out);
                }
            }
            None => joined.push_row(row.clone()),
        }
    }

    Ok(joined)
}

/// Joins air quality to weather by station/day, then to renewable share by
/// city. Cities left null by the first join become `"Unknown"` before the
/// second join runs.
pub fn join_sources(
    air_quality: &Table,
    weather: &Table,
    renewables: &Table,
) -> EnrichResult<Table> {
    let mut joined = left_join(air_quality, weather, &[STATION_ID, DATE])?;
    fill_missing_text(&mut joined, CITY, UNKNOWN_CITY)?;

    let mut joined = left_join(&joined, renewables, &[CITY])?;
    joined.rename("enriched");
    Ok(joined)
}

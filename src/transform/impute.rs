//! Numeric coercion and median imputation.

use tracing::debug;

use crate::records::columns::{AQI, CO2_PPM, HUMIDITY, PRECIP_MM, RENEWABLE_SHARE, TEMP_C};
use crate::stats::median;
use crate::table::{Table, Value};

/// Columns whose gaps are filled with the column median.
pub const IMPUTED_COLUMNS: &[&str] = &[TEMP_C, HUMIDITY, PRECIP_MM, RENEWABLE_SHARE];

/// Measurement columns that are coerced to numbers but never filled.
pub const MEASUREMENT_COLUMNS: &[&str] = &[AQI, CO2_PPM];

/// Outcome of imputing one column.
#[derive(Debug, Clone, PartialEq)]
pub struct Imputation {
    pub column: String,
    pub median: Option<f64>,
    pub filled: usize,
}

/// Rewrites a column so every cell is a number or null. Returns the column
/// index, or `None` if the column is absent.
pub fn coerce_numeric(table: &mut Table, column: &str) -> Option<usize> {
    let idx = table.column_index(column)?;
    for row in 0..table.len() {
        let coerced = Value::from(table.value(row, idx).to_number());
        table.set(row, idx, coerced);
    }
    Some(idx)
}

/// Coerces `column` to numeric and fills its nulls with the median of the
/// values currently present. An all-null column stays all-null.
pub fn impute_median(table: &mut Table, column: &str) -> Option<Imputation> {
    let idx = coerce_numeric(table, column)?;
    let median = median((0..table.len()).map(|row| table.value(row, idx).to_number()));

    let mut filled = 0;
    if let Some(m) = median {
        for row in 0..table.len() {
            if table.value(row, idx).is_null() {
                table.set(row, idx, Value::Number(m));
                filled += 1;
            }
        }
    }

    debug!(column, ?median, filled, "Imputed column");
    Some(Imputation {
        column: column.to_string(),
        median,
        filled,
    })
}

/// Runs measurement coercion and median imputation over the joined table.
/// Columns absent from the table are skipped.
pub fn impute(table: &mut Table) -> Vec<Imputation> {
    for column in MEASUREMENT_COLUMNS {
        coerce_numeric(table, column);
    }

    IMPUTED_COLUMNS
        .iter()
        .filter_map(|column| impute_median(table, column))
        .collect()
}

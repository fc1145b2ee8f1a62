//! KPI aggregation over the enriched table.
//!
//! Three independent aggregations fan out from the same enriched table: the
//! daily city rollup with its 7-day CO₂ trend, the AQI category histogram,
//! and the renewable/air-quality alignment label.

pub mod alignment;
pub mod bucket;
pub mod daily;
pub mod types;

use tracing::debug;

use crate::error::{EnrichError, EnrichResult};
use crate::records::columns::{CITY, DATE};
use crate::table::{Table, Value};
use crate::transform::join::left_join;
use crate::transform::normalize::ISO_DATE;
use types::{DailyCityKpi, KpiReport};

pub(crate) fn require_column(table: &Table, column: &str, operation: &str) -> EnrichResult<usize> {
    table
        .column_index(column)
        .ok_or_else(|| EnrichError::schema(column, operation))
}

/// Reads a cell that must be numeric. Nulls read as `None`; text that does
/// not parse as a number is a type mismatch.
pub(crate) fn numeric_cell(table: &Table, row: usize, column: usize) -> EnrichResult<Option<f64>> {
    let cell = table.value(row, column);
    match cell {
        Value::Null => Ok(None),
        Value::Number(n) if n.is_nan() => Ok(None),
        Value::Number(n) => Ok(Some(*n)),
        Value::Text(s) => match s.trim().parse::<f64>() {
            Ok(n) if !n.is_nan() => Ok(Some(n)),
            _ => Err(EnrichError::TypeMismatch {
                column: table.columns()[column].clone(),
                row,
                value: s.clone(),
            }),
        },
    }
}

/// Computes all three KPI tables.
///
/// # Errors
///
/// [`EnrichError::Schema`] when a referenced column is absent,
/// [`EnrichError::TypeMismatch`] when a numeric column holds text, and
/// [`EnrichError::MalformedDate`] when a `date` cell cannot be parsed.
pub fn compute_kpis(enriched: &Table) -> EnrichResult<KpiReport> {
    let daily_city = daily::daily_rollup(enriched)?;
    let aqi_categories = bucket::categorize(enriched)?;
    let alignment = alignment::alignment(&daily_city, enriched)?;

    debug!(
        daily_rows = daily_city.len(),
        category_rows = aqi_categories.len(),
        cities = alignment.len(),
        "KPIs computed"
    );

    Ok(KpiReport {
        daily_city,
        aqi_categories,
        alignment,
    })
}

/// Lowers the daily rollup into a table keyed by (city, date) carrying the
/// columns merged back onto the enriched output.
pub fn daily_table(daily: &[DailyCityKpi]) -> Table {
    let mut table = Table::new(
        "daily_city",
        &[CITY, DATE, "avg_aqi", "co2_7d_ma", "co2_7d_delta"],
    );
    for day in daily {
        table.push_row(vec![
            day.city.clone().into(),
            day.date.format(ISO_DATE).to_string().into(),
            day.avg_aqi.into(),
            day.co2_7d_ma.into(),
            day.co2_7d_delta.into(),
        ]);
    }
    table
}

/// Left-joins `avg_aqi`, `co2_7d_ma` and `co2_7d_delta` onto the enriched
/// table by (city, date).
pub fn attach_daily(enriched: &Table, daily: &[DailyCityKpi]) -> EnrichResult<Table> {
    left_join(enriched, &daily_table(daily), &[CITY, DATE])
}

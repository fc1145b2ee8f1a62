use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::error::EnrichResult;
use crate::kpi::types::DailyCityKpi;
use crate::kpi::{numeric_cell, require_column};
use crate::records::columns::{AQI, CITY, CO2_PPM, DATE};
use crate::stats::{first_difference, mean, rolling_mean};
use crate::table::Table;
use crate::transform::normalize::date_cell;

/// Trailing window, in days, of the CO₂ moving average.
pub const CO2_WINDOW_DAYS: usize = 7;

#[derive(Default)]
struct DayGroup {
    aqi: Vec<Option<f64>>,
    co2: Vec<Option<f64>>,
}

/// Averages AQI and CO₂ per (city, date), sorted by city then date, with a
/// 7-day trailing CO₂ mean and its day-over-day change computed within each
/// city.
pub fn daily_rollup(enriched: &Table) -> EnrichResult<Vec<DailyCityKpi>> {
    const OPERATION: &str = "daily rollup";
    let city_idx = require_column(enriched, CITY, OPERATION)?;
    let date_idx = require_column(enriched, DATE, OPERATION)?;
    let aqi_idx = require_column(enriched, AQI, OPERATION)?;
    let co2_idx = require_column(enriched, CO2_PPM, OPERATION)?;

    let mut groups: BTreeMap<(String, NaiveDate), DayGroup> = BTreeMap::new();
    for row in 0..enriched.len() {
        let Some(city) = enriched.value(row, city_idx).key() else {
            continue;
        };
        let date = date_cell(enriched, row, date_idx)?;
        let group = groups.entry((city, date)).or_default();
        group.aqi.push(numeric_cell(enriched, row, aqi_idx)?);
        group.co2.push(numeric_cell(enriched, row, co2_idx)?);
    }

    let mut daily: Vec<DailyCityKpi> = groups
        .into_iter()
        .map(|((city, date), group)| DailyCityKpi {
            city,
            date,
            avg_aqi: mean(group.aqi),
            avg_co2_ppm: mean(group.co2),
            co2_7d_ma: None,
            co2_7d_delta: 0.0,
        })
        .collect();

    for city_days in daily.chunk_by_mut(|a, b| a.city == b.city) {
        let co2: Vec<Option<f64>> = city_days.iter().map(|d| d.avg_co2_ppm).collect();
        let ma = rolling_mean(&co2, CO2_WINDOW_DAYS);
        let delta = first_difference(&ma);

        for ((day, ma), delta) in city_days.iter_mut().zip(ma).zip(delta) {
            day.co2_7d_ma = ma;
            day.co2_7d_delta = delta;
        }
    }

    Ok(daily)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EnrichError;
    use crate::table::Value;

    fn enriched(rows: &[(&str, &str, Option<f64>, Option<f64>)]) -> Table {
        let mut t = Table::new("enriched", &["city", "date", "aqi", "co2_ppm"]);
        for &(city, date, aqi, co2) in rows {
            t.push_row(vec![city.into(), date.into(), aqi.into(), co2.into()]);
        }
        t
    }

    fn week() -> Vec<(&'static str, String, Option<f64>, Option<f64>)> {
        (0..7)
            .map(|i| {
                (
                    "TestCity",
                    format!("2025-01-0{}", i + 1),
                    Some(50.0 + 10.0 * i as f64),
                    Some(400.0 + 2.0 * i as f64),
                )
            })
            .collect()
    }

    #[test]
    fn test_rolling_window_over_a_week() {
        let rows = week();
        let rows: Vec<_> = rows
            .iter()
            .map(|(c, d, a, co)| (*c, d.as_str(), *a, *co))
            .collect();
        let daily = daily_rollup(&enriched(&rows)).unwrap();

        assert_eq!(daily.len(), 7);
        assert_eq!(daily[0].co2_7d_ma, Some(400.0));
        assert_eq!(daily[0].co2_7d_delta, 0.0);
        assert!(daily[1].co2_7d_delta >= 0.0);
        assert!((daily[6].co2_7d_ma.unwrap() - 406.0).abs() < 1e-9);
    }

    #[test]
    fn test_groups_average_within_day_and_sort() {
        let daily = daily_rollup(&enriched(&[
            ("Madison", "2025-07-02", Some(80.0), Some(410.0)),
            ("Eau Claire", "2025-07-01", Some(30.0), Some(390.0)),
            ("Madison", "2025-07-01", Some(40.0), Some(400.0)),
            ("Madison", "2025-07-01", Some(60.0), None),
        ]))
        .unwrap();

        assert_eq!(daily.len(), 3);
        assert_eq!(daily[0].city, "Eau Claire");
        assert_eq!(daily[1].city, "Madison");
        assert_eq!(daily[1].date, NaiveDate::from_ymd_opt(2025, 7, 1).unwrap());
        assert_eq!(daily[1].avg_aqi, Some(50.0));
        assert_eq!(daily[1].avg_co2_ppm, Some(400.0));
        assert_eq!(daily[2].co2_7d_ma, Some(405.0));
        assert_eq!(daily[2].co2_7d_delta, 5.0);
    }

    #[test]
    fn test_rolling_is_per_city() {
        let daily = daily_rollup(&enriched(&[
            ("A", "2025-07-01", None, Some(100.0)),
            ("B", "2025-07-01", None, Some(500.0)),
        ]))
        .unwrap();

        assert_eq!(daily[1].co2_7d_ma, Some(500.0));
        assert_eq!(daily[1].co2_7d_delta, 0.0);
        assert_eq!(daily[0].avg_aqi, None);
    }

    #[test]
    fn test_missing_co2_column_is_schema_error() {
        let mut t = Table::new("enriched", &["city", "date", "aqi"]);
        t.push_row(vec!["A".into(), "2025-07-01".into(), 1.0.into()]);
        assert!(matches!(
            daily_rollup(&t),
            Err(EnrichError::Schema { column, .. }) if column == "co2_ppm"
        ));
    }

    #[test]
    fn test_non_numeric_co2_is_type_mismatch() {
        let mut t = Table::new("enriched", &["city", "date", "aqi", "co2_ppm"]);
        t.push_row(vec!["A".into(), "2025-07-01".into(), 1.0.into(), Value::from("high")]);
        assert!(matches!(
            daily_rollup(&t),
            Err(EnrichError::TypeMismatch { column, .. }) if column == "co2_ppm"
        ));
    }
}

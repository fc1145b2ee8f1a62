use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::error::EnrichResult;
use crate::kpi::types::{AlignmentRecord, DailyCityKpi};
use crate::kpi::{numeric_cell, require_column};
use crate::records::columns::{CITY, RENEWABLE_SHARE};
use crate::table::Table;

/// Minimum renewable share for a city to count as aligned.
pub const MIN_RENEWABLE_SHARE: f64 = 0.5;
/// Maximum latest-day average AQI for a city to count as aligned.
pub const MAX_AVG_AQI: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Alignment {
    #[serde(rename = "Aligned")]
    Aligned,
    #[serde(rename = "Needs Improvement")]
    NeedsImprovement,
}

impl Alignment {
    /// A missing share or AQI never satisfies the thresholds.
    pub fn classify(renewable_share: Option<f64>, avg_aqi: Option<f64>) -> Self {
        match (renewable_share, avg_aqi) {
            (Some(share), Some(aqi)) if share >= MIN_RENEWABLE_SHARE && aqi <= MAX_AVG_AQI => {
                Alignment::Aligned
            }
            _ => Alignment::NeedsImprovement,
        }
    }
}

/// Latest daily row of each city, keyed by city. When two rows share the
/// latest date the earlier one in `daily` wins.
pub fn latest_by_city(daily: &[DailyCityKpi]) -> BTreeMap<&str, &DailyCityKpi> {
    let mut latest: BTreeMap<&str, &DailyCityKpi> = BTreeMap::new();
    for day in daily {
        latest
            .entry(day.city.as_str())
            .and_modify(|current| {
                if day.date > current.date {
                    *current = day;
                }
            })
            .or_insert(day);
    }
    latest
}

/// First renewable share seen for each city in the enriched table.
pub fn share_by_city(enriched: &Table) -> EnrichResult<HashMap<String, Option<f64>>> {
    const OPERATION: &str = "alignment";
    let city_idx = require_column(enriched, CITY, OPERATION)?;
    let share_idx = require_column(enriched, RENEWABLE_SHARE, OPERATION)?;

    let mut shares = HashMap::new();
    for row in 0..enriched.len() {
        let Some(city) = enriched.value(row, city_idx).key() else {
            continue;
        };
        if !shares.contains_key(&city) {
            shares.insert(city, numeric_cell(enriched, row, share_idx)?);
        }
    }
    Ok(shares)
}

/// Labels each city from its latest-day AQI and its renewable share, ordered
/// by city.
pub fn alignment(daily: &[DailyCityKpi], enriched: &Table) -> EnrichResult<Vec<AlignmentRecord>> {
    let shares = share_by_city(enriched)?;

    Ok(latest_by_city(daily)
        .into_iter()
        .map(|(city, day)| {
            let renewable_share = shares.get(city).copied().flatten();
            AlignmentRecord {
                city: city.to_string(),
                avg_aqi: day.avg_aqi,
                renewable_share,
                clean_energy_alignment: Alignment::classify(renewable_share, day.avg_aqi),
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EnrichError;
    use crate::table::Value;
    use chrono::NaiveDate;

    fn day(city: &str, d: u32, avg_aqi: Option<f64>) -> DailyCityKpi {
        DailyCityKpi {
            city: city.to_string(),
            date: NaiveDate::from_ymd_opt(2025, 7, d).unwrap(),
            avg_aqi,
            avg_co2_ppm: None,
            co2_7d_ma: None,
            co2_7d_delta: 0.0,
        }
    }

    fn shares(rows: &[(&str, Value)]) -> Table {
        let mut t = Table::new("enriched", &["city", "renewable_share"]);
        for (city, share) in rows {
            t.push_row(vec![(*city).into(), share.clone()]);
        }
        t
    }

    #[test]
    fn test_alignment_rule() {
        assert_eq!(Alignment::classify(Some(0.6), Some(90.0)), Alignment::Aligned);
        assert_eq!(Alignment::classify(Some(0.5), Some(100.0)), Alignment::Aligned);
        assert_eq!(
            Alignment::classify(Some(0.4), Some(90.0)),
            Alignment::NeedsImprovement
        );
        assert_eq!(
            Alignment::classify(Some(0.6), Some(101.0)),
            Alignment::NeedsImprovement
        );
        assert_eq!(Alignment::classify(None, Some(10.0)), Alignment::NeedsImprovement);
        assert_eq!(Alignment::classify(Some(0.9), None), Alignment::NeedsImprovement);
    }

    #[test]
    fn test_uses_latest_day_per_city() {
        let daily = vec![
            day("Madison", 1, Some(150.0)),
            day("Madison", 3, Some(90.0)),
            day("Madison", 2, Some(140.0)),
        ];
        let enriched = shares(&[("Madison", Value::Number(0.6))]);

        let result = alignment(&daily, &enriched).unwrap();

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].avg_aqi, Some(90.0));
        assert_eq!(result[0].clean_energy_alignment, Alignment::Aligned);
    }

    #[test]
    fn test_latest_date_tie_keeps_first() {
        let daily = vec![day("A", 5, Some(1.0)), day("A", 5, Some(2.0))];
        let latest = latest_by_city(&daily);
        assert_eq!(latest["A"].avg_aqi, Some(1.0));
    }

    #[test]
    fn test_first_share_per_city_wins() {
        let daily = vec![day("A", 1, Some(10.0)), day("B", 1, Some(10.0))];
        let enriched = shares(&[
            ("B", Value::Number(0.4)),
            ("A", Value::Null),
            ("B", Value::Number(0.9)),
        ]);

        let result = alignment(&daily, &enriched).unwrap();

        assert_eq!(result[0].city, "A");
        assert_eq!(result[0].renewable_share, None);
        assert_eq!(result[0].clean_energy_alignment, Alignment::NeedsImprovement);
        assert_eq!(result[1].renewable_share, Some(0.4));
        assert_eq!(result[1].clean_energy_alignment, Alignment::NeedsImprovement);
    }

    #[test]
    fn test_missing_share_column() {
        let enriched = Table::new("enriched", &["city"]);
        assert!(matches!(
            alignment(&[], &enriched),
            Err(EnrichError::Schema { .. })
        ));
    }
}

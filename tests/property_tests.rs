//! Property-based tests for the enrichment and KPI stages.

use std::collections::HashSet;

use envirowatch::kpi::bucket::AqiBucket;
use envirowatch::records::{AirQualityRecord, RenewableShareRecord, WeatherRecord, to_table};
use envirowatch::stats::round1;
use envirowatch::table::{Table, Value};
use envirowatch::transform::units::add_temp_fahrenheit;
use envirowatch::transform::{EnrichOptions, clean_and_join};
use proptest::prelude::*;

fn weather(station_ids: &[u8], days: &[u8], temp_c: f64) -> Vec<WeatherRecord> {
    station_ids
        .iter()
        .zip(days)
        .map(|(s, d)| WeatherRecord {
            station_id: format!("S{s}"),
            date: format!("2025-07-{:02}", d),
            city: Some("City".to_string()),
            lat: None,
            lon: None,
            temp_c: Some(temp_c),
            humidity: Some(50.0),
            precip_mm: Some(1.0),
        })
        .collect()
}

fn air_quality(station_ids: &[u8], days: &[u8]) -> Vec<AirQualityRecord> {
    station_ids
        .iter()
        .zip(days)
        .map(|(s, d)| AirQualityRecord {
            station_id: format!("S{s}"),
            date: format!("2025-07-{:02}", d),
            aqi: Some(50.0),
            co2_ppm: Some(410.0),
        })
        .collect()
}

fn renewables() -> Table {
    to_table(&[RenewableShareRecord {
        city: "City".to_string(),
        renewable_share: Some(0.5),
    }])
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Enriching twice leaves temp_f as it was after the first pass.
    #[test]
    fn fahrenheit_is_idempotent(temps in prop::collection::vec(-60.0f64..60.0, 1..20)) {
        let mut table = Table::new("t", &["temp_c"]);
        for t in &temps {
            table.push_row(vec![Value::from(*t)]);
        }

        add_temp_fahrenheit(&mut table).unwrap();
        let once = table.clone();
        add_temp_fahrenheit(&mut table).unwrap();

        prop_assert_eq!(table, once);
    }

    /// A constant temp_c yields the same rounded temp_f on every row.
    #[test]
    fn constant_celsius_maps_to_rounded_fahrenheit(
        c in -40.0f64..45.0,
        days in prop::collection::vec(1u8..=28, 1..10),
    ) {
        let stations = vec![1u8; days.len()];
        let enriched = clean_and_join(
            &to_table(&weather(&stations, &days, c)),
            &to_table(&air_quality(&stations, &days)),
            &renewables(),
            EnrichOptions { include_fahrenheit: true },
        )
        .unwrap();

        let expected = Value::Number(round1(c * 9.0 / 5.0 + 32.0));
        for v in enriched.column("temp_f").unwrap() {
            prop_assert_eq!(v, &expected);
        }
    }

    /// No two enriched rows share (station_id, date), however many repeats
    /// the inputs carry.
    #[test]
    fn enriched_rows_are_unique_per_station_day(
        keys in prop::collection::vec((1u8..4, 1u8..6), 1..40),
    ) {
        let (stations, days): (Vec<u8>, Vec<u8>) = keys.into_iter().unzip();
        let enriched = clean_and_join(
            &to_table(&weather(&stations, &days, 12.0)),
            &to_table(&air_quality(&stations, &days)),
            &renewables(),
            EnrichOptions::default(),
        )
        .unwrap();

        let mut seen = HashSet::new();
        for row in 0..enriched.len() {
            let key = (
                enriched.get(row, "station_id").map(Value::to_string),
                enriched.get(row, "date").map(Value::to_string),
            );
            prop_assert!(seen.insert(key));
        }
    }

    /// Higher AQI never lands in a better bucket.
    #[test]
    fn buckets_are_monotonic(a in 0.0f64..500.0, b in 0.0f64..500.0) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(AqiBucket::classify(Some(lo)) <= AqiBucket::classify(Some(hi)));
    }
}

//! Synthetic source data for offline runs, seeding and fallbacks.
//!
//! Every generator takes the random source explicitly so runs can be made
//! reproducible with a seeded RNG.

use chrono::{Days, NaiveDate};
use rand::Rng;
use rand_distr::{Distribution, Normal};

use crate::records::{AirQualityRecord, RenewableShareRecord, WeatherRecord};
use crate::stats::round1;
use crate::transform::normalize::ISO_DATE;

/// A monitoring station with fixed metadata.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Station {
    pub station_id: &'static str,
    pub city: &'static str,
    pub lat: f64,
    pub lon: f64,
}

pub const DEFAULT_STATIONS: &[Station] = &[
    Station {
        station_id: "ST101",
        city: "Eau Claire",
        lat: 44.811,
        lon: -91.498,
    },
    Station {
        station_id: "ST202",
        city: "Madison",
        lat: 43.074,
        lon: -89.384,
    },
    Station {
        station_id: "ST303",
        city: "Minneapolis",
        lat: 44.977,
        lon: -93.265,
    },
];

/// Inclusive range of calendar days. Empty when `end < start`.
pub fn date_range(start: NaiveDate, end: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    start.iter_days().take_while(move |d| *d <= end)
}

pub fn random_temp_c<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    round1(rng.gen_range(-5.0..=32.0))
}

pub fn random_humidity<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    f64::from(rng.gen_range(25u8..=95))
}

/// Daily precipitation: a clipped normal draw, never negative.
pub fn random_precip_mm<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    let draw: f64 = match Normal::new(1.2, 2.0) {
        Ok(normal) => normal.sample(rng),
        Err(_) => 0.0,
    };
    round1(draw.max(0.0))
}

/// One weather reading per station per day.
pub fn simulate_weather<R: Rng + ?Sized>(
    rng: &mut R,
    stations: &[Station],
    start: NaiveDate,
    end: NaiveDate,
) -> Vec<WeatherRecord> {
    let mut rows = Vec::new();
    for day in date_range(start, end) {
        for s in stations {
            rows.push(WeatherRecord {
                station_id: s.station_id.to_string(),
                date: day.format(ISO_DATE).to_string(),
                city: Some(s.city.to_string()),
                lat: Some(s.lat),
                lon: Some(s.lon),
                temp_c: Some(random_temp_c(rng)),
                humidity: Some(random_humidity(rng)),
                precip_mm: Some(random_precip_mm(rng)),
            });
        }
    }
    rows
}

/// `rows_per_station_per_day` air-quality readings per station per day.
/// Values above one produce repeated station/day keys.
pub fn simulate_air_quality<R: Rng + ?Sized>(
    rng: &mut R,
    station_ids: &[&str],
    start: NaiveDate,
    end: NaiveDate,
    rows_per_station_per_day: usize,
) -> Vec<AirQualityRecord> {
    let mut rows = Vec::new();
    for day in date_range(start, end) {
        for station_id in station_ids {
            for _ in 0..rows_per_station_per_day {
                rows.push(AirQualityRecord {
                    station_id: station_id.to_string(),
                    date: day.format(ISO_DATE).to_string(),
                    aqi: Some(f64::from(rng.gen_range(10u8..=200))),
                    co2_ppm: Some(round1(rng.gen_range(350.0..=450.0))),
                });
            }
        }
    }
    rows
}

/// Reference renewable shares for the default cities.
pub fn default_renewables() -> Vec<RenewableShareRecord> {
    [("Eau Claire", 0.42), ("Madison", 0.51), ("Minneapolis", 0.47)]
        .into_iter()
        .map(|(city, share)| RenewableShareRecord {
            city: city.to_string(),
            renewable_share: Some(share),
        })
        .collect()
}

/// A random share in `[0.2, 0.8]` for each city, rounded to two decimals.
pub fn simulate_renewables<R: Rng + ?Sized>(rng: &mut R, cities: &[String]) -> Vec<RenewableShareRecord> {
    cities
        .iter()
        .map(|city| RenewableShareRecord {
            city: city.clone(),
            renewable_share: Some((rng.gen_range(0.2..=0.8_f64) * 100.0).round() / 100.0),
        })
        .collect()
}

/// Resolves station ids against the default stations, skipping unknown ids.
pub fn stations_for(ids: &[String]) -> Vec<Station> {
    ids.iter()
        .filter_map(|id| {
            DEFAULT_STATIONS
                .iter()
                .find(|s| s.station_id == id.as_str())
                .copied()
        })
        .collect()
}

/// Days from `days_back` days ago through `today`.
pub fn trailing_window(today: NaiveDate, days_back: u64) -> (NaiveDate, NaiveDate) {
    let start = today.checked_sub_days(Days::new(days_back)).unwrap_or(today);
    (start, today)
}

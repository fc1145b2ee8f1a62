//! Weather and station metadata from the external measurements API.
//!
//! The fetch never fails: when offline, when every attempt fails or when the
//! payload has no usable results, weather is simulated for the requested
//! range instead.

use chrono::NaiveDate;
use rand::Rng;
use rand::seq::SliceRandom;
use reqwest::Url;
use serde_json::Value;
use tracing::{error, info, warn};

use super::extract::{FieldChain, date_prefix_at, number_at, text_at};
use super::{HttpClient, RetryPolicy, fetch_json};
use crate::records::WeatherRecord;
use crate::simulate::{
    DEFAULT_STATIONS, Station, random_humidity, random_precip_mm, random_temp_c, simulate_weather,
};
use crate::transform::normalize::{ISO_DATE, UNKNOWN_CITY};

pub const DEFAULT_API_ENDPOINT: &str = "https://api.openaq.org/v2/measurements";

/// Results past this many are ignored.
pub const MAX_RESULTS: usize = 5000;
const PAGE_LIMIT: &str = "1000";

struct WeatherFields {
    station_id: FieldChain<String>,
    city: FieldChain<String>,
    lat: FieldChain<f64>,
    lon: FieldChain<f64>,
    date: FieldChain<String>,
    temp_c: FieldChain<f64>,
    humidity: FieldChain<f64>,
    precip_mm: FieldChain<f64>,
}

impl WeatherFields {
    fn new() -> Self {
        Self {
            station_id: FieldChain::new("station_id")
                .then(text_at("/location"))
                .then(text_at("/station_id")),
            city: FieldChain::new("city")
                .then(text_at("/city"))
                .then(text_at("/place")),
            lat: FieldChain::new("lat").then(number_at("/coordinates/latitude")),
            lon: FieldChain::new("lon").then(number_at("/coordinates/longitude")),
            date: FieldChain::new("date").then(date_prefix_at("/date/utc")),
            temp_c: FieldChain::new("temp_c").then(number_at("/temperature")),
            humidity: FieldChain::new("humidity").then(number_at("/humidity")),
            precip_mm: FieldChain::new("precip_mm").then(number_at("/precipitation")),
        }
    }

    fn record<R: Rng + ?Sized>(
        &self,
        item: &Value,
        start: NaiveDate,
        stations: &[Station],
        rng: &mut R,
    ) -> WeatherRecord {
        let station_id = self.station_id.extract_or_else(item, || {
            stations
                .choose(rng)
                .map(|s| s.station_id.to_string())
                .unwrap_or_default()
        });

        WeatherRecord {
            station_id,
            date: self
                .date
                .extract_or_else(item, || start.format(ISO_DATE).to_string()),
            city: Some(
                self.city
                    .extract_or_else(item, || UNKNOWN_CITY.to_string()),
            ),
            lat: self.lat.extract(item),
            lon: self.lon.extract(item),
            temp_c: Some(self.temp_c.extract_or_else(item, || random_temp_c(rng))),
            humidity: Some(self.humidity.extract_or_else(item, || random_humidity(rng))),
            precip_mm: Some(self.precip_mm.extract_or_else(item, || random_precip_mm(rng))),
        }
    }
}

/// The result list of a payload: either the payload itself or its
/// `results` member.
pub fn results_of(payload: &Value) -> Option<&Vec<Value>> {
    match payload {
        Value::Array(items) => Some(items),
        Value::Object(map) => map.get("results").and_then(Value::as_array),
        _ => None,
    }
}

/// Maps a payload into weather records. `None` when the payload has no
/// results list or the list is empty.
pub fn parse_payload<R: Rng + ?Sized>(
    payload: &Value,
    start: NaiveDate,
    stations: &[Station],
    rng: &mut R,
) -> Option<Vec<WeatherRecord>> {
    let results = results_of(payload).filter(|items| !items.is_empty())?;
    let fields = WeatherFields::new();
    Some(
        results
            .iter()
            .take(MAX_RESULTS)
            .map(|item| fields.record(item, start, stations, rng))
            .collect(),
    )
}

pub fn request_url(endpoint: &str, start: NaiveDate, end: NaiveDate) -> anyhow::Result<Url> {
    let url = Url::parse_with_params(
        endpoint,
        &[
            ("date_from", start.format(ISO_DATE).to_string()),
            ("date_to", end.format(ISO_DATE).to_string()),
            ("limit", PAGE_LIMIT.to_string()),
        ],
    )?;
    Ok(url)
}

/// Fetches weather for `start..=end`, or simulates it for `stations`.
#[allow(clippy::too_many_arguments)]
#[tracing::instrument(skip_all, fields(start = %start, end = %end, offline = offline))]
pub async fn fetch_external_data<C: HttpClient + ?Sized, R: Rng + ?Sized>(
    client: &C,
    endpoint: &str,
    policy: &RetryPolicy,
    start: NaiveDate,
    end: NaiveDate,
    offline: bool,
    stations: &[Station],
    rng: &mut R,
) -> Vec<WeatherRecord> {
    let stations = if stations.is_empty() {
        DEFAULT_STATIONS
    } else {
        stations
    };

    if offline {
        info!(event = "api_simulated", start = %start, end = %end);
        return simulate_weather(rng, stations, start, end);
    }

    let url = match request_url(endpoint, start, end) {
        Ok(url) => url,
        Err(e) => {
            error!(event = "api_error", endpoint, error = %e);
            return simulate_weather(rng, stations, start, end);
        }
    };

    let Some(payload) = fetch_json(client, &url, policy).await else {
        error!(event = "api_fallback_simulation");
        return simulate_weather(rng, stations, start, end);
    };

    match parse_payload(&payload, start, stations, rng) {
        Some(rows) => {
            info!(event = "api_fetched", rows = rows.len());
            rows
        }
        None => {
            warn!(event = "api_empty_or_unexpected");
            simulate_weather(rng, stations, start, end)
        }
    }
}

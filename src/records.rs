//! Typed source records exchanged with the fetch and local-source layers.
//!
//! The engine itself works on [`Table`]s; these records are the typed edge
//! that collaborators produce and that [`to_table`] lowers into a table.

use serde::{Deserialize, Serialize};

use crate::table::{Table, Value};

/// Column names shared by the input and output contracts.
pub mod columns {
    pub const STATION_ID: &str = "station_id";
    pub const DATE: &str = "date";
    pub const CITY: &str = "city";
    pub const LAT: &str = "lat";
    pub const LON: &str = "lon";
    pub const TEMP_C: &str = "temp_c";
    pub const TEMP_F: &str = "temp_f";
    pub const HUMIDITY: &str = "humidity";
    pub const PRECIP_MM: &str = "precip_mm";
    pub const AQI: &str = "aqi";
    pub const CO2_PPM: &str = "co2_ppm";
    pub const RENEWABLE_SHARE: &str = "renewable_share";
}

/// A record type with a fixed column layout.
pub trait TableRecord {
    const TABLE: &'static str;
    const COLUMNS: &'static [&'static str];

    fn values(&self) -> Vec<Value>;
}

/// Lowers typed records into a [`Table`] named after the record type.
pub fn to_table<R: TableRecord>(records: &[R]) -> Table {
    let mut table = Table::new(R::TABLE, R::COLUMNS);
    for record in records {
        table.push_row(record.values());
    }
    table
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherRecord {
    pub station_id: String,
    pub date: String,
    pub city: Option<String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub temp_c: Option<f64>,
    pub humidity: Option<f64>,
    pub precip_mm: Option<f64>,
}

impl TableRecord for WeatherRecord {
    const TABLE: &'static str = "weather";
    const COLUMNS: &'static [&'static str] = &[
        columns::STATION_ID,
        columns::DATE,
        columns::CITY,
        columns::LAT,
        columns::LON,
        columns::TEMP_C,
        columns::HUMIDITY,
        columns::PRECIP_MM,
    ];

    fn values(&self) -> Vec<Value> {
        vec![
            self.station_id.clone().into(),
            self.date.clone().into(),
            self.city.clone().into(),
            self.lat.into(),
            self.lon.into(),
            self.temp_c.into(),
            self.humidity.into(),
            self.precip_mm.into(),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AirQualityRecord {
    pub station_id: String,
    pub date: String,
    pub aqi: Option<f64>,
    pub co2_ppm: Option<f64>,
}

impl TableRecord for AirQualityRecord {
    const TABLE: &'static str = "air_quality";
    const COLUMNS: &'static [&'static str] = &[
        columns::STATION_ID,
        columns::DATE,
        columns::AQI,
        columns::CO2_PPM,
    ];

    fn values(&self) -> Vec<Value> {
        vec![
            self.station_id.clone().into(),
            self.date.clone().into(),
            self.aqi.into(),
            self.co2_ppm.into(),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenewableShareRecord {
    pub city: String,
    /// Unparsable shares read as missing and are imputed later.
    #[serde(deserialize_with = "csv::invalid_option")]
    pub renewable_share: Option<f64>,
}

impl TableRecord for RenewableShareRecord {
    const TABLE: &'static str = "renewable_share";
    const COLUMNS: &'static [&'static str] = &[columns::CITY, columns::RENEWABLE_SHARE];

    fn values(&self) -> Vec<Value> {
        vec![self.city.clone().into(), self.renewable_share.into()]
    }
}

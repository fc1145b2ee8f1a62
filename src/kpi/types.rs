//! Output rows produced by the KPI aggregator.

use chrono::NaiveDate;
use serde::Serialize;

use crate::kpi::alignment::Alignment;
use crate::kpi::bucket::AqiBucket;

/// Per city and day averages with the trailing CO₂ trend.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyCityKpi {
    pub city: String,
    pub date: NaiveDate,
    pub avg_aqi: Option<f64>,
    pub avg_co2_ppm: Option<f64>,
    pub co2_7d_ma: Option<f64>,
    pub co2_7d_delta: f64,
}

impl DailyCityKpi {
    pub const COLUMNS: &'static [&'static str] = &[
        "city",
        "date",
        "avg_aqi",
        "avg_co2_ppm",
        "co2_7d_ma",
        "co2_7d_delta",
    ];
}

/// Number of observations of a city falling into one AQI bucket.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AqiCategoryCount {
    pub city: String,
    pub bucket: AqiBucket,
    pub days_in_bucket: usize,
}

impl AqiCategoryCount {
    pub const COLUMNS: &'static [&'static str] = &["city", "bucket", "days_in_bucket"];
}

/// A city's latest air quality set against its renewable share.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlignmentRecord {
    pub city: String,
    pub avg_aqi: Option<f64>,
    pub renewable_share: Option<f64>,
    pub clean_energy_alignment: Alignment,
}

impl AlignmentRecord {
    pub const COLUMNS: &'static [&'static str] =
        &["city", "avg_aqi", "renewable_share", "clean_energy_alignment"];
}

/// The three KPI tables computed from one enriched table.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct KpiReport {
    pub daily_city: Vec<DailyCityKpi>,
    pub aqi_categories: Vec<AqiCategoryCount>,
    pub alignment: Vec<AlignmentRecord>,
}

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::EnrichResult;
use crate::kpi::types::AqiCategoryCount;
use crate::kpi::{numeric_cell, require_column};
use crate::records::columns::{AQI, CITY};
use crate::table::Table;

/// AQI severity bucket. Variants are ordered from best to worst.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum AqiBucket {
    #[serde(rename = "Good")]
    Good,
    #[serde(rename = "Moderate")]
    Moderate,
    #[serde(rename = "Unhealthy for SG")]
    UnhealthyForSensitiveGroups,
    #[serde(rename = "Unhealthy+")]
    Unhealthy,
}

impl AqiBucket {
    /// Classifies an AQI reading using inclusive upper bounds.
    ///
    /// | Range       | Bucket           |
    /// |-------------|------------------|
    /// | <= 50       | Good             |
    /// | <= 100      | Moderate         |
    /// | <= 150      | Unhealthy for SG |
    /// | otherwise   | Unhealthy+       |
    ///
    /// A missing reading falls through to `Unhealthy+`.
    pub fn classify(aqi: Option<f64>) -> Self {
        match aqi {
            Some(a) if a <= 50.0 => AqiBucket::Good,
            Some(a) if a <= 100.0 => AqiBucket::Moderate,
            Some(a) if a <= 150.0 => AqiBucket::UnhealthyForSensitiveGroups,
            _ => AqiBucket::Unhealthy,
        }
    }
}

/// Counts raw observations per (city, bucket), ordered by city then
/// severity. Rows without a city are not counted.
pub fn categorize(enriched: &Table) -> EnrichResult<Vec<AqiCategoryCount>> {
    const OPERATION: &str = "AQI categorization";
    let city_idx = require_column(enriched, CITY, OPERATION)?;
    let aqi_idx = require_column(enriched, AQI, OPERATION)?;

    let mut counts: BTreeMap<(String, AqiBucket), usize> = BTreeMap::new();
    for row in 0..enriched.len() {
        let Some(city) = enriched.value(row, city_idx).key() else {
            continue;
        };
        let bucket = AqiBucket::classify(numeric_cell(enriched, row, aqi_idx)?);
        *counts.entry((city, bucket)).or_default() += 1;
    }

    Ok(counts
        .into_iter()
        .map(|((city, bucket), days_in_bucket)| AqiCategoryCount {
            city,
            bucket,
            days_in_bucket,
        })
        .collect())
}

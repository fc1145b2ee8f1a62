//! Cleaning and joining of the three sources into the enriched table.
//!
//! Stages run strictly in order: normalize → join → impute → deduplicate →
//! unit enrichment. Each stage works on the single table produced by the
//! previous one.

pub mod dedup;
pub mod impute;
pub mod join;
pub mod normalize;
pub mod units;

use tracing::{debug, info};

use crate::error::EnrichResult;
use crate::records::columns::{DATE, STATION_ID};
use crate::table::Table;

#[derive(Debug, Clone, Copy, Default)]
pub struct EnrichOptions {
    /// Derive `temp_f` from `temp_c`.
    pub include_fahrenheit: bool,
}

/// Builds the enriched, per-station-per-day table.
///
/// The inputs are left untouched; each is copied before normalization.
///
/// # Errors
///
/// - [`EnrichError::MalformedDate`](crate::error::EnrichError::MalformedDate)
///   if a `date` cell of the weather or air-quality table cannot be parsed.
/// - [`EnrichError::MissingColumn`](crate::error::EnrichError::MissingColumn)
///   if a join key is absent, or `temp_c` is absent while Fahrenheit output
///   was requested.
pub fn clean_and_join(
    weather: &Table,
    air_quality: &Table,
    renewables: &Table,
    options: EnrichOptions,
) -> EnrichResult<Table> {
    let mut weather = weather.clone();
    let mut air_quality = air_quality.clone();

    normalize::normalize_weather(&mut weather)?;
    normalize::normalize_air_quality(&mut air_quality)?;

    let mut enriched = join::join_sources(&air_quality, &weather, renewables)?;
    debug!(rows = enriched.len(), "Sources joined");

    impute::impute(&mut enriched);

    let dropped = dedup::drop_duplicates(&mut enriched, &[STATION_ID, DATE])?;
    if dropped > 0 {
        info!(dropped, "Dropped duplicate station/day rows");
    }

    if options.include_fahrenheit {
        units::add_temp_fahrenheit(&mut enriched)?;
    }

    Ok(enriched)
}

//! Local sources: air quality from SQLite and renewable share from CSV.
//!
//! Both sources seed themselves with synthetic data when missing, so a run
//! always gets a usable air-quality table and renewable reference data.

pub mod renewables;
pub mod sqlite;

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use rand::Rng;
use rusqlite::Connection;
use tracing::{info, warn};

use crate::output::ensure_parent;
use crate::records::{AirQualityRecord, RenewableShareRecord};
use crate::simulate::{DEFAULT_STATIONS, default_renewables, simulate_air_quality};

pub const DEFAULT_DB_PATH: &str = "data/env.db";
pub const DEFAULT_RENEWABLES_CSV: &str = "data/renewable_share.csv";

#[derive(Debug, Clone)]
pub struct LocalPaths {
    pub db_path: PathBuf,
    pub renewables_csv: PathBuf,
}

impl Default for LocalPaths {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            renewables_csv: PathBuf::from(DEFAULT_RENEWABLES_CSV),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LocalSources {
    pub air_quality: Vec<AirQualityRecord>,
    pub renewables: Vec<RenewableShareRecord>,
}

fn default_station_ids() -> Vec<&'static str> {
    DEFAULT_STATIONS.iter().map(|s| s.station_id).collect()
}

/// Loads air quality and renewable share.
///
/// If the database has no `air_quality` table, air quality for `start..=end`
/// is simulated and written to it. An existing table is never replaced. If the renewable CSV is absent,
/// the default reference data is written and returned.
pub fn load_local_sources<R: Rng + ?Sized>(
    paths: &LocalPaths,
    start: NaiveDate,
    end: NaiveDate,
    rng: &mut R,
) -> Result<LocalSources> {
    ensure_parent(&paths.db_path)?;
    let mut conn = Connection::open(&paths.db_path)
        .with_context(|| format!("Failed to open database {}", paths.db_path.display()))?;

    let table_exists = sqlite::air_quality_exists(&conn)
        .with_context(|| format!("Failed to inspect database {}", paths.db_path.display()))?;

    let air_quality = if table_exists {
        let rows = sqlite::read_air_quality(&conn).context("Failed to read air_quality table")?;
        info!(event = "db_loaded", rows = rows.len(), table = sqlite::AIR_QUALITY_TABLE);
        rows
    } else {
        warn!(event = "db_air_quality_missing", table = sqlite::AIR_QUALITY_TABLE);
        let rows = simulate_air_quality(rng, &default_station_ids(), start, end, 1);
        sqlite::write_air_quality(&mut conn, &rows).context("Failed to seed air_quality table")?;
        info!(
            event = "db_simulated_written",
            rows = rows.len(),
            table = sqlite::AIR_QUALITY_TABLE
        );
        rows
    };

    let renewables = if paths.renewables_csv.exists() {
        let rows = renewables::read_renewables(&paths.renewables_csv)?;
        info!(
            event = "file_loaded",
            rows = rows.len(),
            file = %paths.renewables_csv.display()
        );
        rows
    } else {
        let rows = default_renewables();
        ensure_parent(&paths.renewables_csv)?;
        renewables::write_renewables(&paths.renewables_csv, &rows)?;
        info!(
            event = "file_simulated_written",
            rows = rows.len(),
            file = %paths.renewables_csv.display()
        );
        rows
    };

    Ok(LocalSources {
        air_quality,
        renewables,
    })
}

/// Writes synthetic air quality for `start..=end` and the default renewable
/// CSV, replacing whatever was there. Returns the number of air-quality rows.
pub fn seed_local_sources<R: Rng + ?Sized>(
    paths: &LocalPaths,
    start: NaiveDate,
    end: NaiveDate,
    rows_per_station_per_day: usize,
    rng: &mut R,
) -> Result<usize> {
    ensure_parent(&paths.db_path)?;
    let mut conn = Connection::open(&paths.db_path)
        .with_context(|| format!("Failed to open database {}", paths.db_path.display()))?;

    let rows = simulate_air_quality(
        rng,
        &default_station_ids(),
        start,
        end,
        rows_per_station_per_day,
    );
    sqlite::write_air_quality(&mut conn, &rows).context("Failed to write air_quality table")?;

    ensure_parent(&paths.renewables_csv)?;
    renewables::write_renewables(&paths.renewables_csv, &default_renewables())?;

    Ok(rows.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn paths(dir: &std::path::Path) -> LocalPaths {
        LocalPaths {
            db_path: dir.join("db").join("env.db"),
            renewables_csv: dir.join("renewable_share.csv"),
        }
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 7, d).unwrap()
    }

    #[test]
    fn test_first_load_seeds_then_second_load_reads() {
        let dir = tempfile::tempdir().unwrap();
        let paths = paths(dir.path());
        let mut rng = StdRng::seed_from_u64(11);

        let first = load_local_sources(&paths, day(1), day(3), &mut rng).unwrap();
        assert_eq!(first.air_quality.len(), 9);
        assert_eq!(first.renewables, default_renewables());
        assert!(paths.db_path.exists());
        assert!(paths.renewables_csv.exists());

        // a different range must not reseed: the stored rows come back
        let second = load_local_sources(&paths, day(10), day(20), &mut rng).unwrap();
        assert_eq!(second, first);
    }

    #[test]
    fn test_existing_table_with_bad_cells_is_kept() {
        let dir = tempfile::tempdir().unwrap();
        let paths = paths(dir.path());
        ensure_parent(&paths.db_path).unwrap();
        let conn = Connection::open(&paths.db_path).unwrap();
        conn.execute_batch(
            "CREATE TABLE air_quality (station_id TEXT, date TEXT, aqi REAL, co2_ppm REAL);
             INSERT INTO air_quality VALUES ('REAL1', '2025-07-01', 'n/a', 401.0);
             INSERT INTO air_quality VALUES ('REAL1', '2025-07-02', 55, 402.0);",
        )
        .unwrap();
        drop(conn);

        let mut rng = StdRng::seed_from_u64(3);
        let loaded = load_local_sources(&paths, day(1), day(2), &mut rng).unwrap();

        assert_eq!(loaded.air_quality.len(), 2);
        assert!(loaded.air_quality.iter().all(|r| r.station_id == "REAL1"));
        assert_eq!(loaded.air_quality[0].aqi, None);

        let conn = Connection::open(&paths.db_path).unwrap();
        let stored: i64 = conn
            .query_row("SELECT COUNT(*) FROM air_quality WHERE station_id = 'REAL1'", [], |r| r.get(0))
            .unwrap();
        assert_eq!(stored, 2);
    }

    #[test]
    fn test_seed_local_sources_replaces_data() {
        let dir = tempfile::tempdir().unwrap();
        let paths = paths(dir.path());
        let mut rng = StdRng::seed_from_u64(5);

        let written = seed_local_sources(&paths, day(1), day(2), 2, &mut rng).unwrap();
        assert_eq!(written, 12);

        let loaded = load_local_sources(&paths, day(1), day(2), &mut rng).unwrap();
        assert_eq!(loaded.air_quality.len(), 12);
    }
}

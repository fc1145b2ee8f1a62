//! Persistence of the enriched table and KPI tables as CSV, plus a logged
//! preview of the enriched rows.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use csv::WriterBuilder;
use serde::Serialize;
use tracing::{debug, info};

use crate::kpi::types::{AlignmentRecord, AqiCategoryCount, DailyCityKpi, KpiReport};
use crate::table::{Table, Value};

pub const DEFAULT_OUTPUT: &str = "data/final_enriched.csv";
pub const DEFAULT_KPI_DIR: &str = "data/kpis";

/// Creates the parent directory of `path` if it has one.
pub(crate) fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    Ok(())
}

/// Writes `table` as CSV with a header row, replacing any existing file.
/// Nulls are written as empty fields.
pub fn write_table(path: &Path, table: &Table) -> Result<()> {
    ensure_parent(path)?;
    let mut writer = WriterBuilder::new()
        .from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;

    writer.write_record(table.columns())?;
    for row in table.rows() {
        writer.write_record(row.iter().map(Value::to_string))?;
    }
    writer.flush()?;

    debug!(path = %path.display(), rows = table.len(), "Table written");
    Ok(())
}

/// Writes `header` and then one row per record. Each record must serialize
/// to fields in `header` order. An empty slice still produces the header.
pub fn write_records<T: Serialize>(path: &Path, header: &[&str], records: &[T]) -> Result<()> {
    ensure_parent(path)?;
    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;

    writer.write_record(header)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;

    debug!(path = %path.display(), rows = records.len(), "Records written");
    Ok(())
}

/// Writes `daily_city.csv`, `aqi_categories.csv` and `alignment.csv` into
/// `dir` and returns their paths.
pub fn write_kpis(dir: &Path, report: &KpiReport) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create directory {}", dir.display()))?;

    let daily = dir.join("daily_city.csv");
    let categories = dir.join("aqi_categories.csv");
    let alignment = dir.join("alignment.csv");

    write_records(&daily, DailyCityKpi::COLUMNS, &report.daily_city)?;
    write_records(&categories, AqiCategoryCount::COLUMNS, &report.aqi_categories)?;
    write_records(&alignment, AlignmentRecord::COLUMNS, &report.alignment)?;

    Ok(vec![daily, categories, alignment])
}

fn to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Null => serde_json::Value::Null,
        Value::Number(n) => serde_json::Number::from_f64(*n)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        Value::Text(s) => serde_json::Value::String(s.clone()),
    }
}

/// Logs up to `n` rows of `table`, one JSON object per row.
pub fn log_sample(table: &Table, n: usize) {
    for (i, row) in table.rows().iter().take(n).enumerate() {
        let object: serde_json::Map<String, serde_json::Value> = table
            .columns()
            .iter()
            .cloned()
            .zip(row.iter().map(to_json))
            .collect();
        info!(table = table.name(), row = i, "{}", serde_json::Value::Object(object));
    }
}

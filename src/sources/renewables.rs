//! Renewable-share reference data kept as a CSV file.

use std::path::Path;

use anyhow::{Context, Result};

use crate::records::RenewableShareRecord;

pub fn read_renewables(path: &Path) -> Result<Vec<RenewableShareRecord>> {
    let mut rdr = csv::Reader::from_path(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;

    let mut rows = Vec::new();
    for result in rdr.deserialize() {
        let record: RenewableShareRecord =
            result.with_context(|| format!("Malformed row in {}", path.display()))?;
        rows.push(record);
    }
    Ok(rows)
}

pub fn write_renewables(path: &Path, records: &[RenewableShareRecord]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulate::default_renewables;

    #[test]
    fn test_round_trip_default_renewables() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("renewable_share.csv");

        write_renewables(&path, &default_renewables()).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("city,renewable_share"));

        assert_eq!(read_renewables(&path).unwrap(), default_renewables());
    }

    #[test]
    fn test_empty_share_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("renewable_share.csv");
        std::fs::write(&path, "city,renewable_share\nMadison,\n").unwrap();

        let rows = read_renewables(&path).unwrap();
        assert_eq!(rows[0].renewable_share, None);
    }

    #[test]
    fn test_non_numeric_share_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("renewable_share.csv");
        std::fs::write(&path, "city,renewable_share\nMadison,n/a\nEau Claire,0.42\n").unwrap();

        let rows = read_renewables(&path).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].renewable_share, None);
        assert_eq!(rows[1].renewable_share, Some(0.42));
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read_renewables(&dir.path().join("nope.csv")).is_err());
    }
}

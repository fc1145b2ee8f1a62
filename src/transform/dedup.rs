//! Keep-first deduplication on a composite key.

use std::collections::HashSet;

use crate::error::{EnrichError, EnrichResult};
use crate::table::Table;

/// Drops every row whose key was already seen, keeping the first occurrence.
/// Null key cells compare equal to each other. Returns the number of rows
/// dropped.
pub fn drop_duplicates(table: &mut Table, keys: &[&str]) -> EnrichResult<usize> {
    let indices = keys
        .iter()
        .map(|k| {
            table
                .column_index(k)
                .ok_or_else(|| EnrichError::missing_column(k, "deduplication"))
        })
        .collect::<EnrichResult<Vec<_>>>()?;

    let before = table.len();
    let mut seen: HashSet<Vec<Option<String>>> = HashSet::with_capacity(before);
    table.retain_rows(|row| seen.insert(indices.iter().map(|&i| row[i].key()).collect()));

    Ok(before - table.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Value;

    #[test]
    fn test_keeps_first_occurrence() {
        let mut t = Table::new("enriched", &["station_id", "date", "aqi"]);
        t.push_row(vec!["S1".into(), "2025-07-01".into(), 10.0.into()]);
        t.push_row(vec!["S1".into(), "2025-07-01".into(), 99.0.into()]);
        t.push_row(vec!["S1".into(), "2025-07-02".into(), 20.0.into()]);
        t.push_row(vec!["S2".into(), "2025-07-01".into(), 30.0.into()]);

        let dropped = drop_duplicates(&mut t, &["station_id", "date"]).unwrap();

        assert_eq!(dropped, 1);
        assert_eq!(t.len(), 3);
        assert_eq!(t.get(0, "aqi"), Some(&Value::Number(10.0)));
    }

    #[test]
    fn test_null_keys_collapse() {
        let mut t = Table::new("enriched", &["station_id", "date"]);
        t.push_row(vec![Value::Null, "2025-07-01".into()]);
        t.push_row(vec![Value::Null, "2025-07-01".into()]);

        assert_eq!(drop_duplicates(&mut t, &["station_id", "date"]).unwrap(), 1);
    }

    #[test]
    fn test_missing_key_column() {
        let mut t = Table::new("enriched", &["station_id"]);
        assert!(matches!(
            drop_duplicates(&mut t, &["station_id", "date"]),
            Err(EnrichError::MissingColumn { .. })
        ));
    }
}

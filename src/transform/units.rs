//! Unit enrichment.

use crate::error::{EnrichError, EnrichResult};
use crate::records::columns::{TEMP_C, TEMP_F};
use crate::stats::round1;
use crate::table::{Table, Value};

/// Converts Celsius to Fahrenheit, rounded to one decimal place.
pub fn celsius_to_fahrenheit(celsius: f64) -> f64 {
    round1(celsius * 9.0 / 5.0 + 32.0)
}

/// Adds `temp_f` derived from `temp_c`. Leaves an existing `temp_f` column
/// untouched, so repeated calls are no-ops.
pub fn add_temp_fahrenheit(table: &mut Table) -> EnrichResult<()> {
    let celsius = table
        .column_index(TEMP_C)
        .ok_or_else(|| EnrichError::missing_column(TEMP_C, "Fahrenheit conversion"))?;

    if table.has_column(TEMP_F) {
        return Ok(());
    }

    table.add_column(TEMP_F, |row| {
        Value::from(row[celsius].to_number().map(celsius_to_fahrenheit))
    });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_celsius_to_fahrenheit() {
        assert_eq!(celsius_to_fahrenheit(10.0), 50.0);
        assert_eq!(celsius_to_fahrenheit(0.0), 32.0);
        assert_eq!(celsius_to_fahrenheit(-40.0), -40.0);
        assert_eq!(celsius_to_fahrenheit(21.7), 71.1);
    }

    #[test]
    fn test_add_temp_fahrenheit_is_idempotent() {
        let mut t = Table::new("enriched", &["temp_c"]);
        t.push_row(vec![10.0.into()]);
        t.push_row(vec![Value::Null]);

        add_temp_fahrenheit(&mut t).unwrap();
        let once = t.clone();
        add_temp_fahrenheit(&mut t).unwrap();

        assert_eq!(t, once);
        assert_eq!(t.columns().len(), 2);
        assert_eq!(t.get(0, "temp_f"), Some(&Value::Number(50.0)));
        assert!(t.get(1, "temp_f").unwrap().is_null());
    }

    #[test]
    fn test_existing_temp_f_is_not_overwritten() {
        let mut t = Table::new("enriched", &["temp_c", "temp_f"]);
        t.push_row(vec![10.0.into(), 99.0.into()]);

        add_temp_fahrenheit(&mut t).unwrap();
        assert_eq!(t.get(0, "temp_f"), Some(&Value::Number(99.0)));
    }

    #[test]
    fn test_missing_temp_c() {
        let mut t = Table::new("enriched", &["temp_f"]);
        assert_eq!(
            add_temp_fahrenheit(&mut t),
            Err(EnrichError::missing_column("temp_c", "Fahrenheit conversion"))
        );
    }
}

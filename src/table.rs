//! In-memory tabular structure shared by every pipeline stage.
//!
//! A [`Table`] is an ordered list of rows over a fixed list of named columns.
//! Cells are loosely typed [`Value`]s so that sparse or dirty inputs can be
//! represented faithfully until the stage that cares about them coerces them.

use std::fmt;

/// A single cell.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Number(f64),
    Text(String),
}

impl Value {
    /// `true` for `Null` and for `NaN` numbers.
    pub fn is_null(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Number(n) => n.is_nan(),
            Value::Text(_) => false,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Lenient numeric coercion: text is parsed, anything unparsable (and
    /// `NaN`) becomes `None`.
    pub fn to_number(&self) -> Option<f64> {
        match self {
            Value::Null => None,
            Value::Number(n) if n.is_nan() => None,
            Value::Number(n) => Some(*n),
            Value::Text(s) => s.trim().parse::<f64>().ok().filter(|n| !n.is_nan()),
        }
    }

    /// Key used by joins, grouping and deduplication. Null cells have no key.
    pub fn key(&self) -> Option<String> {
        match self {
            Value::Null => None,
            Value::Number(n) if n.is_nan() => None,
            Value::Number(n) => Some(n.to_string()),
            Value::Text(s) => Some(s.clone()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Number(n) if n.is_nan() => Ok(()),
            Value::Number(n) => write!(f, "{n}"),
            Value::Text(s) => f.write_str(s),
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<Option<f64>> for Value {
    fn from(n: Option<f64>) -> Self {
        n.map_or(Value::Null, Value::Number)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<Option<String>> for Value {
    fn from(s: Option<String>) -> Self {
        s.map_or(Value::Null, Value::Text)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    name: String,
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    pub fn new(name: impl Into<String>, columns: &[&str]) -> Self {
        Self::with_columns(name, columns.iter().map(|c| c.to_string()).collect())
    }

    pub fn with_columns(name: impl Into<String>, columns: Vec<String>) -> Self {
        Self {
            name: name.into(),
            columns,
            rows: Vec::new(),
        }
    }

    /// Label used in error messages and logs (e.g. `"weather"`).
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rename(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    /// Appends a row, padding with nulls or truncating to the column count.
    pub fn push_row(&mut self, mut row: Vec<Value>) {
        row.resize(self.columns.len(), Value::Null);
        self.rows.push(row);
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    pub fn value(&self, row: usize, column: usize) -> &Value {
        &self.rows[row][column]
    }

    pub fn set(&mut self, row: usize, column: usize, value: Value) {
        self.rows[row][column] = value;
    }

    /// Cell lookup by column name.
    pub fn get(&self, row: usize, column: &str) -> Option<&Value> {
        let idx = self.column_index(column)?;
        self.rows.get(row).map(|r| &r[idx])
    }

    /// Iterates over one column's cells, if the column exists.
    pub fn column(&self, name: &str) -> Option<impl Iterator<Item = &Value>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(move |r| &r[idx]))
    }

    /// Appends a column whose cells are derived from each existing row.
    /// Returns the new column's index.
    pub fn add_column<F>(&mut self, name: &str, mut derive: F) -> usize
    where
        F: FnMut(&[Value]) -> Value,
    {
        for row in &mut self.rows {
            let value = derive(row);
            row.push(value);
        }
        self.columns.push(name.to_string());
        self.columns.len() - 1
    }

    pub fn retain_rows<F>(&mut self, mut keep: F)
    where
        F: FnMut(&[Value]) -> bool,
    {
        self.rows.retain(|row| keep(row));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        let mut t = Table::new("sample", &["id", "score"]);
        t.push_row(vec!["a".into(), 1.5.into()]);
        t.push_row(vec!["b".into(), Value::Null]);
        t
    }

    #[test]
    fn test_to_number_coerces_text() {
        assert_eq!(Value::from("12.5").to_number(), Some(12.5));
        assert_eq!(Value::from(" 7 ").to_number(), Some(7.0));
        assert_eq!(Value::from("n/a").to_number(), None);
        assert_eq!(Value::Number(f64::NAN).to_number(), None);
        assert_eq!(Value::Null.to_number(), None);
    }

    #[test]
    fn test_null_and_nan_have_no_key() {
        assert_eq!(Value::Null.key(), None);
        assert_eq!(Value::Number(f64::NAN).key(), None);
        assert_eq!(Value::from("ST101").key(), Some("ST101".to_string()));
    }

    #[test]
    fn test_push_row_pads_short_rows() {
        let mut t = Table::new("t", &["a", "b", "c"]);
        t.push_row(vec![1.0.into()]);
        assert_eq!(t.rows()[0].len(), 3);
        assert!(t.value(0, 2).is_null());
    }

    #[test]
    fn test_get_by_column_name() {
        let t = sample();
        assert_eq!(t.get(0, "score"), Some(&Value::Number(1.5)));
        assert_eq!(t.get(0, "missing"), None);
        assert_eq!(t.get(5, "score"), None);
    }

    #[test]
    fn test_add_column_derives_from_row() {
        let mut t = sample();
        let idx = t.add_column("doubled", |row| row[1].to_number().map(|n| n * 2.0).into());
        assert_eq!(idx, 2);
        assert_eq!(t.value(0, idx), &Value::Number(3.0));
        assert!(t.value(1, idx).is_null());
    }

    #[test]
    fn test_display_renders_null_as_empty() {
        assert_eq!(Value::Null.to_string(), "");
        assert_eq!(Value::Number(50.0).to_string(), "50");
        assert_eq!(Value::from("Madison").to_string(), "Madison");
    }
}

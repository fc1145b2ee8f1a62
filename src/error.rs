//! Error taxonomy for the enrichment and KPI engine.
//!
//! Missing *values* are never errors: they are imputed or carried through as
//! nulls. Only structural problems (bad date keys, absent columns, cells that
//! cannot be read as numbers) abort a run.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EnrichError {
    #[error("Malformed date in table '{table}' at row {row}: '{value}'")]
    MalformedDate {
        table: String,
        row: usize,
        value: String,
    },

    #[error("Missing column '{column}' required for {operation}")]
    MissingColumn { column: String, operation: String },

    #[error("Schema error: {operation} references absent column '{column}'")]
    Schema { column: String, operation: String },

    #[error("Type mismatch in column '{column}' at row {row}: '{value}' is not numeric")]
    TypeMismatch {
        column: String,
        row: usize,
        value: String,
    },
}

impl EnrichError {
    pub fn missing_column(column: &str, operation: &str) -> Self {
        EnrichError::MissingColumn {
            column: column.to_string(),
            operation: operation.to_string(),
        }
    }

    pub fn schema(column: &str, operation: &str) -> Self {
        EnrichError::Schema {
            column: column.to_string(),
            operation: operation.to_string(),
        }
    }
}

pub type EnrichResult<T> = std::result::Result<T, EnrichError>;

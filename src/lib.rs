pub mod config;
pub mod error;
pub mod fetch;
pub mod kpi;
pub mod output;
pub mod records;
pub mod simulate;
pub mod sources;
pub mod stats;
pub mod table;
pub mod transform;

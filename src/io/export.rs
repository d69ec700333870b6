//! Export tables for spreadsheets or a chart front-end.
//!
//! - CSV uses the store layout (`Time` column first, canonical labels).
//! - JSON carries the cadence and uses `null` for missing values.

use std::fs::File;
use std::path::Path;

use serde::Serialize;

use crate::domain::{Cadence, Table};
use crate::error::AppError;
use crate::io::store::write_table;

/// Serializable view of a `Table`.
#[derive(Debug, Serialize)]
pub struct TableFile {
    pub cadence: Cadence,
    pub periods: Vec<String>,
    pub columns: Vec<ColumnFile>,
}

#[derive(Debug, Serialize)]
pub struct ColumnFile {
    pub name: String,
    pub values: Vec<Option<f64>>,
}

impl From<&Table> for TableFile {
    fn from(table: &Table) -> Self {
        Self {
            cadence: table.cadence,
            periods: table.periods.iter().map(|p| p.label()).collect(),
            columns: table
                .columns
                .iter()
                .map(|c| ColumnFile {
                    name: c.name.clone(),
                    values: c.values.iter().map(|v| (!v.is_nan()).then_some(*v)).collect(),
                })
                .collect(),
        }
    }
}

/// Write a table to CSV or JSON, chosen by the file extension (default CSV).
pub fn write_table_file(path: &Path, table: &Table) -> Result<(), AppError> {
    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));

    if is_json {
        write_table_json(path, table)
    } else {
        write_table_csv(path, table)
    }
}

pub fn write_table_csv(path: &Path, table: &Table) -> Result<(), AppError> {
    write_table(path, table).map_err(|e| AppError::new(2, format!("Failed to write export CSV: {e}")))
}

pub fn write_table_json(path: &Path, table: &Table) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export JSON '{}': {e}", path.display())))?;

    serde_json::to_writer_pretty(file, &TableFile::from(table))
        .map_err(|e| AppError::new(2, format!("Failed to write export JSON: {e}")))?;

    Ok(())
}

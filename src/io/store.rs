//! On-disk raw-series store.
//!
//! One CSV per series at `<root>/<Identifier>-<Source>-<Code>.csv`:
//!
//! ```text
//! Time,Gross domestic product,Personal consumption expenditures,...
//! 2024Q1,28269.17,19424.11,...
//! ```
//!
//! - `Time` labels may be any form `Period::parse` accepts; they are written
//!   back in the canonical form of the series cadence.
//! - Empty cells, `.` and `nan` are missing values.
//! - Column names may repeat; columns are matched by position.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::domain::{Cadence, Period, SeriesKey, Table};
use crate::engine::SeriesSource;
use crate::error::EngineError;

pub const TIME_COLUMN: &str = "Time";

/// Directory-backed store of parsed raw series.
#[derive(Debug, Clone)]
pub struct CsvStore {
    root: PathBuf,
}

impl CsvStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, key: &SeriesKey) -> PathBuf {
        self.root.join(format!("{key}.csv"))
    }

    pub fn contains(&self, key: &SeriesKey) -> bool {
        self.path_for(key).is_file()
    }

    /// Stored series, sorted by key. Files whose name is not a series key are skipped.
    pub fn list(&self) -> Result<Vec<SeriesKey>, EngineError> {
        if !self.root.is_dir() {
            return Ok(Vec::new());
        }
        let entries = fs::read_dir(&self.root)
            .map_err(|e| EngineError::Storage(format!("Failed to read '{}': {e}", self.root.display())))?;

        let mut keys = Vec::new();
        for entry in entries {
            let path = entry
                .map_err(|e| EngineError::Storage(format!("Failed to read '{}': {e}", self.root.display())))?
                .path();
            if path.extension().and_then(|e| e.to_str()) != Some("csv") {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            match SeriesKey::parse(stem) {
                Ok(key) => keys.push(key),
                Err(_) => debug!(path = %path.display(), "skipping non-series file"),
            }
        }
        keys.sort();
        Ok(keys)
    }

    /// Store `table` under `key`.
    ///
    /// With `replace` (or no existing file) the table is written whole.
    /// Otherwise only rows for periods not yet stored are appended. Returns the
    /// number of rows written or appended.
    pub fn save(&self, key: &SeriesKey, table: &Table, replace: bool) -> Result<usize, EngineError> {
        let path = self.path_for(key);
        fs::create_dir_all(&self.root)
            .map_err(|e| EngineError::Storage(format!("Failed to create '{}': {e}", self.root.display())))?;

        if replace || !path.is_file() {
            write_table(&path, table)?;
            info!(%key, rows = table.len(), "new dataset saved");
            return Ok(table.len());
        }

        let existing = read_table(&path, key.cadence())?;
        let stored: HashSet<Period> = existing.periods.iter().copied().collect();
        let fresh: Vec<usize> = (0..table.len())
            .filter(|&i| !stored.contains(&table.periods[i]))
            .collect();

        if fresh.is_empty() {
            info!(%key, "no new data");
            return Ok(0);
        }

        if table.columns.len() != existing.columns.len() {
            return Err(EngineError::Storage(format!(
                "Cannot append to '{}': stored table has {} columns, update has {}.",
                path.display(),
                existing.columns.len(),
                table.columns.len()
            )));
        }

        let mut merged = existing;
        for &row in &fresh {
            merged.periods.push(table.periods[row]);
            for (col, update) in merged.columns.iter_mut().zip(&table.columns) {
                col.values.push(update.values[row]);
            }
        }
        write_table(&path, &merged.sorted())?;

        info!(%key, rows = fresh.len(), "appended new observations");
        Ok(fresh.len())
    }
}

impl SeriesSource for CsvStore {
    fn load_raw_series(&self, key: &SeriesKey) -> Result<Table, EngineError> {
        let path = self.path_for(key);
        if !path.is_file() {
            return Err(EngineError::SeriesNotFound(key.to_string()));
        }
        let table = read_table(&path, key.cadence())?;
        debug!(%key, rows = table.len(), columns = table.columns.len(), "loaded raw series");
        Ok(table)
    }
}

/// Read a store CSV, bucketing `Time` labels into `cadence`.
pub fn read_table(path: &Path, cadence: Cadence) -> Result<Table, EngineError> {
    let storage = |msg: String| EngineError::Storage(format!("'{}': {msg}", path.display()));

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| storage(format!("failed to open: {e}")))?;

    let headers = reader
        .headers()
        .map_err(|e| storage(format!("failed to read headers: {e}")))?
        .clone();

    let first = headers.get(0).map(|h| h.trim_start_matches('\u{feff}'));
    if first != Some(TIME_COLUMN) {
        return Err(storage(format!("first column must be `{TIME_COLUMN}`")));
    }
    let names: Vec<String> = headers.iter().skip(1).map(str::to_string).collect();

    let mut periods = Vec::new();
    let mut values: Vec<Vec<f64>> = vec![Vec::new(); names.len()];

    for (idx, result) in reader.records().enumerate() {
        // +2: header line plus 1-based numbering.
        let line = idx + 2;
        let record = result.map_err(|e| storage(format!("line {line}: {e}")))?;

        let label = record.get(0).unwrap_or_default();
        periods.push(Period::parse(cadence, label)?);

        for (col, out) in values.iter_mut().enumerate() {
            let raw = record.get(col + 1).unwrap_or_default();
            let value = parse_value(raw)
                .ok_or_else(|| storage(format!("line {line}: invalid value '{raw}'")))?;
            out.push(value);
        }
    }

    let mut table = Table::new(cadence, periods);
    for (name, values) in names.into_iter().zip(values) {
        table.push_column(name, values);
    }
    Ok(table.sorted())
}

/// Write a table in store layout.
pub fn write_table(path: &Path, table: &Table) -> Result<(), EngineError> {
    let storage = |msg: String| EngineError::Storage(format!("'{}': {msg}", path.display()));

    let mut writer = csv::Writer::from_path(path).map_err(|e| storage(format!("failed to create: {e}")))?;

    let mut header = vec![TIME_COLUMN.to_string()];
    header.extend(table.columns.iter().map(|c| c.name.clone()));
    writer
        .write_record(&header)
        .map_err(|e| storage(format!("failed to write header: {e}")))?;

    for (row, period) in table.periods.iter().enumerate() {
        let mut record = vec![period.label()];
        record.extend(table.columns.iter().map(|c| format_value(c.values[row])));
        writer
            .write_record(&record)
            .map_err(|e| storage(format!("failed to write row: {e}")))?;
    }

    writer.flush().map_err(|e| storage(format!("failed to flush: {e}")))?;
    Ok(())
}

pub fn format_value(value: f64) -> String {
    if value.is_nan() {
        String::new()
    } else {
        value.to_string()
    }
}

fn parse_value(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "." || trimmed.eq_ignore_ascii_case("nan") {
        return Some(f64::NAN);
    }
    trimmed.replace(',', "").parse::<f64>().ok()
}

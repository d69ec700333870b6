//! Wide period-indexed tables.
//!
//! A `Table` is the in-memory contract between every stage: raw series loaded
//! from the store, resampled series, aligned merges and derived indicators all
//! share it. Missing values are `f64::NAN`; rows are never dropped to signal
//! missing data.

use crate::domain::{Cadence, Period};
use crate::error::EngineError;

/// A named value column.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub values: Vec<f64>,
}

impl Column {
    pub fn new(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }
}

/// Period column plus value columns, all of equal length.
///
/// Periods are expected in strictly increasing order (no duplicates); lookups
/// by period rely on it. Every table the engine and the store produce holds
/// this, and [`Table::sorted`] restores the order for hand-built tables.
///
/// Column names are not required to be unique; columns are addressed
/// positionally by the engine and by name only in the derived-indicator layer
/// (first match wins).
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub cadence: Cadence,
    pub periods: Vec<Period>,
    pub columns: Vec<Column>,
}

impl Table {
    pub fn new(cadence: Cadence, periods: Vec<Period>) -> Self {
        Self {
            cadence,
            periods,
            columns: Vec::new(),
        }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.periods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.periods.is_empty()
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Look up a column, failing with `ColumnNotFound`.
    pub fn require(&self, name: &str) -> Result<&Column, EngineError> {
        self.column(name)
            .ok_or_else(|| EngineError::ColumnNotFound(name.to_string()))
    }

    /// Append a column. Values are padded with NaN or truncated to the row count.
    pub fn push_column(&mut self, name: impl Into<String>, mut values: Vec<f64>) {
        values.resize(self.len(), f64::NAN);
        self.columns.push(Column::new(name, values));
    }

    /// Replace the first column named `name`, or append it.
    pub fn set_column(&mut self, name: &str, mut values: Vec<f64>) {
        values.resize(self.len(), f64::NAN);
        match self.columns.iter_mut().find(|c| c.name == name) {
            Some(col) => col.values = values,
            None => self.columns.push(Column::new(name, values)),
        }
    }

    /// Row position of a period, if present. Assumes sorted periods.
    pub fn position(&self, period: &Period) -> Option<usize> {
        self.periods.binary_search(period).ok()
    }

    /// Remove every row holding at least one NaN.
    pub fn drop_incomplete_rows(&self) -> Table {
        let keep: Vec<usize> = (0..self.len())
            .filter(|&i| self.columns.iter().all(|c| !c.values[i].is_nan()))
            .collect();
        self.select_rows(&keep)
    }

    /// Rename columns positionally; extra names are ignored.
    pub fn rename_columns<S: AsRef<str>>(&mut self, names: &[S]) {
        for (col, name) in self.columns.iter_mut().zip(names) {
            col.name = name.as_ref().to_string();
        }
    }

    /// Rows at the given positions, in the given order.
    pub fn select_rows(&self, rows: &[usize]) -> Table {
        Table {
            cadence: self.cadence,
            periods: rows.iter().map(|&i| self.periods[i]).collect(),
            columns: self
                .columns
                .iter()
                .map(|c| Column::new(c.name.clone(), rows.iter().map(|&i| c.values[i]).collect()))
                .collect(),
        }
    }

    /// Rows reordered chronologically (stable for equal periods).
    pub fn sorted(self) -> Table {
        if self.periods.windows(2).all(|w| w[0] <= w[1]) {
            return self;
        }
        let mut order: Vec<usize> = (0..self.len()).collect();
        order.sort_by_key(|&i| self.periods[i]);
        self.select_rows(&order)
    }

    /// First and last period, if any.
    pub fn span(&self) -> Option<(Period, Period)> {
        Some((*self.periods.first()?, *self.periods.last()?))
    }
}

/// Round to 2 decimal places, leaving NaN untouched.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn months(n: u32) -> Vec<Period> {
        (1..=n)
            .map(|m| Period::containing(Cadence::Monthly, NaiveDate::from_ymd_opt(2020, m, 1).unwrap()))
            .collect()
    }

    #[test]
    fn drop_incomplete_rows_removes_nan_rows() {
        let mut table = Table::new(Cadence::Monthly, months(3));
        table.push_column("a", vec![1.0, f64::NAN, 3.0]);
        table.push_column("b", vec![1.0, 2.0, 3.0]);

        let out = table.drop_incomplete_rows();
        assert_eq!(out.len(), 2);
        assert_eq!(out.periods[1].label(), "2020-03");
        assert_eq!(out.columns[0].values, vec![1.0, 3.0]);
    }

    #[test]
    fn push_column_pads_to_row_count() {
        let mut table = Table::new(Cadence::Monthly, months(3));
        table.push_column("a", vec![1.0]);
        assert_eq!(table.columns[0].values.len(), 3);
        assert!(table.columns[0].values[2].is_nan());
    }

    #[test]
    fn set_column_replaces_first_match() {
        let mut table = Table::new(Cadence::Monthly, months(2));
        table.push_column("a", vec![1.0, 2.0]);
        table.set_column("a", vec![5.0, 6.0]);
        table.set_column("b", vec![7.0, 8.0]);
        assert_eq!(table.column_names(), vec!["a", "b"]);
        assert_eq!(table.require("a").unwrap().values, vec![5.0, 6.0]);
        assert_eq!(table.require("c"), Err(EngineError::ColumnNotFound("c".to_string())));
    }

    #[test]
    fn round2_handles_nan() {
        assert_eq!(round2(1.23456), 1.23);
        assert_eq!(round2(-0.005001), -0.01);
        assert!(round2(f64::NAN).is_nan());
    }
}

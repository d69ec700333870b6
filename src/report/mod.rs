//! Reporting utilities: table summaries and formatted terminal output.

mod format;

pub use format::*;

use crate::domain::{Period, Table};

/// Coverage of one column.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSummary {
    pub name: String,
    /// Non-missing values.
    pub observations: usize,
    pub first: Option<Period>,
    pub last: Option<Period>,
}

/// Row count, span and per-column coverage of a table.
#[derive(Debug, Clone, PartialEq)]
pub struct TableSummary {
    pub rows: usize,
    pub span: Option<(Period, Period)>,
    pub columns: Vec<ColumnSummary>,
}

pub fn summarize(table: &Table) -> TableSummary {
    let columns = table
        .columns
        .iter()
        .map(|col| {
            let present: Vec<Period> = table
                .periods
                .iter()
                .zip(&col.values)
                .filter(|(_, v)| !v.is_nan())
                .map(|(p, _)| *p)
                .collect();
            ColumnSummary {
                name: col.name.clone(),
                observations: present.len(),
                first: present.first().copied(),
                last: present.last().copied(),
            }
        })
        .collect();

    TableSummary {
        rows: table.len(),
        span: table.span(),
        columns,
    }
}

//! Derived indicators over aligned tables.
//!
//! All transforms are stateless and return fresh tables or columns. NaN is a
//! value-level signal and is propagated through arithmetic, never zeroed.

use crate::domain::{Column, Table, round2};
use crate::engine::cadence::yoy_window;
use crate::error::EngineError;

pub const GDP: &str = "Gross domestic product";
pub const EXPORTS: &str = "Exports";
pub const IMPORTS: &str = "Imports";
pub const NET_EXPORTS: &str = "Net exports of goods and services";

/// Every column as a percentage of `denominator`, rounded to 2 decimals.
///
/// The denominator column itself becomes 100.
pub fn percentage_share(table: &Table, denominator: &str) -> Result<Table, EngineError> {
    let base = table.require(denominator)?.values.clone();

    let columns = table
        .columns
        .iter()
        .map(|col| {
            let values = col
                .values
                .iter()
                .zip(&base)
                .map(|(v, b)| round2(v / b * 100.0))
                .collect();
            Column::new(col.name.clone(), values)
        })
        .collect();

    Ok(Table {
        cadence: table.cadence,
        periods: table.periods.clone(),
        columns,
    })
}

/// Real magnitudes: `nominal / deflator * 100`, matched by period and column.
///
/// Columns are matched by name; the k-th column of a repeated name in
/// `nominal` pairs with the k-th column of that name in `deflator`. Columns or
/// periods without a deflator yield NaN. When both exports and imports are
/// present, net exports are recomputed as their difference.
pub fn real_from_nominal(nominal: &Table, deflator: &Table) -> Table {
    let rows: Vec<Option<usize>> = nominal.periods.iter().map(|p| deflator.position(p)).collect();

    let mut out = Table::new(nominal.cadence, nominal.periods.clone());
    for (idx, col) in nominal.columns.iter().enumerate() {
        let occurrence = nominal.columns[..idx].iter().filter(|c| c.name == col.name).count();
        let price = deflator
            .columns
            .iter()
            .filter(|c| c.name == col.name)
            .nth(occurrence);

        let values = match price {
            Some(price) => col
                .values
                .iter()
                .zip(&rows)
                .map(|(v, row)| row.map_or(f64::NAN, |r| v / price.values[r] * 100.0))
                .collect(),
            None => vec![f64::NAN; nominal.len()],
        };
        out.push_column(col.name.clone(), values);
    }

    let net = match (out.column(EXPORTS), out.column(IMPORTS)) {
        (Some(exports), Some(imports)) => Some(
            exports
                .values
                .iter()
                .zip(&imports.values)
                .map(|(x, m)| x - m)
                .collect::<Vec<f64>>(),
        ),
        _ => None,
    };
    if let Some(net) = net {
        out.set_column(NET_EXPORTS, net);
    }

    out
}

/// Percent change over `window` periods; the first `window` values are NaN.
pub fn pct_change(values: &[f64], window: usize) -> Vec<f64> {
    values
        .iter()
        .enumerate()
        .map(|(i, v)| {
            if i < window {
                f64::NAN
            } else {
                (v / values[i - window] - 1.0) * 100.0
            }
        })
        .collect()
}

/// Year-over-year percent change of every column, window chosen by cadence.
pub fn yoy_change(table: &Table) -> Table {
    let window = yoy_window(table.cadence);
    let mut out = Table::new(table.cadence, table.periods.clone());
    for col in &table.columns {
        out.push_column(col.name.clone(), pct_change(&col.values, window));
    }
    out
}

/// `(actual - reference) / reference * 100`, e.g. the output gap.
pub fn relative_gap(table: &Table, actual: &str, reference: &str) -> Result<Vec<f64>, EngineError> {
    let a = table.require(actual)?;
    let r = table.require(reference)?;
    Ok(a.values
        .iter()
        .zip(&r.values)
        .map(|(a, r)| (a - r) / r * 100.0)
        .collect())
}

/// `a - b`, e.g. the unemployment-rate gap.
pub fn difference(table: &Table, a: &str, b: &str) -> Result<Vec<f64>, EngineError> {
    let a = table.require(a)?;
    let b = table.require(b)?;
    Ok(a.values.iter().zip(&b.values).map(|(a, b)| a - b).collect())
}

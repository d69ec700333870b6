//! Multi-series merge: resample every series to one cadence and align them on
//! a shared period index.

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use crate::domain::{Aggregation, Cadence, Column, Period, SeriesKey, Table};
use crate::engine::cadence::{coarser_of, coarsest};
use crate::engine::resample::resample;
use crate::error::EngineError;

/// Where raw series come from.
///
/// The returned table must be sampled at `key.cadence()`.
pub trait SeriesSource {
    fn load_raw_series(&self, key: &SeriesKey) -> Result<Table, EngineError>;
}

/// In-memory source, mostly useful for tests and previews.
impl SeriesSource for BTreeMap<SeriesKey, Table> {
    fn load_raw_series(&self, key: &SeriesKey) -> Result<Table, EngineError> {
        self.get(key)
            .cloned()
            .map(Table::sorted)
            .ok_or_else(|| EngineError::SeriesNotFound(key.to_string()))
    }
}

/// Merge the named series into one aligned table.
///
/// The output cadence is the coarsest of every series' native cadence and
/// `minimum`. Each series is mean-resampled to it; the result is the outer
/// join on period, chronologically sorted, with one column per input column in
/// the caller's series order. Missing cells are NaN.
///
/// Returns the table together with the resolved output cadence.
pub fn merge<S, N>(source: &S, names: &[N], minimum: Cadence) -> Result<(Table, Cadence), EngineError>
where
    S: SeriesSource + ?Sized,
    N: AsRef<str>,
{
    let keys = names
        .iter()
        .map(|n| SeriesKey::parse(n.as_ref()))
        .collect::<Result<Vec<_>, _>>()?;
    merge_keys(source, &keys, minimum)
}

/// [`merge`] over already-parsed keys.
pub fn merge_keys<S>(source: &S, keys: &[SeriesKey], minimum: Cadence) -> Result<(Table, Cadence), EngineError>
where
    S: SeriesSource + ?Sized,
{
    let highest = coarsest(keys.iter().map(SeriesKey::cadence)).ok_or(EngineError::NoSeries)?;
    let cadence = coarser_of(highest, minimum);
    debug!(series = keys.len(), ?highest, ?cadence, "merging series");

    let mut resampled = Vec::with_capacity(keys.len());
    for key in keys {
        let raw = source.load_raw_series(key)?;
        let table = resample(&raw, cadence, Aggregation::Mean)?;
        debug!(%key, rows = table.len(), "resampled");
        resampled.push(table);
    }

    let periods: Vec<Period> = resampled
        .iter()
        .flat_map(|t| t.periods.iter().copied())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let mut columns = Vec::new();
    for table in &resampled {
        let rows: Vec<Option<usize>> = periods.iter().map(|p| table.position(p)).collect();
        for col in &table.columns {
            let values = rows
                .iter()
                .map(|row| row.map_or(f64::NAN, |r| col.values[r]))
                .collect();
            columns.push(Column::new(col.name.clone(), values));
        }
    }

    Ok((
        Table {
            cadence,
            periods,
            columns,
        },
        cadence,
    ))
}

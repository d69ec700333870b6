//! Downsampling a raw series to a coarser (or equal) cadence.

use std::collections::BTreeMap;

use tracing::debug;

use crate::domain::{Aggregation, Cadence, Column, Period, Table, round2};
use crate::engine::boundary::check_full_period;
use crate::engine::cadence::level_of;
use crate::error::EngineError;

/// Resample `raw` (sampled at `raw.cadence`) to `target`.
///
/// - Rows are grouped by the `target` period they fall in and reduced with
///   `aggregation`; NaN inputs are skipped, an all-NaN group yields NaN.
/// - With `Aggregation::Mean` and a cadence change, an incomplete first or
///   last period is dropped (see [`check_full_period`]). `Max` never trims.
/// - Output is chronological, one row per period that holds observations,
///   values rounded to 2 decimals.
/// - Resampling to the native cadence returns the rows unchanged (sorted,
///   full precision).
///
/// Upsampling fails with `UnsupportedDirection`.
pub fn resample(raw: &Table, target: Cadence, aggregation: Aggregation) -> Result<Table, EngineError> {
    let native = raw.cadence;
    if level_of(target) < level_of(native) {
        return Err(EngineError::UnsupportedDirection { native, target });
    }
    if target == native {
        return Ok(raw.clone().sorted());
    }

    let mut groups: BTreeMap<Period, Vec<usize>> = BTreeMap::new();
    for (row, period) in raw.periods.iter().enumerate() {
        groups.entry(period.coarsen(target)).or_default().push(row);
    }

    let periods: Vec<Period> = groups.keys().copied().collect();
    let columns: Vec<Column> = raw
        .columns
        .iter()
        .map(|col| {
            let values = groups
                .values()
                .map(|rows| round2(reduce(rows.iter().map(|&r| col.values[r]), aggregation)))
                .collect();
            Column::new(col.name.clone(), values)
        })
        .collect();

    let out = Table {
        cadence: target,
        periods,
        columns,
    };

    if aggregation != Aggregation::Mean {
        return Ok(out);
    }

    let Some(flags) = check_full_period(raw, target) else {
        return Ok(out);
    };

    let start = usize::from(!flags.first_full);
    let end = out.len() - usize::from(!flags.last_full);
    if start > 0 || end < out.len() {
        debug!(
            first_full = flags.first_full,
            last_full = flags.last_full,
            "trimming incomplete edge periods from {native:?} -> {target:?} resample"
        );
    }

    let rows: Vec<usize> = (start..end.max(start)).collect();
    Ok(out.select_rows(&rows))
}

fn reduce(values: impl Iterator<Item = f64>, aggregation: Aggregation) -> f64 {
    let mut n = 0usize;
    let mut sum = 0.0;
    let mut max = f64::NEG_INFINITY;
    for v in values.filter(|v| !v.is_nan()) {
        n += 1;
        sum += v;
        max = max.max(v);
    }
    if n == 0 {
        return f64::NAN;
    }
    match aggregation {
        Aggregation::Mean => sum / n as f64,
        Aggregation::Max => max,
    }
}

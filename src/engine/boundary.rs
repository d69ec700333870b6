//! Completeness of the first and last period of a resample.
//!
//! Averaging whatever partial data sits at the edge of a series gives a
//! materially wrong value (a quarter built from Feb+Mar only). Edge periods
//! are therefore checked against the number of native observations a full
//! period must hold; interior periods are never checked.

use crate::domain::{Cadence, Period, Table};

/// Whether the first/last target period is backed by a full set of raw rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundaryFlags {
    pub first_full: bool,
    pub last_full: bool,
}

/// Check the edge periods of `raw` (sampled at `raw.cadence`) against `target`.
///
/// Returns `None` for an empty series.
pub fn check_full_period(raw: &Table, target: Cadence) -> Option<BoundaryFlags> {
    let native = raw.cadence;
    let tagged: Vec<Period> = raw.periods.iter().map(|p| p.coarsen(target)).collect();

    let first = *tagged.iter().min()?;
    let last = *tagged.iter().max()?;

    let is_full = |period: Period| {
        let expected = period.count_within(native);
        let actual = tagged.iter().filter(|&&p| p == period).count();
        actual == expected
    };

    Some(BoundaryFlags {
        first_full: is_full(first),
        last_full: is_full(last),
    })
}

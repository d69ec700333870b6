//! Frequency-normalization and merge engine.
//!
//! Pipeline for a merge request:
//! series names -> native cadences -> output cadence (`cadence`) -> per-series
//! resample with edge-period trimming (`resample`, `boundary`) -> outer join on
//! period (`merge`) -> optional derived indicators (`derived`).
//!
//! Everything here is pure: inputs are borrowed, outputs are fresh tables.

pub mod boundary;
pub mod cadence;
pub mod derived;
pub mod merge;
pub mod resample;

pub use boundary::{BoundaryFlags, check_full_period};
pub use cadence::{cadence_of, coarser_of, coarsest, level_of, yoy_window};
pub use merge::{SeriesSource, merge, merge_keys};
pub use resample::resample;

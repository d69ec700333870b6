//! Domain types used throughout the engine and pipelines.
//!
//! This module defines:
//!
//! - cadences, aggregation rules and structured series names (`types`)
//! - calendar periods (`period`)
//! - wide period-indexed tables (`table`)

pub mod period;
pub mod table;
pub mod types;

pub use period::*;
pub use table::*;
pub use types::*;

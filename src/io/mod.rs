//! Input/output helpers.
//!
//! - raw-series CSV store (`store`)
//! - table exports (CSV/JSON) (`export`)

pub mod export;
pub mod store;

pub use export::*;
pub use store::*;

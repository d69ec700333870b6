//! `macro-dash` library crate.
//!
//! The binary (`macro`) is a thin wrapper around this library so that:
//!
//! - the engine is testable without spawning processes
//! - the merge and derived-indicator layers are reusable by other front-ends
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod catalog;
pub mod cli;
pub mod data;
pub mod domain;
pub mod engine;
pub mod error;
pub mod io;
pub mod plot;
pub mod report;

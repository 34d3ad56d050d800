//! `do-dashboard` library crate.
//!
//! The binary (`dod`) is a thin wrapper around this library so that:
//!
//! - the aggregation/statistics core is testable without spawning processes
//! - the report and the TUI share one pipeline
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod logging;
pub mod pipeline;
pub mod plot;
pub mod report;
pub mod stats;
pub mod tui;

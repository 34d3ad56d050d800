//! Numeric statistics over aggregated series: overall mean and trailing rolling mean.

pub mod rolling;

pub use rolling::*;

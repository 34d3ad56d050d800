//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - raw load-history rows (`RawLoadEvent`)
//! - aggregated outputs (`AggregatedBucket`, `MetricKind`, `RollingStatsResult`)
//! - run configuration (`DashboardConfig`, `SampleConfig`, `StatsSeries`)

pub mod types;

pub use types::*;

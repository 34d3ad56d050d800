//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - aggregated in-memory on every dashboard render
//! - exported to JSON/CSV
//! - reloaded later for plotting

use std::fmt;
use std::path::PathBuf;

use chrono::NaiveDateTime;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Table the dashboard narrows the load history to unless told otherwise.
pub const DEFAULT_TARGET_TABLE: &str = "TRAN_EVENT_LOAD";

/// Rolling window length in data points ("9 before, 0 after").
pub const DEFAULT_ROLLING_WINDOW: usize = 10;

/// One copy/load operation as reported by the warehouse load history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawLoadEvent {
    pub load_time: NaiveDateTime,
    pub table_name: String,
    /// Rows read from the source file(s).
    pub rows_parsed: Option<u64>,
    /// Rows successfully ingested.
    pub rows_loaded: Option<u64>,
    pub error_count: Option<u64>,
}

impl RawLoadEvent {
    pub fn new(
        load_time: NaiveDateTime,
        table_name: impl Into<String>,
        rows_parsed: u64,
        rows_loaded: u64,
        error_count: u64,
    ) -> Self {
        Self {
            load_time,
            table_name: table_name.into(),
            rows_parsed: Some(rows_parsed),
            rows_loaded: Some(rows_loaded),
            error_count: Some(error_count),
        }
    }

    /// The counter feeding `kind`'s aggregation.
    pub fn counter(&self, kind: MetricKind) -> Option<u64> {
        match kind {
            MetricKind::SourceFileCount => self.rows_parsed,
            MetricKind::IngestedCount => self.rows_loaded,
        }
    }
}

/// Which of the two comparable counters a bucket carries.
///
/// Serialized with the `COUNT_TYPE` labels of the load-history query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MetricKind {
    SourceFileCount,
    IngestedCount,
}

impl MetricKind {
    pub const ALL: [MetricKind; 2] = [MetricKind::SourceFileCount, MetricKind::IngestedCount];

    pub fn label(self) -> &'static str {
        match self {
            MetricKind::SourceFileCount => "SOURCE_FILE_COUNT",
            MetricKind::IngestedCount => "INGESTED_COUNT",
        }
    }

    /// Parse a `COUNT_TYPE` label (case-insensitive).
    pub fn from_label(s: &str) -> Option<Self> {
        let s = s.trim();
        Self::ALL.into_iter().find(|k| k.label().eq_ignore_ascii_case(s))
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

/// One aggregated `(hour, table_name, metric_kind)` group.
///
/// Field names are the binding contract with renderers: `hour` → time axis,
/// `count` → quantity axis, `metric_kind` → colour/series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregatedBucket {
    pub hour: NaiveDateTime,
    pub table_name: String,
    pub metric_kind: MetricKind,
    pub count: u64,
    pub error_count: u64,
}

/// Global and trailing-window means of one time series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RollingStatsResult {
    pub window: usize,
    pub overall_mean: f64,
    /// One entry per input point, aligned to the input's time ordering.
    pub rolling_mean: Vec<(NaiveDateTime, f64)>,
}

/// Which buckets of the filtered series feed the mean / rolling-mean overlays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum StatsSeries {
    /// `INGESTED_COUNT` buckets only.
    Ingested,
    /// `SOURCE_FILE_COUNT` buckets only.
    Source,
    /// Both kinds, interleaved by hour.
    All,
}

impl StatsSeries {
    pub fn kind(self) -> Option<MetricKind> {
        match self {
            StatsSeries::Ingested => Some(MetricKind::IngestedCount),
            StatsSeries::Source => Some(MetricKind::SourceFileCount),
            StatsSeries::All => None,
        }
    }

    pub fn next(self) -> Self {
        match self {
            StatsSeries::Ingested => StatsSeries::Source,
            StatsSeries::Source => StatsSeries::All,
            StatsSeries::All => StatsSeries::Ingested,
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            StatsSeries::Ingested => "ingested",
            StatsSeries::Source => "source",
            StatsSeries::All => "all",
        }
    }
}

/// Parameters for the synthetic load history used in demo mode.
#[derive(Debug, Clone)]
pub struct SampleConfig {
    pub seed: u64,
    pub hours: usize,
    pub tables: Vec<String>,
    /// Loads per table per hour (upper bound; the actual count is drawn per hour).
    pub max_loads_per_hour: usize,
    /// Probability that a load only partially ingests its source rows.
    pub partial_load_prob: f64,
    /// Probability that a load reports no `rows_loaded` at all.
    pub missing_loaded_prob: f64,
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults).
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    /// Load history CSV; `None` means demo mode (synthetic sample).
    pub csv_path: Option<PathBuf>,
    pub skip_invalid: bool,
    pub target_table: String,
    pub stats_series: StatsSeries,
    pub window: usize,

    pub sample: SampleConfig,

    pub plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,

    pub export_buckets: Option<PathBuf>,
    pub export_snapshot: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metric_kind_display_honours_width() {
        assert_eq!(format!("{:<18}|", MetricKind::IngestedCount), "INGESTED_COUNT    |");
        assert_eq!(MetricKind::from_label(" source_file_count "), Some(MetricKind::SourceFileCount));
        assert_eq!(MetricKind::SourceFileCount.to_string(), "SOURCE_FILE_COUNT");
    }
}

//! Shared "dashboard pipeline" logic used by both CLI and TUI front-ends.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! load -> aggregate -> filter to target table -> rolling stats -> discrepancies
//!
//! The CLI and the TUI can then focus on presentation (printing vs widgets).

use tracing::debug;

use crate::data::generate_sample;
use crate::domain::{AggregatedBucket, DashboardConfig, RollingStatsResult, StatsSeries};
use crate::error::AppError;
use crate::io::ingest::{LoadedData, LoadedRows, RowError, load_csv};
use crate::pipeline::{Discrepancy, aggregate, filter_by_kind, filter_by_table, find_discrepancies, series_points, sort_by_hour};
use crate::stats::rolling_stats;

/// Where the rows of a run came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataOrigin {
    Csv(String),
    Sample { seed: u64 },
}

impl DataOrigin {
    pub fn describe(&self) -> String {
        match self {
            DataOrigin::Csv(path) => path.clone(),
            DataOrigin::Sample { seed } => format!("synthetic sample (seed {seed})"),
        }
    }
}

/// Input snapshot for one or more renders.
#[derive(Debug, Clone)]
pub struct LoadHistory {
    pub origin: DataOrigin,
    pub rows: LoadedRows,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
}

/// All computed outputs of a single render.
#[derive(Debug, Clone)]
pub struct DashboardRun {
    /// Every bucket, source block then ingested block.
    pub buckets: Vec<AggregatedBucket>,
    pub target_table: String,
    /// Buckets for `target_table`, original relative order.
    pub filtered: Vec<AggregatedBucket>,
    pub stats_series: StatsSeries,
    /// The filtered buckets feeding the overlays, sorted by hour.
    pub stats_input: Vec<AggregatedBucket>,
    /// `None` when the target table has no buckets of the selected series.
    pub stats: Option<RollingStatsResult>,
    pub discrepancies: Vec<Discrepancy>,
}

/// Load the run input: the configured CSV, or a synthetic sample when none is set.
pub fn load_history(config: &DashboardConfig) -> Result<LoadHistory, AppError> {
    match &config.csv_path {
        Some(path) => {
            let LoadedData {
                rows,
                row_errors,
                rows_read,
            } = load_csv(path, config.skip_invalid)?;
            Ok(LoadHistory {
                origin: DataOrigin::Csv(path.display().to_string()),
                rows,
                row_errors,
                rows_read,
            })
        }
        None => {
            let events = generate_sample(&config.sample)?;
            let rows_read = events.len();
            Ok(LoadHistory {
                origin: DataOrigin::Sample {
                    seed: config.sample.seed,
                },
                rows: LoadedRows::Events(events),
                row_errors: Vec::new(),
                rows_read,
            })
        }
    }
}

/// Load and compute in one go.
pub fn run_dashboard(config: &DashboardConfig) -> Result<(LoadHistory, DashboardRun), AppError> {
    let history = load_history(config)?;
    let run = build_dashboard(&history.rows, config)?;
    Ok((history, run))
}

/// Compute every dashboard output from an already loaded snapshot.
///
/// This is useful for the TUI where we want to recompute on every setting
/// change without re-reading the file.
pub fn build_dashboard(rows: &LoadedRows, config: &DashboardConfig) -> Result<DashboardRun, AppError> {
    // 1) Aggregate raw events (query output is already bucketed).
    let buckets = match rows {
        LoadedRows::Events(events) => aggregate(events)?,
        LoadedRows::Buckets(buckets) => buckets.clone(),
    };

    // 2) Narrow to the target table.
    let filtered = filter_by_table(&buckets, &config.target_table);

    // 3) Pick the overlay series and put it in time order.
    let selected = match config.stats_series.kind() {
        Some(kind) => filter_by_kind(&filtered, kind),
        None => filtered.clone(),
    };
    let stats_input = sort_by_hour(selected);

    // 4) Overall + rolling means; an empty series is an empty state, not a failure.
    let stats = if stats_input.is_empty() {
        None
    } else {
        Some(rolling_stats(&series_points(&stats_input), config.window)?)
    };

    // 5) Hours where ingested != source for the target table.
    let discrepancies = find_discrepancies(&filtered);

    debug!(
        buckets = buckets.len(),
        filtered = filtered.len(),
        discrepancies = discrepancies.len(),
        target = %config.target_table,
        "dashboard computed"
    );

    Ok(DashboardRun {
        buckets,
        target_table: config.target_table.clone(),
        filtered,
        stats_series: config.stats_series,
        stats_input,
        stats,
        discrepancies,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::default_config;
    use crate::domain::{MetricKind, RawLoadEvent};
    use chrono::NaiveDate;

    fn events() -> Vec<RawLoadEvent> {
        let at = |h, m| NaiveDate::from_ymd_opt(2024, 1, 1).unwrap().and_hms_opt(h, m, 0).unwrap();
        vec![
            RawLoadEvent::new(at(2, 0), "E", 30, 30, 0),
            RawLoadEvent::new(at(0, 5), "E", 100, 95, 0),
            RawLoadEvent::new(at(0, 40), "E", 50, 50, 1),
            RawLoadEvent::new(at(1, 0), "OTHER", 9, 9, 0),
        ]
    }

    fn config(table: &str, series: StatsSeries) -> DashboardConfig {
        let mut config = default_config();
        config.target_table = table.to_string();
        config.stats_series = series;
        config
    }

    #[test]
    fn ingested_series_is_sorted_and_averaged() {
        let run = build_dashboard(&LoadedRows::Events(events()), &config("E", StatsSeries::Ingested)).unwrap();

        assert_eq!(run.buckets.len(), 6);
        assert_eq!(run.filtered.len(), 4);
        assert!(run.stats_input.iter().all(|b| b.metric_kind == MetricKind::IngestedCount));

        let stats = run.stats.unwrap();
        let values: Vec<f64> = stats.rolling_mean.iter().map(|&(_, v)| v).collect();
        assert_eq!(values, vec![145.0, (145.0 + 30.0) / 2.0]);
        assert_eq!(stats.overall_mean, 87.5);

        assert_eq!(run.discrepancies.len(), 1);
        assert_eq!(run.discrepancies[0].gap(), 5);
    }

    #[test]
    fn all_series_uses_both_kinds() {
        let run = build_dashboard(&LoadedRows::Events(events()), &config("E", StatsSeries::All)).unwrap();
        assert_eq!(run.stats_input.len(), 4);
        assert_eq!(run.stats.unwrap().overall_mean, (150.0 + 145.0 + 30.0 + 30.0) / 4.0);
    }

    #[test]
    fn unknown_table_is_an_empty_state() {
        let run = build_dashboard(&LoadedRows::Events(events()), &config("NOPE", StatsSeries::Ingested)).unwrap();
        assert!(run.filtered.is_empty());
        assert!(run.stats.is_none());
        assert!(run.discrepancies.is_empty());
    }

    #[test]
    fn demo_mode_loads_a_sample() {
        let (history, run) = run_dashboard(&default_config()).unwrap();
        assert!(matches!(history.origin, DataOrigin::Sample { .. }));
        assert!(!run.buckets.is_empty());
        assert!(!run.filtered.is_empty());
    }
}

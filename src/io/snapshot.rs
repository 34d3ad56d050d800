//! Read/write dashboard snapshot JSON files.
//!
//! A snapshot is the "portable" representation of one render:
//! - all buckets plus the filtered series for the target table
//! - the overlay statistics (overall + rolling mean)
//! - the source-vs-ingested discrepancies
//!
//! `dod plot --snapshot` re-renders it without the original CSV.

use std::fs::File;
use std::path::Path;

use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::app::pipeline::DashboardRun;
use crate::domain::{AggregatedBucket, RollingStatsResult, StatsSeries};
use crate::error::AppError;
use crate::pipeline::Discrepancy;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardSnapshot {
    pub tool: String,
    pub generated_at: NaiveDateTime,
    pub origin: String,
    pub target_table: String,
    pub stats_series: StatsSeries,
    pub buckets: Vec<AggregatedBucket>,
    pub filtered: Vec<AggregatedBucket>,
    pub stats_input: Vec<AggregatedBucket>,
    pub stats: Option<RollingStatsResult>,
    pub discrepancies: Vec<Discrepancy>,
}

impl DashboardSnapshot {
    pub fn from_run(run: &DashboardRun, origin: &str) -> Self {
        Self {
            tool: "dod".to_string(),
            generated_at: Local::now().naive_local(),
            origin: origin.to_string(),
            target_table: run.target_table.clone(),
            stats_series: run.stats_series,
            buckets: run.buckets.clone(),
            filtered: run.filtered.clone(),
            stats_input: run.stats_input.clone(),
            stats: run.stats.clone(),
            discrepancies: run.discrepancies.clone(),
        }
    }
}

/// Write a snapshot JSON file.
pub fn write_snapshot_json(path: &Path, run: &DashboardRun, origin: &str) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(4, format!("Failed to create snapshot JSON '{}': {e}", path.display())))?;

    let snapshot = DashboardSnapshot::from_run(run, origin);
    serde_json::to_writer_pretty(file, &snapshot)
        .map_err(|e| AppError::new(4, format!("Failed to write snapshot JSON: {e}")))?;

    info!(path = %path.display(), "wrote snapshot");
    Ok(())
}

/// Read a snapshot JSON file.
pub fn read_snapshot_json(path: &Path) -> Result<DashboardSnapshot, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open snapshot JSON '{}': {e}", path.display())))?;
    serde_json::from_reader(file).map_err(|e| AppError::new(2, format!("Invalid snapshot JSON: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::default_config;
    use crate::app::pipeline::run_dashboard;

    #[test]
    fn snapshot_survives_a_file_round_trip() {
        let (history, run) = run_dashboard(&default_config()).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snapshot.json");

        write_snapshot_json(&path, &run, &history.origin.describe()).unwrap();
        let back = read_snapshot_json(&path).unwrap();

        assert_eq!(back.tool, "dod");
        assert_eq!(back.target_table, run.target_table);
        assert_eq!(back.buckets, run.buckets);
        assert_eq!(back.discrepancies, run.discrepancies);
        assert_eq!(back.stats.map(|s| s.rolling_mean.len()), run.stats.map(|s| s.rolling_mean.len()));
    }

    #[test]
    fn snapshot_uses_binding_field_names() {
        let (_, run) = run_dashboard(&default_config()).unwrap();
        let json = serde_json::to_value(DashboardSnapshot::from_run(&run, "test")).unwrap();
        let first = &json["buckets"][0];
        assert!(first.get("hour").is_some());
        assert!(first.get("count").is_some());
        assert!(first["metric_kind"] == "SOURCE_FILE_COUNT");
    }
}

use std::io::Write;

use chrono::{NaiveDate, NaiveDateTime};
use do_dashboard::app::default_config;
use do_dashboard::app::pipeline::{DataOrigin, run_dashboard};
use do_dashboard::domain::{AggregatedBucket, DashboardConfig, MetricKind, RawLoadEvent, StatsSeries};
use do_dashboard::error::AppError;
use do_dashboard::io::{LoadedRows, read_snapshot_json, write_buckets_csv, write_snapshot_json};
use do_dashboard::pipeline::{PipelineError, aggregate, filter_by_kind, filter_by_table, series_points};
use do_dashboard::stats::{overall_mean, rolling_mean, rolling_stats};
use tempfile::NamedTempFile;

fn at(day: u32, hour: u32, min: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, day)
        .unwrap()
        .and_hms_opt(hour, min, 0)
        .unwrap()
}

fn csv_fixture(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

fn csv_config(file: &NamedTempFile, table: &str) -> DashboardConfig {
    let mut config = default_config();
    config.csv_path = Some(file.path().to_path_buf());
    config.target_table = table.to_string();
    config
}

fn find(buckets: &[AggregatedBucket], table: &str, kind: MetricKind) -> AggregatedBucket {
    buckets
        .iter()
        .find(|b| b.table_name == table && b.metric_kind == kind)
        .cloned()
        .unwrap()
}

#[test]
fn raw_csv_yields_the_expected_buckets() -> Result<(), AppError> {
    let file = csv_fixture(
        "load_time,table_name,rows_parsed,rows_loaded,error_count\n\
         2024-01-01 00:05:00,E,100,95,0\n\
         2024-01-01 00:40:00,E,50,50,1\n\
         2024-01-01 00:10:00,OTHER,10,10,\n",
    );
    let (history, run) = run_dashboard(&csv_config(&file, "E"))?;

    assert!(matches!(history.origin, DataOrigin::Csv(_)));
    assert_eq!(history.rows_read, 3);

    let source = find(&run.buckets, "E", MetricKind::SourceFileCount);
    let ingested = find(&run.buckets, "E", MetricKind::IngestedCount);
    assert_eq!((source.hour, source.count, source.error_count), (at(1, 0, 0), 150, 1));
    assert_eq!((ingested.hour, ingested.count, ingested.error_count), (at(1, 0, 0), 145, 1));

    assert_eq!(run.filtered.len(), 2);
    assert_eq!(run.discrepancies.len(), 1);
    assert_eq!(run.discrepancies[0].gap(), 5);
    Ok(())
}

#[test]
fn grouping_sums_match_per_hour_and_table() -> Result<(), AppError> {
    let events = vec![
        RawLoadEvent::new(at(1, 0, 1), "A", 1, 1, 0),
        RawLoadEvent::new(at(1, 1, 59), "A", 2, 2, 0),
        RawLoadEvent::new(at(1, 0, 59), "A", 4, 4, 0),
        RawLoadEvent::new(at(1, 0, 30), "B", 8, 8, 0),
        RawLoadEvent::new(at(2, 0, 30), "A", 16, 16, 0),
    ];
    let buckets = aggregate(&events)?;

    let source = filter_by_kind(&buckets, MetricKind::SourceFileCount);
    for bucket in &source {
        let expected: u64 = events
            .iter()
            .filter(|e| e.table_name == bucket.table_name)
            .filter(|e| e.load_time.date() == bucket.hour.date())
            .filter(|e| e.load_time.format("%H").to_string() == bucket.hour.format("%H").to_string())
            .filter_map(|e| e.rows_parsed)
            .sum();
        assert_eq!(bucket.count, expected, "bucket {bucket:?}");
    }
    assert_eq!(source.len(), 4);
    Ok(())
}

#[test]
fn null_counters_yield_zero_buckets() -> Result<(), AppError> {
    let file = csv_fixture(
        "load_time,table_name,rows_parsed,rows_loaded,error_count\n\
         2024-01-01 00:05:00,E,100,,3\n\
         2024-01-01 01:05:00,E,,70,\n",
    );
    let (_, run) = run_dashboard(&csv_config(&file, "E"))?;

    let counts = |kind| -> Vec<(NaiveDateTime, u64, u64)> {
        filter_by_kind(&run.buckets, kind)
            .iter()
            .map(|b| (b.hour, b.count, b.error_count))
            .collect()
    };
    assert_eq!(
        counts(MetricKind::SourceFileCount),
        vec![(at(1, 0, 0), 100, 3), (at(1, 1, 0), 0, 0)]
    );
    assert_eq!(
        counts(MetricKind::IngestedCount),
        vec![(at(1, 0, 0), 0, 3), (at(1, 1, 0), 70, 0)]
    );

    assert_eq!(run.discrepancies.len(), 2);
    assert_eq!(run.discrepancies[0].ingested, Some(0));
    assert_eq!(run.discrepancies[1].source, Some(0));
    Ok(())
}

#[test]
fn query_output_kinds_stay_independent() -> Result<(), AppError> {
    let file = csv_fixture(
        "LAST_LOAD_TIME,COUNT,COUNT_TYPE,TABLE_NAME\n\
         2024-01-01 00:00:00,100,SOURCE_FILE_COUNT,E\n\
         2024-01-01 01:00:00,70,INGESTED_COUNT,E\n",
    );
    let (_, run) = run_dashboard(&csv_config(&file, "E"))?;

    let hours = |kind| -> Vec<NaiveDateTime> {
        filter_by_kind(&run.buckets, kind).iter().map(|b| b.hour).collect()
    };
    assert_eq!(hours(MetricKind::SourceFileCount), vec![at(1, 0, 0)]);
    assert_eq!(hours(MetricKind::IngestedCount), vec![at(1, 1, 0)]);
    assert_eq!(run.discrepancies.len(), 2);
    Ok(())
}

#[test]
fn filtering_is_total_and_idempotent() -> Result<(), AppError> {
    let (_, run) = run_dashboard(&default_config())?;
    let target = run.target_table.clone();

    assert!(run.filtered.iter().all(|b| b.table_name == target));
    assert_eq!(filter_by_table(&run.filtered, &target), run.filtered);
    assert!(filter_by_table(&run.buckets, "NO_SUCH_TABLE").is_empty());
    Ok(())
}

#[test]
fn rolling_window_slides_after_ten_points() -> Result<(), PipelineError> {
    let counts: Vec<f64> = (1..=12).map(|v| f64::from(v) * 10.0).collect();
    let rolled = rolling_mean(&counts, 10)?;

    let mean = |xs: &[f64]| xs.iter().sum::<f64>() / xs.len() as f64;
    assert_eq!(rolled.len(), 12);
    assert_eq!(rolled[0], counts[0]);
    assert!((rolled[9] - mean(&counts[0..=9])).abs() < 1e-9);
    assert!((rolled[11] - mean(&counts[2..=11])).abs() < 1e-9);

    assert_eq!(overall_mean(&[2.0, 4.0, 6.0])?, 4.0);
    Ok(())
}

#[test]
fn empty_input_gives_no_buckets_and_no_mean() {
    let buckets = aggregate(&[]).unwrap();
    assert!(buckets.is_empty());

    let values: Vec<f64> = series_points(&buckets).into_iter().map(|(_, v)| v).collect();
    assert_eq!(overall_mean(&values), Err(PipelineError::EmptySeries));
    assert_eq!(rolling_stats(&[], 10), Err(PipelineError::EmptySeries));
}

#[test]
fn query_output_csv_is_merged_per_hour() -> Result<(), AppError> {
    let file = csv_fixture(
        "LAST_LOAD_TIME,COUNT,COUNT_TYPE,TABLE_NAME,ERROR_COUNT\n\
         2024-01-01 00:05:00.000,100,SOURCE_FILE_COUNT,E,0\n\
         2024-01-01 00:40:00.000,50,SOURCE_FILE_COUNT,E,1\n\
         2024-01-01 00:05:00.000,95,INGESTED_COUNT,E,0\n\
         2024-01-01 00:40:00.000,50,INGESTED_COUNT,E,1\n",
    );
    let (history, run) = run_dashboard(&csv_config(&file, "E"))?;

    assert!(matches!(history.rows, LoadedRows::Buckets(_)));
    assert_eq!(run.buckets.len(), 2);
    assert_eq!(find(&run.buckets, "E", MetricKind::SourceFileCount).count, 150);
    assert_eq!(find(&run.buckets, "E", MetricKind::IngestedCount).count, 145);
    Ok(())
}

#[test]
fn strict_load_rejects_bad_rows_and_lenient_skips_them() {
    let file = csv_fixture(
        "load_time,table_name,rows_parsed,rows_loaded\n\
         2024-01-01 00:05:00,E,100,95\n\
         not-a-time,E,1,1\n",
    );

    let err = run_dashboard(&csv_config(&file, "E")).unwrap_err();
    assert_eq!(err.exit_code(), 2);
    assert!(err.message().contains("line 3"), "{err}");

    let mut config = csv_config(&file, "E");
    config.skip_invalid = true;
    let (history, run) = run_dashboard(&config).unwrap();
    assert_eq!(history.row_errors.len(), 1);
    assert_eq!(history.row_errors[0].line, 3);
    assert_eq!(run.filtered.len(), 2);
}

#[test]
fn stats_follow_the_selected_series() -> Result<(), AppError> {
    let file = csv_fixture(
        "load_time,table_name,rows_parsed,rows_loaded\n\
         2024-01-01 02:00:00,E,30,30\n\
         2024-01-01 00:00:00,E,10,8\n\
         2024-01-01 01:00:00,E,20,20\n",
    );

    let mut config = csv_config(&file, "E");
    let (_, run) = run_dashboard(&config)?;
    let stats = run.stats.unwrap();
    let hours: Vec<NaiveDateTime> = stats.rolling_mean.iter().map(|&(h, _)| h).collect();
    assert_eq!(hours, vec![at(1, 0, 0), at(1, 1, 0), at(1, 2, 0)]);
    assert!((stats.overall_mean - 58.0 / 3.0).abs() < 1e-9);

    config.stats_series = StatsSeries::Source;
    let (_, run) = run_dashboard(&config)?;
    assert!((run.stats.unwrap().overall_mean - 20.0).abs() < 1e-9);
    Ok(())
}

#[test]
fn exports_round_trip_through_disk() -> Result<(), AppError> {
    let (history, run) = run_dashboard(&default_config())?;
    let dir = tempfile::tempdir().unwrap();

    let csv_path = dir.path().join("buckets.csv");
    write_buckets_csv(&csv_path, &run.buckets)?;
    let mut config = default_config();
    config.csv_path = Some(csv_path);
    let (_, reloaded) = run_dashboard(&config)?;
    assert_eq!(reloaded.buckets, run.buckets);

    let json_path = dir.path().join("snapshot.json");
    write_snapshot_json(&json_path, &run, &history.origin.describe())?;
    let snapshot = read_snapshot_json(&json_path)?;
    assert_eq!(snapshot.target_table, run.target_table);
    assert_eq!(snapshot.stats_input, run.stats_input);
    assert_eq!(snapshot.discrepancies, run.discrepancies);
    Ok(())
}

//! Narrowing and ordering helpers over aggregated buckets.
//!
//! All functions here are total: an empty result is a valid answer.

use chrono::NaiveDateTime;

use crate::domain::{AggregatedBucket, MetricKind};

/// Buckets belonging to `target`, in their original relative order.
pub fn filter_by_table(buckets: &[AggregatedBucket], target: &str) -> Vec<AggregatedBucket> {
    buckets
        .iter()
        .filter(|b| b.table_name == target)
        .cloned()
        .collect()
}

/// Buckets of one metric kind, in their original relative order.
pub fn filter_by_kind(buckets: &[AggregatedBucket], kind: MetricKind) -> Vec<AggregatedBucket> {
    buckets
        .iter()
        .filter(|b| b.metric_kind == kind)
        .cloned()
        .collect()
}

/// Distinct table names in first-seen order.
pub fn table_names(buckets: &[AggregatedBucket]) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for b in buckets {
        if !names.iter().any(|n| *n == b.table_name) {
            names.push(b.table_name.clone());
        }
    }
    names
}

/// Stable sort by hour; buckets sharing an hour keep their relative order.
pub fn sort_by_hour(mut buckets: Vec<AggregatedBucket>) -> Vec<AggregatedBucket> {
    buckets.sort_by_key(|b| b.hour);
    buckets
}

/// `(hour, count)` pairs in the order given.
pub fn series_points(buckets: &[AggregatedBucket]) -> Vec<(NaiveDateTime, f64)> {
    buckets.iter().map(|b| (b.hour, b.count as f64)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn bucket(hour: u32, table: &str, kind: MetricKind, count: u64) -> AggregatedBucket {
        AggregatedBucket {
            hour: NaiveDate::from_ymd_opt(2024, 1, 1)
                .unwrap()
                .and_hms_opt(hour, 0, 0)
                .unwrap(),
            table_name: table.to_string(),
            metric_kind: kind,
            count,
            error_count: 0,
        }
    }

    fn sample() -> Vec<AggregatedBucket> {
        vec![
            bucket(2, "E", MetricKind::SourceFileCount, 10),
            bucket(1, "O", MetricKind::SourceFileCount, 3),
            bucket(0, "E", MetricKind::SourceFileCount, 12),
            bucket(2, "E", MetricKind::IngestedCount, 9),
            bucket(1, "O", MetricKind::IngestedCount, 3),
        ]
    }

    #[test]
    fn filter_by_table_keeps_only_target_in_order() {
        let filtered = filter_by_table(&sample(), "E");
        assert_eq!(filtered.len(), 3);
        assert!(filtered.iter().all(|b| b.table_name == "E"));
        let counts: Vec<u64> = filtered.iter().map(|b| b.count).collect();
        assert_eq!(counts, vec![10, 12, 9]);
    }

    #[test]
    fn filter_by_table_is_idempotent() {
        let once = filter_by_table(&sample(), "E");
        let twice = filter_by_table(&once, "E");
        assert_eq!(once, twice);
    }

    #[test]
    fn filter_by_table_without_match_is_empty() {
        assert!(filter_by_table(&sample(), "MISSING").is_empty());
        assert!(filter_by_table(&[], "E").is_empty());
    }

    #[test]
    fn filter_by_kind_and_table_names() {
        let ingested = filter_by_kind(&sample(), MetricKind::IngestedCount);
        assert_eq!(ingested.len(), 2);
        assert_eq!(table_names(&sample()), vec!["E".to_string(), "O".to_string()]);
    }

    #[test]
    fn sort_by_hour_is_stable() {
        let sorted = sort_by_hour(filter_by_table(&sample(), "E"));
        let got: Vec<(u64, MetricKind)> = sorted.iter().map(|b| (b.count, b.metric_kind)).collect();
        assert_eq!(
            got,
            vec![
                (12, MetricKind::SourceFileCount),
                (10, MetricKind::SourceFileCount),
                (9, MetricKind::IngestedCount),
            ]
        );
        assert_eq!(series_points(&sorted)[0].1, 12.0);
    }
}

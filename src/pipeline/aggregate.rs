//! Hourly `(hour, table_name)` aggregation of load-history rows.
//!
//! Each metric kind is grouped on its own pass over the events and the two
//! blocks are concatenated: every `SOURCE_FILE_COUNT` bucket first, then every
//! `INGESTED_COUNT` bucket. Within a block, groups keep the order in which the
//! input first mentions them, so a deterministic input order gives a
//! deterministic output.

use std::collections::HashMap;

use chrono::{DurationRound, NaiveDateTime, TimeDelta};

use crate::domain::{AggregatedBucket, MetricKind, RawLoadEvent};
use crate::pipeline::error::{PipelineError, Result};

/// Round `ts` down to the start of its containing hour.
pub fn truncate_to_hour(ts: NaiveDateTime) -> Result<NaiveDateTime> {
    ts.duration_trunc(TimeDelta::hours(1))
        .map_err(|e| PipelineError::InvalidInput(format!("cannot truncate {ts} to the hour: {e}")))
}

/// Aggregate raw load events into `SOURCE_FILE_COUNT` and `INGESTED_COUNT` buckets.
///
/// A missing counter sums as 0, so every `(hour, table)` group gets a bucket of
/// each kind. A group whose counters are all zero or null still yields an
/// explicit `count = 0` that carries the group's errors.
pub fn aggregate(events: &[RawLoadEvent]) -> Result<Vec<AggregatedBucket>> {
    for event in events {
        validate_table_name(&event.table_name)?;
    }

    let mut out = aggregate_kind(events, MetricKind::SourceFileCount)?;
    out.extend(aggregate_kind(events, MetricKind::IngestedCount)?);
    Ok(out)
}

/// Re-group already aggregated rows by `(truncated hour, table_name, metric_kind)`.
///
/// Load-history exports that were grouped on the raw load timestamp can carry
/// several rows for the same hour; this folds them into one bucket each.
pub fn merge_buckets(buckets: &[AggregatedBucket]) -> Result<Vec<AggregatedBucket>> {
    let mut index: HashMap<(NaiveDateTime, &str, MetricKind), usize> = HashMap::new();
    let mut out: Vec<AggregatedBucket> = Vec::with_capacity(buckets.len());

    for bucket in buckets {
        validate_table_name(&bucket.table_name)?;
        let hour = truncate_to_hour(bucket.hour)?;
        let key = (hour, bucket.table_name.as_str(), bucket.metric_kind);

        match index.get(&key) {
            Some(&idx) => accumulate(&mut out[idx], bucket.count, bucket.error_count)?,
            None => {
                index.insert(key, out.len());
                out.push(AggregatedBucket {
                    hour,
                    ..bucket.clone()
                });
            }
        }
    }

    Ok(out)
}

fn aggregate_kind(events: &[RawLoadEvent], kind: MetricKind) -> Result<Vec<AggregatedBucket>> {
    let mut index: HashMap<(NaiveDateTime, &str), usize> = HashMap::new();
    let mut out: Vec<AggregatedBucket> = Vec::new();

    for event in events {
        let count = event.counter(kind).unwrap_or(0);
        let errors = event.error_count.unwrap_or(0);
        let hour = truncate_to_hour(event.load_time)?;
        let key = (hour, event.table_name.as_str());

        match index.get(&key) {
            Some(&idx) => accumulate(&mut out[idx], count, errors)?,
            None => {
                index.insert(key, out.len());
                out.push(AggregatedBucket {
                    hour,
                    table_name: event.table_name.clone(),
                    metric_kind: kind,
                    count,
                    error_count: errors,
                });
            }
        }
    }

    Ok(out)
}

fn accumulate(bucket: &mut AggregatedBucket, count: u64, errors: u64) -> Result<()> {
    let overflow = || PipelineError::CountOverflow {
        table: bucket.table_name.clone(),
        hour: bucket.hour,
    };
    let new_count = bucket.count.checked_add(count).ok_or_else(overflow)?;
    let new_errors = bucket.error_count.checked_add(errors).ok_or_else(overflow)?;
    bucket.count = new_count;
    bucket.error_count = new_errors;
    Ok(())
}

fn validate_table_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(PipelineError::InvalidInput("missing table name".to_string()));
    }
    Ok(())
}

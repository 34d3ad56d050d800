//! Source-vs-ingested comparison per `(hour, table_name)`.
//!
//! A load is healthy when the rows ingested match the rows parsed from the
//! source files. Anything else, including a group present for only one of the
//! two kinds, is reported.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::{AggregatedBucket, MetricKind};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Discrepancy {
    pub hour: NaiveDateTime,
    pub table_name: String,
    pub source: Option<u64>,
    pub ingested: Option<u64>,
    /// Largest error count reported by either kind for this group.
    pub error_count: u64,
}

impl Discrepancy {
    /// Rows parsed but not ingested (negative when more rows were ingested).
    pub fn gap(&self) -> i128 {
        i128::from(self.source.unwrap_or(0)) - i128::from(self.ingested.unwrap_or(0))
    }
}

/// Pair up both kinds per group and return the mismatching ones, sorted by `(hour, table_name)`.
pub fn find_discrepancies(buckets: &[AggregatedBucket]) -> Vec<Discrepancy> {
    let mut pairs: BTreeMap<(NaiveDateTime, &str), Discrepancy> = BTreeMap::new();

    for b in buckets {
        let entry = pairs
            .entry((b.hour, b.table_name.as_str()))
            .or_insert_with(|| Discrepancy {
                hour: b.hour,
                table_name: b.table_name.clone(),
                source: None,
                ingested: None,
                error_count: 0,
            });
        let slot = match b.metric_kind {
            MetricKind::SourceFileCount => &mut entry.source,
            MetricKind::IngestedCount => &mut entry.ingested,
        };
        *slot = Some(slot.unwrap_or(0).saturating_add(b.count));
        entry.error_count = entry.error_count.max(b.error_count);
    }

    pairs
        .into_values()
        .filter(|d| d.source != d.ingested)
        .collect()
}

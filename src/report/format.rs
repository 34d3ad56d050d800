//! Formatted terminal output: bucket tables, overlay stats, discrepancies.
//!
//! We keep formatting code in one place so:
//! - the aggregation/statistics code stays clean and testable
//! - output changes are localized (important for snapshot tests)

use crate::app::pipeline::{DashboardRun, LoadHistory};
use crate::domain::{AggregatedBucket, RollingStatsResult};
use crate::pipeline::Discrepancy;

/// Format the run summary header.
pub fn format_run_summary(history: &LoadHistory, run: &DashboardRun) -> String {
    let mut out = String::new();

    out.push_str("=== dod - Data Observability Dashboard ===\n");
    out.push_str(&format!("Source: {} ({})\n", history.origin.describe(), history.rows.shape_name()));
    out.push_str(&format!(
        "Rows: read={} used={} skipped={}\n",
        history.rows_read,
        history.rows.len(),
        history.row_errors.len()
    ));
    for e in history.row_errors.iter().take(5) {
        out.push_str(&format!("  line {}: {}\n", e.line, e.message));
    }
    if history.row_errors.len() > 5 {
        out.push_str(&format!("  ... {} more\n", history.row_errors.len() - 5));
    }
    out.push_str(&format!(
        "Buckets: {} | target table: {} ({} buckets)\n",
        run.buckets.len(),
        run.target_table,
        run.filtered.len()
    ));
    out.push('\n');

    out
}

/// Format a bucket table with the binding-contract columns.
pub fn format_bucket_table(rows: &[AggregatedBucket]) -> String {
    if rows.is_empty() {
        return "(no buckets)\n".to_string();
    }

    let mut out = String::new();
    out.push_str(
        format!(
            "{:<16} {:<24} {:<18} {:>12} {:>8}",
            "hour", "table_name", "metric_kind", "count", "errors"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(format!("{:-<16} {:-<24} {:-<18} {:-<12} {:-<8}", "", "", "", "", "").trim_end());
    out.push('\n');

    for b in rows {
        out.push_str(
            format!(
                "{:<16} {:<24} {:<18} {:>12} {:>8}",
                b.hour.format("%Y-%m-%d %H:%M").to_string(),
                truncate(&b.table_name, 24),
                b.metric_kind,
                b.count,
                b.error_count,
            )
            .trim_end(),
        );
        out.push('\n');
    }

    out
}

/// Format the mean / rolling-mean summary for the target table.
pub fn format_stats_summary(run: &DashboardRun) -> String {
    let Some(stats) = &run.stats else {
        return format!(
            "No {} buckets for table {}; nothing to average.\n",
            run.stats_series.display_name(),
            run.target_table
        );
    };

    let mut out = String::new();
    out.push_str(&format!(
        "Volume stats for {} (series: {}, n={}):\n",
        run.target_table,
        run.stats_series.display_name(),
        stats.rolling_mean.len()
    ));
    out.push_str(&format!("- overall mean : {:.2}\n", stats.overall_mean));
    if let Some(latest) = latest_rolling(stats) {
        out.push_str(&format!(
            "- rolling mean : {:.2} (window={}, at {})\n",
            latest.1,
            stats.window,
            latest.0.format("%Y-%m-%d %H:%M")
        ));
    }
    out
}

fn latest_rolling(stats: &RollingStatsResult) -> Option<(chrono::NaiveDateTime, f64)> {
    stats.rolling_mean.last().copied()
}

/// Format the source-vs-ingested mismatch list.
pub fn format_discrepancies(rows: &[Discrepancy]) -> String {
    if rows.is_empty() {
        return "No discrepancies: ingested matches source for every hour.\n".to_string();
    }

    let mut out = String::new();
    out.push_str(&format!("Discrepancies ({}):\n", rows.len()));
    out.push_str(
        format!(
            "{:<16} {:<24} {:>12} {:>12} {:>10} {:>8}",
            "hour", "table_name", "source", "ingested", "gap", "errors"
        )
        .trim_end(),
    );
    out.push('\n');
    for d in rows {
        out.push_str(
            format!(
                "{:<16} {:<24} {:>12} {:>12} {:>10} {:>8}",
                d.hour.format("%Y-%m-%d %H:%M").to_string(),
                truncate(&d.table_name, 24),
                fmt_opt(d.source),
                fmt_opt(d.ingested),
                d.gap(),
                d.error_count,
            )
            .trim_end(),
        );
        out.push('\n');
    }
    out
}

fn fmt_opt(v: Option<u64>) -> String {
    v.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
}

pub(crate) fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}

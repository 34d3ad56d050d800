//! Export aggregated buckets to CSV.
//!
//! The header uses the renderer binding names (`hour`, `count`, `metric_kind`)
//! so the file can be fed to any charting tool unmodified.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use tracing::info;

use crate::domain::AggregatedBucket;
use crate::error::AppError;

/// Write buckets to a CSV file.
pub fn write_buckets_csv(path: &Path, buckets: &[AggregatedBucket]) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(4, format!("Failed to create export CSV '{}': {e}", path.display())))?;
    write_buckets(file, buckets)?;
    info!(path = %path.display(), rows = buckets.len(), "exported buckets");
    Ok(())
}

/// Write buckets as CSV to any writer.
pub fn write_buckets<W: Write>(out: W, buckets: &[AggregatedBucket]) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_writer(out);

    writer
        .write_record(["hour", "table_name", "metric_kind", "count", "error_count"])
        .map_err(|e| AppError::new(4, format!("Failed to write export CSV header: {e}")))?;

    for b in buckets {
        writer
            .write_record([
                b.hour.format("%Y-%m-%d %H:%M:%S").to_string(),
                b.table_name.clone(),
                b.metric_kind.to_string(),
                b.count.to_string(),
                b.error_count.to_string(),
            ])
            .map_err(|e| AppError::new(4, format!("Failed to write export CSV row: {e}")))?;
    }

    writer
        .flush()
        .map_err(|e| AppError::new(4, format!("Failed to flush export CSV: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::MetricKind;
    use crate::io::ingest::{LoadedRows, read_load_history};
    use chrono::NaiveDate;

    #[test]
    fn exported_csv_reads_back_as_query_output() {
        let buckets = vec![
            AggregatedBucket {
                hour: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap(),
                table_name: "E".to_string(),
                metric_kind: MetricKind::SourceFileCount,
                count: 150,
                error_count: 1,
            },
            AggregatedBucket {
                hour: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap(),
                table_name: "E".to_string(),
                metric_kind: MetricKind::IngestedCount,
                count: 145,
                error_count: 1,
            },
        ];

        let mut buf = Vec::new();
        write_buckets(&mut buf, &buckets).unwrap();
        let text = String::from_utf8(buf.clone()).unwrap();
        assert!(text.starts_with("hour,table_name,metric_kind,count,error_count\n"));
        assert!(text.contains("2024-01-01 00:00:00,E,INGESTED_COUNT,145,1"));

        let LoadedRows::Buckets(back) = read_load_history(buf.as_slice(), false).unwrap().rows else {
            panic!("expected buckets");
        };
        assert_eq!(back, buckets);
    }
}

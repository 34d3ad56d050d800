//! The warehouse query whose result `dod` consumes.
//!
//! `dod` never connects to the warehouse; run this query there and export the
//! result to CSV (`dod report --csv result.csv`). The output columns match the
//! "query output" shape accepted by `io::ingest`.

pub const LOAD_HISTORY_SQL: &str = "\
SELECT
    DATE_TRUNC('HOUR', LAST_LOAD_TIME) AS LAST_LOAD_TIME,
    SUM(ROW_PARSED) AS COUNT,
    'SOURCE_FILE_COUNT' AS COUNT_TYPE,
    TABLE_NAME,
    COALESCE(SUM(ERROR_COUNT), 0) AS ERROR_COUNT
FROM DATA_OBSERVABILITY.DO.COPY_HISTORY
GROUP BY DATE_TRUNC('HOUR', LAST_LOAD_TIME), TABLE_NAME
UNION ALL
SELECT
    DATE_TRUNC('HOUR', LAST_LOAD_TIME) AS LAST_LOAD_TIME,
    SUM(ROW_COUNT) AS COUNT,
    'INGESTED_COUNT' AS COUNT_TYPE,
    TABLE_NAME,
    COALESCE(SUM(ERROR_COUNT), 0) AS ERROR_COUNT
FROM DATA_OBSERVABILITY.DO.COPY_HISTORY
GROUP BY DATE_TRUNC('HOUR', LAST_LOAD_TIME), TABLE_NAME;
";

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::MetricKind;

    #[test]
    fn query_tags_both_metric_kinds() {
        for kind in MetricKind::ALL {
            assert!(LOAD_HISTORY_SQL.contains(&format!("'{}'", kind.label())));
        }
        assert_eq!(LOAD_HISTORY_SQL.matches("GROUP BY DATE_TRUNC('HOUR'").count(), 2);
    }
}

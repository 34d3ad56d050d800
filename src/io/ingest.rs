//! CSV ingest of load-history exports.
//!
//! Two shapes are accepted, detected from the header row:
//!
//! - **raw events**: one row per copy/load operation
//!   (`load_time`, `table_name`, `rows_parsed`, `rows_loaded`, `error_count`)
//! - **query output**: the already aggregated load-history query result
//!   (`last_load_time`, `count`, `count_type`, `table_name`, `error_count`)
//!
//! Design goals:
//! - **Strict by default**: the first malformed row aborts the load (exit code 2)
//! - **Lenient on request**: `skip_invalid` skips bad rows and reports them
//! - **No aggregation here**: raw rows are handed to the pipeline untouched

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::{DateTime, NaiveDateTime};
use csv::StringRecord;
use tracing::{debug, info, warn};

use crate::domain::{AggregatedBucket, MetricKind, RawLoadEvent};
use crate::error::AppError;
use crate::pipeline::{PipelineError, merge_buckets};

/// Rows recovered from a CSV, in file order.
#[derive(Debug, Clone)]
pub enum LoadedRows {
    Events(Vec<RawLoadEvent>),
    /// Query output, already folded to one bucket per `(hour, table, kind)`.
    Buckets(Vec<AggregatedBucket>),
}

impl LoadedRows {
    pub fn len(&self) -> usize {
        match self {
            LoadedRows::Events(v) => v.len(),
            LoadedRows::Buckets(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn shape_name(&self) -> &'static str {
        match self {
            LoadedRows::Events(_) => "raw events",
            LoadedRows::Buckets(_) => "query output",
        }
    }
}

/// A row-level error encountered during ingest.
#[derive(Debug, Clone)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// Ingest output: parsed rows + skipped rows.
#[derive(Debug, Clone)]
pub struct LoadedData {
    pub rows: LoadedRows,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
}

/// Load a load-history CSV from disk.
pub fn load_csv(path: &Path, skip_invalid: bool) -> Result<LoadedData, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open CSV '{}': {e}", path.display())))?;

    let data = read_load_history(file, skip_invalid)?;
    info!(
        path = %path.display(),
        shape = data.rows.shape_name(),
        rows_read = data.rows_read,
        rows_used = data.rows.len(),
        skipped = data.row_errors.len(),
        "loaded load history"
    );
    if data.rows.is_empty() {
        warn!(path = %path.display(), "load history has no usable rows");
    }
    Ok(data)
}

/// Parse load history from any reader (file, stdin, in-memory fixture).
pub fn read_load_history<R: Read>(input: R, skip_invalid: bool) -> Result<LoadedData, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(input);

    let headers = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read CSV headers: {e}")))?
        .clone();
    let header_map = build_header_map(&headers);
    let shape = detect_shape(&header_map)?;
    debug!(?shape, "detected CSV shape");

    let mut events = Vec::new();
    let mut buckets = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // +2: records() starts after the header, and lines are 1-based.
        let line = idx + 2;
        rows_read += 1;

        let parsed = result
            .map_err(|e| format!("CSV parse error: {e}"))
            .and_then(|record| match &shape {
                Shape::Raw(cols) => parse_event(&record, cols).map(|e| events.push(e)),
                Shape::Query(cols) => parse_bucket(&record, cols).map(|b| buckets.push(b)),
            });

        if let Err(message) = parsed {
            if !skip_invalid {
                return Err(PipelineError::InvalidInput(format!("line {line}: {message}")).into());
            }
            warn!(line, %message, "skipping invalid row");
            row_errors.push(RowError { line, message });
        }
    }

    let rows = match shape {
        Shape::Raw(_) => LoadedRows::Events(events),
        Shape::Query(_) => LoadedRows::Buckets(merge_buckets(&buckets)?),
    };

    Ok(LoadedData {
        rows,
        row_errors,
        rows_read,
    })
}

#[derive(Debug)]
enum Shape {
    Raw(RawColumns),
    Query(QueryColumns),
}

#[derive(Debug)]
struct RawColumns {
    load_time: usize,
    table_name: usize,
    rows_parsed: usize,
    rows_loaded: usize,
    error_count: Option<usize>,
}

#[derive(Debug)]
struct QueryColumns {
    hour: usize,
    table_name: usize,
    count: usize,
    metric_kind: usize,
    error_count: Option<usize>,
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports sometimes prefix the first header with a UTF-8 BOM.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn column(header_map: &HashMap<String, usize>, aliases: &[&str]) -> Option<usize> {
    aliases.iter().find_map(|a| header_map.get(*a).copied())
}

fn detect_shape(header_map: &HashMap<String, usize>) -> Result<Shape, AppError> {
    let missing = |what: &str| AppError::new(2, format!("Missing required column: `{what}`"));

    let table_name = column(header_map, &["table_name"]).ok_or_else(|| missing("table_name"))?;
    let error_count = column(header_map, &["error_count"]);

    if let Some(metric_kind) = column(header_map, &["count_type", "metric_kind"]) {
        return Ok(Shape::Query(QueryColumns {
            hour: column(header_map, &["last_load_time", "hour"]).ok_or_else(|| missing("last_load_time"))?,
            table_name,
            count: column(header_map, &["count"]).ok_or_else(|| missing("count"))?,
            metric_kind,
            error_count,
        }));
    }

    let Some(rows_parsed) = column(header_map, &["rows_parsed", "row_parsed"]) else {
        return Err(AppError::new(
            2,
            "Unrecognized CSV: expected raw load events (`rows_parsed`, `rows_loaded`) \
             or load-history query output (`count`, `count_type`).",
        ));
    };

    Ok(Shape::Raw(RawColumns {
        load_time: column(header_map, &["load_time", "last_load_time"]).ok_or_else(|| missing("load_time"))?,
        table_name,
        rows_parsed,
        rows_loaded: column(header_map, &["rows_loaded", "row_count"]).ok_or_else(|| missing("rows_loaded"))?,
        error_count,
    }))
}

fn parse_event(record: &StringRecord, cols: &RawColumns) -> Result<RawLoadEvent, String> {
    Ok(RawLoadEvent {
        load_time: parse_timestamp(get_required(record, cols.load_time, "load_time")?)?,
        table_name: get_required(record, cols.table_name, "table_name")?.to_string(),
        rows_parsed: parse_opt_count(get_optional(record, Some(cols.rows_parsed)), "rows_parsed")?,
        rows_loaded: parse_opt_count(get_optional(record, Some(cols.rows_loaded)), "rows_loaded")?,
        error_count: parse_opt_count(get_optional(record, cols.error_count), "error_count")?,
    })
}

fn parse_bucket(record: &StringRecord, cols: &QueryColumns) -> Result<AggregatedBucket, String> {
    let kind_raw = get_required(record, cols.metric_kind, "count_type")?;
    let metric_kind = MetricKind::from_label(kind_raw)
        .ok_or_else(|| format!("Unknown count_type '{kind_raw}'."))?;

    Ok(AggregatedBucket {
        hour: parse_timestamp(get_required(record, cols.hour, "last_load_time")?)?,
        table_name: get_required(record, cols.table_name, "table_name")?.to_string(),
        metric_kind,
        // SUM over an all-NULL group comes back empty; treat as zero.
        count: parse_opt_count(get_optional(record, Some(cols.count)), "count")?.unwrap_or(0),
        error_count: parse_opt_count(get_optional(record, cols.error_count), "error_count")?.unwrap_or(0),
    })
}

fn get_required<'a>(record: &'a StringRecord, idx: usize, name: &str) -> Result<&'a str, String> {
    record
        .get(idx)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| format!("Missing required value: `{name}`"))
}

fn get_optional(record: &StringRecord, idx: Option<usize>) -> Option<&str> {
    record
        .get(idx?)
        .map(str::trim)
        .filter(|s| !s.is_empty() && !s.eq_ignore_ascii_case("null"))
}

pub(crate) fn parse_timestamp(s: &str) -> Result<NaiveDateTime, String> {
    const FMTS: [&str; 4] = [
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M",
    ];
    for fmt in FMTS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(ts);
        }
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return Ok(ts.naive_utc());
    }
    if let Ok(ts) = DateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f %z") {
        return Ok(ts.naive_utc());
    }
    Err(format!(
        "Invalid timestamp '{s}'. Expected YYYY-MM-DD HH:MM[:SS[.fff]] or RFC 3339."
    ))
}

fn parse_opt_count(s: Option<&str>, name: &str) -> Result<Option<u64>, String> {
    let Some(s) = s else { return Ok(None) };
    if let Ok(v) = s.parse::<u64>() {
        return Ok(Some(v));
    }
    // Warehouse drivers sometimes render integer sums as `150.0`.
    match s.parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 && v.fract() == 0.0 && v < u64::MAX as f64 => Ok(Some(v as u64)),
        Ok(_) => Err(format!("`{name}` must be a non-negative integer, got '{s}'.")),
        Err(_) => Err(format!("`{name}` is not numeric: '{s}'.")),
    }
}

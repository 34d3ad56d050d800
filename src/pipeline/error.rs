use chrono::NaiveDateTime;
use thiserror::Error;

/// Precondition violations raised by the aggregation/statistics core.
///
/// None of these are transient; callers should surface them, not retry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("mean requested on an empty series")]
    EmptySeries,

    #[error("count overflow in bucket {table} @ {hour}")]
    CountOverflow { table: String, hour: NaiveDateTime },
}

pub type Result<T> = std::result::Result<T, PipelineError>;

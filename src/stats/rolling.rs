//! Global mean and trailing rolling mean over a time-ordered series.
//!
//! The window is counted in data points, not elapsed time: with gaps in the
//! hourly series, a window of 10 still covers the 9 preceding *points* plus the
//! current one. Input order is trusted as-is; callers sort by hour beforehand.

use chrono::NaiveDateTime;

use crate::domain::RollingStatsResult;
use crate::pipeline::{PipelineError, Result};

/// Arithmetic mean of `values`.
///
/// An empty slice is an error rather than `NaN`.
pub fn overall_mean(values: &[f64]) -> Result<f64> {
    if values.is_empty() {
        return Err(PipelineError::EmptySeries);
    }
    Ok(values.iter().sum::<f64>() / values.len() as f64)
}

/// Trailing mean at every position over `window` points ending at that position.
///
/// The first `window - 1` positions average only the points available so far.
/// Each window is summed from scratch, so a `NaN` only poisons the windows that
/// actually contain it.
pub fn rolling_mean(values: &[f64], window: usize) -> Result<Vec<f64>> {
    if window == 0 {
        return Err(PipelineError::InvalidInput("rolling window must be > 0".to_string()));
    }

    let out = (0..values.len())
        .map(|i| {
            let start = (i + 1).saturating_sub(window);
            let slice = &values[start..=i];
            slice.iter().sum::<f64>() / slice.len() as f64
        })
        .collect();
    Ok(out)
}

/// Overall and rolling means for a `(hour, value)` series.
pub fn rolling_stats(series: &[(NaiveDateTime, f64)], window: usize) -> Result<RollingStatsResult> {
    let values: Vec<f64> = series.iter().map(|&(_, v)| v).collect();
    let overall_mean = overall_mean(&values)?;
    let means = rolling_mean(&values, window)?;

    let rolling_mean = series
        .iter()
        .zip(means)
        .map(|(&(hour, _), mean)| (hour, mean))
        .collect();

    Ok(RollingStatsResult {
        window,
        overall_mean,
        rolling_mean,
    })
}

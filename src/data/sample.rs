//! Synthetic load-history generation for demo mode.
//!
//! Every table gets a per-hour volume drawn around a table-specific baseline
//! with a daily cycle. Most loads ingest every parsed row; a configurable share
//! are partial loads (rows lost, errors reported) and a smaller share report no
//! `rows_loaded` at all, so every dashboard view has something to show.

use std::f64::consts::PI;

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::domain::{RawLoadEvent, SampleConfig};
use crate::error::AppError;

/// Baseline rows per load for the first table; later tables scale down.
const BASE_ROWS_PER_LOAD: f64 = 5_000.0;

/// Fixed start so the same seed always produces the same timestamps.
fn sample_start() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or_default()
}

pub fn generate_sample(config: &SampleConfig) -> Result<Vec<RawLoadEvent>, AppError> {
    if config.hours == 0 {
        return Err(AppError::new(2, "Sample hours must be > 0."));
    }
    if config.tables.is_empty() {
        return Err(AppError::new(2, "Sample needs at least one table."));
    }
    if config.max_loads_per_hour == 0 {
        return Err(AppError::new(2, "Sample loads per hour must be > 0."));
    }
    if !(0.0..1.0).contains(&config.partial_load_prob)
        || !(0.0..1.0).contains(&config.missing_loaded_prob)
        || config.partial_load_prob + config.missing_loaded_prob >= 1.0
    {
        return Err(AppError::new(2, "Invalid partial/missing load probability settings."));
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let noise = Normal::<f64>::new(0.0, 0.15)
        .map_err(|e| AppError::new(4, format!("Noise distribution error: {e}")))?;
    let start = sample_start();

    let mut events = Vec::new();
    for hour in 0..config.hours {
        let hour_start = start + TimeDelta::hours(hour as i64);
        // Daily cycle: busier in the middle of the day.
        let daily = 1.0 + 0.5 * (2.0 * PI * ((hour % 24) as f64 - 6.0) / 24.0).sin();

        for (t, table) in config.tables.iter().enumerate() {
            let baseline = BASE_ROWS_PER_LOAD / (t as f64 + 1.0);
            let loads = rng.gen_range(0..=config.max_loads_per_hour);

            for _ in 0..loads {
                let minute = rng.gen_range(0..60);
                let second = rng.gen_range(0..60);
                let load_time = hour_start + TimeDelta::minutes(minute) + TimeDelta::seconds(second);

                let level = baseline * daily * (1.0 + noise.sample(&mut rng)).max(0.05);
                let rows_parsed = level.round() as u64;

                let roll: f64 = rng.r#gen();
                let (rows_loaded, error_count) = if roll < config.missing_loaded_prob {
                    (None, Some(0))
                } else if roll < config.missing_loaded_prob + config.partial_load_prob {
                    let lost = rng.gen_range(1..=rows_parsed.max(1));
                    (Some(rows_parsed.saturating_sub(lost)), Some(lost.min(50)))
                } else {
                    (Some(rows_parsed), None)
                };

                events.push(RawLoadEvent {
                    load_time,
                    table_name: table.clone(),
                    rows_parsed: Some(rows_parsed),
                    rows_loaded,
                    error_count,
                });
            }
        }
    }

    Ok(events)
}

//! ASCII/Unicode plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - hourly counts: `#` bars
//! - overall mean: `=` rule
//! - rolling mean: `*` line

use chrono::NaiveDateTime;

use crate::domain::RollingStatsResult;

/// Which overlay to draw on top of the bars.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overlay {
    Mean,
    Rolling,
}

/// Render a bar chart of `(hour, count)` with a mean or rolling-mean overlay.
pub fn render_volume_plot(
    series: &[(NaiveDateTime, f64)],
    stats: Option<&RollingStatsResult>,
    width: usize,
    height: usize,
    overlay: Overlay,
) -> String {
    if series.is_empty() {
        return "(no data to plot)\n".to_string();
    }

    let width = width.max(10);
    let height = height.max(5);

    let (t_min, t_max) = time_range(series);
    let y_max = y_max(series, stats).unwrap_or(1.0) * 1.05;

    let mut grid = vec![vec![' '; width]; height];

    for &(t, v) in series {
        if !(v.is_finite() && v > 0.0) {
            continue;
        }
        let x = map_x(secs(t), t_min, t_max, width);
        let top = map_y(v, y_max, height);
        for row in grid.iter_mut().skip(top) {
            row[x] = '#';
        }
    }

    match (overlay, stats) {
        (Overlay::Mean, Some(stats)) if stats.overall_mean.is_finite() => {
            let y = map_y(stats.overall_mean, y_max, height);
            grid[y].iter_mut().for_each(|c| *c = '=');
        }
        (Overlay::Rolling, Some(stats)) => {
            let mut prev = None;
            for &(t, v) in &stats.rolling_mean {
                if !v.is_finite() {
                    prev = None;
                    continue;
                }
                let x = map_x(secs(t), t_min, t_max, width);
                let y = map_y(v, y_max, height);
                match prev {
                    Some((x0, y0)) => draw_line(&mut grid, x0, y0, x, y, '*'),
                    None => grid[y][x] = '*',
                }
                prev = Some((x, y));
            }
        }
        _ => {}
    }

    let mut out = String::new();
    out.push_str(&format!(
        "Plot: hours=[{}, {}] | count=[0, {y_max:.2}]",
        series[0].0.format("%Y-%m-%d %H:%M"),
        series[series.len() - 1].0.format("%Y-%m-%d %H:%M"),
    ));
    if let Some(stats) = stats {
        match overlay {
            Overlay::Mean => out.push_str(&format!(" | mean={:.2}", stats.overall_mean)),
            Overlay::Rolling => out.push_str(&format!(" | rolling window={}", stats.window)),
        }
    }
    out.push('\n');

    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }

    out
}

fn secs(t: NaiveDateTime) -> f64 {
    t.and_utc().timestamp() as f64
}

fn time_range(series: &[(NaiveDateTime, f64)]) -> (f64, f64) {
    let mut min_t = f64::INFINITY;
    let mut max_t = f64::NEG_INFINITY;
    for &(t, _) in series {
        min_t = min_t.min(secs(t));
        max_t = max_t.max(secs(t));
    }
    if max_t > min_t {
        (min_t, max_t)
    } else {
        // Single hour: centre it.
        (min_t - 1800.0, min_t + 1800.0)
    }
}

fn y_max(series: &[(NaiveDateTime, f64)], stats: Option<&RollingStatsResult>) -> Option<f64> {
    let mut max_y = f64::NEG_INFINITY;
    for &(_, v) in series {
        max_y = max_y.max(v);
    }
    if let Some(stats) = stats {
        for &(_, v) in &stats.rolling_mean {
            max_y = max_y.max(v);
        }
    }
    if max_y.is_finite() && max_y > 0.0 { Some(max_y) } else { None }
}

fn map_x(t: f64, t_min: f64, t_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = ((t - t_min) / (t_max - t_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = (y / y_max).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

/// Integer line drawing (Bresenham-ish).
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0 && (y0 as usize) < grid.len() && x0 >= 0 && (x0 as usize) < grid[0].len() {
            grid[y0 as usize][x0 as usize] = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::rolling_stats;
    use chrono::{NaiveDate, TimeDelta};

    fn series(values: &[f64]) -> Vec<(NaiveDateTime, f64)> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
        values
            .iter()
            .enumerate()
            .map(|(i, &v)| (start + TimeDelta::hours(i as i64), v))
            .collect()
    }

    #[test]
    fn mean_plot_golden_snapshot_small() {
        let s = series(&[2.0, 4.0, 6.0]);
        let stats = rolling_stats(&s, 10).unwrap();

        let txt = render_volume_plot(&s, Some(&stats), 10, 5, Overlay::Mean);
        let expected = concat!(
            "Plot: hours=[2024-01-01 00:00, 2024-01-01 02:00] | count=[0, 6.30] | mean=4.00\n",
            "         #\n",
            "==========\n",
            "     #   #\n",
            "#    #   #\n",
            "#    #   #\n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn rolling_plot_marks_every_point() {
        let s = series(&[2.0, 4.0, 6.0]);
        let stats = rolling_stats(&s, 10).unwrap();
        let txt = render_volume_plot(&s, Some(&stats), 10, 5, Overlay::Rolling);
        assert!(txt.contains('*'));
        assert!(txt.lines().skip(1).all(|l| l.chars().count() == 10));
    }

    #[test]
    fn empty_series_has_placeholder() {
        assert_eq!(render_volume_plot(&[], None, 10, 5, Overlay::Mean), "(no data to plot)\n");
    }
}

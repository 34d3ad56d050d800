//! Ratatui-based terminal UI.
//!
//! Three tabs over one loaded history: the aggregated source table, a
//! source-vs-ingested comparison for the target table, and the ingested data
//! volume with mean and rolling-mean overlays.

use std::collections::BTreeMap;
use std::io;
use std::path::PathBuf;
use std::time::Duration;

use chrono::NaiveDateTime;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use plotters::style::RGBColor;
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Row, Table, Tabs},
};
use tracing::{info, warn};

use crate::app::pipeline::{DashboardRun, LoadHistory, build_dashboard, load_history};
use crate::domain::{AggregatedBucket, DashboardConfig, MetricKind};
use crate::error::AppError;
use crate::io::export::write_buckets_csv;
use crate::pipeline::table_names;

mod plotters_chart;

use plotters_chart::{BarSegment, ChartLine, VolumePlottersChart};

/// Where `e` writes when no `--export` path was given.
const DEFAULT_EXPORT_PATH: &str = "dod-buckets.csv";

/// The comparison tab opens with proportional stacking; `n` switches to raw counts.
const DEFAULT_NORMALIZED: bool = true;

const BAR_HALF_WIDTH: f64 = 0.4;

const SOURCE_COLOR: RGBColor = RGBColor(255, 255, 0); // yellow
const INGESTED_COLOR: RGBColor = RGBColor(0, 255, 255); // cyan
const MEAN_COLOR: RGBColor = RGBColor(255, 0, 0); // red
const ROLLING_COLOR: RGBColor = RGBColor(0, 255, 0); // green

/// Start the TUI.
pub fn run(config: DashboardConfig) -> Result<(), AppError> {
    // Load before taking over the terminal so input errors print normally.
    let mut app = App::new(config)?;

    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::new(4, format!("Failed to initialize terminal: {e}")))?;

    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::new(4, format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::new(4, format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tab {
    Source,
    Comparison,
    Volume,
}

impl Tab {
    const ALL: [Tab; 3] = [Tab::Source, Tab::Comparison, Tab::Volume];

    fn title(self) -> &'static str {
        match self {
            Tab::Source => "Source",
            Tab::Comparison => "Ingested vs Source",
            Tab::Volume => "Ingested Data Volume",
        }
    }

    fn index(self) -> usize {
        match self {
            Tab::Source => 0,
            Tab::Comparison => 1,
            Tab::Volume => 2,
        }
    }

    fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    fn prev(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// Axis labelling for one chart.
#[derive(Clone, Copy)]
struct AxisSpec {
    x_label: &'static str,
    y_label: &'static str,
    fmt_x: fn(f64) -> String,
    fmt_y: fn(f64) -> String,
}

const VOLUME_AXES: AxisSpec = AxisSpec {
    x_label: "hour",
    y_label: "rows",
    fmt_x: fmt_axis_hour,
    fmt_y: fmt_axis_count,
};

const SHARE_AXES: AxisSpec = AxisSpec {
    x_label: "hour",
    y_label: "share",
    fmt_x: fmt_axis_hour,
    fmt_y: fmt_axis_share,
};

struct App {
    config: DashboardConfig,
    history: LoadHistory,
    run: DashboardRun,
    tab: Tab,
    scroll: usize,
    normalized: bool,
    status: String,
}

impl App {
    fn new(config: DashboardConfig) -> Result<Self, AppError> {
        let history = load_history(&config)?;
        let run = build_dashboard(&history.rows, &config)?;
        let status = format!("{} | {}", loaded_status(&history), stacking_status(DEFAULT_NORMALIZED));
        info!(origin = %history.origin.describe(), table = %config.target_table, "tui started");
        Ok(Self {
            config,
            history,
            run,
            tab: Tab::Source,
            scroll: 0,
            normalized: DEFAULT_NORMALIZED,
            status,
        })
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::new(4, format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::new(4, format!("Event poll error: {e}")))? {
                continue;
            }

            match event::read().map_err(|e| AppError::new(4, format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code)? {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn handle_key(&mut self, code: KeyCode) -> Result<bool, AppError> {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return Ok(true),
            KeyCode::Tab | KeyCode::Right => {
                self.tab = self.tab.next();
                self.scroll = 0;
            }
            KeyCode::BackTab | KeyCode::Left => {
                self.tab = self.tab.prev();
                self.scroll = 0;
            }
            KeyCode::Up => self.scroll = self.scroll.saturating_sub(1),
            KeyCode::Down => self.scroll = (self.scroll + 1).min(self.scroll_limit()),
            KeyCode::Char('t') => self.cycle_table()?,
            KeyCode::Char('k') => {
                self.config.stats_series = self.config.stats_series.next();
                self.recompute()?;
                self.status = format!("stats series: {}", self.config.stats_series.display_name());
            }
            KeyCode::Char('n') => {
                self.normalized = !self.normalized;
                self.status = stacking_status(self.normalized).to_string();
            }
            KeyCode::Char('r') => self.reload()?,
            KeyCode::Char('e') => self.export(),
            _ => {}
        }

        Ok(false)
    }

    fn scroll_limit(&self) -> usize {
        match self.tab {
            Tab::Source => self.run.buckets.len().saturating_sub(1),
            Tab::Comparison => self.run.discrepancies.len().saturating_sub(1),
            Tab::Volume => 0,
        }
    }

    fn recompute(&mut self) -> Result<(), AppError> {
        self.run = build_dashboard(&self.history.rows, &self.config)?;
        self.scroll = self.scroll.min(self.scroll_limit());
        Ok(())
    }

    fn cycle_table(&mut self) -> Result<(), AppError> {
        let names = table_names(&self.run.buckets);
        let Some(next) = next_table(&names, &self.config.target_table) else {
            self.status = "No tables loaded.".to_string();
            return Ok(());
        };
        self.config.target_table = next;
        self.recompute()?;
        self.status = format!("table: {}", self.config.target_table);
        Ok(())
    }

    /// Re-read the CSV, or draw a fresh sample in demo mode.
    fn reload(&mut self) -> Result<(), AppError> {
        if self.config.csv_path.is_none() {
            self.config.sample.seed = self.config.sample.seed.wrapping_add(1);
        }

        match load_history(&self.config) {
            Ok(history) => {
                self.history = history;
                self.recompute()?;
                self.status = loaded_status(&self.history);
                info!(origin = %self.history.origin.describe(), rows = self.history.rows_read, "reloaded");
            }
            Err(err) => {
                warn!(error = %err, "reload failed");
                self.status = format!("Reload failed: {err}");
            }
        }
        Ok(())
    }

    fn export(&mut self) {
        let path = self
            .config
            .export_buckets
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_EXPORT_PATH));
        match write_buckets_csv(&path, &self.run.buckets) {
            Ok(()) => {
                self.status = format!("Wrote {} buckets to {}", self.run.buckets.len(), path.display());
            }
            Err(err) => {
                self.status = format!("Export failed: {err}");
            }
        }
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(5),
                Constraint::Length(3),
                Constraint::Min(0),
                Constraint::Length(3),
            ])
            .split(size);

        self.draw_header(frame, chunks[0]);
        self.draw_tabs(frame, chunks[1]);
        match self.tab {
            Tab::Source => self.draw_source_tab(frame, chunks[2]),
            Tab::Comparison => self.draw_comparison_tab(frame, chunks[2]),
            Tab::Volume => self.draw_volume_tab(frame, chunks[2]),
        }
        self.draw_footer(frame, chunks[3]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let mut lines: Vec<Line> = Vec::new();
        lines.push(Line::from(vec![
            Span::styled("dod", Style::default().fg(Color::Cyan)),
            Span::raw(" | load history dashboard"),
        ]));

        lines.push(Line::from(Span::styled(
            format!(
                "source: {} | {} rows ({}) | skipped: {}",
                self.history.origin.describe(),
                self.history.rows_read,
                self.history.rows.shape_name(),
                self.history.row_errors.len(),
            ),
            Style::default().fg(Color::Gray),
        )));

        let stats = match &self.run.stats {
            Some(stats) => {
                let last = stats.rolling_mean.last().map(|&(_, v)| v).unwrap_or(f64::NAN);
                format!("mean={:.1} | rolling({})={last:.1}", stats.overall_mean, stats.window)
            }
            None => "no data for this table".to_string(),
        };
        lines.push(Line::from(Span::styled(
            format!(
                "table: {} | series: {} | {stats}",
                self.run.target_table,
                self.run.stats_series.display_name(),
            ),
            Style::default().fg(Color::Gray),
        )));

        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_tabs(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let tabs = Tabs::new(Tab::ALL.iter().map(|t| t.title()))
            .select(self.tab.index())
            .block(Block::default().borders(Borders::ALL))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White));
        frame.render_widget(tabs, area);
    }

    fn draw_source_tab(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let header = Row::new(["hour", "table_name", "metric_kind", "count", "error_count"])
            .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD));

        let rows = self.run.buckets.iter().skip(self.scroll).map(|b| {
            let style = if b.table_name == self.run.target_table {
                Style::default().fg(Color::White)
            } else {
                Style::default().fg(Color::Gray)
            };
            Row::new(vec![
                b.hour.format("%Y-%m-%d %H:%M").to_string(),
                b.table_name.clone(),
                b.metric_kind.to_string(),
                b.count.to_string(),
                b.error_count.to_string(),
            ])
            .style(style)
        });

        let table = Table::new(
            rows,
            [
                Constraint::Length(17),
                Constraint::Min(16),
                Constraint::Length(18),
                Constraint::Length(12),
                Constraint::Length(12),
            ],
        )
        .header(header)
        .block(
            Block::default()
                .title(format!("Source table ({} buckets)", self.run.buckets.len()))
                .borders(Borders::ALL),
        );
        frame.render_widget(table, area);
    }

    fn draw_comparison_tab(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
            .split(area);

        let title = format!(
            "{}: source (yellow) vs ingested (cyan){}",
            self.run.target_table,
            if self.normalized { ", normalized" } else { "" }
        );
        let bars = stacked_bars(&self.run.filtered, self.normalized);
        let axes = comparison_axes(self.normalized);
        draw_chart(frame, chunks[0], &title, &bars, &[], axes, self.normalized);

        self.draw_discrepancies(frame, chunks[1]);
    }

    fn draw_discrepancies(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default()
            .title(format!("Discrepancies ({})", self.run.discrepancies.len()))
            .borders(Borders::ALL);

        if self.run.discrepancies.is_empty() {
            let msg = Paragraph::new("Ingested matches source.")
                .style(Style::default().fg(Color::Green))
                .block(block);
            frame.render_widget(msg, area);
            return;
        }

        let fmt_opt = |v: Option<u64>| v.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string());
        let items: Vec<ListItem> = self
            .run
            .discrepancies
            .iter()
            .skip(self.scroll)
            .map(|d| {
                ListItem::new(format!(
                    "{} src {} ing {} gap {:+}",
                    d.hour.format("%m-%d %H:%M"),
                    fmt_opt(d.source),
                    fmt_opt(d.ingested),
                    d.gap(),
                ))
                .style(Style::default().fg(Color::Red))
            })
            .collect();
        frame.render_widget(List::new(items).block(block), area);
    }

    fn draw_volume_tab(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(area);

        let Some(stats) = &self.run.stats else {
            let msg = Paragraph::new(format!(
                "No {} buckets for table {}.",
                self.run.stats_series.display_name(),
                self.run.target_table
            ))
            .style(Style::default().fg(Color::Yellow))
            .block(Block::default().title(Tab::Volume.title()).borders(Borders::ALL));
            frame.render_widget(msg, area);
            return;
        };

        let bars = volume_bars(&self.run.stats_input);
        let (x_bounds, _) = chart_bounds(&bars, &[], false);

        let mean_line = ChartLine {
            points: vec![(x_bounds[0], stats.overall_mean), (x_bounds[1], stats.overall_mean)],
            color: MEAN_COLOR,
        };
        let rolling_line = ChartLine {
            points: stats
                .rolling_mean
                .iter()
                .map(|&(hour, v)| (hour_x(hour), v))
                .filter(|&(_, v)| v.is_finite())
                .collect(),
            color: ROLLING_COLOR,
        };

        let series = self.run.stats_series.display_name();
        draw_chart(
            frame,
            chunks[0],
            &format!("{series} volume, mean {:.1} (red)", stats.overall_mean),
            &bars,
            &[mean_line],
            VOLUME_AXES,
            false,
        );
        draw_chart(
            frame,
            chunks[1],
            &format!("{series} volume, rolling mean over {} points (green)", stats.window),
            &bars,
            &[rolling_line],
            VOLUME_AXES,
            false,
        );
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "Tab/←/→ tab  ↑/↓ scroll  t table  k series  n normalize  r reload  e export  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

fn stacking_status(normalized: bool) -> &'static str {
    if normalized {
        "stacking: normalized"
    } else {
        "stacking: absolute"
    }
}

fn comparison_axes(normalized: bool) -> AxisSpec {
    if normalized { SHARE_AXES } else { VOLUME_AXES }
}

fn loaded_status(history: &LoadHistory) -> String {
    let mut status = format!("Loaded {} rows from {}", history.rows_read, history.origin.describe());
    if !history.row_errors.is_empty() {
        status.push_str(&format!(" ({} skipped)", history.row_errors.len()));
    }
    status
}

/// The table after `current` in `names`, wrapping around; the first one if `current` is unknown.
fn next_table(names: &[String], current: &str) -> Option<String> {
    if names.is_empty() {
        return None;
    }
    let next = match names.iter().position(|n| n == current) {
        Some(i) => (i + 1) % names.len(),
        None => 0,
    };
    Some(names[next].clone())
}

/// X coordinate of an hour: hours since the Unix epoch.
fn hour_x(hour: NaiveDateTime) -> f64 {
    hour.and_utc().timestamp() as f64 / 3600.0
}

fn kind_color(kind: MetricKind) -> RGBColor {
    match kind {
        MetricKind::SourceFileCount => SOURCE_COLOR,
        MetricKind::IngestedCount => INGESTED_COLOR,
    }
}

/// One bar per bucket, coloured by metric kind.
fn volume_bars(buckets: &[AggregatedBucket]) -> Vec<BarSegment> {
    buckets
        .iter()
        .map(|b| {
            let x = hour_x(b.hour);
            BarSegment {
                x0: x - BAR_HALF_WIDTH,
                x1: x + BAR_HALF_WIDTH,
                y0: 0.0,
                y1: b.count as f64,
                color: kind_color(b.metric_kind),
            }
        })
        .collect()
}

/// Source stacked under ingested per hour; `normalized` scales each hour to a total of 1.
fn stacked_bars(buckets: &[AggregatedBucket], normalized: bool) -> Vec<BarSegment> {
    let mut per_hour: BTreeMap<NaiveDateTime, [u64; 2]> = BTreeMap::new();
    for b in buckets {
        let slot = match b.metric_kind {
            MetricKind::SourceFileCount => 0,
            MetricKind::IngestedCount => 1,
        };
        let entry = per_hour.entry(b.hour).or_default();
        entry[slot] = entry[slot].saturating_add(b.count);
    }

    let mut bars = Vec::with_capacity(per_hour.len() * 2);
    for (hour, [source, ingested]) in per_hour {
        let x = hour_x(hour);
        let total = source as f64 + ingested as f64;
        let scale = match (normalized, total > 0.0) {
            (true, true) => 1.0 / total,
            (true, false) => 0.0,
            (false, _) => 1.0,
        };
        let s = source as f64 * scale;
        let i = ingested as f64 * scale;
        bars.push(BarSegment {
            x0: x - BAR_HALF_WIDTH,
            x1: x + BAR_HALF_WIDTH,
            y0: 0.0,
            y1: s,
            color: SOURCE_COLOR,
        });
        bars.push(BarSegment {
            x0: x - BAR_HALF_WIDTH,
            x1: x + BAR_HALF_WIDTH,
            y0: s,
            y1: s + i,
            color: INGESTED_COLOR,
        });
    }
    bars
}

/// Axis bounds covering every bar and line; `unit_y` pins the y range to a share.
fn chart_bounds(bars: &[BarSegment], lines: &[ChartLine], unit_y: bool) -> ([f64; 2], [f64; 2]) {
    let (mut x_min, mut x_max) = (f64::INFINITY, f64::NEG_INFINITY);
    let mut y_max = f64::NEG_INFINITY;

    for b in bars {
        x_min = x_min.min(b.x0);
        x_max = x_max.max(b.x1);
        y_max = y_max.max(b.y1);
    }
    for &(x, y) in lines.iter().flat_map(|l| l.points.iter()) {
        x_min = x_min.min(x);
        x_max = x_max.max(x);
        y_max = y_max.max(y);
    }

    if !x_min.is_finite() || !x_max.is_finite() || x_max <= x_min {
        x_min = 0.0;
        x_max = 1.0;
    }
    if unit_y || !y_max.is_finite() || y_max <= 0.0 {
        y_max = 1.0;
    }

    ([x_min, x_max], [0.0, y_max * 1.05])
}

fn draw_chart(
    frame: &mut ratatui::Frame<'_>,
    area: Rect,
    title: &str,
    bars: &[BarSegment],
    lines: &[ChartLine],
    axes: AxisSpec,
    unit_y: bool,
) {
    let block = Block::default().title(title.to_string()).borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);
    frame.render_widget(Clear, inner);

    if bars.is_empty() {
        let msg = Paragraph::new("No buckets for this table.")
            .style(Style::default().fg(Color::Yellow))
            .block(Block::default());
        frame.render_widget(msg, inner);
        return;
    }

    let (x_bounds, y_bounds) = chart_bounds(bars, lines, unit_y);
    let (chart_rect, insets) = chart_layout(inner);
    let widget = VolumePlottersChart {
        bars,
        lines,
        x_bounds,
        y_bounds,
        x_label: axes.x_label,
        y_label: axes.y_label.to_string(),
        fmt_x: axes.fmt_x,
        fmt_y: axes.fmt_y,
    };

    frame.render_widget(widget, chart_rect);
    if let Some(insets) = insets {
        draw_axis_ticks(frame, inner, chart_rect, insets, x_bounds, y_bounds, axes);
    }
}

fn fmt_axis_hour(v: f64) -> String {
    chrono::DateTime::from_timestamp((v * 3600.0).round() as i64, 0)
        .map(|dt| dt.format("%m-%d %H:%M").to_string())
        .unwrap_or_default()
}

fn fmt_axis_count(v: f64) -> String {
    format!("{v:.0}")
}

fn fmt_axis_share(v: f64) -> String {
    format!("{:.0}%", v * 100.0)
}

#[derive(Debug, Clone, Copy)]
struct AxisInsets {
    left: u16,
    right: u16,
    top: u16,
    bottom: u16,
}

fn chart_layout(inner: Rect) -> (Rect, Option<AxisInsets>) {
    let insets = AxisInsets {
        left: 9,
        right: 2,
        top: 1,
        bottom: 2,
    };

    if inner.width <= insets.left + insets.right + 10
        || inner.height <= insets.top + insets.bottom + 5
    {
        return (inner, None);
    }

    let rect = Rect {
        x: inner.x + insets.left,
        y: inner.y + insets.top,
        width: inner.width - insets.left - insets.right,
        height: inner.height - insets.top - insets.bottom,
    };

    (rect, Some(insets))
}

fn draw_axis_ticks(
    frame: &mut ratatui::Frame<'_>,
    inner: Rect,
    chart: Rect,
    insets: AxisInsets,
    x_bounds: [f64; 2],
    y_bounds: [f64; 2],
    axes: AxisSpec,
) {
    let ticks = 5usize;
    let style = Style::default().fg(Color::Gray);

    for i in 0..ticks {
        let u = i as f64 / (ticks as f64 - 1.0);
        let x_val = x_bounds[0] + u * (x_bounds[1] - x_bounds[0]);
        let x = chart.x + ((chart.width - 1) as f64 * u).round() as u16;
        let label = (axes.fmt_x)(x_val);
        let label_len = label.len() as u16;
        let max_start = (inner.x + inner.width).saturating_sub(label_len).max(inner.x);
        let start = x.saturating_sub(label_len / 2).max(inner.x).min(max_start);
        let y = chart.y + chart.height;
        if y >= inner.y + inner.height - 1 {
            continue;
        }
        frame.render_widget(
            Paragraph::new(label).style(style),
            Rect {
                x: start,
                y,
                width: label_len,
                height: 1,
            },
        );
    }

    for i in 0..ticks {
        let u = i as f64 / (ticks as f64 - 1.0);
        let y_val = y_bounds[0] + u * (y_bounds[1] - y_bounds[0]);
        let y = chart.y + (chart.height - 1) - ((chart.height - 1) as f64 * u).round() as u16;
        let label = (axes.fmt_y)(y_val);
        let label_len = label.len() as u16;
        let x = inner.x + insets.left.saturating_sub(1);
        let start = x.saturating_sub(label_len);
        if start < inner.x {
            continue;
        }
        frame.render_widget(
            Paragraph::new(label).style(style),
            Rect {
                x: start,
                y,
                width: label_len,
                height: 1,
            },
        );
    }

    let x_label = Paragraph::new(axes.x_label)
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::Gray));
    let x_rect = Rect {
        x: chart.x,
        y: chart.y + chart.height + 1,
        width: chart.width,
        height: 1,
    };
    if x_rect.y < inner.y + inner.height {
        frame.render_widget(x_label, x_rect);
    }

    let y_label = Paragraph::new(axes.y_label)
        .style(Style::default().fg(Color::Gray).add_modifier(Modifier::BOLD));
    let y_rect = Rect {
        x: inner.x,
        y: inner.y,
        width: insets.left.saturating_sub(1),
        height: 1,
    };
    frame.render_widget(y_label, y_rect);
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn bucket(h: u32, kind: MetricKind, count: u64) -> AggregatedBucket {
        AggregatedBucket {
            hour: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap().and_hms_opt(h, 0, 0).unwrap(),
            table_name: "T".to_string(),
            metric_kind: kind,
            count,
            error_count: 0,
        }
    }

    #[test]
    fn tabs_wrap_both_ways() {
        assert_eq!(Tab::Volume.next(), Tab::Source);
        assert_eq!(Tab::Source.prev(), Tab::Volume);
        assert_eq!(Tab::Comparison.next().prev(), Tab::Comparison);
    }

    #[test]
    fn next_table_wraps_and_recovers_from_unknown() {
        let names = vec!["A".to_string(), "B".to_string()];
        assert_eq!(next_table(&names, "A").as_deref(), Some("B"));
        assert_eq!(next_table(&names, "B").as_deref(), Some("A"));
        assert_eq!(next_table(&names, "ZZZ").as_deref(), Some("A"));
        assert_eq!(next_table(&[], "A"), None);
    }

    #[test]
    fn stacked_bars_put_ingested_on_top_of_source() {
        let buckets = vec![
            bucket(0, MetricKind::SourceFileCount, 150),
            bucket(0, MetricKind::IngestedCount, 145),
        ];
        let bars = stacked_bars(&buckets, false);
        assert_eq!(bars.len(), 2);
        assert_eq!((bars[0].y0, bars[0].y1), (0.0, 150.0));
        assert_eq!((bars[1].y0, bars[1].y1), (150.0, 295.0));
    }

    #[test]
    fn normalized_stacks_reach_one() {
        let buckets = vec![
            bucket(0, MetricKind::SourceFileCount, 30),
            bucket(0, MetricKind::IngestedCount, 10),
            bucket(1, MetricKind::IngestedCount, 0),
        ];
        let bars = stacked_bars(&buckets, true);
        assert_eq!(bars.len(), 4);
        assert!((bars[1].y1 - 1.0).abs() < 1e-12);
        assert!((bars[0].y1 - 0.75).abs() < 1e-12);
        // An hour with no rows at all stays flat.
        assert_eq!(bars[3].y1, 0.0);
    }

    #[test]
    fn comparison_opens_as_shares() {
        let buckets = vec![
            bucket(0, MetricKind::SourceFileCount, 150),
            bucket(0, MetricKind::IngestedCount, 145),
        ];
        let axes = comparison_axes(DEFAULT_NORMALIZED);
        assert_eq!(axes.y_label, "share");
        assert_eq!((axes.fmt_y)(0.5), "50%");

        let bars = stacked_bars(&buckets, DEFAULT_NORMALIZED);
        assert!((bars[1].y1 - 1.0).abs() < 1e-12);
        assert_eq!(stacking_status(DEFAULT_NORMALIZED), "stacking: normalized");
        assert_eq!(comparison_axes(!DEFAULT_NORMALIZED).y_label, "rows");
    }

    #[test]
    fn hour_axis_round_trips() {
        let b = bucket(5, MetricKind::IngestedCount, 1);
        assert_eq!(fmt_axis_hour(hour_x(b.hour)), "01-01 05:00");
    }
}

//! Command-line parsing for the load-history dashboard.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the aggregation/statistics code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::{DEFAULT_ROLLING_WINDOW, DEFAULT_TARGET_TABLE, StatsSeries};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "dod", version, about = "Data Observability Dashboard for warehouse load history")]
pub struct Cli {
    #[command(flatten)]
    pub log: LogArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Aggregate load history and print tables, stats, discrepancies, and plots.
    Report(DashboardArgs),
    /// Plot a previously exported snapshot JSON.
    Plot(PlotArgs),
    /// Print the load-history query whose CSV result `--csv` expects.
    Sql,
    /// Launch the interactive TUI.
    ///
    /// This uses the same underlying pipeline as `dod report`, but renders the
    /// three dashboard tabs in a terminal UI using Ratatui.
    Tui(DashboardArgs),
}

/// Logging options shared by every subcommand.
#[derive(Debug, Args, Clone)]
pub struct LogArgs {
    /// Log filter (e.g. `info`, `do_dashboard=debug`).
    #[arg(long, global = true, env = "DOD_LOG", default_value = "warn")]
    pub log_level: String,

    /// Write logs to this file instead of stderr.
    #[arg(long, global = true, env = "DOD_LOG_FILE")]
    pub log_file: Option<PathBuf>,
}

/// Common options for the report and the TUI.
#[derive(Debug, Args, Clone)]
pub struct DashboardArgs {
    /// Load-history CSV (raw events or query output). Omit for a synthetic sample.
    #[arg(short = 'f', long, env = "DOD_CSV")]
    pub csv: Option<PathBuf>,

    /// Skip malformed rows instead of aborting.
    #[arg(long)]
    pub skip_invalid: bool,

    /// Table to narrow the charts to.
    #[arg(short = 't', long, env = "DOD_TABLE", default_value = DEFAULT_TARGET_TABLE)]
    pub table: String,

    /// Which buckets feed the mean / rolling-mean overlays.
    #[arg(long, value_enum, default_value_t = StatsSeries::Ingested)]
    pub stats: StatsSeries,

    /// Rolling window in data points.
    #[arg(long, default_value_t = DEFAULT_ROLLING_WINDOW)]
    pub window: usize,

    /// Random seed for the synthetic sample.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Hours of synthetic history.
    #[arg(long, default_value_t = 72)]
    pub hours: usize,

    /// Probability of a partial load in the synthetic sample.
    #[arg(long, default_value_t = 0.08)]
    pub partial_prob: f64,

    /// Probability of a load without `rows_loaded` in the synthetic sample.
    #[arg(long, default_value_t = 0.02)]
    pub missing_prob: f64,

    /// Render ASCII plots in the terminal (enabled by default).
    #[arg(long, default_value_t = true)]
    pub plot: bool,

    /// Disable the terminal plots.
    #[arg(long)]
    pub no_plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,

    /// Export all buckets to CSV.
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Export a dashboard snapshot (buckets + stats + discrepancies) to JSON.
    #[arg(long = "export-snapshot")]
    pub export_snapshot: Option<PathBuf>,
}

/// Options for plotting a saved snapshot.
#[derive(Debug, Args)]
pub struct PlotArgs {
    /// Snapshot JSON file produced by `dod report --export-snapshot`.
    #[arg(long, value_name = "JSON")]
    pub snapshot: PathBuf,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,
}

//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments and initializes logging
//! - loads the load history (CSV or synthetic sample)
//! - runs aggregation, filtering, and rolling statistics
//! - prints reports/plots
//! - writes optional exports

use clap::Parser;
use tracing::info;

use crate::cli::{Command, DashboardArgs, PlotArgs};
use crate::domain::{
    DEFAULT_ROLLING_WINDOW, DEFAULT_TARGET_TABLE, DashboardConfig, SampleConfig, StatsSeries,
};
use crate::error::AppError;
use crate::logging::LogSink;
use crate::plot::Overlay;

pub mod pipeline;

/// Entry point for the `dod` binary.
pub fn run() -> Result<(), AppError> {
    dotenvy::dotenv().ok();

    // We want `dod` and `dod -t TABLE` to behave like `dod tui ...`.
    //
    // Clap requires a subcommand name, so we do a small, explicit rewrite of the
    // argv list before parsing.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    let sink = match cli.command {
        Command::Tui(_) => LogSink::FileOnly,
        _ => LogSink::Stderr,
    };
    crate::logging::init(&cli.log.log_level, cli.log.log_file.as_deref(), sink)?;

    match cli.command {
        Command::Report(args) => handle_report(args),
        Command::Plot(args) => handle_plot(args),
        Command::Sql => {
            print!("{}", crate::data::LOAD_HISTORY_SQL);
            Ok(())
        }
        Command::Tui(args) => crate::tui::run(dashboard_config_from_args(&args)),
    }
}

fn handle_report(args: DashboardArgs) -> Result<(), AppError> {
    let config = dashboard_config_from_args(&args);
    let (history, run) = pipeline::run_dashboard(&config)?;
    info!(origin = %history.origin.describe(), buckets = run.buckets.len(), "report computed");

    println!("{}", crate::report::format_run_summary(&history, &run));

    println!("Source table:");
    println!("{}", crate::report::format_bucket_table(&run.buckets));

    println!("Filtered to {}:", run.target_table);
    println!("{}", crate::report::format_bucket_table(&run.filtered));

    println!("{}", crate::report::format_discrepancies(&run.discrepancies));
    println!("{}", crate::report::format_stats_summary(&run));

    if config.plot {
        let series = crate::pipeline::series_points(&run.stats_input);
        for (title, overlay) in [("Mean chart", Overlay::Mean), ("Rolling mean chart", Overlay::Rolling)] {
            println!("{title}:");
            println!(
                "{}",
                crate::plot::render_volume_plot(
                    &series,
                    run.stats.as_ref(),
                    config.plot_width,
                    config.plot_height,
                    overlay,
                )
            );
        }
    }

    // Optional exports.
    if let Some(path) = &config.export_buckets {
        crate::io::export::write_buckets_csv(path, &run.buckets)?;
    }
    if let Some(path) = &config.export_snapshot {
        crate::io::snapshot::write_snapshot_json(path, &run, &history.origin.describe())?;
    }

    Ok(())
}

fn handle_plot(args: PlotArgs) -> Result<(), AppError> {
    let snapshot = crate::io::snapshot::read_snapshot_json(&args.snapshot)?;
    let series = crate::pipeline::series_points(&snapshot.stats_input);

    println!(
        "Snapshot of {} ({}), series: {}",
        snapshot.target_table,
        snapshot.origin,
        snapshot.stats_series.display_name()
    );
    for overlay in [Overlay::Mean, Overlay::Rolling] {
        println!(
            "{}",
            crate::plot::render_volume_plot(&series, snapshot.stats.as_ref(), args.width, args.height, overlay)
        );
    }
    Ok(())
}

pub fn dashboard_config_from_args(args: &DashboardArgs) -> DashboardConfig {
    let defaults = default_config();
    DashboardConfig {
        csv_path: args.csv.clone(),
        skip_invalid: args.skip_invalid,
        target_table: args.table.clone(),
        stats_series: args.stats,
        window: args.window,
        sample: SampleConfig {
            seed: args.seed,
            hours: args.hours,
            partial_load_prob: args.partial_prob,
            missing_loaded_prob: args.missing_prob,
            ..defaults.sample
        },
        plot: args.plot && !args.no_plot,
        plot_width: args.width,
        plot_height: args.height,
        export_buckets: args.export.clone(),
        export_snapshot: args.export_snapshot.clone(),
    }
}

/// Configuration used when no flags are given (demo mode on the default table).
pub fn default_config() -> DashboardConfig {
    DashboardConfig {
        csv_path: None,
        skip_invalid: false,
        target_table: DEFAULT_TARGET_TABLE.to_string(),
        stats_series: StatsSeries::Ingested,
        window: DEFAULT_ROLLING_WINDOW,
        sample: SampleConfig {
            seed: 42,
            hours: 72,
            tables: vec![
                DEFAULT_TARGET_TABLE.to_string(),
                "CUSTOMER_LOAD".to_string(),
                "ORDER_ITEM_LOAD".to_string(),
            ],
            max_loads_per_hour: 4,
            partial_load_prob: 0.08,
            missing_loaded_prob: 0.02,
        },
        plot: true,
        plot_width: 100,
        plot_height: 20,
        export_buckets: None,
        export_snapshot: None,
    }
}

/// Rewrite argv so `dod` defaults to `dod tui`.
///
/// Rules:
/// - `dod`                      -> `dod tui`
/// - `dod -t TABLE ...`         -> `dod tui -t TABLE ...`
/// - `dod --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "report" | "plot" | "sql" | "tui");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "tui flags".
    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
        return argv;
    }

    // Otherwise, leave as-is.
    argv
}

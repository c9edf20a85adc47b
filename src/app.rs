//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and parses CLI arguments
//! - generates or reads the sales table
//! - runs descriptive and inferential statistics
//! - prints reports/plots and writes optional exports and charts

use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::cli::{AnalyzeArgs, ChartsArgs, Command, DashboardArgs, GenerateArgs};
use crate::error::AppError;
use crate::report::StatsReport;
use crate::stats::DEFAULT_HISTOGRAM_BINS;
use crate::viz::{ChartKind, ChartOptions};

pub mod pipeline;

/// Entry point for the `sales` binary.
pub fn run() -> Result<(), AppError> {
    // A missing `.env` is the normal case.
    let _ = dotenvy::dotenv();

    // We want `sales` and `sales -n 50` to behave like `sales dashboard ...`.
    //
    // Clap requires a subcommand name, so we do a small, explicit rewrite of the
    // argv list before parsing.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    if !matches!(cli.command, Command::Dashboard(_)) {
        init_logging();
    }

    match cli.command {
        Command::Generate(args) => handle_generate(args),
        Command::Analyze(args) => handle_analyze(args),
        Command::Charts(args) => handle_charts(args),
        Command::Dashboard(args) => handle_dashboard(args),
    }
}

/// Log to stderr, filtered by `RUST_LOG` (default `warn`). The dashboard owns
/// the terminal, so it runs without a subscriber.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn handle_generate(args: GenerateArgs) -> Result<(), AppError> {
    let config = args.generator.to_config();
    let table = crate::data::generate_table(&config)?;
    crate::io::write_table_csv(&args.output, &table)?;
    info!(path = %args.output.display(), rows = table.len(), "table written");
    println!("Wrote {} records to {}", table.len(), args.output.display());
    Ok(())
}

fn handle_analyze(args: AnalyzeArgs) -> Result<(), AppError> {
    let config = args.to_config();
    let run = pipeline::run_analysis(&config)?;

    println!("{}", crate::report::format_run_summary(&run, &config));

    if args.plot {
        let bins = crate::stats::histogram(&run.table.units(), DEFAULT_HISTOGRAM_BINS)?;
        println!("{}", crate::plot::render_ascii_histogram(&bins, args.width, args.height));
    }

    // Optional exports.
    if let Some(path) = &args.export_json {
        let report = StatsReport::from_run(&run, config.category);
        crate::io::write_report_json(path, &report)?;
        info!(path = %path.display(), "report written");
    }
    if let Some(path) = &args.export_pivot {
        crate::io::write_pivot_csv(path, &crate::io::pivot_units(&run.table))?;
        info!(path = %path.display(), "pivot written");
    }

    Ok(())
}

fn handle_charts(args: ChartsArgs) -> Result<(), AppError> {
    let loaded = pipeline::load_table(&args.source.to_source())?;
    let kinds = if args.kinds.is_empty() {
        ChartKind::ALL.to_vec()
    } else {
        args.kinds.clone()
    };
    let options = ChartOptions {
        width: args.width,
        height: args.height,
        ..ChartOptions::default()
    };

    let mut failures = Vec::new();
    for (kind, outcome) in crate::viz::render_all(&loaded.table, &kinds, &options) {
        match outcome {
            Ok(artifact) => {
                let path = crate::viz::write_artifact(&args.out_dir, &artifact)?;
                println!("{kind:<14} {}", path.display());
            }
            Err(err) => {
                println!("{kind:<14} skipped: {err}");
                failures.push((kind, err));
            }
        }
    }

    // Partial output is still a success; only a run where nothing rendered fails.
    if failures.len() == kinds.len() {
        if let Some((_, err)) = failures.into_iter().next() {
            return Err(err.into());
        }
    } else if !failures.is_empty() {
        warn!(failed = failures.len(), total = kinds.len(), "some charts were skipped");
    }
    Ok(())
}

fn handle_dashboard(args: DashboardArgs) -> Result<(), AppError> {
    crate::tui::run(args.generator.to_config(), args.test.to_config())
}

/// Rewrite argv so `sales` defaults to `sales dashboard`.
///
/// Rules:
/// - `sales`                          -> `sales dashboard`
/// - `sales -n 50 ...`                -> `sales dashboard -n 50 ...`
/// - `sales --help/--version/-h`      -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("dashboard".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "generate" | "analyze" | "charts" | "dashboard");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "dashboard flags".
    if arg1.starts_with('-') {
        argv.insert(1, "dashboard".to_string());
        return argv;
    }

    // Otherwise, leave as-is.
    argv
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_invocation_runs_dashboard() {
        assert_eq!(rewrite_args(args(&["sales"])), args(&["sales", "dashboard"]));
        assert_eq!(
            rewrite_args(args(&["sales", "-n", "50"])),
            args(&["sales", "dashboard", "-n", "50"])
        );
    }

    #[test]
    fn subcommands_and_help_are_untouched() {
        for argv in [
            args(&["sales", "analyze", "--plot"]),
            args(&["sales", "--help"]),
            args(&["sales", "charts", "-k", "heatmap"]),
        ] {
            assert_eq!(rewrite_args(argv.clone()), argv);
        }
    }

    #[test]
    fn charts_command_writes_svgs_and_tolerates_missing_columns() {
        let dir = std::env::temp_dir().join(format!("sales-app-charts-{}", std::process::id()));
        let csv = dir.join("undated.csv");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(
            &csv,
            "product,category,units_sold\nHome-01,Home,4\nHome-02,Home,9\nSports-01,Sports,12\n",
        )
        .unwrap();

        let cli = crate::cli::Cli::parse_from([
            "sales",
            "charts",
            "--input",
            csv.to_str().unwrap(),
            "--out-dir",
            dir.join("out").to_str().unwrap(),
        ]);
        let Command::Charts(charts) = cli.command else {
            panic!("expected charts");
        };
        handle_charts(charts).unwrap();

        assert!(dir.join("out/histogram.svg").exists());
        assert!(dir.join("out/treemap.svg").exists());
        assert!(dir.join("out/stacked-bar.svg").exists());
        assert!(!dir.join("out/trend.svg").exists());
        assert!(!dir.join("out/scatter.svg").exists());
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn analyze_exports_report_and_pivot() {
        let dir = std::env::temp_dir().join(format!("sales-app-analyze-{}", std::process::id()));
        let json = dir.join("report.json");
        let pivot = dir.join("pivot.csv");
        std::fs::create_dir_all(&dir).unwrap();

        let cli = crate::cli::Cli::parse_from([
            "sales",
            "analyze",
            "-n",
            "40",
            "--export-json",
            json.to_str().unwrap(),
            "--export-pivot",
            pivot.to_str().unwrap(),
        ]);
        let Command::Analyze(analyze) = cli.command else {
            panic!("expected analyze");
        };
        handle_analyze(analyze).unwrap();

        let report = crate::io::read_report_json(&json).unwrap();
        assert_eq!(report.rows, 40);
        assert!(report.inference.is_some());
        assert!(std::fs::read_to_string(&pivot).unwrap().starts_with("product,"));
        let _ = std::fs::remove_dir_all(&dir);
    }
}

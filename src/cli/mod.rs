//! Command-line parsing for the sales explorer.
//!
//! Argument parsing and command dispatch stay separate from the statistics code:
//! this module only turns flags into domain configs.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use crate::domain::{AnalysisConfig, Category, GeneratorConfig, TableSource, TestConfig};
use crate::viz::ChartKind;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "sales", version, about = "Synthetic sales data exploration")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Generate a synthetic sales table and write it to CSV.
    Generate(GenerateArgs),
    /// Describe the table, test its mean, and optionally plot/export.
    Analyze(AnalyzeArgs),
    /// Render SVG charts.
    Charts(ChartsArgs),
    /// Launch the interactive dashboard.
    ///
    /// Uses the same pipeline as `sales analyze`, rendered with Ratatui.
    Dashboard(DashboardArgs),
}

/// Synthetic dataset parameters.
#[derive(Debug, Args, Clone)]
pub struct GeneratorArgs {
    /// Number of records to generate.
    #[arg(short = 'n', long, env = "SALES_RECORDS", default_value_t = 100)]
    pub records: usize,

    /// Random seed (same seed, same table).
    #[arg(long, env = "SALES_SEED", default_value_t = 42)]
    pub seed: u64,

    /// Mean of the units-sold distribution.
    #[arg(long, default_value_t = 20.0)]
    pub units_mean: f64,

    /// Standard deviation of the units-sold distribution.
    #[arg(long, default_value_t = 6.0)]
    pub units_std: f64,

    /// Smallest units-sold value.
    #[arg(long, default_value_t = 0)]
    pub units_min: u32,

    /// Largest units-sold value.
    #[arg(long, default_value_t = 40)]
    pub units_max: u32,

    /// Lowest unit price.
    #[arg(long, default_value_t = 5.0)]
    pub price_min: f64,

    /// Highest unit price.
    #[arg(long, default_value_t = 500.0)]
    pub price_max: f64,

    /// First sale date (YYYY-MM-DD).
    #[arg(long, value_name = "DATE")]
    pub start_date: Option<NaiveDate>,

    /// Number of days sale dates are spread over.
    #[arg(long, default_value_t = 90)]
    pub span_days: u32,

    /// Products per category.
    #[arg(long, default_value_t = 4)]
    pub products: usize,
}

/// Hypothesis test parameters.
#[derive(Debug, Args, Clone)]
pub struct TestArgs {
    /// Hypothesized population mean of units sold.
    #[arg(long, default_value_t = 20.0)]
    pub mu0: f64,

    /// Significance level.
    #[arg(long, default_value_t = 0.05)]
    pub alpha: f64,
}

/// Where the table comes from: a CSV file or the generator.
#[derive(Debug, Args, Clone)]
pub struct SourceArgs {
    /// Read the table from CSV instead of generating it.
    #[arg(short = 'i', long, value_name = "CSV")]
    pub input: Option<PathBuf>,

    #[command(flatten)]
    pub generator: GeneratorArgs,
}

#[derive(Debug, Args, Clone)]
pub struct GenerateArgs {
    #[command(flatten)]
    pub generator: GeneratorArgs,

    /// Output CSV path.
    #[arg(short = 'o', long, value_name = "CSV")]
    pub output: PathBuf,
}

#[derive(Debug, Args, Clone)]
pub struct AnalyzeArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Restrict the analysis to one category.
    #[arg(short = 'c', long, value_enum)]
    pub category: Option<Category>,

    #[command(flatten)]
    pub test: TestArgs,

    /// Render an ASCII histogram in the terminal.
    #[arg(long)]
    pub plot: bool,

    /// Histogram width (columns).
    #[arg(long, default_value_t = 60)]
    pub width: usize,

    /// Histogram height (rows).
    #[arg(long, default_value_t = 12)]
    pub height: usize,

    /// Export the statistics report to JSON.
    #[arg(long = "export-json", value_name = "JSON")]
    pub export_json: Option<PathBuf>,

    /// Export units per product x category to CSV.
    #[arg(long = "export-pivot", value_name = "CSV")]
    pub export_pivot: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct ChartsArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Charts to render (repeatable); all charts when omitted.
    #[arg(short = 'k', long = "kind", value_enum)]
    pub kinds: Vec<ChartKind>,

    /// Directory the SVG files are written to.
    #[arg(short = 'o', long, value_name = "DIR", default_value = "charts")]
    pub out_dir: PathBuf,

    /// Chart width (pixels).
    #[arg(long, default_value_t = 800)]
    pub width: u32,

    /// Chart height (pixels).
    #[arg(long, default_value_t = 600)]
    pub height: u32,
}

#[derive(Debug, Args, Clone)]
pub struct DashboardArgs {
    #[command(flatten)]
    pub generator: GeneratorArgs,

    #[command(flatten)]
    pub test: TestArgs,
}

impl GeneratorArgs {
    pub fn to_config(&self) -> GeneratorConfig {
        let defaults = GeneratorConfig::default();
        GeneratorConfig {
            record_count: self.records,
            units_min: self.units_min,
            units_max: self.units_max,
            units_mean: self.units_mean,
            units_std_dev: self.units_std,
            price_min: self.price_min,
            price_max: self.price_max,
            start_date: self.start_date.unwrap_or(defaults.start_date),
            span_days: self.span_days,
            products_per_category: self.products,
            seed: self.seed,
        }
    }
}

impl TestArgs {
    pub fn to_config(&self) -> TestConfig {
        TestConfig {
            hypothesized_mean: self.mu0,
            alpha: self.alpha,
        }
    }
}

impl SourceArgs {
    pub fn to_source(&self) -> TableSource {
        match &self.input {
            Some(path) => TableSource::Csv(path.clone()),
            None => TableSource::Generate(self.generator.to_config()),
        }
    }
}

impl AnalyzeArgs {
    pub fn to_config(&self) -> AnalysisConfig {
        AnalysisConfig {
            source: self.source.to_source(),
            category: self.category,
            test: self.test.to_config(),
        }
    }
}

//! SVG charts.
//!
//! Every chart is a pure `table -> Result<ChartArtifact>` function. Charts
//! check their own columns, so a table missing e.g. dates still renders every
//! chart that doesn't need them.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::domain::{Column, SalesTable};
use crate::error::{Result, SalesError};
use crate::stats::DEFAULT_HISTOGRAM_BINS;

mod charts;
pub mod palette;
pub mod treemap;

pub use charts::{category_totals, daily_totals};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ChartKind {
    Histogram,
    Boxplot,
    CategoryBar,
    StackedBar,
    Scatter,
    Heatmap,
    #[value(name = "scatter3d")]
    #[serde(rename = "scatter3d")]
    Scatter3d,
    Treemap,
    Trend,
}

impl ChartKind {
    pub const ALL: [ChartKind; 9] = [
        ChartKind::Histogram,
        ChartKind::Boxplot,
        ChartKind::CategoryBar,
        ChartKind::StackedBar,
        ChartKind::Scatter,
        ChartKind::Heatmap,
        ChartKind::Scatter3d,
        ChartKind::Treemap,
        ChartKind::Trend,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ChartKind::Histogram => "histogram",
            ChartKind::Boxplot => "boxplot",
            ChartKind::CategoryBar => "category-bar",
            ChartKind::StackedBar => "stacked-bar",
            ChartKind::Scatter => "scatter",
            ChartKind::Heatmap => "heatmap",
            ChartKind::Scatter3d => "scatter3d",
            ChartKind::Treemap => "treemap",
            ChartKind::Trend => "trend",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            ChartKind::Histogram => "Distribution of Units Sold",
            ChartKind::Boxplot => "Units Sold by Category",
            ChartKind::CategoryBar => "Total Units Sold by Category",
            ChartKind::StackedBar => "Units Sold by Product and Category",
            ChartKind::Scatter => "Units Sold vs Revenue",
            ChartKind::Heatmap => "Correlation Matrix",
            ChartKind::Scatter3d => "Units, Revenue and Day",
            ChartKind::Treemap => "Share of Units Sold by Category",
            ChartKind::Trend => "Units Sold per Day",
        }
    }

    /// Columns the chart reads. The heatmap additionally needs two numeric
    /// columns, which the correlation step checks.
    pub fn required_columns(self) -> &'static [Column] {
        match self {
            ChartKind::Histogram | ChartKind::Heatmap => &[Column::UnitsSold],
            ChartKind::Boxplot | ChartKind::CategoryBar | ChartKind::Treemap => {
                &[Column::Category, Column::UnitsSold]
            }
            ChartKind::StackedBar => &[Column::Product, Column::Category, Column::UnitsSold],
            ChartKind::Scatter => &[Column::UnitsSold, Column::UnitPrice],
            ChartKind::Scatter3d => &[Column::UnitsSold, Column::UnitPrice, Column::Date],
            ChartKind::Trend => &[Column::Date, Column::UnitsSold],
        }
    }

    pub fn file_name(self) -> String {
        format!("{}.svg", self.name())
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Output size and binning.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartOptions {
    pub width: u32,
    pub height: u32,
    pub histogram_bins: usize,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            histogram_bins: DEFAULT_HISTOGRAM_BINS,
        }
    }
}

/// A rendered chart.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartArtifact {
    pub kind: ChartKind,
    pub svg: String,
}

/// Render one chart.
pub fn render(kind: ChartKind, table: &SalesTable, options: &ChartOptions) -> Result<ChartArtifact> {
    table.require(kind.required_columns())?;
    if table.is_empty() {
        return Err(SalesError::insufficient(1, 0));
    }
    if options.width < 100 || options.height < 100 {
        return Err(SalesError::invalid(format!(
            "Chart size {}x{} is too small (minimum 100x100).",
            options.width, options.height
        )));
    }

    let svg = match kind {
        ChartKind::Histogram => charts::histogram(table, options)?,
        ChartKind::Boxplot => charts::boxplot(table, options)?,
        ChartKind::CategoryBar => charts::category_bar(table, options)?,
        ChartKind::StackedBar => charts::stacked_bar(table, options)?,
        ChartKind::Scatter => charts::scatter(table, options)?,
        ChartKind::Heatmap => charts::heatmap(table, options)?,
        ChartKind::Scatter3d => charts::scatter3d(table, options)?,
        ChartKind::Treemap => charts::treemap(table, options)?,
        ChartKind::Trend => charts::trend(table, options)?,
    };
    Ok(ChartArtifact { kind, svg })
}

/// Render every requested chart; each outcome is independent of the others.
pub fn render_all(
    table: &SalesTable,
    kinds: &[ChartKind],
    options: &ChartOptions,
) -> Vec<(ChartKind, Result<ChartArtifact>)> {
    kinds
        .iter()
        .map(|&kind| {
            let outcome = render(kind, table, options);
            match &outcome {
                Ok(a) => tracing::info!(chart = %kind, bytes = a.svg.len(), "chart rendered"),
                Err(e) => tracing::warn!(chart = %kind, error = %e, "chart skipped"),
            }
            (kind, outcome)
        })
        .collect()
}

/// Write `<out_dir>/<kind>.svg`, creating the directory if needed.
pub fn write_artifact(out_dir: &Path, artifact: &ChartArtifact) -> Result<PathBuf> {
    fs::create_dir_all(out_dir)?;
    let path = out_dir.join(artifact.kind.file_name());
    fs::write(&path, &artifact.svg)?;
    Ok(path)
}

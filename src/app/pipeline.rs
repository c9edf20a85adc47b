//! Shared "analysis pipeline" logic used by both CLI and TUI front-ends.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! generate or load -> filter -> describe -> test -> correlate
//!
//! The CLI and the TUI can then focus on presentation (printing vs widgets).

use std::collections::BTreeMap;

use tracing::{info, warn};

use crate::domain::{AnalysisConfig, Category, SalesTable, TableSource};
use crate::error::{Result, SalesError};
use crate::io::ingest::RowError;
use crate::stats::{
    CorrelationMatrix, InferenceResult, Summary, correlation_matrix, describe,
    describe_by_category, inference,
};

/// A table plus where it came from.
#[derive(Debug, Clone)]
pub struct LoadedTable {
    pub table: SalesTable,
    /// Human-readable origin (`generated (seed 42)` or a file path).
    pub origin: String,
    pub row_errors: Vec<RowError>,
}

/// All computed outputs of a single analysis run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    /// The analysed table (already filtered to `config.category`, if any).
    pub table: SalesTable,
    pub origin: String,
    pub row_errors: Vec<RowError>,
    pub summary: Summary,
    pub by_category: BTreeMap<Category, Summary>,
    pub inference: Option<InferenceResult>,
    pub correlation: Option<CorrelationMatrix>,
    /// Optional steps that were skipped, with the reason.
    pub skipped: Vec<(String, String)>,
}

/// Generate or read the table described by `source`.
pub fn load_table(source: &TableSource) -> Result<LoadedTable> {
    match source {
        TableSource::Generate(config) => {
            let table = crate::data::generate_table(config)?;
            Ok(LoadedTable {
                table,
                origin: format!("generated (seed {})", config.seed),
                row_errors: Vec::new(),
            })
        }
        TableSource::Csv(path) => {
            let ingested = crate::io::ingest::read_table_csv(path)?;
            Ok(LoadedTable {
                table: ingested.table,
                origin: path.display().to_string(),
                row_errors: ingested.row_errors,
            })
        }
    }
}

/// Execute the full analysis pipeline and return the computed outputs.
pub fn run_analysis(config: &AnalysisConfig) -> Result<RunOutput> {
    let loaded = load_table(&config.source)?;
    analyze_loaded(loaded, config)
}

/// Run the analysis over an already loaded table.
///
/// This is useful for the TUI where the table is regenerated in place.
pub fn analyze_loaded(loaded: LoadedTable, config: &AnalysisConfig) -> Result<RunOutput> {
    inference::validate(&config.test)?;

    let table = match config.category {
        Some(category) => loaded.table.by_category(category),
        None => loaded.table,
    };

    // Descriptive statistics are the one mandatory step: an empty table is an
    // error rather than a report full of NaNs.
    let summary = describe(&table)?;
    let by_category = describe_by_category(&table)?;

    let mut skipped = Vec::new();

    // Too few records only skips the test; any other failure is fatal.
    let inference = match inference::analyze(&table, &config.test) {
        Ok(r) => Some(r),
        Err(err @ SalesError::InsufficientData { .. }) => {
            warn!(%err, "inference skipped");
            skipped.push(("inference".to_string(), err.to_string()));
            None
        }
        Err(err) => return Err(err),
    };

    let correlation = match correlation_matrix(&table) {
        Ok(m) => Some(m),
        Err(err) => {
            skipped.push(("correlation".to_string(), err.to_string()));
            None
        }
    };

    info!(
        rows = table.len(),
        origin = %loaded.origin,
        verdict = ?inference.as_ref().map(|r| r.verdict),
        "analysis complete"
    );

    Ok(RunOutput {
        table,
        origin: loaded.origin,
        row_errors: loaded.row_errors,
        summary,
        by_category,
        inference,
        correlation,
        skipped,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{GeneratorConfig, TestConfig};
    use crate::error::SalesError;

    fn config(category: Option<Category>) -> AnalysisConfig {
        AnalysisConfig {
            source: TableSource::Generate(GeneratorConfig::default()),
            category,
            test: TestConfig::default(),
        }
    }

    #[test]
    fn full_run_on_generated_data() {
        let run = run_analysis(&config(None)).unwrap();
        assert_eq!(run.summary.count, 100);
        assert!(run.inference.is_some());
        assert!(run.correlation.is_some());
        assert!(run.skipped.is_empty());
        assert_eq!(run.origin, "generated (seed 42)");
    }

    #[test]
    fn category_filter_narrows_the_table() {
        let run = run_analysis(&config(Some(Category::Home))).unwrap();
        assert!(run.table.records().iter().all(|r| r.category == Category::Home));
        assert_eq!(run.by_category.len(), 1);
        assert_eq!(run.by_category[&Category::Home].count, run.summary.count);
    }

    #[test]
    fn empty_filter_result_is_insufficient_data() {
        let loaded = LoadedTable {
            table: SalesTable::from_records(Vec::new()),
            origin: "empty".to_string(),
            row_errors: Vec::new(),
        };
        assert!(matches!(
            analyze_loaded(loaded, &config(None)),
            Err(SalesError::InsufficientData { .. })
        ));
    }

    #[test]
    fn single_record_skips_inference_but_describes() {
        let mut generator = GeneratorConfig::default();
        generator.record_count = 1;
        let run = run_analysis(&AnalysisConfig {
            source: TableSource::Generate(generator),
            category: None,
            test: TestConfig::default(),
        })
        .unwrap();
        assert_eq!(run.summary.count, 1);
        assert!(run.inference.is_none());
        assert!(run.skipped.iter().any(|(step, _)| step == "inference"));
    }

    #[test]
    fn invalid_test_parameters_fail_fast() {
        for test in [
            TestConfig { alpha: 1.5, ..TestConfig::default() },
            TestConfig { hypothesized_mean: f64::NAN, ..TestConfig::default() },
        ] {
            let result = run_analysis(&AnalysisConfig { test, ..config(None) });
            assert!(
                matches!(result, Err(SalesError::InvalidConfiguration(_))),
                "expected InvalidConfiguration for {test:?}"
            );
        }
    }

    #[test]
    fn invalid_alpha_wins_over_a_tiny_table() {
        let loaded = load_table(&TableSource::Generate(GeneratorConfig {
            record_count: 1,
            ..GeneratorConfig::default()
        }))
        .unwrap();
        let config = AnalysisConfig {
            test: TestConfig { alpha: 0.0, ..TestConfig::default() },
            ..config(None)
        };
        assert!(matches!(
            analyze_loaded(loaded, &config),
            Err(SalesError::InvalidConfiguration(_))
        ));
    }
}

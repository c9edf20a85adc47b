//! Read/write statistics report JSON files.
//!
//! The report is the "portable" form of an analysis run:
//! - descriptive statistics, overall and per category
//! - the confidence interval and test verdict
//! - the correlation table, when the source had enough numeric columns
//!
//! The schema is defined by `report::StatsReport`.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use crate::error::Result;
use crate::report::StatsReport;

/// Write a report JSON file.
pub fn write_report_json(path: &Path, report: &StatsReport) -> Result<()> {
    let file = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(file, report)?;
    Ok(())
}

/// Read a report JSON file.
pub fn read_report_json(path: &Path) -> Result<StatsReport> {
    let file = File::open(path)?;
    let report: StatsReport = serde_json::from_reader(file)?;
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::pipeline::{LoadedTable, analyze_loaded};
    use crate::domain::{AnalysisConfig, GeneratorConfig, TableSource, TestConfig};
    use crate::stats::Verdict;

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("sales-{}-{name}", std::process::id()))
    }

    fn config() -> AnalysisConfig {
        AnalysisConfig {
            source: TableSource::Generate(GeneratorConfig::default()),
            category: None,
            test: TestConfig::default(),
        }
    }

    #[test]
    fn report_survives_json() {
        let run = crate::app::pipeline::run_analysis(&config()).unwrap();
        let report = StatsReport::from_run(&run, None);

        let path = temp_path("report.json");
        write_report_json(&path, &report).unwrap();
        let back = read_report_json(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(back.rows, 100);
        assert_eq!(back.by_category, report.by_category);
        assert_eq!(back.inference.map(|r| r.verdict), report.inference.map(|r| r.verdict));
        assert_eq!(back.results.len(), report.results.len());
    }

    #[test]
    fn infinite_statistic_is_written_as_text() {
        let mut generator = GeneratorConfig::default();
        generator.units_min = 5;
        generator.units_max = 5;
        let loaded = LoadedTable {
            table: crate::data::generate_table(&generator).unwrap(),
            origin: "constant".to_string(),
            row_errors: Vec::new(),
        };
        let run = analyze_loaded(loaded, &config()).unwrap();
        let report = StatsReport::from_run(&run, None);

        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"-inf\""));

        let back: StatsReport = serde_json::from_str(&json).unwrap();
        let inference = back.inference.unwrap();
        assert_eq!(inference.statistic, f64::NEG_INFINITY);
        assert_eq!(inference.verdict, Verdict::Reject);
    }
}

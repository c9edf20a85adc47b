//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the statistics code stays clean and testable
//! - output changes are localized (important for golden tests)

use std::collections::BTreeMap;

use crate::app::pipeline::RunOutput;
use crate::domain::{AnalysisConfig, Category, StatisticResult};
use crate::stats::{CorrelationMatrix, InferenceResult, Reference, Summary};

/// Format the full run summary (dataset + descriptive + inferential).
pub fn format_run_summary(run: &RunOutput, config: &AnalysisConfig) -> String {
    let mut out = String::new();

    out.push_str("=== sales - Sales Data Exploration ===\n");
    out.push_str(&format!("Source: {}\n", run.origin));
    if let Some(category) = config.category {
        out.push_str(&format!("Category filter: {category}\n"));
    }
    out.push_str(&format!("Rows: {}", run.table.len()));
    if let Some((lo, hi)) = run.table.date_range() {
        out.push_str(&format!(" | dates: {lo} .. {hi}"));
    }
    out.push('\n');
    if !run.row_errors.is_empty() {
        out.push_str(&format!("Skipped rows: {}\n", run.row_errors.len()));
        for e in run.row_errors.iter().take(5) {
            out.push_str(&format!("  line {}: {}\n", e.line, e.message));
        }
    }

    out.push_str("\nUnits sold:\n");
    out.push_str(&format_results(&run.summary.results()));

    out.push_str("\nBy category:\n");
    out.push_str(&format_category_table(&run.by_category));

    out.push_str("\nHypothesis test:\n");
    match &run.inference {
        Some(inference) => out.push_str(&format_inference(inference)),
        None => out.push_str("  (not available)\n"),
    }

    if let Some(m) = &run.correlation {
        out.push_str("\nCorrelation:\n");
        out.push_str(&format_correlation(m));
    }

    for (step, reason) in &run.skipped {
        out.push_str(&format!("  (skipped {step}) {reason}\n"));
    }

    out
}

/// One line per named result.
pub fn format_results(results: &[StatisticResult]) -> String {
    let mut out = String::new();
    for r in results {
        let line = match r {
            StatisticResult::Scalar { name, value } => format!("  {name:<16} {}", fmt_num(*value)),
            StatisticResult::Interval { name, lower, upper } => {
                format!("  {name:<16} [{}, {}]", fmt_num(*lower), fmt_num(*upper))
            }
        };
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}

/// Per-category table.
pub fn format_category_table(by_category: &BTreeMap<Category, Summary>) -> String {
    let mut out = String::new();
    out.push_str(
        format!(
            "{:<12} {:>6} {:>8} {:>8} {:>6} {:>8} {:>8}",
            "category", "n", "mean", "median", "mode", "std", "total"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(&format!(
        "{:-<12} {:-<6} {:-<8} {:-<8} {:-<6} {:-<8} {:-<8}\n",
        "", "", "", "", "", "", ""
    ));

    for (category, s) in by_category {
        let std = s.std_dev.map(|v| format!("{v:.2}")).unwrap_or_else(|| "n/a".to_string());
        out.push_str(&format!(
            "{:<12} {:>6} {:>8.2} {:>8.1} {:>6} {:>8} {:>8}\n",
            category.display_name(),
            s.count,
            s.mean,
            s.median,
            s.mode,
            std,
            s.sum,
        ));
    }
    out
}

pub fn format_inference(r: &InferenceResult) -> String {
    let mut out = String::new();
    let dist = match r.reference {
        Reference::StudentT { df } => format!("Student's t (df={df:.0})"),
        Reference::Normal => "normal".to_string(),
    };
    out.push_str(&format!(
        "  H0: mean = {} | alpha = {} | n = {} | {dist}\n",
        fmt_num(r.hypothesized_mean),
        r.alpha,
        r.n
    ));
    out.push_str(&format!(
        "  mean = {} | se = {}\n",
        fmt_num(r.mean),
        fmt_num(r.std_error)
    ));
    out.push_str(&format_results(&r.results()));
    out.push_str(&format!("  verdict: {}\n", r.verdict.display_name()));
    out
}

pub fn format_correlation(m: &CorrelationMatrix) -> String {
    let mut out = String::new();
    let mut header = format!("  {:<12}", "");
    for c in &m.columns {
        header.push_str(&format!(" {:>10}", c.label()));
    }
    out.push_str(header.trim_end());
    out.push('\n');

    for (i, c) in m.columns.iter().enumerate() {
        let mut line = format!("  {:<12}", c.label());
        for j in 0..m.columns.len() {
            line.push_str(&format!(" {:>10.3}", m.values[(i, j)]));
        }
        out.push_str(&line);
        out.push('\n');
    }
    out
}

fn fmt_num(v: f64) -> String {
    if v.is_infinite() {
        return if v > 0.0 { "inf".to_string() } else { "-inf".to_string() };
    }
    format!("{v:.4}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::descriptive::summarize;

    #[test]
    fn results_golden() {
        let results = vec![
            StatisticResult::scalar("mean", 20.0),
            StatisticResult::interval("95% CI", 18.5, 21.25),
            StatisticResult::scalar("test_statistic", f64::NEG_INFINITY),
        ];
        let expected = concat!(
            "  mean             20.0000\n",
            "  95% CI           [18.5000, 21.2500]\n",
            "  test_statistic   -inf\n",
        );
        assert_eq!(format_results(&results), expected);
    }

    #[test]
    fn category_table_marks_missing_std() {
        let mut by_category = BTreeMap::new();
        by_category.insert(Category::Home, summarize(&[10, 20, 30]).unwrap());
        by_category.insert(Category::Sports, summarize(&[7]).unwrap());
        let text = format_category_table(&by_category);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[2].starts_with("Home"));
        assert!(lines[2].contains("10.00"));
        assert!(lines[3].contains("n/a"));
    }
}

//! Reporting: the serializable statistics report and terminal formatting.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::app::pipeline::RunOutput;
use crate::domain::{Category, StatisticResult};
use crate::stats::{CorrelationMatrix, InferenceResult, NumericColumn, Summary};

pub mod format;

pub use format::*;

/// A saved analysis (JSON).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsReport {
    pub tool: String,
    pub origin: String,
    pub rows: usize,
    pub category: Option<Category>,
    pub summary: Summary,
    pub by_category: BTreeMap<Category, Summary>,
    pub inference: Option<InferenceResult>,
    pub correlation: Option<CorrelationTable>,
    /// Flat list of every named result, for consumers that don't care about structure.
    pub results: Vec<StatisticResult>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationTable {
    pub columns: Vec<NumericColumn>,
    /// Row-major.
    pub values: Vec<Vec<f64>>,
}

impl From<&CorrelationMatrix> for CorrelationTable {
    fn from(m: &CorrelationMatrix) -> Self {
        let values = (0..m.values.nrows())
            .map(|i| m.values.row(i).iter().copied().collect())
            .collect();
        Self {
            columns: m.columns.clone(),
            values,
        }
    }
}

impl StatsReport {
    pub fn from_run(run: &RunOutput, category: Option<Category>) -> Self {
        let mut results = run.summary.results();
        if let Some(inference) = &run.inference {
            results.extend(inference.results());
        }
        Self {
            tool: "sales".to_string(),
            origin: run.origin.clone(),
            rows: run.table.len(),
            category,
            summary: run.summary.clone(),
            by_category: run.by_category.clone(),
            inference: run.inference.clone(),
            correlation: run.correlation.as_ref().map(CorrelationTable::from),
            results,
        }
    }
}

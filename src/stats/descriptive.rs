//! Descriptive statistics over units sold.
//!
//! All functions take plain `u32` slices so they can be reused for any
//! grouping; `describe` / `describe_by_category` are the table-level entry
//! points.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::domain::{Category, SalesTable, StatisticResult};
use crate::error::{Result, SalesError};

/// Summary of one group of units-sold values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub count: usize,
    pub sum: u64,
    pub min: u32,
    pub max: u32,
    pub mean: f64,
    pub median: f64,
    pub mode: u32,
    /// Sample variance; `None` for a single record.
    pub variance: Option<f64>,
    pub std_dev: Option<f64>,
}

impl Summary {
    /// Named results in a stable order.
    pub fn results(&self) -> Vec<StatisticResult> {
        let mut out = vec![
            StatisticResult::scalar("count", self.count as f64),
            StatisticResult::scalar("mean", self.mean),
            StatisticResult::scalar("median", self.median),
            StatisticResult::scalar("mode", f64::from(self.mode)),
        ];
        if let Some(v) = self.variance {
            out.push(StatisticResult::scalar("variance", v));
        }
        if let Some(s) = self.std_dev {
            out.push(StatisticResult::scalar("std_dev", s));
        }
        out.push(StatisticResult::scalar("min", f64::from(self.min)));
        out.push(StatisticResult::scalar("max", f64::from(self.max)));
        out
    }
}

pub fn mean(values: &[u32]) -> Result<f64> {
    if values.is_empty() {
        return Err(SalesError::insufficient(1, 0));
    }
    let sum: u64 = values.iter().map(|&v| u64::from(v)).sum();
    Ok(sum as f64 / values.len() as f64)
}

pub fn median(values: &[u32]) -> Result<f64> {
    if values.is_empty() {
        return Err(SalesError::insufficient(1, 0));
    }
    let mut sorted = values.to_vec();
    sorted.sort_unstable();
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        Ok(f64::from(sorted[mid]))
    } else {
        Ok((f64::from(sorted[mid - 1]) + f64::from(sorted[mid])) / 2.0)
    }
}

/// Most frequent value; ties resolve to the smallest value.
pub fn mode(values: &[u32]) -> Result<u32> {
    if values.is_empty() {
        return Err(SalesError::insufficient(1, 0));
    }
    let mut counts: HashMap<u32, usize> = HashMap::new();
    for &v in values {
        *counts.entry(v).or_insert(0) += 1;
    }
    counts
        .into_iter()
        .max_by(|(va, ca), (vb, cb)| ca.cmp(cb).then(vb.cmp(va)))
        .map(|(v, _)| v)
        .ok_or_else(|| SalesError::insufficient(1, 0))
}

/// Sample variance (n - 1 denominator).
pub fn variance(values: &[u32]) -> Result<f64> {
    if values.len() < 2 {
        return Err(SalesError::insufficient(2, values.len()));
    }
    let m = mean(values)?;
    let ss: f64 = values
        .iter()
        .map(|&v| {
            let d = f64::from(v) - m;
            d * d
        })
        .sum();
    Ok(ss / (values.len() as f64 - 1.0))
}

pub fn std_dev(values: &[u32]) -> Result<f64> {
    variance(values).map(f64::sqrt)
}

pub fn summarize(values: &[u32]) -> Result<Summary> {
    if values.is_empty() {
        return Err(SalesError::insufficient(1, 0));
    }
    let variance = variance(values).ok();
    Ok(Summary {
        count: values.len(),
        sum: values.iter().map(|&v| u64::from(v)).sum(),
        min: values.iter().copied().min().unwrap_or_default(),
        max: values.iter().copied().max().unwrap_or_default(),
        mean: mean(values)?,
        median: median(values)?,
        mode: mode(values)?,
        variance,
        std_dev: variance.map(f64::sqrt),
    })
}

/// Summary of units sold over the whole table.
pub fn describe(table: &SalesTable) -> Result<Summary> {
    summarize(&table.units())
}

/// Per-category summaries, covering only categories that have records.
pub fn describe_by_category(table: &SalesTable) -> Result<BTreeMap<Category, Summary>> {
    if table.is_empty() {
        return Err(SalesError::insufficient(1, 0));
    }
    table
        .units_by_category()
        .into_iter()
        .map(|(category, units)| Ok((category, summarize(&units)?)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn basic_central_tendency() {
        let v = [10, 20, 30];
        assert_relative_eq!(mean(&v).unwrap(), 20.0);
        assert_relative_eq!(median(&v).unwrap(), 20.0);
    }

    #[test]
    fn median_of_even_count_averages_middle_pair() {
        assert_relative_eq!(median(&[4, 1, 3, 2]).unwrap(), 2.5);
    }

    #[test]
    fn mode_picks_most_frequent() {
        assert_eq!(mode(&[17, 17, 18, 20]).unwrap(), 17);
    }

    #[test]
    fn mode_tie_breaks_to_smallest() {
        assert_eq!(mode(&[9, 3, 9, 3, 5]).unwrap(), 3);
        assert_eq!(mode(&[8, 2, 5]).unwrap(), 2);
    }

    #[test]
    fn sample_variance_and_std_dev() {
        let v = [2, 4, 4, 4, 5, 5, 7, 9];
        // Sum of squared deviations = 32, n - 1 = 7.
        let var = variance(&v).unwrap();
        assert_relative_eq!(var, 32.0 / 7.0, epsilon = 1e-12);
        assert_relative_eq!(std_dev(&v).unwrap(), var.sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn empty_input_is_insufficient_data() {
        assert!(matches!(mean(&[]), Err(SalesError::InsufficientData { needed: 1, actual: 0 })));
        assert!(matches!(median(&[]), Err(SalesError::InsufficientData { .. })));
        assert!(matches!(mode(&[]), Err(SalesError::InsufficientData { .. })));
        assert!(matches!(summarize(&[]), Err(SalesError::InsufficientData { .. })));
        assert!(matches!(
            describe(&SalesTable::from_records(Vec::new())),
            Err(SalesError::InsufficientData { .. })
        ));
    }

    #[test]
    fn single_value_has_no_variance() {
        assert!(matches!(
            variance(&[5]),
            Err(SalesError::InsufficientData { needed: 2, actual: 1 })
        ));
        let s = summarize(&[5]).unwrap();
        assert_eq!(s.variance, None);
        assert_eq!(s.std_dev, None);
        assert_eq!(s.results().len(), 6);
    }

    #[test]
    fn std_dev_is_sqrt_of_variance_on_generated_data() {
        let table = crate::data::generate_table(&Default::default()).unwrap();
        let s = describe(&table).unwrap();
        assert_relative_eq!(s.std_dev.unwrap(), s.variance.unwrap().sqrt(), epsilon = 1e-12);
        assert_eq!(s.count, 100);
        assert!(s.min <= s.mode && s.mode <= s.max);
    }

    #[test]
    fn per_category_counts_add_up() {
        let table = crate::data::generate_table(&Default::default()).unwrap();
        let by_cat = describe_by_category(&table).unwrap();
        let total: usize = by_cat.values().map(|s| s.count).sum();
        assert_eq!(total, table.len());
    }
}

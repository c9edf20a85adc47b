//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during analysis
//! - exported to JSON/CSV
//! - reloaded later for charts or comparisons

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use chrono::NaiveDate;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SalesError};

/// Product category (grouping key only).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ValueEnum,
)]
pub enum Category {
    Electronics,
    Home,
    Clothing,
    Grocery,
    Sports,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Electronics,
        Category::Home,
        Category::Clothing,
        Category::Grocery,
        Category::Sports,
    ];

    pub fn display_name(self) -> &'static str {
        match self {
            Category::Electronics => "Electronics",
            Category::Home => "Home",
            Category::Clothing => "Clothing",
            Category::Grocery => "Grocery",
            Category::Sports => "Sports",
        }
    }

    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|c| *c == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        let idx = Self::ALL.iter().position(|c| *c == self).unwrap_or(0);
        Self::ALL[(idx + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let needle = s.trim();
        Category::ALL
            .into_iter()
            .find(|c| c.display_name().eq_ignore_ascii_case(needle))
            .ok_or_else(|| format!("Unknown category '{needle}'."))
    }
}

/// A table column, as named in CSV headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Column {
    Product,
    Category,
    UnitsSold,
    Date,
    UnitPrice,
    /// Derived: `units_sold * unit_price`.
    Revenue,
}

impl Column {
    /// Columns every table carries.
    pub const REQUIRED: [Column; 3] = [Column::Product, Column::Category, Column::UnitsSold];

    pub fn name(self) -> &'static str {
        match self {
            Column::Product => "product",
            Column::Category => "category",
            Column::UnitsSold => "units_sold",
            Column::Date => "date",
            Column::UnitPrice => "unit_price",
            Column::Revenue => "revenue",
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One sale. Immutable once generated or ingested.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleRecord {
    pub product: String,
    pub category: Category,
    pub units_sold: u32,
    /// Absent only when the source file has no date column.
    pub date: Option<NaiveDate>,
    /// Absent only when the source file has no price column.
    pub unit_price: Option<f64>,
}

impl SaleRecord {
    pub fn revenue(&self) -> Option<f64> {
        self.unit_price.map(|p| p * f64::from(self.units_sold))
    }
}

/// Ordered, read-only sequence of sale records plus the columns they carry.
#[derive(Debug, Clone, PartialEq)]
pub struct SalesTable {
    records: Vec<SaleRecord>,
    columns: BTreeSet<Column>,
}

impl SalesTable {
    /// Build a table; optional columns are part of the schema only when every
    /// record carries a value for them.
    pub fn from_records(records: Vec<SaleRecord>) -> Self {
        let mut columns: BTreeSet<Column> = Column::REQUIRED.into_iter().collect();
        if !records.is_empty() && records.iter().all(|r| r.date.is_some()) {
            columns.insert(Column::Date);
        }
        if !records.is_empty() && records.iter().all(|r| r.unit_price.is_some()) {
            columns.insert(Column::UnitPrice);
            columns.insert(Column::Revenue);
        }
        Self { records, columns }
    }

    pub fn records(&self) -> &[SaleRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn columns(&self) -> &BTreeSet<Column> {
        &self.columns
    }

    pub fn has_column(&self, column: Column) -> bool {
        self.columns.contains(&column)
    }

    /// Fail with `MissingField` if any of `columns` is absent.
    pub fn require(&self, columns: &[Column]) -> Result<()> {
        match columns.iter().find(|c| !self.has_column(**c)) {
            Some(missing) => Err(SalesError::MissingField(*missing)),
            None => Ok(()),
        }
    }

    /// Units sold for every record, in table order.
    pub fn units(&self) -> Vec<u32> {
        self.records.iter().map(|r| r.units_sold).collect()
    }

    /// A new table holding only the records of `category`.
    pub fn by_category(&self, category: Category) -> SalesTable {
        let records = self
            .records
            .iter()
            .filter(|r| r.category == category)
            .cloned()
            .collect();
        let mut table = SalesTable::from_records(records);
        // A filtered table keeps the parent's schema even when it is empty.
        table.columns = self.columns.clone();
        table
    }

    /// Units grouped by category (only categories with records).
    pub fn units_by_category(&self) -> BTreeMap<Category, Vec<u32>> {
        let mut out: BTreeMap<Category, Vec<u32>> = BTreeMap::new();
        for r in &self.records {
            out.entry(r.category).or_default().push(r.units_sold);
        }
        out
    }

    /// Earliest and latest sale date, if the table carries dates.
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        let mut dates = self.records.iter().filter_map(|r| r.date);
        let first = dates.next()?;
        Some(dates.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d))))
    }
}

/// A derived statistic: a named scalar or a named interval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum StatisticResult {
    Scalar {
        name: String,
        #[serde(with = "float_repr")]
        value: f64,
    },
    Interval { name: String, lower: f64, upper: f64 },
}

impl StatisticResult {
    pub fn scalar(name: impl Into<String>, value: f64) -> Self {
        Self::Scalar {
            name: name.into(),
            value,
        }
    }

    pub fn interval(name: impl Into<String>, lower: f64, upper: f64) -> Self {
        Self::Interval {
            name: name.into(),
            lower,
            upper,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Scalar { name, .. } | Self::Interval { name, .. } => name,
        }
    }
}

/// JSON has no infinities: a degenerate test statistic is written as the
/// strings `"inf"` / `"-inf"` (and `"nan"`) instead of `null`.
pub(crate) mod float_repr {
    use serde::{Deserialize, Deserializer, Serializer, de};

    pub fn serialize<S: Serializer>(v: &f64, s: S) -> Result<S::Ok, S::Error> {
        if v.is_finite() {
            s.serialize_f64(*v)
        } else if v.is_nan() {
            s.serialize_str("nan")
        } else if *v > 0.0 {
            s.serialize_str("inf")
        } else {
            s.serialize_str("-inf")
        }
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Number(f64),
        Text(String),
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
        match Repr::deserialize(d)? {
            Repr::Number(v) => Ok(v),
            Repr::Text(t) => match t.as_str() {
                "inf" => Ok(f64::INFINITY),
                "-inf" => Ok(f64::NEG_INFINITY),
                "nan" => Ok(f64::NAN),
                other => Err(de::Error::custom(format!("invalid number '{other}'"))),
            },
        }
    }
}

/// Parameters of the synthetic dataset generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    pub record_count: usize,
    pub units_min: u32,
    pub units_max: u32,
    /// Centre of the units-sold distribution before clamping.
    pub units_mean: f64,
    pub units_std_dev: f64,
    pub price_min: f64,
    pub price_max: f64,
    pub start_date: NaiveDate,
    /// Dates are drawn uniformly from `start_date .. start_date + span_days`.
    pub span_days: u32,
    /// Products generated per category.
    pub products_per_category: usize,
    pub seed: u64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            record_count: 100,
            units_min: 0,
            units_max: 40,
            units_mean: 20.0,
            units_std_dev: 6.0,
            price_min: 5.0,
            price_max: 500.0,
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default(),
            span_days: 90,
            products_per_category: 4,
            seed: 42,
        }
    }
}

/// Parameters of the inferential step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TestConfig {
    /// Population mean under the null hypothesis.
    pub hypothesized_mean: f64,
    /// Significance level; the interval is built at `1 - alpha`.
    pub alpha: f64,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            hypothesized_mean: 20.0,
            alpha: 0.05,
        }
    }
}

/// Where the table comes from for a run.
#[derive(Debug, Clone, PartialEq)]
pub enum TableSource {
    Generate(GeneratorConfig),
    Csv(PathBuf),
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults).
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisConfig {
    pub source: TableSource,
    /// Restrict the analysis to one category.
    pub category: Option<Category>,
    pub test: TestConfig,
}

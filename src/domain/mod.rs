//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the sales table and its records (`SaleRecord`, `SalesTable`, `Category`, `Column`)
//! - derived results (`StatisticResult`)
//! - run configuration (`GeneratorConfig`, `TestConfig`, `AnalysisConfig`)

pub mod types;

pub use types::*;

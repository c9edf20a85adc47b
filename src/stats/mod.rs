//! Statistics over the sales table.
//!
//! - `descriptive`: mean/median/mode/variance, overall and per category
//! - `inference`: confidence interval + one-sample test on the mean
//! - `correlation`: Pearson matrix over the numeric columns
//! - `histogram`: equal-width binning

pub mod correlation;
pub mod descriptive;
pub mod histogram;
pub mod inference;

pub use correlation::{CorrelationMatrix, NumericColumn, correlation_matrix};
pub use descriptive::{Summary, describe, describe_by_category};
pub use histogram::{Bin, DEFAULT_HISTOGRAM_BINS, histogram};
pub use inference::{ConfidenceInterval, InferenceResult, Reference, Verdict};

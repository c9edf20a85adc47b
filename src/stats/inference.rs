//! Confidence interval and one-sample test for mean units sold.
//!
//! Small samples (`n < 30`) use Student's t with `n - 1` degrees of freedom,
//! larger ones the standard normal. The same distribution drives both the
//! interval and the p-value, so the verdict and the interval always agree:
//! `mu0` lies outside the interval exactly when the test rejects.

use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal, StudentsT};

use crate::domain::{SalesTable, StatisticResult, TestConfig};
use crate::error::{Result, SalesError};
use crate::stats::descriptive;

/// Sample size from which the normal approximation replaces Student's t.
pub const LARGE_SAMPLE: usize = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Reject,
    FailToReject,
}

impl Verdict {
    pub fn display_name(self) -> &'static str {
        match self {
            Verdict::Reject => "reject H0",
            Verdict::FailToReject => "fail to reject H0",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "name", rename_all = "snake_case")]
pub enum Reference {
    StudentT { df: f64 },
    Normal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceInterval {
    /// e.g. `0.95`.
    pub level: f64,
    pub lower: f64,
    pub upper: f64,
}

impl ConfidenceInterval {
    pub fn contains(&self, x: f64) -> bool {
        self.lower <= x && x <= self.upper
    }
}

/// Output of the inferential step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InferenceResult {
    pub n: usize,
    pub mean: f64,
    pub std_dev: f64,
    pub std_error: f64,
    pub reference: Reference,
    pub interval: ConfidenceInterval,
    pub hypothesized_mean: f64,
    pub alpha: f64,
    /// `(mean - mu0) / se`; infinite when `se == 0` and `mean != mu0`.
    #[serde(with = "crate::domain::types::float_repr")]
    pub statistic: f64,
    pub p_value: f64,
    pub verdict: Verdict,
}

impl InferenceResult {
    pub fn results(&self) -> Vec<StatisticResult> {
        vec![
            StatisticResult::interval(
                format!("{:.0}% CI", self.interval.level * 100.0),
                self.interval.lower,
                self.interval.upper,
            ),
            StatisticResult::scalar("test_statistic", self.statistic),
            StatisticResult::scalar("p_value", self.p_value),
        ]
    }
}

/// Run the interval + test on a table's units sold.
pub fn analyze(table: &SalesTable, config: &TestConfig) -> Result<InferenceResult> {
    test_mean(&table.units(), config)
}

/// Run the interval + test on raw values.
pub fn test_mean(values: &[u32], config: &TestConfig) -> Result<InferenceResult> {
    validate(config)?;

    let n = values.len();
    if n < 2 {
        return Err(SalesError::insufficient(2, n));
    }

    let mean = descriptive::mean(values)?;
    let std_dev = descriptive::std_dev(values)?;
    let std_error = std_dev / (n as f64).sqrt();

    let reference = if n < LARGE_SAMPLE {
        Reference::StudentT { df: n as f64 - 1.0 }
    } else {
        Reference::Normal
    };

    let level = 1.0 - config.alpha;
    let critical = inverse_cdf(reference, 1.0 - config.alpha / 2.0)?;
    let half_width = critical * std_error;
    let interval = ConfidenceInterval {
        level,
        lower: mean - half_width,
        upper: mean + half_width,
    };

    let diff = mean - config.hypothesized_mean;
    let (statistic, p_value) = if std_error > 0.0 {
        let stat = diff / std_error;
        let tail = 1.0 - cdf(reference, stat.abs())?;
        (stat, (2.0 * tail).clamp(0.0, 1.0))
    } else if diff == 0.0 {
        (0.0, 1.0)
    } else {
        (diff.signum() * f64::INFINITY, 0.0)
    };

    let verdict = if p_value < config.alpha {
        Verdict::Reject
    } else {
        Verdict::FailToReject
    };

    Ok(InferenceResult {
        n,
        mean,
        std_dev,
        std_error,
        reference,
        interval,
        hypothesized_mean: config.hypothesized_mean,
        alpha: config.alpha,
        statistic,
        p_value,
        verdict,
    })
}

/// Check `alpha` and the hypothesized mean before any data is touched.
pub fn validate(config: &TestConfig) -> Result<()> {
    if !(config.alpha > 0.0 && config.alpha < 1.0) {
        return Err(SalesError::invalid(format!(
            "Significance level must be in (0, 1), got {}.",
            config.alpha
        )));
    }
    if !config.hypothesized_mean.is_finite() {
        return Err(SalesError::invalid("Hypothesized mean must be finite."));
    }
    Ok(())
}

fn cdf(reference: Reference, x: f64) -> Result<f64> {
    match reference {
        Reference::StudentT { df } => Ok(students_t(df)?.cdf(x)),
        Reference::Normal => Ok(standard_normal()?.cdf(x)),
    }
}

fn inverse_cdf(reference: Reference, p: f64) -> Result<f64> {
    match reference {
        Reference::StudentT { df } => Ok(students_t(df)?.inverse_cdf(p)),
        Reference::Normal => Ok(standard_normal()?.inverse_cdf(p)),
    }
}

fn students_t(df: f64) -> Result<StudentsT> {
    StudentsT::new(0.0, 1.0, df)
        .map_err(|e| SalesError::invalid(format!("Student's t distribution error: {e}")))
}

fn standard_normal() -> Result<Normal> {
    Normal::new(0.0, 1.0).map_err(|e| SalesError::invalid(format!("Normal distribution error: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn cfg() -> TestConfig {
        TestConfig::default()
    }

    #[test]
    fn constant_far_from_reference_rejects() {
        let values = vec![5u32; 40];
        let r = test_mean(&values, &cfg()).unwrap();
        assert_eq!(r.verdict, Verdict::Reject);
        assert_eq!(r.p_value, 0.0);
        assert!(r.statistic.is_infinite() && r.statistic < 0.0);
        assert!(r.interval.contains(5.0));
    }

    #[test]
    fn mean_at_reference_with_low_variance_fails_to_reject() {
        let values = [19, 20, 21, 20, 19, 21, 20, 20];
        let r = test_mean(&values, &cfg()).unwrap();
        assert_relative_eq!(r.mean, 20.0);
        assert_relative_eq!(r.statistic, 0.0);
        assert_relative_eq!(r.p_value, 1.0, epsilon = 1e-9);
        assert_eq!(r.verdict, Verdict::FailToReject);
    }

    #[test]
    fn constant_at_reference_fails_to_reject() {
        let r = test_mean(&[20, 20, 20], &cfg()).unwrap();
        assert_eq!(r.verdict, Verdict::FailToReject);
        assert_eq!(r.interval.lower, 20.0);
        assert_eq!(r.interval.upper, 20.0);
    }

    #[test]
    fn small_samples_use_students_t() {
        let r = test_mean(&[10, 20, 30], &cfg()).unwrap();
        assert_eq!(r.reference, Reference::StudentT { df: 2.0 });
        // t(0.975, 2) = 4.302653; s = 10, se = 10 / sqrt(3).
        let half = 4.302653 * 10.0 / 3f64.sqrt();
        assert_relative_eq!(r.interval.lower, 20.0 - half, epsilon = 1e-4);
        assert_relative_eq!(r.interval.upper, 20.0 + half, epsilon = 1e-4);
    }

    #[test]
    fn large_samples_use_normal() {
        let values: Vec<u32> = (0..60).map(|i| 15 + (i % 11)).collect();
        let r = test_mean(&values, &cfg()).unwrap();
        assert_eq!(r.reference, Reference::Normal);
        let half = 1.959964 * r.std_error;
        assert_relative_eq!(r.interval.upper - r.mean, half, epsilon = 1e-4);
    }

    #[test]
    fn interval_contains_mean_and_is_ordered() {
        let table = crate::data::generate_table(&Default::default()).unwrap();
        let r = analyze(&table, &cfg()).unwrap();
        assert!(r.interval.lower <= r.interval.upper);
        assert!(r.interval.contains(r.mean));
        assert!((0.0..=1.0).contains(&r.p_value));
    }

    #[test]
    fn verdict_agrees_with_interval() {
        let values = [12, 18, 25, 14, 22, 16, 19, 21, 13, 17];
        let r = test_mean(&values, &cfg()).unwrap();
        let outside = !r.interval.contains(r.hypothesized_mean);
        assert_eq!(outside, r.verdict == Verdict::Reject);
    }

    #[test]
    fn is_deterministic() {
        let values = [12, 18, 25, 14, 22];
        assert_eq!(test_mean(&values, &cfg()).unwrap(), test_mean(&values, &cfg()).unwrap());
    }

    #[test]
    fn fewer_than_two_values_is_insufficient() {
        assert!(matches!(
            test_mean(&[7], &cfg()),
            Err(SalesError::InsufficientData { needed: 2, actual: 1 })
        ));
        assert!(matches!(
            test_mean(&[], &cfg()),
            Err(SalesError::InsufficientData { needed: 2, actual: 0 })
        ));
    }

    #[test]
    fn rejects_bad_alpha() {
        let config = TestConfig { alpha: 1.5, ..cfg() };
        assert!(matches!(
            test_mean(&[1, 2, 3], &config),
            Err(SalesError::InvalidConfiguration(_))
        ));
    }
}

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, StudentsT};

use super::{
    mean, validate_sample, variance, ComputationError, SampleId, TestOutcome, TwoSampleTest,
};

/// Student's t-test for two independent samples, assuming equal variances.
///
/// The variance estimate is pooled across both samples and the reference
/// distribution has `n1 + n2 - 2` degrees of freedom.
#[derive(Debug, Clone, Copy, Default)]
pub struct StudentTTest;

/// Welch's t-test for comparing two independent samples with potentially unequal variances.
#[derive(Debug, Clone, Copy, Default)]
pub struct WelchTTest;

impl StudentTTest {
    pub fn new() -> Self {
        Self
    }
}

impl WelchTTest {
    pub fn new() -> Self {
        Self
    }

    /// Calculate degrees of freedom using the Welch-Satterthwaite equation.
    ///
    /// df = (var1/n1 + var2/n2)^2 / ((var1/n1)^2/(n1-1) + (var2/n2)^2/(n2-1))
    fn welch_satterthwaite_df(var1: f64, n1: usize, var2: f64, n2: usize) -> f64 {
        let s1 = var1 / n1 as f64;
        let s2 = var2 / n2 as f64;
        let numerator = (s1 + s2).powi(2);
        let denominator = (s1.powi(2) / (n1 - 1) as f64) + (s2.powi(2) / (n2 - 1) as f64);

        if denominator == 0.0 {
            // Fallback to minimum df when variances are zero
            return (n1.min(n2) - 1) as f64;
        }

        numerator / denominator
    }
}

/// Validate both samples and return their sizes and moments.
fn moments(sample1: &[f64], sample2: &[f64]) -> Result<[(usize, f64, f64); 2], ComputationError> {
    validate_sample(sample1, SampleId::First)?;
    validate_sample(sample2, SampleId::Second)?;

    let mean1 = mean(sample1);
    let mean2 = mean(sample2);
    Ok([
        (sample1.len(), mean1, variance(sample1, mean1)),
        (sample2.len(), mean2, variance(sample2, mean2)),
    ])
}

fn ensure_finite(quantity: &'static str, value: f64) -> Result<f64, ComputationError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ComputationError::NumericOverflow { quantity, value })
    }
}

/// Turn a mean difference and its standard error into a two-tailed outcome.
///
/// Finite observations can still overflow the moments; those are rejected
/// before statrs sees them.
fn two_tailed(diff: f64, se: f64, df: f64) -> Result<TestOutcome, ComputationError> {
    ensure_finite("mean difference", diff)?;
    ensure_finite("standard error", se)?;
    ensure_finite("degrees of freedom", df)?;

    // Both samples are constant: the difference is either exact or absent.
    if se == 0.0 {
        let (statistic, p_value) = if diff == 0.0 {
            (0.0, 1.0)
        } else {
            (diff.signum() * f64::INFINITY, 0.0)
        };
        return Ok(TestOutcome {
            statistic,
            p_value,
            degrees_of_freedom: df,
        });
    }

    let statistic = ensure_finite("test statistic", diff / se)?;
    let t_dist =
        StudentsT::new(0.0, 1.0, df).map_err(|e| ComputationError::Distribution(e.to_string()))?;
    // Two-tailed test: p = 2 * P(T > |t|)
    let p_value = ensure_finite("p-value", 2.0 * t_dist.sf(statistic.abs()))?.clamp(0.0, 1.0);

    Ok(TestOutcome {
        statistic,
        p_value,
        degrees_of_freedom: df,
    })
}

impl TwoSampleTest for StudentTTest {
    fn name(&self) -> &'static str {
        "Student's t-test"
    }

    fn test(&self, sample1: &[f64], sample2: &[f64]) -> Result<TestOutcome, ComputationError> {
        let [(n1, mean1, var1), (n2, mean2, var2)] = moments(sample1, sample2)?;

        let df = (n1 + n2 - 2) as f64;
        let pooled = ((n1 - 1) as f64 * var1 + (n2 - 1) as f64 * var2) / df;
        let se = (pooled * (1.0 / n1 as f64 + 1.0 / n2 as f64)).sqrt();

        two_tailed(mean1 - mean2, se, df)
    }
}

impl TwoSampleTest for WelchTTest {
    fn name(&self) -> &'static str {
        "Welch's t-test"
    }

    fn test(&self, sample1: &[f64], sample2: &[f64]) -> Result<TestOutcome, ComputationError> {
        let [(n1, mean1, var1), (n2, mean2, var2)] = moments(sample1, sample2)?;

        // t = (mean1 - mean2) / sqrt(var1/n1 + var2/n2)
        let se = (var1 / n1 as f64 + var2 / n2 as f64).sqrt();
        let df = Self::welch_satterthwaite_df(var1, n1, var2, n2);

        two_tailed(mean1 - mean2, se, df)
    }
}

/// Runtime selection between the shipped t-test variants.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestVariant {
    #[default]
    Student,
    Welch,
}

impl fmt::Display for TestVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TestVariant::Student => write!(f, "student"),
            TestVariant::Welch => write!(f, "welch"),
        }
    }
}

impl FromStr for TestVariant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "student" => Ok(TestVariant::Student),
            "welch" => Ok(TestVariant::Welch),
            other => Err(format!(
                "unknown test variant '{other}', expected 'student' or 'welch'"
            )),
        }
    }
}

impl TwoSampleTest for TestVariant {
    fn name(&self) -> &'static str {
        match self {
            TestVariant::Student => StudentTTest.name(),
            TestVariant::Welch => WelchTTest.name(),
        }
    }

    fn test(&self, sample1: &[f64], sample2: &[f64]) -> Result<TestOutcome, ComputationError> {
        match self {
            TestVariant::Student => StudentTTest.test(sample1, sample2),
            TestVariant::Welch => WelchTTest.test(sample1, sample2),
        }
    }
}

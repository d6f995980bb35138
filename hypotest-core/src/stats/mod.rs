use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Identifies which of the two samples a value or error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SampleId {
    First,
    Second,
}

impl fmt::Display for SampleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SampleId::First => write!(f, "sample 1"),
            SampleId::Second => write!(f, "sample 2"),
        }
    }
}

/// Errors raised by the statistics and distribution providers.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ComputationError {
    /// A sample has fewer than the two observations a variance needs.
    #[error("{sample} has {len} observation(s), at least 2 are required")]
    InsufficientObservations { sample: SampleId, len: usize },

    /// A sample contains NaN or an infinity.
    #[error("{sample} contains a non-finite value {value} at index {index}")]
    NonFiniteObservation {
        sample: SampleId,
        index: usize,
        value: f64,
    },

    /// An intermediate quantity left the floating-point range.
    #[error("{quantity} is {value}; the observations are too large to compare")]
    NumericOverflow { quantity: &'static str, value: f64 },

    /// A quantile was requested outside of (0, 1).
    #[error("probability {0} is outside of (0, 1)")]
    InvalidProbability(f64),

    /// The underlying distribution could not be constructed.
    #[error("distribution error: {0}")]
    Distribution(String),
}

/// An ordered sequence of observations.
///
/// Construction never fails; the observations are validated when a statistic
/// is computed over them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Sample(Vec<f64>);

impl Sample {
    pub fn new(values: Vec<f64>) -> Self {
        Self(values)
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Arithmetic mean, or `None` for an empty sample.
    pub fn mean(&self) -> Option<f64> {
        if self.0.is_empty() {
            return None;
        }
        Some(mean(&self.0))
    }
}

impl From<Vec<f64>> for Sample {
    fn from(values: Vec<f64>) -> Self {
        Self(values)
    }
}

impl From<&[f64]> for Sample {
    fn from(values: &[f64]) -> Self {
        Self(values.to_vec())
    }
}

impl<const N: usize> From<[f64; N]> for Sample {
    fn from(values: [f64; N]) -> Self {
        Self(values.to_vec())
    }
}

impl FromIterator<f64> for Sample {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// The joint output of a two-sample test.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TestOutcome {
    /// The test statistic (positive when sample 1 has the larger mean).
    pub statistic: f64,
    /// Two-tailed p-value in [0, 1].
    pub p_value: f64,
    /// Degrees of freedom of the reference t distribution.
    pub degrees_of_freedom: f64,
}

/// Trait for tests that compare the means of two independent samples.
pub trait TwoSampleTest: Send + Sync {
    /// Short human-readable name of the test, used in logs and reports.
    fn name(&self) -> &'static str;

    /// Compute the test statistic and p-value for the two samples.
    fn test(&self, sample1: &[f64], sample2: &[f64]) -> Result<TestOutcome, ComputationError>;
}

/// Trait for inverse-CDF lookups of a reference distribution.
pub trait QuantileFunction: Send + Sync {
    fn quantile(&self, probability: f64) -> Result<f64, ComputationError>;
}

/// Check that a sample is usable for a mean comparison.
pub fn validate_sample(sample: &[f64], id: SampleId) -> Result<(), ComputationError> {
    if let Some((index, &value)) = sample.iter().enumerate().find(|(_, v)| !v.is_finite()) {
        return Err(ComputationError::NonFiniteObservation {
            sample: id,
            index,
            value,
        });
    }
    if sample.len() < 2 {
        return Err(ComputationError::InsufficientObservations {
            sample: id,
            len: sample.len(),
        });
    }
    Ok(())
}

/// Calculate the sample mean.
pub(crate) fn mean(samples: &[f64]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    samples.iter().sum::<f64>() / samples.len() as f64
}

/// Calculate the sample variance.
/// Uses Bessel's correction (n-1 denominator) for unbiased estimation.
pub(crate) fn variance(samples: &[f64], mean: f64) -> f64 {
    if samples.len() < 2 {
        return 0.0;
    }
    let sum_sq_diff: f64 = samples
        .iter()
        .map(|x| {
            let diff = x - mean;
            diff * diff
        })
        .sum();
    sum_sq_diff / (samples.len() - 1) as f64
}

mod normal;
mod ttest;
pub use normal::StandardNormal;
pub use ttest::{StudentTTest, TestVariant, WelchTTest};

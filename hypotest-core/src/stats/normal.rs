use statrs::distribution::{ContinuousCDF, Normal};

use super::{ComputationError, QuantileFunction};

/// Quantile function of the standard normal distribution.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardNormal;

impl StandardNormal {
    pub fn new() -> Self {
        Self
    }
}

impl QuantileFunction for StandardNormal {
    fn quantile(&self, probability: f64) -> Result<f64, ComputationError> {
        if !(probability > 0.0 && probability < 1.0) {
            return Err(ComputationError::InvalidProbability(probability));
        }
        let normal =
            Normal::new(0.0, 1.0).map_err(|e| ComputationError::Distribution(e.to_string()))?;
        Ok(normal.inverse_cdf(probability))
    }
}

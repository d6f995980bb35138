//! Seeded normal sample generation for demo runs.

use hypotest_core::Sample;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal, NormalError};
use thiserror::Error;

use crate::config::GenerationConfig;

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("invalid normal distribution (mean {mean}, std dev {std_dev}): {source}")]
    InvalidDistribution {
        mean: f64,
        std_dev: f64,
        #[source]
        source: NormalError,
    },
}

/// Draw `size` observations from a normal distribution.
pub fn normal_sample<R: Rng>(
    rng: &mut R,
    mean: f64,
    std_dev: f64,
    size: usize,
) -> Result<Sample, GenerateError> {
    let normal = Normal::new(mean, std_dev).map_err(|source| GenerateError::InvalidDistribution {
        mean,
        std_dev,
        source,
    })?;
    Ok(normal.sample_iter(rng).take(size).collect())
}

/// Generate both samples from one seeded generator, first sample first.
pub fn generate_samples(config: &GenerationConfig) -> Result<(Sample, Sample), GenerateError> {
    let mut rng = StdRng::seed_from_u64(config.seed);
    let sample1 = normal_sample(&mut rng, config.mean1, config.std_dev1, config.size)?;
    let sample2 = normal_sample(&mut rng, config.mean2, config.std_dev2, config.size)?;
    Ok((sample1, sample2))
}

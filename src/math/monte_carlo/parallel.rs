//! Rayon-parallel hit-or-miss integration with a reproducible stream.
//!
//! Work is split into fixed-size batches. Every batch seeds its own
//! `ChaCha8Rng` from the same seed and jumps to the word offset at which the
//! sequential run would start that batch, so the merged accept count is the
//! one [`estimate_integral_with_rng`] produces with
//! `ChaCha8Rng::seed_from_u64(seed)`, independent of scheduling.
//!
//! [`estimate_integral_with_rng`]: super::estimate_integral_with_rng

use log::debug;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

use super::monte_carlo_integration::{
    bounding_height, empty_rectangle, HitOrMiss, IntegrationEstimate, MonteCarloConfig,
};
use crate::error::Result;

/// Samples handled by one rayon work item.
const BATCH_SIZE: usize = 16_384;

/// 32-bit ChaCha words consumed per sample: one `u64` for `x`, one for `y`.
const WORDS_PER_SAMPLE: u128 = 4;

/// Parallel counterpart of `estimate_integral_with_rng` seeded with
/// `ChaCha8Rng::seed_from_u64(seed)`. Both return the same estimate.
pub fn par_estimate_integral<F>(
    f: F,
    a: f64,
    b: f64,
    config: &MonteCarloConfig,
    seed: u64,
) -> Result<IntegrationEstimate>
where
    F: Fn(f64) -> f64 + Sync,
{
    let y_max = bounding_height(&f, a, b, config)?;
    if y_max <= 0.0 {
        return Ok(empty_rectangle(a, b, y_max, config));
    }

    let sampler = HitOrMiss::new(a, b, y_max);
    let samples = config.samples;
    let batches = samples.div_ceil(BATCH_SIZE);

    let accepted: usize = (0..batches)
        .into_par_iter()
        .map(|batch| {
            let start = batch * BATCH_SIZE;
            let end = (start + BATCH_SIZE).min(samples);
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            rng.set_word_pos(start as u128 * WORDS_PER_SAMPLE);
            (start..end).filter(|_| sampler.hit(&f, &mut rng)).count()
        })
        .sum();
    debug!("parallel hit-or-miss: {accepted}/{samples} points accepted over {batches} batches");

    Ok(IntegrationEstimate::from_counts(
        accepted,
        samples,
        y_max,
        b - a,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::math::monte_carlo::estimate_integral_with_rng;

    fn sequential(f: impl Fn(f64) -> f64, a: f64, b: f64, samples: usize, seed: u64) -> IntegrationEstimate {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let config = MonteCarloConfig::with_samples(samples);
        estimate_integral_with_rng(f, a, b, &config, &mut rng).unwrap()
    }

    #[test]
    fn test_parallel_matches_sequential() {
        // Not a multiple of the batch size, so the last batch is partial.
        let samples = 3 * BATCH_SIZE + 1_234;
        let config = MonteCarloConfig::with_samples(samples);
        let parallel = par_estimate_integral(|x| x * x, 0.0, 2.0, &config, 2024).unwrap();
        let serial = sequential(|x| x * x, 0.0, 2.0, samples, 2024);

        assert_eq!(parallel.accepted, serial.accepted);
        assert_eq!(parallel.value.to_bits(), serial.value.to_bits());
    }

    #[test]
    fn test_parallel_single_partial_batch() {
        let config = MonteCarloConfig::with_samples(100);
        let parallel = par_estimate_integral(|x| x.sqrt(), 1.0, 4.0, &config, 8).unwrap();
        let serial = sequential(|x| x.sqrt(), 1.0, 4.0, 100, 8);
        assert_eq!(parallel, serial);
    }

    #[test]
    fn test_parallel_converges() {
        let config = MonteCarloConfig::default();
        let estimate = par_estimate_integral(|x| x * x, 0.0, 2.0, &config, 1).unwrap();
        assert!((estimate.value - 8.0 / 3.0).abs() < 8.0 / 3.0 * 0.02);
    }

    #[test]
    fn test_parallel_narrow_interval_matches_sequential() {
        let config = MonteCarloConfig::with_samples(2_000);
        let parallel = par_estimate_integral(|x| x, 1e6, 1e6 + 1e-4, &config, 31).unwrap();
        let serial = sequential(|x| x, 1e6, 1e6 + 1e-4, 2_000, 31);
        assert_eq!(parallel, serial);
    }

    #[test]
    fn test_parallel_negative_maximum_accepts_nothing() {
        let config = MonteCarloConfig {
            samples: 100,
            check_nonnegative: false,
            ..MonteCarloConfig::default()
        };
        let estimate = par_estimate_integral(|x| -x - 1.0, 0.0, 1.0, &config, 0).unwrap();
        assert_eq!(estimate.value, 0.0);
        assert_eq!(estimate.accepted, 0);
    }

    #[test]
    fn test_parallel_validates_like_sequential() {
        let config = MonteCarloConfig::with_samples(10);
        let err = par_estimate_integral(|x| x, 1.0, 1.0, &config, 0).unwrap_err();
        assert_eq!(err, Error::InvalidInterval { a: 1.0, b: 1.0 });

        let err = par_estimate_integral(|x| x - 0.5, 0.0, 1.0, &config, 0).unwrap_err();
        assert!(matches!(err, Error::NegativeIntegrand { .. }));
    }
}

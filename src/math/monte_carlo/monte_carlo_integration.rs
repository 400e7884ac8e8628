//! Hit-or-miss Monte Carlo integration.
//!
//! The area under a nonnegative integrand `f` on `[a, b]` is estimated by
//! scattering points uniformly over the bounding rectangle
//! `[a, b] x [0, y_max]` and counting the fraction that land on or below the
//! curve:
//!
//! ```text
//!   estimate = (b - a) * y_max * accepted / samples
//! ```
//!
//! `y_max` is the largest value of `f` on an evenly spaced probe grid (1,000
//! points including both endpoints by default). It is a grid approximation of
//! the supremum, not an exact maximum: a peak that falls between two probes
//! is clipped and the estimate is biased low.
//!
//! # Examples
//!
//! ```
//! use numlab::math::monte_carlo::{estimate_integral_seeded, DEFAULT_SAMPLES};
//!
//! let area = estimate_integral_seeded(|x| x * x, 0.0, 2.0, DEFAULT_SAMPLES, 42).unwrap();
//! assert!((area - 8.0 / 3.0).abs() < 0.05);
//! ```

use log::debug;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::error::{Error, Result};

/// Default number of random points.
pub const DEFAULT_SAMPLES: usize = 1_000_000;

/// Default size of the grid used to approximate the integrand's maximum.
pub const DEFAULT_PROBE_POINTS: usize = 1_000;

/// Configuration for hit-or-miss integration.
#[derive(Debug, Clone, PartialEq)]
pub struct MonteCarloConfig {
    /// Number of random points drawn under the bounding rectangle
    pub samples: usize,
    /// Number of evenly spaced grid points used to find `y_max`
    pub probe_points: usize,
    /// Reject integrands that go negative on the probe grid
    pub check_nonnegative: bool,
}

impl Default for MonteCarloConfig {
    fn default() -> Self {
        Self {
            samples: DEFAULT_SAMPLES,
            probe_points: DEFAULT_PROBE_POINTS,
            check_nonnegative: true,
        }
    }
}

impl MonteCarloConfig {
    /// Default configuration with a different sample count.
    pub fn with_samples(samples: usize) -> Self {
        Self {
            samples,
            ..Self::default()
        }
    }
}

/// Outcome of a single hit-or-miss run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntegrationEstimate {
    /// Estimated value of the integral
    pub value: f64,
    /// Number of points that fell on or below the curve
    pub accepted: usize,
    /// Total number of points drawn
    pub samples: usize,
    /// Height of the bounding rectangle
    pub y_max: f64,
    /// Area of the bounding rectangle, `(b - a) * y_max`
    pub bounding_area: f64,
}

impl IntegrationEstimate {
    pub(crate) fn from_counts(accepted: usize, samples: usize, y_max: f64, width: f64) -> Self {
        let bounding_area = width * y_max;
        Self {
            value: bounding_area * (accepted as f64 / samples as f64),
            accepted,
            samples,
            y_max,
            bounding_area,
        }
    }

    /// Fraction of points that fell under the curve.
    pub fn acceptance_rate(&self) -> f64 {
        self.accepted as f64 / self.samples as f64
    }

    /// Binomial standard error of the estimate.
    pub fn standard_error(&self) -> f64 {
        let p = self.acceptance_rate();
        self.bounding_area * (p * (1.0 - p) / self.samples as f64).sqrt()
    }
}

/// Estimates the integral of `f` over `[a, b]` with `samples` random points,
/// drawing from the thread-local generator.
///
/// Results differ from run to run; use [`estimate_integral_seeded`] or
/// [`estimate_integral_with_rng`] when reproducibility matters.
pub fn estimate_integral<F>(f: F, a: f64, b: f64, samples: usize) -> Result<f64>
where
    F: Fn(f64) -> f64,
{
    let mut rng = rand::thread_rng();
    let config = MonteCarloConfig::with_samples(samples);
    estimate_integral_with_rng(f, a, b, &config, &mut rng).map(|estimate| estimate.value)
}

/// Estimates the integral of `f` over `[a, b]` using a `ChaCha8Rng` seeded
/// with `seed`. Identical arguments give bit-identical results.
pub fn estimate_integral_seeded<F>(f: F, a: f64, b: f64, samples: usize, seed: u64) -> Result<f64>
where
    F: Fn(f64) -> f64,
{
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let config = MonteCarloConfig::with_samples(samples);
    estimate_integral_with_rng(f, a, b, &config, &mut rng).map(|estimate| estimate.value)
}

/// Estimates the integral of `f` over `[a, b]` drawing every random number
/// from `rng`.
///
/// Each sample consumes one `u64` for `x` followed by one `u64` for `y`.
///
/// # Errors
///
/// * [`Error::InvalidInterval`] if `a >= b` or a bound is not finite
/// * [`Error::InvalidSampleCount`] if `config.samples == 0`
/// * [`Error::NegativeIntegrand`] if `config.check_nonnegative` is set and a
///   probe of `f` is negative
/// * [`Error::NonFiniteIntegrand`] if a probe of `f` is NaN or infinite
pub fn estimate_integral_with_rng<F, R>(
    f: F,
    a: f64,
    b: f64,
    config: &MonteCarloConfig,
    rng: &mut R,
) -> Result<IntegrationEstimate>
where
    F: Fn(f64) -> f64,
    R: Rng + ?Sized,
{
    let y_max = bounding_height(&f, a, b, config)?;
    if y_max <= 0.0 {
        return Ok(empty_rectangle(a, b, y_max, config));
    }

    let sampler = HitOrMiss::new(a, b, y_max);
    let accepted = (0..config.samples)
        .filter(|_| sampler.hit(&f, rng))
        .count();
    debug!(
        "hit-or-miss on [{a}, {b}]: {accepted}/{} points accepted",
        config.samples
    );

    Ok(IntegrationEstimate::from_counts(
        accepted,
        config.samples,
        y_max,
        b - a,
    ))
}

/// Returns `points` evenly spaced values from `a` to `b`, both included.
/// The last value is exactly `b`.
pub fn linspace(a: f64, b: f64, points: usize) -> impl Iterator<Item = f64> {
    let step = if points > 1 {
        (b - a) / (points - 1) as f64
    } else {
        0.0
    };
    (0..points).map(move |i| {
        if points > 1 && i + 1 == points {
            b
        } else {
            a + i as f64 * step
        }
    })
}

/// Maximum of `f` over a `points`-wide probe grid on `[a, b]`.
pub fn probe_max<F>(f: &F, a: f64, b: f64, points: usize) -> Result<f64>
where
    F: Fn(f64) -> f64,
{
    scan_probe_grid(f, a, b, points, false)
}

fn scan_probe_grid<F>(f: &F, a: f64, b: f64, points: usize, check_nonnegative: bool) -> Result<f64>
where
    F: Fn(f64) -> f64,
{
    let mut y_max = f64::NEG_INFINITY;
    for x in linspace(a, b, points) {
        let value = f(x);
        if !value.is_finite() {
            return Err(Error::NonFiniteIntegrand { x, value });
        }
        if check_nonnegative && value < 0.0 {
            return Err(Error::NegativeIntegrand { x, value });
        }
        y_max = y_max.max(value);
    }
    Ok(y_max)
}

pub(crate) fn validate(a: f64, b: f64, config: &MonteCarloConfig) -> Result<()> {
    if !a.is_finite() || !b.is_finite() || a >= b || !(b - a).is_finite() {
        return Err(Error::InvalidInterval { a, b });
    }
    if config.samples == 0 {
        return Err(Error::InvalidSampleCount(config.samples));
    }
    if config.probe_points < 2 {
        return Err(Error::InvalidInput(format!(
            "probe grid needs at least 2 points, got {}",
            config.probe_points
        )));
    }
    Ok(())
}

/// Validates the inputs and returns the probe-grid maximum. It is negative
/// only when the nonnegativity check is disabled.
pub(crate) fn bounding_height<F>(f: &F, a: f64, b: f64, config: &MonteCarloConfig) -> Result<f64>
where
    F: Fn(f64) -> f64,
{
    validate(a, b, config)?;
    let y_max = scan_probe_grid(f, a, b, config.probe_points, config.check_nonnegative)?;
    debug!(
        "probe grid of {} points on [{a}, {b}] gives y_max = {y_max}",
        config.probe_points
    );
    Ok(y_max)
}

/// Zero-height rectangle with zero area. Every point sits on the axis, so it
/// counts as under the curve unless the grid maximum was negative.
pub(crate) fn empty_rectangle(
    a: f64,
    b: f64,
    grid_max: f64,
    config: &MonteCarloConfig,
) -> IntegrationEstimate {
    let accepted = if grid_max < 0.0 { 0 } else { config.samples };
    IntegrationEstimate::from_counts(accepted, config.samples, 0.0, b - a)
}

/// Uniform point generator over the bounding rectangle.
///
/// Coordinates are `low + width * u` with `u` from the `Standard` `f64`
/// distribution, one `u64` each. Unlike `Uniform::new`, setup cost does not
/// grow as the interval narrows relative to its magnitude.
pub(crate) struct HitOrMiss {
    a: f64,
    b: f64,
    width: f64,
    y_max: f64,
}

impl HitOrMiss {
    /// `a < b` and `0 < y_max` must both be finite.
    pub(crate) fn new(a: f64, b: f64, y_max: f64) -> Self {
        Self {
            a,
            b,
            width: b - a,
            y_max,
        }
    }

    /// Draws one point and reports whether it lies on or below the curve.
    pub(crate) fn hit<F, R>(&self, f: &F, rng: &mut R) -> bool
    where
        F: Fn(f64) -> f64,
        R: Rng + ?Sized,
    {
        let x = self.a + self.width * rng.gen::<f64>();
        // rounding can land exactly on b
        let x = if x < self.b { x } else { self.a };
        let y = self.y_max * rng.gen::<f64>();
        y <= f(x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;

    const EXACT_X_SQUARED: f64 = 8.0 / 3.0;

    #[test]
    fn test_monte_carlo_integration() {
        // Integrate f(x) = x^2 over [0,2]. The exact value is 8/3.
        let result = estimate_integral_seeded(|x| x * x, 0.0, 2.0, 1_000_000, 42).unwrap();
        assert!((result - EXACT_X_SQUARED).abs() / EXACT_X_SQUARED < 0.02);
    }

    #[test]
    fn test_convergence_across_seeds() {
        for seed in 0..5 {
            let result = estimate_integral_seeded(|x| x * x, 0.0, 2.0, 1_000_000, seed).unwrap();
            assert_relative_eq!(result, EXACT_X_SQUARED, max_relative = 0.02);
        }
    }

    #[test]
    fn test_unseeded_entry_point() {
        let result = estimate_integral(|x| x, 0.0, 1.0, 200_000).unwrap();
        assert!((result - 0.5).abs() < 0.02);
    }

    #[test]
    fn test_spread_shrinks_with_more_samples() {
        fn spread(samples: usize) -> f64 {
            let runs: Vec<f64> = (0..30)
                .map(|seed| estimate_integral_seeded(|x| x * x, 0.0, 2.0, samples, seed).unwrap())
                .collect();
            let mean = runs.iter().sum::<f64>() / runs.len() as f64;
            let var = runs.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / (runs.len() - 1) as f64;
            var.sqrt()
        }

        let coarse = spread(1_000);
        let fine = spread(100_000);
        assert!(fine < coarse, "fine = {fine}, coarse = {coarse}");
    }

    #[test]
    fn test_degenerate_interval_is_rejected() {
        let err = estimate_integral_seeded(|x| x, 1.0, 1.0, 1_000, 0).unwrap_err();
        assert_eq!(err, Error::InvalidInterval { a: 1.0, b: 1.0 });

        let err = estimate_integral_seeded(|x| x, 2.0, 1.0, 1_000, 0).unwrap_err();
        assert_eq!(err, Error::InvalidInterval { a: 2.0, b: 1.0 });

        let err = estimate_integral_seeded(|x| x, 0.0, f64::INFINITY, 1_000, 0).unwrap_err();
        assert!(matches!(err, Error::InvalidInterval { .. }));

        let err = estimate_integral_seeded(|x| x, f64::NAN, 1.0, 1_000, 0).unwrap_err();
        assert!(matches!(err, Error::InvalidInterval { .. }));
    }

    #[test]
    fn test_zero_samples_is_rejected() {
        let err = estimate_integral_seeded(|x| x, 0.0, 1.0, 0, 0).unwrap_err();
        assert_eq!(err, Error::InvalidSampleCount(0));
    }

    #[test]
    fn test_tiny_probe_grid_is_rejected() {
        let config = MonteCarloConfig {
            probe_points: 1,
            ..MonteCarloConfig::default()
        };
        let mut rng = StdRng::seed_from_u64(0);
        let err = estimate_integral_with_rng(|x| x, 0.0, 1.0, &config, &mut rng).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn test_constant_function_is_exact() {
        let c = 3.5;
        let config = MonteCarloConfig::with_samples(10_000);
        let mut rng = StdRng::seed_from_u64(9);
        let estimate = estimate_integral_with_rng(|_| c, -1.0, 3.0, &config, &mut rng).unwrap();

        assert_eq!(estimate.y_max, c);
        assert_eq!(estimate.accepted, 10_000);
        assert_eq!(estimate.acceptance_rate(), 1.0);
        assert_eq!(estimate.value, c * 4.0);
        assert_eq!(estimate.standard_error(), 0.0);
    }

    #[test]
    fn test_zero_function_skips_sampling() {
        let config = MonteCarloConfig::with_samples(10);
        let mut rng = StdRng::seed_from_u64(1);
        let estimate = estimate_integral_with_rng(|_| 0.0, 0.0, 1.0, &config, &mut rng).unwrap();
        assert_eq!(estimate.value, 0.0);
        assert_eq!(estimate.y_max, 0.0);
    }

    #[test]
    fn test_same_seed_is_bit_identical() {
        let f = |x: f64| (x * 3.0).sin().abs() + 0.25;
        let first = estimate_integral_seeded(f, 0.0, 5.0, 100_000, 1234).unwrap();
        let second = estimate_integral_seeded(f, 0.0, 5.0, 100_000, 1234).unwrap();
        assert_eq!(first.to_bits(), second.to_bits());

        let other = estimate_integral_seeded(f, 0.0, 5.0, 100_000, 4321).unwrap();
        assert_ne!(first.to_bits(), other.to_bits());
    }

    #[test]
    fn test_injected_generator_is_reproducible() {
        let config = MonteCarloConfig::with_samples(50_000);
        let mut rng_a = StdRng::seed_from_u64(77);
        let mut rng_b = StdRng::seed_from_u64(77);
        let a = estimate_integral_with_rng(|x| x.exp(), 0.0, 1.0, &config, &mut rng_a).unwrap();
        let b = estimate_integral_with_rng(|x| x.exp(), 0.0, 1.0, &config, &mut rng_b).unwrap();
        assert_eq!(a, b);
        assert_relative_eq!(a.value, std::f64::consts::E - 1.0, max_relative = 0.03);
    }

    #[test]
    fn test_negative_integrand_is_rejected() {
        let err = estimate_integral_seeded(|x| x - 1.0, 0.0, 2.0, 1_000, 0).unwrap_err();
        assert_eq!(err, Error::NegativeIntegrand { x: 0.0, value: -1.0 });
    }

    #[test]
    fn test_negative_integrand_without_check_is_biased_not_fatal() {
        // Only the part above the axis is counted: the area of the triangle on [1, 2].
        let config = MonteCarloConfig {
            samples: 100_000,
            check_nonnegative: false,
            ..MonteCarloConfig::default()
        };
        let mut rng = StdRng::seed_from_u64(5);
        let estimate = estimate_integral_with_rng(|x| x - 1.0, 0.0, 2.0, &config, &mut rng).unwrap();
        assert!(estimate.value.is_finite());
        assert!((estimate.value - 0.5).abs() < 0.05);
    }

    #[test]
    fn test_non_finite_integrand_is_rejected() {
        let err = estimate_integral_seeded(|x| 1.0 / x, 0.0, 1.0, 1_000, 0).unwrap_err();
        assert!(matches!(err, Error::NonFiniteIntegrand { x, .. } if x == 0.0));
    }

    #[test]
    fn test_peak_between_probes_is_missed() {
        // A spike narrower than the grid spacing, centred between two probes.
        let spike = |x: f64| (1.0 - (x - 0.5).abs() / 0.0004).max(0.0);
        let config = MonteCarloConfig::with_samples(1_000);
        let mut rng = StdRng::seed_from_u64(3);
        let estimate = estimate_integral_with_rng(spike, 0.0, 1.0, &config, &mut rng).unwrap();
        assert_eq!(estimate.y_max, 0.0);
        assert_eq!(estimate.value, 0.0);
    }

    #[test]
    fn test_narrow_intervals_finish() {
        let next_after_one = f64::from_bits(1.0f64.to_bits() + 1);
        let config = MonteCarloConfig::with_samples(1_000);
        let mut rng = StdRng::seed_from_u64(4);
        let estimate =
            estimate_integral_with_rng(|x| x, 1.0, next_after_one, &config, &mut rng).unwrap();
        assert_eq!(estimate.samples, 1_000);
        assert!(estimate.value > 0.0 && estimate.value <= next_after_one * (next_after_one - 1.0));

        let result = estimate_integral_seeded(|x| x, 1e6, 1e6 + 1e-4, 1_000, 0).unwrap();
        assert_relative_eq!(result, 100.0, max_relative = 1e-4);
    }

    #[test]
    fn test_draws_stay_inside_rectangle() {
        let (a, b) = (1.0, 1.0 + 4.0 * f64::EPSILON);
        // 2.0 on [a, b) and negative elsewhere, so every in-range draw is a hit
        let indicator = |x: f64| if (a..b).contains(&x) { 2.0 } else { -1.0 };
        let sampler = HitOrMiss::new(a, b, 2.0);
        let mut rng = StdRng::seed_from_u64(6);
        for _ in 0..10_000 {
            assert!(sampler.hit(&indicator, &mut rng));
        }
    }

    #[test]
    fn test_negative_maximum_accepts_nothing() {
        let config = MonteCarloConfig {
            samples: 500,
            check_nonnegative: false,
            ..MonteCarloConfig::default()
        };
        let mut rng = StdRng::seed_from_u64(2);
        let estimate = estimate_integral_with_rng(|x| x - 3.0, 0.0, 1.0, &config, &mut rng).unwrap();
        assert_eq!(estimate.value, 0.0);
        assert_eq!(estimate.y_max, 0.0);
        assert_eq!(estimate.accepted, 0);
        assert_eq!(estimate.acceptance_rate(), 0.0);
    }

    #[test]
    fn test_linspace_matches_endpoints() {
        let grid: Vec<f64> = linspace(0.0, 2.0, 5).collect();
        assert_eq!(grid, vec![0.0, 0.5, 1.0, 1.5, 2.0]);

        let grid: Vec<f64> = linspace(0.1, 0.7, 1_000).collect();
        assert_eq!(grid.len(), 1_000);
        assert_eq!(grid[0], 0.1);
        assert_eq!(grid[999], 0.7);

        assert_eq!(linspace(3.0, 4.0, 1).collect::<Vec<_>>(), vec![3.0]);
        assert_eq!(linspace(3.0, 4.0, 0).count(), 0);
    }

    #[test]
    fn test_probe_max() {
        assert_eq!(probe_max(&|x: f64| x * x, 0.0, 2.0, 1_000).unwrap(), 4.0);
        assert_eq!(probe_max(&|x: f64| -x, 0.0, 2.0, 10).unwrap(), 0.0);
    }

    #[test]
    fn test_standard_error_tracks_actual_error() {
        let config = MonteCarloConfig::with_samples(200_000);
        let mut rng = StdRng::seed_from_u64(11);
        let estimate = estimate_integral_with_rng(|x| x * x, 0.0, 2.0, &config, &mut rng).unwrap();
        assert_eq!(estimate.bounding_area, 8.0);
        assert!(estimate.standard_error() > 0.0);
        assert!((estimate.value - EXACT_X_SQUARED).abs() < 6.0 * estimate.standard_error());
    }
}

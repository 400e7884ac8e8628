//! Monte Carlo estimators.

pub mod monte_carlo_integration;
#[cfg(feature = "parallel")]
pub mod parallel;

pub use monte_carlo_integration::{
    estimate_integral, estimate_integral_seeded, estimate_integral_with_rng, linspace, probe_max,
    IntegrationEstimate, MonteCarloConfig, DEFAULT_PROBE_POINTS, DEFAULT_SAMPLES,
};
#[cfg(feature = "parallel")]
pub use parallel::par_estimate_integral;

pub mod monte_carlo;
pub mod optimization;
pub mod quadrature;

pub use monte_carlo::{
    estimate_integral, estimate_integral_seeded, estimate_integral_with_rng, IntegrationEstimate,
    MonteCarloConfig,
};
#[cfg(feature = "parallel")]
pub use monte_carlo::par_estimate_integral;

pub use optimization::{
    simplex::LinearProgram, simplex_maximize, simplex_minimize, LpProblem, LpSolution, LpStatus,
    OptimizationConfig, OptimizationResult, Sense,
};

pub use quadrature::{quad, quad_with_config, QuadratureConfig, QuadratureResult};

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use numlab::logging::init_logging;
use numlab::math::monte_carlo::{
    estimate_integral_with_rng, IntegrationEstimate, MonteCarloConfig, DEFAULT_PROBE_POINTS,
    DEFAULT_SAMPLES,
};
use numlab::math::quadrature::quad;
use numlab::report::IntegrationComparison;

/// Estimates the integral of f(x) = x^2 by hit-or-miss Monte Carlo sampling
/// and compares it with adaptive quadrature.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Lower integration bound
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    lower: f64,

    /// Upper integration bound
    #[arg(long, default_value_t = 2.0, allow_negative_numbers = true)]
    upper: f64,

    /// Number of random points
    #[arg(short = 'n', long, default_value_t = DEFAULT_SAMPLES)]
    samples: usize,

    /// Grid size used to find the bounding height
    #[arg(long, default_value_t = DEFAULT_PROBE_POINTS)]
    probe_points: usize,

    /// Seed for a reproducible run; a random one is drawn and logged if omitted
    #[arg(long)]
    seed: Option<u64>,

    /// Sample on all cores (same result as the sequential run for a given seed)
    #[arg(long)]
    parallel: bool,
}

fn integrand(x: f64) -> f64 {
    x * x
}

fn estimate(args: &Args, config: &MonteCarloConfig, seed: u64) -> numlab::Result<IntegrationEstimate> {
    if args.parallel {
        return estimate_parallel(args, config, seed);
    }
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    estimate_integral_with_rng(integrand, args.lower, args.upper, config, &mut rng)
}

#[cfg(feature = "parallel")]
fn estimate_parallel(args: &Args, config: &MonteCarloConfig, seed: u64) -> numlab::Result<IntegrationEstimate> {
    numlab::math::monte_carlo::par_estimate_integral(integrand, args.lower, args.upper, config, seed)
}

#[cfg(not(feature = "parallel"))]
fn estimate_parallel(args: &Args, config: &MonteCarloConfig, seed: u64) -> numlab::Result<IntegrationEstimate> {
    log::warn!("built without the `parallel` feature, sampling sequentially");
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    estimate_integral_with_rng(integrand, args.lower, args.upper, config, &mut rng)
}

fn main() -> Result<()> {
    init_logging();
    let args = Args::parse();

    let seed = args.seed.unwrap_or_else(rand::random);
    info!("sampling with seed {seed}");

    let config = MonteCarloConfig {
        samples: args.samples,
        probe_points: args.probe_points,
        ..MonteCarloConfig::default()
    };
    let mc = estimate(&args, &config, seed).context("Monte Carlo estimate failed")?;
    info!(
        "y_max = {}, accepted {}/{} points, standard error {:.6}",
        mc.y_max,
        mc.accepted,
        mc.samples,
        mc.standard_error()
    );

    let reference = quad(integrand, args.lower, args.upper).context("quadrature failed")?;
    info!("quadrature error estimate {:e}", reference.abs_error);

    println!();
    println!("{}", IntegrationComparison::new(mc.value, reference.value));
    Ok(())
}

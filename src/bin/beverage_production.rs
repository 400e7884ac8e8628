use anyhow::{Context, Result};
use clap::Parser;

use numlab::logging::init_logging;
use numlab::math::optimization::OptimizationConfig;
use numlab::production::optimize_production;

/// Maximizes lemonade and fruit juice production under water, sugar,
/// lemon juice and fruit puree limits.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Pivot limit for the simplex solver
    #[arg(long, default_value_t = 1000)]
    max_iterations: usize,
}

fn main() -> Result<()> {
    init_logging();
    let args = Args::parse();

    let config = OptimizationConfig {
        max_iterations: args.max_iterations,
        ..OptimizationConfig::default()
    };
    let plan = optimize_production(&config).context("solving the production model failed")?;

    println!();
    println!("{plan}");
    Ok(())
}

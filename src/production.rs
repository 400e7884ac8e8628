//! Beverage production planning.
//!
//! Two drinks share four limited resources:
//!
//! | resource    | lemonade | fruit juice | available |
//! |-------------|----------|-------------|-----------|
//! | water       | 2        | 1           | 100       |
//! | sugar       | 1        | 0           | 50        |
//! | lemon juice | 1        | 0           | 30        |
//! | fruit puree | 0        | 2           | 40        |
//!
//! The plan maximizes the total number of drinks produced.

use log::debug;

use crate::error::Result;
use crate::math::optimization::{LpProblem, LpStatus, OptimizationConfig, Sense, Variable};

/// The production model with handles to its two variables.
#[derive(Debug, Clone)]
pub struct BeverageModel {
    pub problem: LpProblem,
    pub lemonade: Variable,
    pub fruit_juice: Variable,
}

/// How much of one resource a plan consumes.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceUsage {
    pub name: String,
    pub used: f64,
    pub available: f64,
}

/// Solved production plan.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductionPlan {
    pub status: LpStatus,
    pub lemonade: f64,
    pub fruit_juice: f64,
    pub total: f64,
    pub resources: Vec<ResourceUsage>,
}

/// Builds the beverage production linear program.
pub fn beverage_problem() -> Result<BeverageModel> {
    let mut problem = LpProblem::new("Beverage_Production_Maximization", Sense::Maximize);
    let lemonade = problem.add_variable("Lemonade");
    let fruit_juice = problem.add_variable("Fruit_Juice");

    problem.set_objective(lemonade + fruit_juice);
    problem.add_constraint("Water", (2.0 * lemonade + fruit_juice).le(100.0))?;
    problem.add_constraint("Sugar", lemonade.le(50.0))?;
    problem.add_constraint("Lemon juice", lemonade.le(30.0))?;
    problem.add_constraint("Fruit puree", (2.0 * fruit_juice).le(40.0))?;

    Ok(BeverageModel {
        problem,
        lemonade,
        fruit_juice,
    })
}

/// Solves the beverage model and reports the plan with its resource usage.
pub fn optimize_production(config: &OptimizationConfig<f64>) -> Result<ProductionPlan> {
    let model = beverage_problem()?;
    let solution = model.problem.solve(config)?;

    let resources = model
        .problem
        .constraints()
        .iter()
        .map(|c| ResourceUsage {
            name: c.name.clone(),
            used: solution.evaluate(&c.spec.expr),
            available: c.spec.rhs,
        })
        .collect();
    debug!("production plan solved in {} pivots", solution.iterations);

    Ok(ProductionPlan {
        status: solution.status,
        lemonade: solution.value(model.lemonade),
        fruit_juice: solution.value(model.fruit_juice),
        total: solution.objective_value,
        resources,
    })
}
